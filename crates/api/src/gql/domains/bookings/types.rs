use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Enum, Error, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::booking::cents_to_amount;
use crate::gql::domains::slots::types::format_time;
use crate::gql::loaders::{FieldLoader, UserLoader};
use crate::gql::types::{Field, User};
use infra::models::BookingRow;
use infra::repos::bookings;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum BookingStatus {
    #[graphql(name = "PENDING")]
    Pending,
    #[graphql(name = "CONFIRMED")]
    Confirmed,
    #[graphql(name = "CANCELLED")]
    Cancelled,
    #[graphql(name = "COMPLETED")]
    Completed,
}

impl From<bookings::BookingStatus> for BookingStatus {
    fn from(status: bookings::BookingStatus) -> Self {
        match status {
            bookings::BookingStatus::Pending => BookingStatus::Pending,
            bookings::BookingStatus::Confirmed => BookingStatus::Confirmed,
            bookings::BookingStatus::Cancelled => BookingStatus::Cancelled,
            bookings::BookingStatus::Completed => BookingStatus::Completed,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Booking {
    pub id: ID,
    pub user_id: ID,
    pub field_id: ID,
    pub time_slot_id: ID,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub payment_intent_id: Option<String>,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            field_id: row.field_id.into(),
            time_slot_id: row.time_slot_id.into(),
            date: row.date,
            start_time: format_time(row.start_time),
            end_time: format_time(row.end_time),
            total_amount: cents_to_amount(row.total_amount_cents),
            status: row.status.into(),
            payment_intent_id: row.payment_intent_id,
            cancellation_reason: row.cancellation_reason,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[ComplexObject]
impl Booking {
    async fn field(&self, ctx: &Context<'_>) -> Result<Option<Field>> {
        let field_id =
            Uuid::parse_str(self.field_id.as_str()).map_err(|e| Error::new(e.to_string()))?;
        let loader = ctx.data::<DataLoader<FieldLoader>>()?;

        Ok(loader
            .load_one(field_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
            .map(Field::from))
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let user_id =
            Uuid::parse_str(self.user_id.as_str()).map_err(|e| Error::new(e.to_string()))?;
        let loader = ctx.data::<DataLoader<UserLoader>>()?;

        Ok(loader
            .load_one(user_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
            .map(User::from))
    }
}

#[derive(InputObject)]
pub struct ReserveTimeSlotInput {
    pub time_slot_id: Uuid,
    /// Price shown to the player, in currency units. Rejected if stale.
    pub expected_price: Option<f64>,
    pub notes: Option<String>,
}
