use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Enum, Error, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::cents_to_amount;
use crate::gql::loaders::VenueLoader;
use crate::gql::types::Venue;
use infra::models::FieldRow;
use infra::repos::fields;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum FieldStatus {
    #[graphql(name = "ACTIVE")]
    Active,
    #[graphql(name = "INACTIVE")]
    Inactive,
    #[graphql(name = "MAINTENANCE")]
    Maintenance,
}

impl From<fields::FieldStatus> for FieldStatus {
    fn from(status: fields::FieldStatus) -> Self {
        match status {
            fields::FieldStatus::Active => FieldStatus::Active,
            fields::FieldStatus::Inactive => FieldStatus::Inactive,
            fields::FieldStatus::Maintenance => FieldStatus::Maintenance,
        }
    }
}

impl From<FieldStatus> for fields::FieldStatus {
    fn from(status: FieldStatus) -> Self {
        match status {
            FieldStatus::Active => fields::FieldStatus::Active,
            FieldStatus::Inactive => fields::FieldStatus::Inactive,
            FieldStatus::Maintenance => fields::FieldStatus::Maintenance,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Field {
    pub id: ID,
    pub venue_id: ID,
    pub name: String,
    pub description: Option<String>,
    pub sport_type: String,
    pub capacity: Option<i32>,
    pub surface: Option<String>,
    pub hourly_rate: f64,
    pub peak_hour_rate: Option<f64>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub status: FieldStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FieldRow> for Field {
    fn from(row: FieldRow) -> Self {
        Self {
            id: row.id.into(),
            venue_id: row.venue_id.into(),
            name: row.name,
            description: row.description,
            sport_type: row.sport_type,
            capacity: row.capacity,
            surface: row.surface,
            hourly_rate: cents_to_amount(row.hourly_rate_cents),
            peak_hour_rate: row.peak_hour_rate_cents.map(cents_to_amount),
            amenities: row.amenities,
            images: row.images,
            status: row.status.into(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[ComplexObject]
impl Field {
    async fn venue(&self, ctx: &Context<'_>) -> Result<Venue> {
        let loader = ctx.data::<DataLoader<VenueLoader>>()?;
        let venue_id =
            Uuid::parse_str(self.venue_id.as_str()).map_err(|e| Error::new(e.to_string()))?;

        match loader
            .load_one(venue_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
        {
            Some(row) => Ok(row.into()),
            None => Err(Error::new("Venue not found")),
        }
    }
}

#[derive(InputObject)]
pub struct CreateFieldInput {
    pub venue_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sport_type: String,
    pub capacity: Option<i32>,
    pub surface: Option<String>,
    pub hourly_rate: f64,
    pub peak_hour_rate: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

#[derive(InputObject)]
pub struct UpdateFieldInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sport_type: Option<String>,
    pub capacity: Option<i32>,
    pub surface: Option<String>,
    pub hourly_rate: Option<f64>,
    pub peak_hour_rate: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub status: Option<FieldStatus>,
}
