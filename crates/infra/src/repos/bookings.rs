use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgExecutor, Result as SqlxResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::BookingRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Terminal states accept no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    /// Booking lifecycle:
    ///
    /// ```text
    /// pending   -> confirmed -> completed
    /// pending   -> cancelled
    /// confirmed -> cancelled
    /// ```
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(format!("Unknown booking status: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub user_id: Uuid,
    pub field_id: Uuid,
    pub time_slot_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_amount_cents: i32,
    pub notes: Option<String>,
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, data: CreateBooking) -> SqlxResult<BookingRow> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        INSERT INTO bookings (user_id, field_id, time_slot_id, date, start_time, end_time,
                              total_amount_cents, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, user_id, field_id, time_slot_id, date, start_time, end_time,
                  total_amount_cents, status, payment_intent_id, cancellation_reason, notes,
                  created_at, updated_at
        "#,
    )
    .bind(data.user_id)
    .bind(data.field_id)
    .bind(data.time_slot_id)
    .bind(data.date)
    .bind(data.start_time)
    .bind(data.end_time)
    .bind(data.total_amount_cents)
    .bind(&data.notes)
    .fetch_one(executor)
    .await
}

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, user_id, field_id, time_slot_id, date, start_time, end_time,
               total_amount_cents, status, payment_intent_id, cancellation_reason, notes,
               created_at, updated_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Same as [`get_by_id`] but takes a row lock for the rest of the transaction.
pub async fn get_by_id_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, user_id, field_id, time_slot_id, date, start_time, end_time,
               total_amount_cents, status, payment_intent_id, cancellation_reason, notes,
               created_at, updated_at
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_user<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> SqlxResult<Vec<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, user_id, field_id, time_slot_id, date, start_time, end_time,
               total_amount_cents, status, payment_intent_id, cancellation_reason, notes,
               created_at, updated_at
        FROM bookings
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn list_by_venue<'e>(
    executor: impl PgExecutor<'e>,
    venue_id: Uuid,
) -> SqlxResult<Vec<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT b.id, b.user_id, b.field_id, b.time_slot_id, b.date, b.start_time, b.end_time,
               b.total_amount_cents, b.status, b.payment_intent_id, b.cancellation_reason,
               b.notes, b.created_at, b.updated_at
        FROM bookings b
        INNER JOIN fields f ON b.field_id = f.id
        WHERE f.venue_id = $1
        ORDER BY b.created_at DESC
        "#,
    )
    .bind(venue_id)
    .fetch_all(executor)
    .await
}

pub async fn list_by_time_slot<'e>(
    executor: impl PgExecutor<'e>,
    time_slot_id: Uuid,
) -> SqlxResult<Vec<BookingRow>> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        SELECT id, user_id, field_id, time_slot_id, date, start_time, end_time,
               total_amount_cents, status, payment_intent_id, cancellation_reason, notes,
               created_at, updated_at
        FROM bookings
        WHERE time_slot_id = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(time_slot_id)
    .fetch_all(executor)
    .await
}

/// Set a new status. `payment_intent_id` is only overwritten when provided.
pub async fn update_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: BookingStatus,
    payment_intent_id: Option<String>,
) -> SqlxResult<BookingRow> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
        SET status = $2,
            payment_intent_id = COALESCE($3, payment_intent_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, field_id, time_slot_id, date, start_time, end_time,
                  total_amount_cents, status, payment_intent_id, cancellation_reason, notes,
                  created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(payment_intent_id)
    .fetch_one(executor)
    .await
}

pub async fn mark_cancelled<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    reason: Option<String>,
) -> SqlxResult<BookingRow> {
    sqlx::query_as::<_, BookingRow>(
        r#"
        UPDATE bookings
        SET status = 'cancelled', cancellation_reason = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, user_id, field_id, time_slot_id, date, start_time, end_time,
                  total_amount_cents, status, payment_intent_id, cancellation_reason, notes,
                  created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(reason)
    .fetch_one(executor)
    .await
}

/// Owner of the venue the booking's field belongs to.
pub async fn get_venue_owner_id<'e>(
    executor: impl PgExecutor<'e>,
    booking_id: Uuid,
) -> SqlxResult<Option<Uuid>> {
    sqlx::query_scalar(
        r#"
        SELECT v.owner_id
        FROM bookings b
        JOIN fields f ON f.id = b.field_id
        JOIN venues v ON v.id = f.venue_id
        WHERE b.id = $1
        "#,
    )
    .bind(booking_id)
    .fetch_optional(executor)
    .await
}
