use async_graphql::{InputObject, SimpleObject, ID};
use chrono::{NaiveDate, NaiveTime};

use crate::booking::cents_to_amount;
use crate::error::DomainError;
use infra::models::TimeSlotRow;

/// Times are exchanged as `HH:MM`.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(value: &str, name: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| DomainError::validation(format!("{name} must be a time in HH:MM format")))
}

#[derive(SimpleObject, Clone)]
pub struct TimeSlot {
    pub id: ID,
    pub field_id: ID,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub price: f64,
    /// False while booked or while the field is out of service
    pub is_available: bool,
    pub is_peak_hour: bool,
    pub admin_blocked: bool,
    pub is_bookable: bool,
}

impl From<TimeSlotRow> for TimeSlot {
    fn from(row: TimeSlotRow) -> Self {
        Self {
            id: row.id.into(),
            field_id: row.field_id.into(),
            date: row.date,
            start_time: format_time(row.start_time),
            end_time: format_time(row.end_time),
            price: cents_to_amount(row.price_cents),
            is_available: row.is_open(),
            is_peak_hour: row.is_peak_hour,
            admin_blocked: row.admin_blocked,
            is_bookable: row.is_bookable(),
        }
    }
}

/// Pushed to `slotAvailability` subscribers whenever a slot is claimed,
/// released, blocked or unblocked.
#[derive(SimpleObject, Clone, Debug)]
pub struct SlotAvailabilityEvent {
    pub time_slot_id: ID,
    pub field_id: ID,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
    pub admin_blocked: bool,
    /// Shorthand for available, not blocked and on an active field
    pub is_bookable: bool,
}

impl From<&TimeSlotRow> for SlotAvailabilityEvent {
    fn from(row: &TimeSlotRow) -> Self {
        Self {
            time_slot_id: row.id.into(),
            field_id: row.field_id.into(),
            date: row.date,
            start_time: format_time(row.start_time),
            end_time: format_time(row.end_time),
            is_available: row.is_open(),
            admin_blocked: row.admin_blocked,
            is_bookable: row.is_bookable(),
        }
    }
}

#[derive(InputObject)]
pub struct CreateTimeSlotInput {
    pub field_id: uuid::Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    /// Defaults to the field's hourly rate
    pub price: Option<f64>,
    #[graphql(default)]
    pub is_peak_hour: bool,
}

#[derive(InputObject)]
pub struct GenerateTimeSlotsInput {
    pub field_id: uuid::Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub opens_at: String,
    pub closes_at: String,
    pub peak_start: Option<String>,
    pub peak_end: Option<String>,
}

#[derive(SimpleObject)]
pub struct GenerateTimeSlotsResult {
    /// Slots in the requested schedule
    pub planned: i32,
    /// Slots actually inserted; existing slots are left untouched
    pub created: i32,
}

#[derive(InputObject)]
pub struct UpdateTimeSlotInput {
    pub end_time: Option<String>,
    pub price: Option<f64>,
    pub is_peak_hour: Option<bool>,
}
