use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::repos::bookings::BookingStatus;
use crate::repos::fields::FieldStatus;
use crate::repos::users::UserRole;
use crate::repos::venues::VenueStatus;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VenueRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub status: VenueStatus,
    pub rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FieldRow {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sport_type: String,
    pub capacity: Option<i32>,
    pub surface: Option<String>,
    pub hourly_rate_cents: i32,
    pub peak_hour_rate_cents: Option<i32>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub status: FieldStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TimeSlotRow {
    pub id: Uuid,
    pub field_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub price_cents: i32,
    pub is_available: bool,
    pub is_peak_hour: bool,
    pub admin_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whether the owning field is `active`; computed when the row is read.
    pub field_active: bool,
}

impl TimeSlotRow {
    /// Open on an active field. `is_available` alone only says no live
    /// booking holds the slot.
    pub fn is_open(&self) -> bool {
        self.is_available && self.field_active
    }

    /// What a reservation attempt would see right now.
    pub fn is_bookable(&self) -> bool {
        self.is_open() && !self.admin_blocked
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub field_id: Uuid,
    pub time_slot_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_amount_cents: i32,
    pub status: BookingStatus,
    pub payment_intent_id: Option<String>,
    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub venue_id: Uuid,
    pub field_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_moderated: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct VenueStatsRow {
    pub total_bookings: i64,
    pub total_revenue_cents: i64,
    pub total_slots: i64,
    pub booked_slots: i64,
    pub active_fields: i64,
}

impl VenueStatsRow {
    /// Share of the venue's slots held by a live or completed booking.
    pub fn occupancy_rate(&self) -> f64 {
        if self.total_slots == 0 {
            0.0
        } else {
            self.booked_slots as f64 / self.total_slots as f64
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlatformStatsRow {
    pub total_users: i64,
    pub active_venues: i64,
    pub total_bookings: i64,
    pub platform_revenue_cents: i64,
    pub pending_reviews: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total_slots: i64, booked_slots: i64) -> VenueStatsRow {
        VenueStatsRow {
            total_bookings: booked_slots,
            total_revenue_cents: 0,
            total_slots,
            booked_slots,
            active_fields: 1,
        }
    }

    #[test]
    fn occupancy_is_zero_without_slots() {
        assert_eq!(stats(0, 0).occupancy_rate(), 0.0);
    }

    #[test]
    fn occupancy_is_booked_share() {
        assert!((stats(8, 2).occupancy_rate() - 0.25).abs() < f64::EPSILON);
    }

    fn slot(is_available: bool, admin_blocked: bool, field_active: bool) -> TimeSlotRow {
        TimeSlotRow {
            id: Uuid::new_v4(),
            field_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            price_cents: 4500,
            is_available,
            is_peak_hour: false,
            admin_blocked,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            field_active,
        }
    }

    #[test]
    fn inactive_field_closes_its_slots() {
        let row = slot(true, false, false);
        assert!(!row.is_open());
        assert!(!row.is_bookable());
    }

    #[test]
    fn bookable_needs_open_and_unblocked() {
        assert!(slot(true, false, true).is_bookable());
        assert!(!slot(true, true, true).is_bookable());
        assert!(slot(true, true, true).is_open());
        assert!(!slot(false, false, true).is_bookable());
    }
}
