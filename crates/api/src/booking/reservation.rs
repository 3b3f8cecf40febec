use sqlx::PgPool;
use uuid::Uuid;

use infra::models::BookingRow;
use infra::repos::{bookings, time_slots, CreateBooking};

use super::cents_to_amount;
use crate::error::DomainError;

/// Largest accepted difference between a client-displayed price and the slot price.
pub const PRICE_TOLERANCE: f64 = 0.005;

/// Partial unique index allowing one pending or confirmed booking per slot.
const ACTIVE_BOOKING_CONSTRAINT: &str = "bookings_active_slot_idx";

/// Input of a reservation (parsed and authenticated by the caller).
#[derive(Debug, Clone)]
pub struct ReserveParams {
    pub user_id: Uuid,
    pub time_slot_id: Uuid,
    /// Price the client displayed, in currency units.
    pub expected_price: Option<f64>,
    pub notes: Option<String>,
}

pub fn price_matches(expected: f64, actual_cents: i32) -> bool {
    (expected - cents_to_amount(actual_cents)).abs() < PRICE_TOLERANCE
}

/// Reserve a time slot for a user.
///
/// The slot is claimed with a single conditional update, so under any number
/// of concurrent calls for the same slot exactly one wins and the rest fail
/// with `SlotUnavailable`. The claim and the booking insert share one
/// transaction: any failure after the claim rolls the claim back.
pub async fn reserve(pool: &PgPool, params: ReserveParams) -> Result<BookingRow, DomainError> {
    let mut tx = pool.begin().await?;

    let Some(slot) = time_slots::try_claim(&mut *tx, params.time_slot_id).await? else {
        // Lost claim: tell a missing slot apart from an unavailable one
        let exists = time_slots::get_by_id(&mut *tx, params.time_slot_id)
            .await?
            .is_some();
        tx.rollback().await?;

        if !exists {
            return Err(DomainError::not_found("Time slot", params.time_slot_id));
        }
        tracing::debug!(slot_id = %params.time_slot_id, "slot claim lost");
        return Err(DomainError::SlotUnavailable(params.time_slot_id));
    };

    if let Some(expected) = params.expected_price {
        if !price_matches(expected, slot.price_cents) {
            tx.rollback().await?;
            return Err(DomainError::PriceMismatch {
                expected,
                actual: cents_to_amount(slot.price_cents),
            });
        }
    }

    let booking = bookings::create(
        &mut *tx,
        CreateBooking {
            user_id: params.user_id,
            field_id: slot.field_id,
            time_slot_id: slot.id,
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            total_amount_cents: slot.price_cents,
            notes: params.notes,
        },
    )
    .await;

    let booking = match booking {
        Ok(booking) => booking,
        Err(e) => {
            // Undo the claim before the error leaves this function
            tx.rollback().await?;

            let active_booking_exists = e
                .as_database_error()
                .and_then(|db| db.constraint())
                .is_some_and(|c| c == ACTIVE_BOOKING_CONSTRAINT);
            if active_booking_exists {
                return Err(DomainError::SlotUnavailable(slot.id));
            }

            tracing::error!(slot_id = %slot.id, "booking insert failed after claim: {e}");
            return Err(e.into());
        }
    };

    tx.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        slot_id = %slot.id,
        user_id = %params.user_id,
        "time slot reserved"
    );

    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_within_tolerance_matches() {
        assert!(price_matches(45.0, 4500));
        assert!(price_matches(45.004, 4500));
        assert!(price_matches(44.996, 4500));
    }

    #[test]
    fn stale_price_does_not_match() {
        assert!(!price_matches(44.0, 4500));
        assert!(!price_matches(45.01, 4500));
        assert!(!price_matches(0.0, 1));
    }
}
