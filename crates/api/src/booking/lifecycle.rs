use sqlx::PgPool;
use uuid::Uuid;

use infra::models::BookingRow;
use infra::repos::{bookings, time_slots, BookingStatus, UserRole};

use crate::error::DomainError;

/// Who is asking for a lifecycle change.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Transition requested on a booking, with its target status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingTransition {
    Confirm,
    Complete,
    Cancel,
}

impl BookingTransition {
    pub fn target(self) -> BookingStatus {
        match self {
            BookingTransition::Confirm => BookingStatus::Confirmed,
            BookingTransition::Complete => BookingStatus::Completed,
            BookingTransition::Cancel => BookingStatus::Cancelled,
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            BookingTransition::Confirm => "confirm",
            BookingTransition::Complete => "complete",
            BookingTransition::Cancel => "cancel",
        }
    }

    pub fn check(self, from: BookingStatus) -> Result<(), DomainError> {
        if from.can_transition_to(self.target()) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                action: self.action(),
                from: from.as_str(),
            })
        }
    }
}

/// Cancel a booking and give its slot back.
///
/// Only the booking's owner or an admin may cancel. The status change and the
/// slot release commit together.
pub async fn cancel(
    pool: &PgPool,
    booking_id: Uuid,
    actor: Actor,
    reason: Option<String>,
) -> Result<BookingRow, DomainError> {
    let mut tx = pool.begin().await?;

    let booking = bookings::get_by_id_for_update(&mut *tx, booking_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;

    if booking.user_id != actor.user_id && !actor.is_admin() {
        return Err(DomainError::Forbidden(
            "only the booking owner or an administrator can cancel this booking".to_string(),
        ));
    }

    BookingTransition::Cancel.check(booking.status)?;

    let cancelled = bookings::mark_cancelled(&mut *tx, booking_id, reason).await?;
    time_slots::release(&mut *tx, cancelled.time_slot_id).await?;

    tx.commit().await?;

    tracing::info!(
        booking_id = %booking_id,
        slot_id = %cancelled.time_slot_id,
        actor = %actor.user_id,
        "booking cancelled, slot released"
    );

    Ok(cancelled)
}

/// Move a pending booking to confirmed, recording the payment reference if given.
pub async fn confirm(
    pool: &PgPool,
    booking_id: Uuid,
    payment_intent_id: Option<String>,
) -> Result<BookingRow, DomainError> {
    transition(pool, booking_id, BookingTransition::Confirm, payment_intent_id).await
}

pub async fn complete(pool: &PgPool, booking_id: Uuid) -> Result<BookingRow, DomainError> {
    transition(pool, booking_id, BookingTransition::Complete, None).await
}

async fn transition(
    pool: &PgPool,
    booking_id: Uuid,
    transition: BookingTransition,
    payment_intent_id: Option<String>,
) -> Result<BookingRow, DomainError> {
    let mut tx = pool.begin().await?;

    let booking = bookings::get_by_id_for_update(&mut *tx, booking_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;

    transition.check(booking.status)?;

    let updated =
        bookings::update_status(&mut *tx, booking_id, transition.target(), payment_intent_id)
            .await?;

    tx.commit().await?;

    tracing::info!(
        booking_id = %booking_id,
        from = booking.status.as_str(),
        to = updated.status.as_str(),
        "booking status changed"
    );

    Ok(updated)
}
