use async_graphql::{Context, Result, Subscription};
use futures_util::Stream;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use uuid::Uuid;

use crate::auth::permissions::current_user_id;
use crate::gql::types::{Booking, SlotAvailabilityEvent};
use infra::db::Db;
use infra::models::{BookingRow, TimeSlotRow};
use infra::repos::time_slots;

const CHANNEL_CAPACITY: usize = 100;

/// All subscription channels
struct SubscriptionChannels {
    /// Per-field slot availability channels
    fields: HashMap<Uuid, broadcast::Sender<SlotAvailabilityEvent>>,
    /// Per-user booking status channels
    users: HashMap<Uuid, broadcast::Sender<Booking>>,
}

impl SubscriptionChannels {
    fn new() -> Self {
        Self {
            fields: HashMap::new(),
            users: HashMap::new(),
        }
    }

    /// Drop channels whose subscribers have all gone away. Runs on every
    /// subscribe.
    fn prune(&mut self) {
        self.fields.retain(|_, sender| sender.receiver_count() > 0);
        self.users.retain(|_, sender| sender.receiver_count() > 0);
    }

    fn get_or_create_field(&mut self, field_id: Uuid) -> &broadcast::Sender<SlotAvailabilityEvent> {
        self.prune();
        self.fields
            .entry(field_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
    }

    fn get_or_create_user(&mut self, user_id: Uuid) -> &broadcast::Sender<Booking> {
        self.prune();
        self.users
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
    }
}

static CHANNELS: Lazy<Arc<Mutex<SubscriptionChannels>>> =
    Lazy::new(|| Arc::new(Mutex::new(SubscriptionChannels::new())));

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Availability changes (reserved, released, blocked) of the slots of one field
    async fn slot_availability(
        &self,
        field_id: Uuid,
    ) -> Result<impl Stream<Item = Result<SlotAvailabilityEvent, BroadcastStreamRecvError>>> {
        let receiver = {
            let mut channels = CHANNELS.lock();
            channels.get_or_create_field(field_id).subscribe()
        };

        Ok(BroadcastStream::new(receiver))
    }

    /// Status changes of the caller's own bookings
    async fn my_booking_updates(
        &self,
        ctx: &Context<'_>,
    ) -> Result<impl Stream<Item = Result<Booking, BroadcastStreamRecvError>>> {
        let user_id = current_user_id(ctx)?;

        let receiver = {
            let mut channels = CHANNELS.lock();
            channels.get_or_create_user(user_id).subscribe()
        };

        Ok(BroadcastStream::new(receiver))
    }
}

// ============================================================================
// Publish functions - send events to listening channels
// ============================================================================

/// Publish a slot's current availability to its field's channel.
/// Nothing is sent when no one ever subscribed to that field.
pub fn publish_slot_change(slot: &TimeSlotRow) {
    let mut channels = CHANNELS.lock();
    let Some(sender) = channels.fields.get(&slot.field_id) else {
        return;
    };

    if sender.send(SlotAvailabilityEvent::from(slot)).is_err() {
        // Every subscriber is gone
        channels.fields.remove(&slot.field_id);
    }
}

/// Publish a booking's new state to its owner's channel
pub fn publish_booking_update(booking: &BookingRow) {
    let mut channels = CHANNELS.lock();
    let Some(sender) = channels.users.get(&booking.user_id) else {
        return;
    };

    if sender.send(Booking::from(booking.clone())).is_err() {
        channels.users.remove(&booking.user_id);
    }
}

/// Push a booking change and its slot's new availability to subscribers.
pub async fn announce_booking(db: &Db, booking: &BookingRow) {
    publish_booking_update(booking);

    match time_slots::get_by_id(db, booking.time_slot_id).await {
        Ok(Some(slot)) => publish_slot_change(&slot),
        Ok(None) => {}
        Err(e) => tracing::warn!(
            slot_id = %booking.time_slot_id,
            "failed to load slot for broadcast: {e}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn slot(field_id: Uuid) -> TimeSlotRow {
        TimeSlotRow {
            id: Uuid::new_v4(),
            field_id,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            price_cents: 4500,
            is_available: false,
            is_peak_hour: true,
            admin_blocked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            field_active: true,
        }
    }

    #[tokio::test]
    async fn slot_changes_reach_field_subscribers() {
        let field_id = Uuid::new_v4();
        let mut receiver = CHANNELS.lock().get_or_create_field(field_id).subscribe();

        let row = slot(field_id);
        publish_slot_change(&row);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.time_slot_id, async_graphql::ID::from(row.id));
        assert!(!event.is_available);
    }

    #[test]
    fn publishing_without_subscribers_creates_no_channel() {
        let field_id = Uuid::new_v4();
        publish_slot_change(&slot(field_id));
        assert!(!CHANNELS.lock().fields.contains_key(&field_id));
    }

    #[test]
    fn abandoned_channels_are_dropped_on_next_subscribe() {
        let mut channels = SubscriptionChannels::new();
        let left = Uuid::new_v4();
        let stayed = Uuid::new_v4();

        let gone = channels.get_or_create_field(left).subscribe();
        let _kept = channels.get_or_create_user(stayed).subscribe();
        drop(gone);

        let _late = channels.get_or_create_field(Uuid::new_v4()).subscribe();

        assert!(!channels.fields.contains_key(&left));
        assert!(channels.users.contains_key(&stayed));
        assert_eq!(channels.fields.len(), 1);
    }
}
