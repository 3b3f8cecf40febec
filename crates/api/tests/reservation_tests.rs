mod common;

use api::booking::{self, ReserveParams};
use api::error::DomainError;
use common::*;
use infra::repos::{bookings, time_slots, BookingStatus};
use uuid::Uuid;

fn params(user_id: Uuid, time_slot_id: Uuid, expected_price: Option<f64>) -> ReserveParams {
    ReserveParams {
        user_id,
        time_slot_id,
        expected_price,
        notes: None,
    }
}

#[tokio::test]
async fn test_reserve_claims_slot_and_creates_pending_booking() {
    let app_state = setup_test_db().await;
    let fixture = create_fixture(&app_state).await;
    let (player_id, _) = create_test_user(&app_state, "player").await;

    let booking = booking::reserve(&app_state.db, params(player_id, fixture.slot_id, Some(45.0)))
        .await
        .expect("reservation should succeed");

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.user_id, player_id);
    assert_eq!(booking.field_id, fixture.field_id);
    assert_eq!(booking.time_slot_id, fixture.slot_id);
    assert_eq!(booking.date, date(2024, 6, 1));
    assert_eq!(booking.start_time.format("%H:%M").to_string(), "18:00");
    assert_eq!(booking.end_time.format("%H:%M").to_string(), "19:00");
    assert_eq!(booking.total_amount_cents, 4500);

    let slot = time_slots::get_by_id(&app_state.db, fixture.slot_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!slot.is_available);
}

#[tokio::test]
async fn test_second_reservation_of_same_slot_is_unavailable() {
    let app_state = setup_test_db().await;
    let fixture = create_fixture(&app_state).await;
    let (first, _) = create_test_user(&app_state, "player").await;
    let (second, _) = create_test_user(&app_state, "player").await;

    booking::reserve(&app_state.db, params(first, fixture.slot_id, None))
        .await
        .expect("first reservation should succeed");

    let err = booking::reserve(&app_state.db, params(second, fixture.slot_id, None))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SlotUnavailable(id) if id == fixture.slot_id));
}

#[tokio::test]
async fn test_reserve_unknown_slot_is_not_found() {
    let app_state = setup_test_db().await;
    let (player_id, _) = create_test_user(&app_state, "player").await;

    let err = booking::reserve(&app_state.db, params(player_id, Uuid::new_v4(), None))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_price_mismatch_leaves_slot_available() {
    let app_state = setup_test_db().await;
    let fixture = create_fixture(&app_state).await;
    let (player_id, _) = create_test_user(&app_state, "player").await;

    let err = booking::reserve(&app_state.db, params(player_id, fixture.slot_id, Some(30.0)))
        .await
        .unwrap_err();
    match err {
        DomainError::PriceMismatch { expected, actual } => {
            assert_eq!(expected, 30.0);
            assert_eq!(actual, 45.0);
        }
        other => panic!("expected PriceMismatch, got {other:?}"),
    }

    let slot = time_slots::get_by_id(&app_state.db, fixture.slot_id)
        .await
        .unwrap()
        .unwrap();
    assert!(slot.is_available, "claim must roll back on price mismatch");

    let slot_bookings = bookings::list_by_time_slot(&app_state.db, fixture.slot_id)
        .await
        .unwrap();
    assert!(slot_bookings.is_empty());

    // The correct price still goes through afterwards
    booking::reserve(&app_state.db, params(player_id, fixture.slot_id, Some(45.0)))
        .await
        .expect("reservation at the current price should succeed");
}

#[tokio::test]
async fn test_blocked_slot_cannot_be_reserved() {
    let app_state = setup_test_db().await;
    let fixture = create_fixture(&app_state).await;
    let (player_id, _) = create_test_user(&app_state, "player").await;

    time_slots::set_admin_blocked(&app_state.db, fixture.slot_id, true)
        .await
        .unwrap();

    let err = booking::reserve(&app_state.db, params(player_id, fixture.slot_id, None))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SlotUnavailable(_)));
}

#[tokio::test]
async fn test_slot_on_inactive_field_cannot_be_reserved() {
    let app_state = setup_test_db().await;
    let fixture = create_fixture(&app_state).await;
    let (player_id, _) = create_test_user(&app_state, "player").await;

    sqlx::query("UPDATE fields SET status = 'maintenance' WHERE id = $1")
        .bind(fixture.field_id)
        .execute(&app_state.db)
        .await
        .unwrap();

    let err = booking::reserve(&app_state.db, params(player_id, fixture.slot_id, None))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SlotUnavailable(_)));

    let slot = time_slots::get_by_id(&app_state.db, fixture.slot_id)
        .await
        .unwrap()
        .unwrap();
    assert!(slot.is_available);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_have_exactly_one_winner() {
    let app_state = setup_test_db().await;
    let fixture = create_fixture(&app_state).await;

    let mut players = Vec::new();
    for _ in 0..50 {
        let (player_id, _) = create_test_user(&app_state, "player").await;
        players.push(player_id);
    }

    let mut handles = Vec::new();
    for player_id in players {
        let pool = app_state.db.clone();
        let slot_id = fixture.slot_id;
        handles.push(tokio::spawn(async move {
            booking::reserve(&pool, params(player_id, slot_id, Some(45.0))).await
        }));
    }

    let mut winners = 0;
    let mut unavailable = 0;
    for handle in handles {
        match handle.await.expect("reservation task panicked") {
            Ok(_) => winners += 1,
            Err(DomainError::SlotUnavailable(_)) => unavailable += 1,
            Err(other) => panic!("unexpected reservation error: {other:?}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(unavailable, 49);

    let slot_bookings = bookings::list_by_time_slot(&app_state.db, fixture.slot_id)
        .await
        .unwrap();
    assert_eq!(slot_bookings.len(), 1);
}
