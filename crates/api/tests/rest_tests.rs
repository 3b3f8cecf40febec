mod common;

use std::net::SocketAddr;

use api::app::build_router;
use api::auth::Claims;
use api::gql::build_schema;
use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn router(app_state: &api::AppState) -> Router {
    build_router(app_state.clone(), build_schema(app_state.clone()))
}

fn bearer(app_state: &api::AppState, claims: &Claims) -> String {
    let user_id = claims.user_id().expect("claims carry a user id");
    let token = app_state
        .jwt_service()
        .create_token(user_id, claims.email.clone(), claims.role.clone())
        .expect("token should encode");
    format!("Bearer {token}")
}

fn post(uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let mut request = builder.body(body).expect("valid request");
    // The auth routes are rate limited per peer address
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
    request
}

fn post_raw(uri: &str, auth: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("valid request")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn assert_error(body: &Value, code: &str) {
    assert_eq!(body["code"], code, "body: {body}");
    assert!(body["error"].is_string(), "body: {body}");
}

#[tokio::test]
async fn test_reserve_returns_created_then_conflict() {
    let app_state = setup_test_db().await;
    let app = router(&app_state);
    let fixture = create_fixture(&app_state).await;
    let (player_id, player) = create_test_user(&app_state, "player").await;
    let (_, rival) = create_test_user(&app_state, "player").await;

    let body = json!({ "timeSlotId": fixture.slot_id, "expectedPrice": 45.0 });

    let (status, booking) = send(
        &app,
        post("/api/bookings", Some(&bearer(&app_state, &player)), Some(body.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["user_id"], player_id.to_string());
    assert_eq!(booking["total_amount_cents"], 4500);

    let (status, error) = send(
        &app,
        post("/api/bookings", Some(&bearer(&app_state, &rival)), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error(&error, "SLOT_UNAVAILABLE");
}

#[tokio::test]
async fn test_reserve_at_stale_price_is_conflict() {
    let app_state = setup_test_db().await;
    let app = router(&app_state);
    let fixture = create_fixture(&app_state).await;
    let (_, player) = create_test_user(&app_state, "player").await;

    let (status, error) = send(
        &app,
        post(
            "/api/bookings",
            Some(&bearer(&app_state, &player)),
            Some(json!({ "timeSlotId": fixture.slot_id, "expectedPrice": 30.0 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error(&error, "PRICE_MISMATCH");
}

#[tokio::test]
async fn test_reserve_unknown_slot_is_not_found() {
    let app_state = setup_test_db().await;
    let app = router(&app_state);
    let (_, player) = create_test_user(&app_state, "player").await;

    let (status, error) = send(
        &app,
        post(
            "/api/bookings",
            Some(&bearer(&app_state, &player)),
            Some(json!({ "timeSlotId": Uuid::new_v4() })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&error, "NOT_FOUND");
}

#[tokio::test]
async fn test_booking_routes_require_a_valid_token() {
    let app_state = setup_test_db().await;
    let app = router(&app_state);
    let fixture = create_fixture(&app_state).await;
    let body = json!({ "timeSlotId": fixture.slot_id });

    let (status, error) = send(&app, post("/api/bookings", None, Some(body.clone()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&error, "UNAUTHORIZED");

    let (status, error) = send(
        &app,
        post("/api/bookings", Some("Bearer not-a-jwt"), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&error, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_requests_are_validation_errors() {
    let app_state = setup_test_db().await;
    let app = router(&app_state);
    let (_, player) = create_test_user(&app_state, "player").await;
    let auth = bearer(&app_state, &player);

    // Not JSON at all
    let (status, error) = send(&app, post_raw("/api/bookings", &auth, "{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&error, "VALIDATION_ERROR");

    // Valid JSON missing timeSlotId
    let (status, error) = send(&app, post_raw("/api/bookings", &auth, r#"{"notes":"hi"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&error, "VALIDATION_ERROR");

    // Path id that is not a UUID
    let (status, error) = send(&app, post("/api/bookings/42/cancel", Some(&auth), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&error, "VALIDATION_ERROR");

    // Optional body that is present but broken
    let (status, error) = send(
        &app,
        post_raw(&format!("/api/bookings/{}/cancel", Uuid::new_v4()), &auth, "[1,"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&error, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_confirm_is_limited_to_the_venue_owner_then_cancel_frees_slot() {
    let app_state = setup_test_db().await;
    let app = router(&app_state);
    let fixture = create_fixture(&app_state).await;
    let (_, player) = create_test_user(&app_state, "player").await;
    let (_, other_owner) = create_test_user(&app_state, "venue_owner").await;
    let (_, rival) = create_test_user(&app_state, "player").await;

    let (_, booking) = send(
        &app,
        post(
            "/api/bookings",
            Some(&bearer(&app_state, &player)),
            Some(json!({ "timeSlotId": fixture.slot_id })),
        ),
    )
    .await;
    let booking_id = booking["id"].as_str().expect("booking id").to_string();

    let confirm_uri = format!("/api/bookings/{booking_id}/confirm");
    let (status, error) = send(
        &app,
        post(&confirm_uri, Some(&bearer(&app_state, &other_owner)), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&error, "FORBIDDEN");

    let (status, confirmed) = send(
        &app,
        post(
            &confirm_uri,
            Some(&bearer(&app_state, &fixture.owner_claims)),
            Some(json!({ "paymentIntentId": "pi_rest" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");
    assert_eq!(confirmed["payment_intent_id"], "pi_rest");

    // The player calls off the confirmed booking
    let (status, cancelled) = send(
        &app,
        post(
            &format!("/api/bookings/{booking_id}/cancel"),
            Some(&bearer(&app_state, &player)),
            Some(json!({ "reason": "team short" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancellation_reason"], "team short");

    // Completing a cancelled booking is an invalid transition
    let (status, error) = send(
        &app,
        post(
            &format!("/api/bookings/{booking_id}/complete"),
            Some(&bearer(&app_state, &fixture.owner_claims)),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_error(&error, "INVALID_TRANSITION");

    let (status, _) = send(
        &app,
        post(
            "/api/bookings",
            Some(&bearer(&app_state, &rival)),
            Some(json!({ "timeSlotId": fixture.slot_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_refuses_admin_and_accepts_players() {
    let app_state = setup_test_db().await;
    let app = router(&app_state);
    let tag = Uuid::new_v4().simple().to_string();

    let (status, error) = send(
        &app,
        post(
            "/api/auth/register",
            None,
            Some(json!({
                "email": format!("boss-{tag}@test.playhub"),
                "username": format!("boss_{tag}"),
                "password": "password123",
                "role": "admin"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_error(&error, "FORBIDDEN");

    let email = format!("player-{tag}@test.playhub");
    let (status, registered) = send(
        &app,
        post(
            "/api/auth/register",
            None,
            Some(json!({
                "email": email,
                "username": format!("player_{tag}"),
                "password": "password123"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registered["user"]["role"], "player");
    assert!(registered["user"].get("password_hash").is_none());
    assert!(registered["token"].is_string());

    let (status, error) = send(
        &app,
        post(
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "wrong-password1" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&error, "UNAUTHORIZED");

    let (status, logged_in) = send(
        &app,
        post(
            "/api/auth/login",
            None,
            Some(json!({ "email": email, "password": "password123" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logged_in["user"]["email"], email.as_str());
}

#[tokio::test]
async fn test_register_with_malformed_body_is_validation_error() {
    let app_state = setup_test_db().await;
    let app = router(&app_state);

    let (status, error) = send(
        &app,
        post("/api/auth/register", None, Some(json!({ "email": "x@y.z" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&error, "VALIDATION_ERROR");
}
