use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Claims;
use crate::booking::{self, Actor, ReserveParams};
use crate::error::{AppError, DomainError};
use crate::extract::{ApiJson, ApiPath};
use crate::gql::subscriptions::{announce_booking, publish_booking_update};
use crate::state::AppState;
use infra::models::{BookingRow, UserRow};
use infra::repos::{bookings, users, UserRole};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    pub time_slot_id: Uuid,
    pub expected_price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub payment_intent_id: Option<String>,
}

/// POST /api/bookings
pub async fn reserve(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    ApiJson(req): ApiJson<ReserveRequest>,
) -> Result<(StatusCode, Json<BookingRow>), AppError> {
    let user = current_user(&state, claims).await?;

    if req.expected_price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(DomainError::validation("expectedPrice must be a non-negative amount").into());
    }

    let booking = booking::reserve(
        &state.db,
        ReserveParams {
            user_id: user.id,
            time_slot_id: req.time_slot_id,
            expected_price: req.expected_price,
            notes: req.notes,
        },
    )
    .await?;

    announce_booking(&state.db, &booking).await;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings
pub async fn list_mine(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<Json<Vec<BookingRow>>, AppError> {
    let user = current_user(&state, claims).await?;
    let rows = bookings::list_by_user(&state.db, user.id).await?;
    Ok(Json(rows))
}

/// POST /api/bookings/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    ApiPath(id): ApiPath<Uuid>,
    body: Option<ApiJson<CancelRequest>>,
) -> Result<Json<BookingRow>, AppError> {
    let user = current_user(&state, claims).await?;
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();

    let booking = booking::cancel(&state.db, id, Actor::new(user.id, user.role), req.reason).await?;

    announce_booking(&state.db, &booking).await;
    Ok(Json(booking))
}

/// POST /api/bookings/{id}/confirm
pub async fn confirm(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    ApiPath(id): ApiPath<Uuid>,
    body: Option<ApiJson<ConfirmRequest>>,
) -> Result<Json<BookingRow>, AppError> {
    let user = current_user(&state, claims).await?;
    require_booking_manager(&state, &user, id).await?;
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();

    let booking = booking::confirm(&state.db, id, req.payment_intent_id).await?;

    publish_booking_update(&booking);
    Ok(Json(booking))
}

/// POST /api/bookings/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<BookingRow>, AppError> {
    let user = current_user(&state, claims).await?;
    require_booking_manager(&state, &user, id).await?;

    let booking = booking::complete(&state.db, id).await?;

    publish_booking_update(&booking);
    Ok(Json(booking))
}

async fn current_user(
    state: &AppState,
    claims: Option<Extension<Claims>>,
) -> Result<UserRow, AppError> {
    let Extension(claims) =
        claims.ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

    users::get_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
}

/// Admins, or the owner of the venue the booking belongs to.
async fn require_booking_manager(
    state: &AppState,
    user: &UserRow,
    booking_id: Uuid,
) -> Result<(), AppError> {
    if user.role == UserRole::Admin {
        return Ok(());
    }

    let owner_id = bookings::get_venue_owner_id(&state.db, booking_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Booking", booking_id))?;

    if owner_id != user.id {
        return Err(DomainError::Forbidden(
            "only administrators and the venue owner can manage this booking".to_string(),
        )
        .into());
    }

    Ok(())
}
