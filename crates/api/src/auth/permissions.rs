use async_graphql::{Context, ErrorExtensions, Result};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::DomainError;
use crate::gql::error::{unauthenticated, DomainResultExt, ResultExt};
use crate::gql::types::{Role, User};
use crate::state::AppState;
use infra::models::VenueRow;
use infra::repos::{bookings, users, venues};

/// Claims of the caller, or an `UNAUTHENTICATED` error.
pub fn require_auth<'a>(ctx: &'a Context<'_>) -> Result<&'a Claims> {
    ctx.data::<Claims>().map_err(|_| unauthenticated())
}

pub fn current_user_id(ctx: &Context<'_>) -> Result<Uuid> {
    let claims = require_auth(ctx)?;
    claims.user_id().gql_err("Invalid user ID")
}

/// Check if the authenticated user has the required role
pub async fn require_role(ctx: &Context<'_>, required_role: Role) -> Result<User> {
    let claims = require_auth(ctx)?;

    // Check role from JWT claims first (avoids DB query on mismatch)
    let claims_role = Role::from(claims.role.clone());
    if !has_required_role(claims_role, required_role) {
        return Err(forbidden(match required_role {
            Role::Admin => format!(
                "Administrator privileges required. Your current role is {:?}",
                claims_role
            ),
            Role::VenueOwner => format!(
                "Venue owner privileges required. Your current role is {:?}",
                claims_role
            ),
            Role::Player => "You need to be registered as a player".to_string(),
        }));
    }

    let user_id = claims.user_id().gql_err("Invalid user ID")?;
    let state = ctx.data::<AppState>()?;
    let user = users::get_by_id(&state.db, user_id)
        .await
        .into_gql()?
        .ok_or_else(unauthenticated)?;

    // The stored role wins over a stale token
    let user = User::from(user);
    if !has_required_role(user.role, required_role) {
        return Err(forbidden(format!("Your current role is {:?}", user.role)));
    }

    Ok(user)
}

pub async fn require_admin(ctx: &Context<'_>) -> Result<User> {
    require_role(ctx, Role::Admin).await
}

/// Check if the authenticated user owns the venue (admins own every venue)
pub async fn require_venue_owner(ctx: &Context<'_>, venue_id: Uuid) -> Result<(User, VenueRow)> {
    let user = require_role(ctx, Role::VenueOwner).await?;
    let state = ctx.data::<AppState>()?;

    let venue = venues::get_by_id(&state.db, venue_id)
        .await
        .into_gql()?
        .ok_or_else(|| DomainError::not_found("Venue", venue_id))
        .into_gql()?;

    if user.role != Role::Admin && venue.owner_id != user.uuid() {
        return Err(forbidden(
            "Only administrators and the owner of this venue can perform this action".to_string(),
        ));
    }

    Ok((user, venue))
}

/// Confirm and complete are reserved for admins and the owner of the booked venue.
pub async fn require_booking_manager(ctx: &Context<'_>, booking_id: Uuid) -> Result<User> {
    let user = require_role(ctx, Role::VenueOwner).await?;
    if user.role == Role::Admin {
        return Ok(user);
    }

    let state = ctx.data::<AppState>()?;
    let owner_id = bookings::get_venue_owner_id(&state.db, booking_id)
        .await
        .into_gql()?
        .ok_or_else(|| DomainError::not_found("Booking", booking_id))
        .into_gql()?;

    if owner_id != user.uuid() {
        return Err(forbidden(
            "Only administrators and the venue owner can manage this booking".to_string(),
        ));
    }

    Ok(user)
}

fn forbidden(msg: String) -> async_graphql::Error {
    DomainError::Forbidden(msg).extend()
}

pub fn has_required_role(user_role: Role, required_role: Role) -> bool {
    match required_role {
        Role::Admin => user_role == Role::Admin,
        Role::VenueOwner => user_role == Role::VenueOwner || user_role == Role::Admin, // Admin has owner permissions
        Role::Player => true, // Everyone has player permissions
    }
}
