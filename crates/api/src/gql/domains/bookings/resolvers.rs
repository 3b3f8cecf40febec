use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::auth::permissions::{
    current_user_id, require_booking_manager, require_role, require_venue_owner,
};
use crate::booking::{self, Actor, ReserveParams};
use crate::error::DomainError;
use crate::gql::error::DomainResultExt;
use crate::gql::subscriptions::{announce_booking, publish_booking_update};
use crate::gql::types::{Booking, Role};
use crate::state::AppState;
use infra::repos::bookings;

use super::types::ReserveTimeSlotInput;

#[derive(Default)]
pub struct BookingQuery;

#[Object]
impl BookingQuery {
    /// The caller's bookings, newest first
    async fn my_bookings(&self, ctx: &Context<'_>) -> Result<Vec<Booking>> {
        let user_id = current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;

        let rows = bookings::list_by_user(&state.db, user_id).await.into_gql()?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }

    /// A single booking, visible to its owner, the venue owner and admins
    async fn booking(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Booking>> {
        let user = require_role(ctx, Role::Player).await?;
        let state = ctx.data::<AppState>()?;

        let Some(row) = bookings::get_by_id(&state.db, id).await.into_gql()? else {
            return Ok(None);
        };

        if row.user_id != user.uuid() && user.role != Role::Admin {
            let owner_id = bookings::get_venue_owner_id(&state.db, id)
                .await
                .into_gql()?;
            if owner_id != Some(user.uuid()) {
                return Err(DomainError::Forbidden(
                    "you cannot view this booking".to_string(),
                ))
                .into_gql();
            }
        }

        Ok(Some(row.into()))
    }

    /// Every booking on the venue's fields (venue owner or admin)
    async fn venue_bookings(&self, ctx: &Context<'_>, venue_id: Uuid) -> Result<Vec<Booking>> {
        require_venue_owner(ctx, venue_id).await?;
        let state = ctx.data::<AppState>()?;

        let rows = bookings::list_by_venue(&state.db, venue_id).await.into_gql()?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }
}

#[derive(Default)]
pub struct BookingMutation;

#[Object]
impl BookingMutation {
    /// Reserve a time slot for the caller. The booking starts out pending.
    async fn reserve_time_slot(
        &self,
        ctx: &Context<'_>,
        input: ReserveTimeSlotInput,
    ) -> Result<Booking> {
        let user_id = current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;

        let row = booking::reserve(
            &state.db,
            ReserveParams {
                user_id,
                time_slot_id: input.time_slot_id,
                expected_price: input.expected_price,
                notes: input.notes,
            },
        )
        .await
        .into_gql()?;

        announce_booking(&state.db, &row).await;
        Ok(row.into())
    }

    /// Cancel a booking (its owner or an admin). The slot becomes bookable again.
    async fn cancel_booking(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Booking> {
        let user = require_role(ctx, Role::Player).await?;
        let state = ctx.data::<AppState>()?;

        let actor = Actor::new(user.uuid(), user.role.into());
        let row = booking::cancel(&state.db, id, actor, reason)
            .await
            .into_gql()?;

        announce_booking(&state.db, &row).await;
        Ok(row.into())
    }

    /// Confirm a pending booking (venue owner or admin)
    async fn confirm_booking(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        payment_intent_id: Option<String>,
    ) -> Result<Booking> {
        require_booking_manager(ctx, id).await?;
        let state = ctx.data::<AppState>()?;

        let row = booking::confirm(&state.db, id, payment_intent_id)
            .await
            .into_gql()?;

        publish_booking_update(&row);
        Ok(row.into())
    }

    /// Mark a confirmed booking as played (venue owner or admin)
    async fn complete_booking(&self, ctx: &Context<'_>, id: Uuid) -> Result<Booking> {
        require_booking_manager(ctx, id).await?;
        let state = ctx.data::<AppState>()?;

        let row = booking::complete(&state.db, id).await.into_gql()?;

        publish_booking_update(&row);
        Ok(row.into())
    }
}
