use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::auth::permissions::{require_admin, require_role, require_venue_owner};
use crate::auth::Claims;
use crate::booking::amount_to_cents;
use crate::error::DomainError;
use crate::gql::error::DomainResultExt;
use crate::gql::types::{PaginatedResponse, PaginationInput, Role, Venue};
use crate::state::AppState;
use infra::repos::{venues, CreateVenue, UpdateVenue, VenueFilter, VenueSearch};

use super::types::{
    CreateVenueInput, UpdateVenueInput, VenueFilterInput, VenueSearchInput, VenueStatus,
};

#[derive(Default)]
pub struct VenueQuery;

#[Object]
impl VenueQuery {
    /// List venues ordered by rating. Without a status filter only approved
    /// venues are listed; other statuses are visible to admins and to owners
    /// filtering on their own venues.
    async fn venues(
        &self,
        ctx: &Context<'_>,
        filter: Option<VenueFilterInput>,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<Venue>> {
        let state = ctx.data::<AppState>()?;
        let filter = filter.unwrap_or_default();
        let status = filter.status.unwrap_or(VenueStatus::Approved);

        if status != VenueStatus::Approved && !can_see_unapproved(ctx, filter.owner_id) {
            return Err(DomainError::Forbidden(
                "only administrators and owners can list unapproved venues".to_string(),
            ))
            .into_gql();
        }

        let filter = VenueFilter {
            status: Some(status.into()),
            city: filter.city,
            owner_id: filter.owner_id,
        };
        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            venues::list(&state.db, filter.clone(), Some(page)),
            venues::count(&state.db, filter)
        )
        .into_gql()?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Venue::from).collect(),
            total_count,
            page,
        ))
    }

    /// Marketplace search over approved venues
    async fn search_venues(&self, ctx: &Context<'_>, input: VenueSearchInput) -> Result<Vec<Venue>> {
        let state = ctx.data::<AppState>()?;

        let params = VenueSearch {
            sport_type: input.sport_type,
            city: input.city,
            date: input.date,
            price_min_cents: price_bound(input.price_min, "priceMin").into_gql()?,
            price_max_cents: price_bound(input.price_max, "priceMax").into_gql()?,
            amenities: input.amenities.unwrap_or_default(),
        };

        let rows = venues::search(&state.db, params).await.into_gql()?;
        Ok(rows.into_iter().map(Venue::from).collect())
    }

    async fn venue(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Venue>> {
        let state = ctx.data::<AppState>()?;
        let row = venues::get_by_id(&state.db, id).await.into_gql()?;
        Ok(row.map(Venue::from))
    }

    /// Venues awaiting moderation (admins only)
    async fn pending_venues(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<Venue>> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let filter = VenueFilter {
            status: Some(venues::VenueStatus::Pending),
            ..Default::default()
        };
        let page = pagination.unwrap_or_default().to_limit_offset();

        let (rows, total_count) = tokio::try_join!(
            venues::list(&state.db, filter.clone(), Some(page)),
            venues::count(&state.db, filter)
        )
        .into_gql()?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Venue::from).collect(),
            total_count,
            page,
        ))
    }
}

#[derive(Default)]
pub struct VenueMutation;

#[Object]
impl VenueMutation {
    /// Register a venue owned by the caller. New venues await moderation.
    async fn create_venue(&self, ctx: &Context<'_>, input: CreateVenueInput) -> Result<Venue> {
        let user = require_role(ctx, Role::VenueOwner).await?;
        let state = ctx.data::<AppState>()?;

        for (value, name) in [
            (&input.name, "name"),
            (&input.address, "address"),
            (&input.city, "city"),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{name} must not be empty")))
                    .into_gql();
            }
        }

        let row = venues::create(
            &state.db,
            CreateVenue {
                owner_id: user.uuid(),
                name: input.name,
                description: input.description,
                address: input.address,
                city: input.city,
                latitude: input.latitude,
                longitude: input.longitude,
                phone: input.phone,
                email: input.email,
                website: input.website,
                amenities: input.amenities.unwrap_or_default(),
                images: input.images.unwrap_or_default(),
            },
        )
        .await
        .into_gql()?;

        tracing::info!(venue_id = %row.id, owner_id = %row.owner_id, "venue created");
        Ok(row.into())
    }

    async fn update_venue(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateVenueInput,
    ) -> Result<Venue> {
        require_venue_owner(ctx, id).await?;
        let state = ctx.data::<AppState>()?;

        let row = venues::update(
            &state.db,
            id,
            UpdateVenue {
                name: input.name,
                description: input.description,
                address: input.address,
                city: input.city,
                latitude: input.latitude,
                longitude: input.longitude,
                phone: input.phone,
                email: input.email,
                website: input.website,
                amenities: input.amenities,
                images: input.images,
            },
        )
        .await
        .into_gql()?
        .ok_or_else(|| DomainError::not_found("Venue", id))
        .into_gql()?;

        Ok(row.into())
    }

    /// Approve or reject a venue (admins only)
    async fn set_venue_status(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        status: VenueStatus,
    ) -> Result<Venue> {
        let admin = require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let row = venues::set_status(&state.db, id, status.into())
            .await
            .into_gql()?
            .ok_or_else(|| DomainError::not_found("Venue", id))
            .into_gql()?;

        tracing::info!(venue_id = %id, status = row.status.as_str(), admin = %admin.uuid(), "venue moderated");
        Ok(row.into())
    }
}

fn can_see_unapproved(ctx: &Context<'_>, owner_filter: Option<Uuid>) -> bool {
    let Ok(claims) = ctx.data::<Claims>() else {
        return false;
    };
    if Role::from(claims.role.clone()) == Role::Admin {
        return true;
    }
    match (owner_filter, claims.user_id()) {
        (Some(owner_id), Ok(user_id)) => owner_id == user_id,
        _ => false,
    }
}

fn price_bound(amount: Option<f64>, name: &str) -> Result<Option<i32>, DomainError> {
    amount
        .map(|a| {
            amount_to_cents(a)
                .ok_or_else(|| DomainError::validation(format!("{name} must be a non-negative amount")))
        })
        .transpose()
}
