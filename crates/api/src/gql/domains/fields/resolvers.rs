use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::auth::permissions::require_venue_owner;
use crate::booking::amount_to_cents;
use crate::error::DomainError;
use crate::gql::common::helpers::get_venue_id_for_field;
use crate::gql::error::DomainResultExt;
use crate::gql::types::Field;
use crate::state::AppState;
use infra::repos::{fields, CreateField, UpdateField};

use super::types::{CreateFieldInput, UpdateFieldInput};

#[derive(Default)]
pub struct FieldQuery;

#[Object]
impl FieldQuery {
    /// Fields of a venue, ordered by name
    async fn fields(&self, ctx: &Context<'_>, venue_id: Uuid) -> Result<Vec<Field>> {
        let state = ctx.data::<AppState>()?;
        let rows = fields::list_by_venue(&state.db, venue_id).await.into_gql()?;
        Ok(rows.into_iter().map(Field::from).collect())
    }

    async fn field(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Field>> {
        let state = ctx.data::<AppState>()?;
        let row = fields::get_by_id(&state.db, id).await.into_gql()?;
        Ok(row.map(Field::from))
    }
}

#[derive(Default)]
pub struct FieldMutation;

#[Object]
impl FieldMutation {
    async fn create_field(&self, ctx: &Context<'_>, input: CreateFieldInput) -> Result<Field> {
        require_venue_owner(ctx, input.venue_id).await?;
        let state = ctx.data::<AppState>()?;

        if input.name.trim().is_empty() || input.sport_type.trim().is_empty() {
            return Err(DomainError::validation("name and sportType are required")).into_gql();
        }

        let row = fields::create(
            &state.db,
            CreateField {
                venue_id: input.venue_id,
                name: input.name,
                description: input.description,
                sport_type: input.sport_type,
                capacity: input.capacity,
                surface: input.surface,
                hourly_rate_cents: rate_cents(input.hourly_rate, "hourlyRate").into_gql()?,
                peak_hour_rate_cents: input
                    .peak_hour_rate
                    .map(|r| rate_cents(r, "peakHourRate"))
                    .transpose()
                    .into_gql()?,
                amenities: input.amenities.unwrap_or_default(),
                images: input.images.unwrap_or_default(),
            },
        )
        .await
        .into_gql()?;

        Ok(row.into())
    }

    async fn update_field(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateFieldInput,
    ) -> Result<Field> {
        let state = ctx.data::<AppState>()?;
        let venue_id = get_venue_id_for_field(&state.db, id).await.into_gql()?;
        require_venue_owner(ctx, venue_id).await?;

        let row = fields::update(
            &state.db,
            id,
            UpdateField {
                name: input.name,
                description: input.description,
                sport_type: input.sport_type,
                capacity: input.capacity,
                surface: input.surface,
                hourly_rate_cents: input
                    .hourly_rate
                    .map(|r| rate_cents(r, "hourlyRate"))
                    .transpose()
                    .into_gql()?,
                peak_hour_rate_cents: input
                    .peak_hour_rate
                    .map(|r| rate_cents(r, "peakHourRate"))
                    .transpose()
                    .into_gql()?,
                amenities: input.amenities,
                images: input.images,
                status: input.status.map(Into::into),
            },
        )
        .await
        .into_gql()?
        .ok_or_else(|| DomainError::not_found("Field", id))
        .into_gql()?;

        Ok(row.into())
    }
}

fn rate_cents(amount: f64, name: &str) -> Result<i32, DomainError> {
    amount_to_cents(amount)
        .ok_or_else(|| DomainError::validation(format!("{name} must be a non-negative amount")))
}
