use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::auth::permissions::current_user_id;
use crate::error::DomainError;
use crate::gql::error::DomainResultExt;
use crate::state::AppState;
use infra::repos::{reviews, venues, CreateReview};

use super::types::{CreateReviewInput, Review};

#[derive(Default)]
pub struct ReviewQuery;

#[Object]
impl ReviewQuery {
    /// Moderated reviews of a venue, newest first
    async fn venue_reviews(&self, ctx: &Context<'_>, venue_id: Uuid) -> Result<Vec<Review>> {
        let state = ctx.data::<AppState>()?;
        let rows = reviews::list_visible_by_venue(&state.db, venue_id)
            .await
            .into_gql()?;
        Ok(rows.into_iter().map(Review::from).collect())
    }
}

#[derive(Default)]
pub struct ReviewMutation;

#[Object]
impl ReviewMutation {
    /// Leave a review. It stays hidden until moderated.
    async fn create_review(&self, ctx: &Context<'_>, input: CreateReviewInput) -> Result<Review> {
        let user_id = current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;

        if !(1..=5).contains(&input.rating) {
            return Err(DomainError::validation("rating must be between 1 and 5")).into_gql();
        }

        if venues::get_by_id(&state.db, input.venue_id)
            .await
            .into_gql()?
            .is_none()
        {
            return Err(DomainError::not_found("Venue", input.venue_id)).into_gql();
        }

        let row = reviews::create(
            &state.db,
            CreateReview {
                user_id,
                venue_id: input.venue_id,
                field_id: input.field_id,
                booking_id: input.booking_id,
                rating: input.rating,
                comment: input.comment,
            },
        )
        .await
        .into_gql()?;

        Ok(row.into())
    }
}
