use async_graphql::{Context, Object, Result};

use crate::auth::permissions::current_user_id;
use crate::error::DomainError;
use crate::gql::error::DomainResultExt;
use crate::gql::types::User;
use crate::state::AppState;
use infra::repos::{users, UpdateProfileData};

use super::types::UpdateProfileInput;

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The authenticated caller
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let user_id = current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;

        let row = users::get_by_id(&state.db, user_id)
            .await
            .into_gql()?
            .ok_or_else(|| DomainError::not_found("User", user_id))
            .into_gql()?;

        Ok(row.into())
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    /// Update the caller's own profile; omitted fields are left unchanged
    async fn update_profile(&self, ctx: &Context<'_>, input: UpdateProfileInput) -> Result<User> {
        let user_id = current_user_id(ctx)?;
        let state = ctx.data::<AppState>()?;

        let row = users::update_profile(
            &state.db,
            user_id,
            UpdateProfileData {
                first_name: input.first_name,
                last_name: input.last_name,
                phone: input.phone,
            },
        )
        .await
        .into_gql()?
        .ok_or_else(|| DomainError::not_found("User", user_id))
        .into_gql()?;

        Ok(row.into())
    }
}
