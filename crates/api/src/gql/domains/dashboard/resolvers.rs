use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::auth::permissions::{require_admin, require_venue_owner};
use crate::gql::error::DomainResultExt;
use crate::state::AppState;
use infra::repos::stats;

use super::types::{PlatformStats, VenueStats};

#[derive(Default)]
pub struct DashboardQuery;

#[Object]
impl DashboardQuery {
    /// Booking and revenue figures for one venue (venue owner or admin)
    async fn venue_stats(&self, ctx: &Context<'_>, venue_id: Uuid) -> Result<VenueStats> {
        require_venue_owner(ctx, venue_id).await?;
        let state = ctx.data::<AppState>()?;

        let row = stats::venue_stats(&state.db, venue_id).await.into_gql()?;
        Ok(row.into())
    }

    /// Platform-wide figures (admins only)
    async fn platform_stats(&self, ctx: &Context<'_>) -> Result<PlatformStats> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let row = stats::platform_stats(&state.db).await.into_gql()?;
        Ok(row.into())
    }
}
