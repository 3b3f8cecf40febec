use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::{PlatformStatsRow, VenueStatsRow};

pub async fn venue_stats<'e>(executor: impl PgExecutor<'e>, venue_id: Uuid) -> SqlxResult<VenueStatsRow> {
    sqlx::query_as::<_, VenueStatsRow>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM bookings b JOIN fields f ON f.id = b.field_id
             WHERE f.venue_id = $1) AS total_bookings,
            (SELECT COALESCE(SUM(b.total_amount_cents), 0)::BIGINT FROM bookings b
             JOIN fields f ON f.id = b.field_id
             WHERE f.venue_id = $1 AND b.status = 'completed') AS total_revenue_cents,
            (SELECT COUNT(*) FROM time_slots ts JOIN fields f ON f.id = ts.field_id
             WHERE f.venue_id = $1) AS total_slots,
            (SELECT COUNT(DISTINCT b.time_slot_id) FROM bookings b JOIN fields f ON f.id = b.field_id
             WHERE f.venue_id = $1 AND b.status IN ('pending', 'confirmed', 'completed')) AS booked_slots,
            (SELECT COUNT(*) FROM fields f WHERE f.venue_id = $1 AND f.status = 'active') AS active_fields
        "#,
    )
    .bind(venue_id)
    .fetch_one(executor)
    .await
}

pub async fn platform_stats<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<PlatformStatsRow> {
    sqlx::query_as::<_, PlatformStatsRow>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS total_users,
            (SELECT COUNT(*) FROM venues WHERE status = 'approved') AS active_venues,
            (SELECT COUNT(*) FROM bookings) AS total_bookings,
            (SELECT COALESCE(SUM(total_amount_cents), 0)::BIGINT FROM bookings
             WHERE status = 'completed') AS platform_revenue_cents,
            (SELECT COUNT(*) FROM reviews WHERE is_moderated = false) AS pending_reviews
        "#,
    )
    .fetch_one(executor)
    .await
}
