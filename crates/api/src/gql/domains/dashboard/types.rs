use async_graphql::SimpleObject;

use infra::models::{PlatformStatsRow, VenueStatsRow};

#[derive(SimpleObject)]
pub struct VenueStats {
    pub total_bookings: i32,
    /// Revenue from completed bookings, in currency units
    pub total_revenue: f64,
    /// Share of the venue's slots holding a live or completed booking, 0.0 to 1.0
    pub occupancy_rate: f64,
    pub active_fields: i32,
}

impl From<VenueStatsRow> for VenueStats {
    fn from(row: VenueStatsRow) -> Self {
        Self {
            occupancy_rate: row.occupancy_rate(),
            total_bookings: row.total_bookings as i32,
            total_revenue: row.total_revenue_cents as f64 / 100.0,
            active_fields: row.active_fields as i32,
        }
    }
}

#[derive(SimpleObject)]
pub struct PlatformStats {
    pub total_users: i32,
    pub active_venues: i32,
    pub total_bookings: i32,
    pub platform_revenue: f64,
    /// Reviews waiting for moderation
    pub pending_reviews: i32,
}

impl From<PlatformStatsRow> for PlatformStats {
    fn from(row: PlatformStatsRow) -> Self {
        Self {
            total_users: row.total_users as i32,
            active_venues: row.active_venues as i32,
            total_bookings: row.total_bookings as i32,
            platform_revenue: row.platform_revenue_cents as f64 / 100.0,
            pending_reviews: row.pending_reviews as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revenue_is_reported_in_currency_units() {
        let stats = VenueStats::from(VenueStatsRow {
            total_bookings: 3,
            total_revenue_cents: 13_500,
            total_slots: 12,
            booked_slots: 3,
            active_fields: 2,
        });

        assert_eq!(stats.total_revenue, 135.0);
        assert_eq!(stats.occupancy_rate, 0.25);
    }
}
