use async_graphql::{Enum, InputObject, OutputType, SimpleObject};
use infra::pagination::LimitOffset;
use infra::repos::UserRole;

use crate::gql::domains::bookings::types::Booking;
use crate::gql::domains::venues::types::Venue;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
pub enum Role {
    #[graphql(name = "ADMIN")]
    Admin,
    #[graphql(name = "VENUE_OWNER")]
    VenueOwner,
    #[graphql(name = "PLAYER")]
    Player,
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "admin" => Role::Admin,
            "venue_owner" => Role::VenueOwner,
            _ => Role::Player, // Default to player for unknown roles
        }
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Role::Admin,
            UserRole::VenueOwner => Role::VenueOwner,
            UserRole::Player => Role::Player,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => UserRole::Admin,
            Role::VenueOwner => UserRole::VenueOwner,
            Role::Player => UserRole::Player,
        }
    }
}

#[derive(InputObject, Clone, Copy, Default)]
pub struct PaginationInput {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl PaginationInput {
    pub fn to_limit_offset(self) -> LimitOffset {
        LimitOffset::clamped(self.limit.map(i64::from), self.offset.map(i64::from))
    }
}

#[derive(SimpleObject)]
#[graphql(concrete(name = "PaginatedVenues", params(Venue)))]
#[graphql(concrete(name = "PaginatedBookings", params(Booking)))]
pub struct PaginatedResponse<T: OutputType> {
    pub items: Vec<T>,
    pub total_count: i32,
    pub page_size: i32,
    pub offset: i32,
    pub has_next_page: bool,
}

impl<T: OutputType> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total_count: i64, page: LimitOffset) -> Self {
        let page_size = items.len() as i32;
        let offset = page.offset as i32;
        Self {
            has_next_page: (page.offset + items.len() as i64) < total_count,
            items,
            total_count: total_count as i32,
            page_size,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_match_database_labels() {
        assert_eq!(Role::from("venue_owner".to_string()), Role::VenueOwner);
        assert_eq!(Role::from("admin".to_string()), Role::Admin);
        assert_eq!(Role::from("whatever".to_string()), Role::Player);
        assert_eq!(UserRole::from(Role::VenueOwner).as_str(), "venue_owner");
    }

    #[test]
    fn last_page_has_no_next_page() {
        let page = LimitOffset { limit: 2, offset: 2 };
        let resp = PaginatedResponse::new(vec![1, 2], 4, page);
        assert!(!resp.has_next_page);
        assert_eq!(resp.page_size, 2);

        let first = PaginatedResponse::new(vec![1, 2], 4, LimitOffset { limit: 2, offset: 0 });
        assert!(first.has_next_page);
    }
}
