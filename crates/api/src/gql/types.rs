//! Shared GraphQL types, re-exported from the domains that own them.

pub use crate::gql::common::types::{PaginatedResponse, PaginationInput, Role};
pub use crate::gql::domains::bookings::types::{Booking, BookingStatus};
pub use crate::gql::domains::fields::types::{Field, FieldStatus};
pub use crate::gql::domains::reviews::types::Review;
pub use crate::gql::domains::slots::types::{SlotAvailabilityEvent, TimeSlot};
pub use crate::gql::domains::users::types::User;
pub use crate::gql::domains::venues::types::{Venue, VenueStatus};
