pub mod bookings;
pub mod fields;
pub mod reviews;
pub mod stats;
pub mod time_slots;
pub mod users;
pub mod venues;

pub use bookings::{BookingStatus, CreateBooking};
pub use fields::{CreateField, FieldStatus, UpdateField};
pub use reviews::CreateReview;
pub use time_slots::{NewTimeSlot, UpdateTimeSlot};
pub use users::{CreateUserData, UpdateProfileData, UserRole};
pub use venues::{CreateVenue, UpdateVenue, VenueFilter, VenueSearch, VenueStatus};
