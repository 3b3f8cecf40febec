// Each domain contains: mod.rs, resolvers.rs, types.rs

pub mod bookings;
pub mod dashboard;
pub mod fields;
pub mod reviews;
pub mod slots;
pub mod users;
pub mod venues;
