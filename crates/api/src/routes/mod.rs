pub mod auth;
pub mod bookings;
