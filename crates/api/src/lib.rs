pub mod app;
pub mod auth;
pub mod booking;
pub mod error;
pub mod extract;
pub mod gql;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use state::AppState;
