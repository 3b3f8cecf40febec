use async_graphql::ErrorExtensions;

use crate::error::DomainError;

/// Domain errors become GraphQL errors with `code` and `status` extensions.
/// Store failures are logged here and reach the client as a generic message.
impl ErrorExtensions for DomainError {
    fn extend(&self) -> async_graphql::Error {
        if let DomainError::Db(e) = self {
            tracing::error!("Database error: {e}");
        }

        async_graphql::Error::new(self.to_string()).extend_with(|_, ext| {
            ext.set("code", self.code());
            ext.set("status", self.status_code().as_u16() as i32);
        })
    }
}

/// Error for resolvers that need a logged-in caller.
pub fn unauthenticated() -> async_graphql::Error {
    async_graphql::Error::new("You must be logged in to perform this action").extend_with(
        |_, ext| {
            ext.set("code", "UNAUTHENTICATED");
            ext.set("status", 401);
        },
    )
}

/// Extension trait that converts any `Result<T, E>` where `E: Display`
/// into `async_graphql::Result<T>` with a contextual message prefix.
///
/// Usage: `Uuid::parse_str(id).gql_err("Invalid venue ID")?`
pub trait ResultExt<T> {
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn gql_err(self, context: &str) -> std::result::Result<T, async_graphql::Error> {
        self.map_err(|e| async_graphql::Error::new(format!("{context}: {e}")))
    }
}

/// Converts domain and store failures into GraphQL errors carrying
/// `extensions.code` and `extensions.status`.
///
/// Usage: `booking::reserve(&state.db, ...).await.into_gql()?`
pub trait DomainResultExt<T> {
    fn into_gql(self) -> async_graphql::Result<T>;
}

impl<T, E: Into<DomainError>> DomainResultExt<T> for std::result::Result<T, E> {
    fn into_gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.into().extend())
    }
}
