use async_graphql::{InputObject, SimpleObject, ID};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use infra::models::ReviewRow;

#[derive(SimpleObject, Clone)]
pub struct Review {
    pub id: ID,
    pub user_id: ID,
    pub venue_id: ID,
    pub field_id: Option<ID>,
    pub booking_id: Option<ID>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id.into(),
            user_id: row.user_id.into(),
            venue_id: row.venue_id.into(),
            field_id: row.field_id.map(Into::into),
            booking_id: row.booking_id.map(Into::into),
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(InputObject)]
pub struct CreateReviewInput {
    pub venue_id: Uuid,
    pub field_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    /// 1 to 5
    pub rating: i32,
    pub comment: Option<String>,
}
