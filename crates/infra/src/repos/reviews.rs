use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::ReviewRow;

#[derive(Debug, Clone)]
pub struct CreateReview {
    pub user_id: Uuid,
    pub venue_id: Uuid,
    pub field_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub rating: i32,
    pub comment: Option<String>,
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, data: CreateReview) -> SqlxResult<ReviewRow> {
    sqlx::query_as::<_, ReviewRow>(
        r#"
        INSERT INTO reviews (user_id, venue_id, field_id, booking_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, venue_id, field_id, booking_id, rating, comment, is_moderated, created_at
        "#,
    )
    .bind(data.user_id)
    .bind(data.venue_id)
    .bind(data.field_id)
    .bind(data.booking_id)
    .bind(data.rating)
    .bind(&data.comment)
    .fetch_one(executor)
    .await
}

/// Reviews visible to the public: moderated ones only.
pub async fn list_visible_by_venue<'e>(
    executor: impl PgExecutor<'e>,
    venue_id: Uuid,
) -> SqlxResult<Vec<ReviewRow>> {
    sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT id, user_id, venue_id, field_id, booking_id, rating, comment, is_moderated, created_at
        FROM reviews
        WHERE venue_id = $1 AND is_moderated = true
        ORDER BY created_at DESC
        "#,
    )
    .bind(venue_id)
    .fetch_all(executor)
    .await
}
