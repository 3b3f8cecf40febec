use async_graphql::dataloader::Loader;
use infra::{
    db::Db,
    models::{FieldRow, UserRow, VenueRow},
};
use std::{collections::HashMap, future::Future, sync::Arc};
use uuid::Uuid;

// UserLoader - batch load users by ID
#[derive(Clone)]
pub struct UserLoader {
    pool: Db,
}

impl UserLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for UserLoader {
    type Value = UserRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows: Vec<UserRow> = sqlx::query_as::<_, UserRow>(
                r#"
                SELECT id, email, username, password_hash, first_name, last_name, phone,
                       role, is_email_verified, created_at, updated_at
                FROM users
                WHERE id = ANY($1::uuid[])
                "#,
            )
            .bind(&ids)
            .fetch_all(&pool)
            .await
            .map_err(Arc::new)?;

            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}

// VenueLoader - batch load venues by ID
#[derive(Clone)]
pub struct VenueLoader {
    pool: Db,
}

impl VenueLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for VenueLoader {
    type Value = VenueRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows: Vec<VenueRow> = sqlx::query_as::<_, VenueRow>(
                r#"
                SELECT id, owner_id, name, description, address, city, latitude, longitude,
                       phone, email, website, amenities, images, status, rating, review_count,
                       created_at, updated_at
                FROM venues
                WHERE id = ANY($1::uuid[])
                "#,
            )
            .bind(&ids)
            .fetch_all(&pool)
            .await
            .map_err(Arc::new)?;

            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}

// FieldLoader - batch load fields by ID
#[derive(Clone)]
pub struct FieldLoader {
    pool: Db,
}

impl FieldLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for FieldLoader {
    type Value = FieldRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let ids: Vec<Uuid> = keys.to_vec();

        async move {
            if ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows: Vec<FieldRow> = sqlx::query_as::<_, FieldRow>(
                r#"
                SELECT id, venue_id, name, description, sport_type, capacity, surface,
                       hourly_rate_cents, peak_hour_rate_cents, amenities, images, status,
                       created_at, updated_at
                FROM fields
                WHERE id = ANY($1::uuid[])
                "#,
            )
            .bind(&ids)
            .fetch_all(&pool)
            .await
            .map_err(Arc::new)?;

            Ok(rows.into_iter().map(|r| (r.id, r)).collect())
        }
    }
}
