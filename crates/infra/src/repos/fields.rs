use sqlx::{PgExecutor, Result as SqlxResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::models::FieldRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "field_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Active,
    Inactive,
    Maintenance,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Active => "active",
            FieldStatus::Inactive => "inactive",
            FieldStatus::Maintenance => "maintenance",
        }
    }
}

impl FromStr for FieldStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(FieldStatus::Active),
            "inactive" => Ok(FieldStatus::Inactive),
            "maintenance" => Ok(FieldStatus::Maintenance),
            _ => Err(format!("Unknown field status: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateField {
    pub venue_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sport_type: String,
    pub capacity: Option<i32>,
    pub surface: Option<String>,
    pub hourly_rate_cents: i32,
    pub peak_hour_rate_cents: Option<i32>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateField {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sport_type: Option<String>,
    pub capacity: Option<i32>,
    pub surface: Option<String>,
    pub hourly_rate_cents: Option<i32>,
    pub peak_hour_rate_cents: Option<i32>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub status: Option<FieldStatus>,
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, data: CreateField) -> SqlxResult<FieldRow> {
    sqlx::query_as::<_, FieldRow>(
        r#"
        INSERT INTO fields (venue_id, name, description, sport_type, capacity, surface,
                            hourly_rate_cents, peak_hour_rate_cents, amenities, images)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id, venue_id, name, description, sport_type, capacity, surface,
                  hourly_rate_cents, peak_hour_rate_cents, amenities, images, status,
                  created_at, updated_at
        "#,
    )
    .bind(data.venue_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.sport_type)
    .bind(data.capacity)
    .bind(&data.surface)
    .bind(data.hourly_rate_cents)
    .bind(data.peak_hour_rate_cents)
    .bind(&data.amenities)
    .bind(&data.images)
    .fetch_one(executor)
    .await
}

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<FieldRow>> {
    sqlx::query_as::<_, FieldRow>(
        r#"
        SELECT id, venue_id, name, description, sport_type, capacity, surface,
               hourly_rate_cents, peak_hour_rate_cents, amenities, images, status,
               created_at, updated_at
        FROM fields
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_venue<'e>(
    executor: impl PgExecutor<'e>,
    venue_id: Uuid,
) -> SqlxResult<Vec<FieldRow>> {
    sqlx::query_as::<_, FieldRow>(
        r#"
        SELECT id, venue_id, name, description, sport_type, capacity, surface,
               hourly_rate_cents, peak_hour_rate_cents, amenities, images, status,
               created_at, updated_at
        FROM fields
        WHERE venue_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(venue_id)
    .fetch_all(executor)
    .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateField,
) -> SqlxResult<Option<FieldRow>> {
    sqlx::query_as::<_, FieldRow>(
        r#"
        UPDATE fields
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            sport_type = COALESCE($4, sport_type),
            capacity = COALESCE($5, capacity),
            surface = COALESCE($6, surface),
            hourly_rate_cents = COALESCE($7, hourly_rate_cents),
            peak_hour_rate_cents = COALESCE($8, peak_hour_rate_cents),
            amenities = COALESCE($9, amenities),
            images = COALESCE($10, images),
            status = COALESCE($11, status),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, venue_id, name, description, sport_type, capacity, surface,
                  hourly_rate_cents, peak_hour_rate_cents, amenities, images, status,
                  created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.sport_type)
    .bind(data.capacity)
    .bind(&data.surface)
    .bind(data.hourly_rate_cents)
    .bind(data.peak_hour_rate_cents)
    .bind(&data.amenities)
    .bind(&data.images)
    .bind(data.status)
    .fetch_optional(executor)
    .await
}
