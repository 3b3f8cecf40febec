use chrono::NaiveDate;
use sqlx::{PgExecutor, Postgres, QueryBuilder, Result as SqlxResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::{models::VenueRow, pagination::LimitOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "venue_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VenueStatus {
    Pending,
    Approved,
    Rejected,
}

impl VenueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueStatus::Pending => "pending",
            VenueStatus::Approved => "approved",
            VenueStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for VenueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VenueStatus::Pending),
            "approved" => Ok(VenueStatus::Approved),
            "rejected" => Ok(VenueStatus::Rejected),
            _ => Err(format!("Unknown venue status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VenueFilter {
    pub status: Option<VenueStatus>,
    pub city: Option<String>,
    pub owner_id: Option<Uuid>,
}

/// Marketplace search. Only approved venues are ever returned.
#[derive(Debug, Clone, Default)]
pub struct VenueSearch {
    pub sport_type: Option<String>,
    pub city: Option<String>,
    pub date: Option<NaiveDate>,
    pub price_min_cents: Option<i32>,
    pub price_max_cents: Option<i32>,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CreateVenue {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateVenue {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

const VENUE_COLUMNS: &str = "id, owner_id, name, description, address, city, latitude, longitude, phone, email, website, amenities, images, status, rating, review_count, created_at, updated_at";

/// `ILIKE` pattern matching `needle` anywhere, with its own wildcards taken
/// literally. Pair with `ESCAPE '\'`.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &VenueFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ");
        query.push_bind(status);
    }

    if let Some(city) = &filter.city {
        query.push(" AND city ILIKE ");
        query.push_bind(contains_pattern(city));
        query.push(r" ESCAPE '\'");
    }

    if let Some(owner_id) = filter.owner_id {
        query.push(" AND owner_id = ");
        query.push_bind(owner_id);
    }
}

pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    filter: VenueFilter,
    page: Option<LimitOffset>,
) -> SqlxResult<Vec<VenueRow>> {
    let page = page.unwrap_or_default();

    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {VENUE_COLUMNS} FROM venues WHERE 1=1"
    ));
    push_filter(&mut query, &filter);

    query.push(" ORDER BY rating DESC, created_at DESC");
    query.push(" LIMIT ");
    query.push_bind(page.limit);
    query.push(" OFFSET ");
    query.push_bind(page.offset);

    query.build_query_as::<VenueRow>().fetch_all(executor).await
}

pub async fn count<'e>(executor: impl PgExecutor<'e>, filter: VenueFilter) -> SqlxResult<i64> {
    let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM venues WHERE 1=1");
    push_filter(&mut query, &filter);

    query.build_query_scalar::<i64>().fetch_one(executor).await
}

pub async fn search<'e>(executor: impl PgExecutor<'e>, params: VenueSearch) -> SqlxResult<Vec<VenueRow>> {
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {VENUE_COLUMNS} FROM venues v WHERE v.status = 'approved'"
    ));

    if let Some(city) = &params.city {
        query.push(" AND v.city ILIKE ");
        query.push_bind(contains_pattern(city));
        query.push(r" ESCAPE '\'");
    }

    if !params.amenities.is_empty() {
        query.push(" AND v.amenities @> ");
        query.push_bind(params.amenities.clone());
    }

    let needs_field_match = params.sport_type.is_some()
        || params.price_min_cents.is_some()
        || params.price_max_cents.is_some()
        || params.date.is_some();

    if needs_field_match {
        query.push(" AND EXISTS (SELECT 1 FROM fields f WHERE f.venue_id = v.id AND f.status = 'active'");

        if let Some(sport_type) = &params.sport_type {
            query.push(" AND LOWER(f.sport_type) = ");
            query.push_bind(sport_type.to_lowercase());
        }
        if let Some(min) = params.price_min_cents {
            query.push(" AND f.hourly_rate_cents >= ");
            query.push_bind(min);
        }
        if let Some(max) = params.price_max_cents {
            query.push(" AND f.hourly_rate_cents <= ");
            query.push_bind(max);
        }
        if let Some(date) = params.date {
            query.push(
                " AND EXISTS (SELECT 1 FROM time_slots ts WHERE ts.field_id = f.id AND ts.is_available AND NOT ts.admin_blocked AND ts.date = ",
            );
            query.push_bind(date);
            query.push(")");
        }

        query.push(")");
    }

    query.push(" ORDER BY v.rating DESC, v.created_at DESC LIMIT 100");

    query.build_query_as::<VenueRow>().fetch_all(executor).await
}

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<VenueRow>> {
    sqlx::query_as::<_, VenueRow>(&format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, data: CreateVenue) -> SqlxResult<VenueRow> {
    sqlx::query_as::<_, VenueRow>(&format!(
        r#"
        INSERT INTO venues (owner_id, name, description, address, city, latitude, longitude,
                            phone, email, website, amenities, images)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {VENUE_COLUMNS}
        "#
    ))
    .bind(data.owner_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.address)
    .bind(&data.city)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.website)
    .bind(&data.amenities)
    .bind(&data.images)
    .fetch_one(executor)
    .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateVenue,
) -> SqlxResult<Option<VenueRow>> {
    sqlx::query_as::<_, VenueRow>(&format!(
        r#"
        UPDATE venues
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            address = COALESCE($4, address),
            city = COALESCE($5, city),
            latitude = COALESCE($6, latitude),
            longitude = COALESCE($7, longitude),
            phone = COALESCE($8, phone),
            email = COALESCE($9, email),
            website = COALESCE($10, website),
            amenities = COALESCE($11, amenities),
            images = COALESCE($12, images),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {VENUE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.address)
    .bind(&data.city)
    .bind(data.latitude)
    .bind(data.longitude)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.website)
    .bind(&data.amenities)
    .bind(&data.images)
    .fetch_optional(executor)
    .await
}

pub async fn set_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: VenueStatus,
) -> SqlxResult<Option<VenueRow>> {
    sqlx::query_as::<_, VenueRow>(&format!(
        "UPDATE venues SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {VENUE_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_pattern_matches_substring() {
        assert_eq!(contains_pattern("Lyon"), "%Lyon%");
    }

    #[test]
    fn city_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("%"), r"%\%%");
        assert_eq!(contains_pattern("St_Denis"), r"%St\_Denis%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
