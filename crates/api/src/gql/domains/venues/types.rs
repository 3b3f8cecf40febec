use async_graphql::dataloader::DataLoader;
use async_graphql::{ComplexObject, Context, Enum, Error, InputObject, Result, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::gql::error::DomainResultExt;
use crate::gql::loaders::UserLoader;
use crate::gql::types::{Field, User};
use crate::state::AppState;
use infra::models::VenueRow;
use infra::repos::{fields, venues};

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug)]
pub enum VenueStatus {
    #[graphql(name = "PENDING")]
    Pending,
    #[graphql(name = "APPROVED")]
    Approved,
    #[graphql(name = "REJECTED")]
    Rejected,
}

impl From<venues::VenueStatus> for VenueStatus {
    fn from(status: venues::VenueStatus) -> Self {
        match status {
            venues::VenueStatus::Pending => VenueStatus::Pending,
            venues::VenueStatus::Approved => VenueStatus::Approved,
            venues::VenueStatus::Rejected => VenueStatus::Rejected,
        }
    }
}

impl From<VenueStatus> for venues::VenueStatus {
    fn from(status: VenueStatus) -> Self {
        match status {
            VenueStatus::Pending => venues::VenueStatus::Pending,
            VenueStatus::Approved => venues::VenueStatus::Approved,
            VenueStatus::Rejected => venues::VenueStatus::Rejected,
        }
    }
}

#[derive(SimpleObject, Clone)]
#[graphql(complex)]
pub struct Venue {
    pub id: ID,
    pub owner_id: ID,
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
    pub status: VenueStatus,
    pub rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VenueRow> for Venue {
    fn from(row: VenueRow) -> Self {
        Self {
            id: row.id.into(),
            owner_id: row.owner_id.into(),
            name: row.name,
            description: row.description,
            address: row.address,
            city: row.city,
            latitude: row.latitude,
            longitude: row.longitude,
            phone: row.phone,
            email: row.email,
            website: row.website,
            amenities: row.amenities,
            images: row.images,
            status: row.status.into(),
            rating: row.rating,
            review_count: row.review_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[ComplexObject]
impl Venue {
    async fn owner(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let owner_id =
            Uuid::parse_str(self.owner_id.as_str()).map_err(|e| Error::new(e.to_string()))?;
        let loader = ctx.data::<DataLoader<UserLoader>>()?;

        Ok(loader
            .load_one(owner_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
            .map(User::from))
    }

    async fn fields(&self, ctx: &Context<'_>) -> Result<Vec<Field>> {
        let venue_id = Uuid::parse_str(self.id.as_str()).map_err(|e| Error::new(e.to_string()))?;
        let state = ctx.data::<AppState>()?;

        let rows = fields::list_by_venue(&state.db, venue_id).await.into_gql()?;
        Ok(rows.into_iter().map(Field::from).collect())
    }
}

#[derive(InputObject, Default)]
pub struct VenueFilterInput {
    pub status: Option<VenueStatus>,
    pub city: Option<String>,
    pub owner_id: Option<Uuid>,
}

#[derive(InputObject, Default)]
pub struct VenueSearchInput {
    pub sport_type: Option<String>,
    pub city: Option<String>,
    pub date: Option<NaiveDate>,
    /// Lowest acceptable hourly rate, in currency units
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub amenities: Option<Vec<String>>,
}

#[derive(InputObject)]
pub struct CreateVenueInput {
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
}

#[derive(InputObject)]
pub struct UpdateVenueInput {
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
