use std::env;
use std::sync::OnceLock;

use api::auth::{AuthConfig, Claims};
use api::gql::AppSchema;
use api::AppState;
use async_graphql::{Request, Variables};
use chrono::{NaiveDate, NaiveTime};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

static DATABASE_URL: OnceLock<String> = OnceLock::new();

/// TEST_DATABASE_URL when set, otherwise a throwaway Postgres container shared
/// by every test in the binary.
fn database_url() -> &'static str {
    DATABASE_URL.get_or_init(|| {
        if let Ok(url) = env::var("TEST_DATABASE_URL") {
            return url;
        }

        // The blocking runner cannot be driven from inside the test runtime
        std::thread::spawn(|| {
            use testcontainers_modules::postgres::Postgres;
            use testcontainers_modules::testcontainers::runners::SyncRunner;

            let container = Postgres::default()
                .start()
                .expect("Failed to start Postgres container");
            let host = container.get_host().expect("Failed to get container host");
            let port = container
                .get_host_port_ipv4(5432)
                .expect("Failed to get container port");

            // Keep the container alive for the rest of the test binary
            std::mem::forget(container);

            format!("postgres://postgres:postgres@{host}:{port}/postgres")
        })
        .join()
        .expect("Postgres container thread panicked")
    })
}

pub async fn setup_test_db() -> AppState {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url())
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    AppState::with_auth_config(
        pool,
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            access_token_expiration_minutes: 60,
        },
    )
}

/// Helper function to execute GraphQL queries and mutations
#[allow(dead_code)]
pub async fn execute_graphql(
    schema: &AppSchema,
    query: &str,
    variables: Option<Variables>,
    auth_claims: Option<Claims>,
) -> async_graphql::Response {
    let mut request = Request::new(query);

    if let Some(vars) = variables {
        request = request.variables(vars);
    }

    if let Some(claims) = auth_claims {
        request = request.data(claims);
    }

    schema.execute(request).await
}

/// The `code` extension of the first error in a response
#[allow(dead_code)]
pub fn first_error_code(response: &async_graphql::Response) -> Option<String> {
    let error = response.errors.first()?;
    let value = error.extensions.as_ref()?.get("code")?.clone();
    match value {
        async_graphql::Value::String(code) => Some(code),
        _ => None,
    }
}

/// Create a user with the given role ("player", "venue_owner" or "admin")
/// and matching JWT claims.
#[allow(dead_code)]
pub async fn create_test_user(app_state: &AppState, role: &str) -> (Uuid, Claims) {
    let user_id = Uuid::new_v4();
    let email = format!("{user_id}@test.playhub");

    sqlx::query(
        "INSERT INTO users (id, email, username, password_hash, first_name, last_name, role)
         VALUES ($1, $2, $3, $4, 'Test', 'User', $5::user_role)",
    )
    .bind(user_id)
    .bind(&email)
    .bind(format!("test_{user_id}"))
    .bind("$2b$04$dummy.hash.for.testing")
    .bind(role)
    .execute(&app_state.db)
    .await
    .expect("Failed to create test user");

    let claims = Claims::new(user_id, email, role.to_string(), 60);
    (user_id, claims)
}

/// Create an approved venue owned by `owner_id`
#[allow(dead_code)]
pub async fn create_test_venue(app_state: &AppState, owner_id: Uuid) -> Uuid {
    let venue_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO venues (id, owner_id, name, address, city, status)
         VALUES ($1, $2, $3, 'Main Street 1', 'Test City', 'approved')",
    )
    .bind(venue_id)
    .bind(owner_id)
    .bind(format!("Venue {venue_id}"))
    .execute(&app_state.db)
    .await
    .expect("Failed to create test venue");

    venue_id
}

/// Create an active field with the given rates
#[allow(dead_code)]
pub async fn create_test_field(
    app_state: &AppState,
    venue_id: Uuid,
    hourly_rate_cents: i32,
    peak_hour_rate_cents: Option<i32>,
) -> Uuid {
    let field_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO fields (id, venue_id, name, sport_type, hourly_rate_cents, peak_hour_rate_cents)
         VALUES ($1, $2, 'Field A', 'football', $3, $4)",
    )
    .bind(field_id)
    .bind(venue_id)
    .bind(hourly_rate_cents)
    .bind(peak_hour_rate_cents)
    .execute(&app_state.db)
    .await
    .expect("Failed to create test field");

    field_id
}

/// Create an available one-hour slot
#[allow(dead_code)]
pub async fn create_test_slot(
    app_state: &AppState,
    field_id: Uuid,
    date: NaiveDate,
    start_hour: u32,
    price_cents: i32,
) -> Uuid {
    let slot_id = Uuid::new_v4();
    let start = NaiveTime::from_hms_opt(start_hour, 0, 0).expect("valid hour");
    let end = NaiveTime::from_hms_opt(start_hour + 1, 0, 0).expect("valid hour");

    sqlx::query(
        "INSERT INTO time_slots (id, field_id, date, start_time, end_time, price_cents)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(slot_id)
    .bind(field_id)
    .bind(date)
    .bind(start)
    .bind(end)
    .bind(price_cents)
    .execute(&app_state.db)
    .await
    .expect("Failed to create test slot");

    slot_id
}

/// A venue owner, an approved venue, a field and one slot at 18:00 on
/// 2024-06-01 priced at 45.00.
#[allow(dead_code)]
pub struct Fixture {
    pub owner_id: Uuid,
    pub owner_claims: Claims,
    pub venue_id: Uuid,
    pub field_id: Uuid,
    pub slot_id: Uuid,
}

#[allow(dead_code)]
pub async fn create_fixture(app_state: &AppState) -> Fixture {
    let (owner_id, owner_claims) = create_test_user(app_state, "venue_owner").await;
    let venue_id = create_test_venue(app_state, owner_id).await;
    let field_id = create_test_field(app_state, venue_id, 3000, Some(4500)).await;
    let slot_id = create_test_slot(app_state, field_id, date(2024, 6, 1), 18, 4500).await;

    Fixture {
        owner_id,
        owner_claims,
        venue_id,
        field_id,
        slot_id,
    }
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
