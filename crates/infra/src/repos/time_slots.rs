use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::TimeSlotRow;

/// Row columns for a `time_slots` table aliased as `ts`, plus whether the
/// owning field is active.
const SLOT_COLUMNS: &str = "ts.id, ts.field_id, ts.date, ts.start_time, ts.end_time, ts.price_cents, \
     ts.is_available, ts.is_peak_hour, ts.admin_blocked, ts.created_at, ts.updated_at, \
     EXISTS (SELECT 1 FROM fields sf WHERE sf.id = ts.field_id AND sf.status = 'active') AS field_active";

#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeSlot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub price_cents: i32,
    pub is_peak_hour: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTimeSlot {
    pub end_time: Option<NaiveTime>,
    pub price_cents: Option<i32>,
    pub is_peak_hour: Option<bool>,
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    field_id: Uuid,
    data: NewTimeSlot,
) -> SqlxResult<TimeSlotRow> {
    sqlx::query_as::<_, TimeSlotRow>(&format!(
        r#"
        INSERT INTO time_slots AS ts (field_id, date, start_time, end_time, price_cents, is_peak_hour)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(field_id)
    .bind(data.date)
    .bind(data.start_time)
    .bind(data.end_time)
    .bind(data.price_cents)
    .bind(data.is_peak_hour)
    .fetch_one(executor)
    .await
}

/// Bulk insert. Slots colliding on `(field_id, date, start_time)` are left
/// untouched; returns the number of rows actually created.
pub async fn create_many<'e>(
    executor: impl PgExecutor<'e>,
    field_id: Uuid,
    slots: &[NewTimeSlot],
) -> SqlxResult<u64> {
    if slots.is_empty() {
        return Ok(0);
    }

    let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date).collect();
    let starts: Vec<NaiveTime> = slots.iter().map(|s| s.start_time).collect();
    let ends: Vec<NaiveTime> = slots.iter().map(|s| s.end_time).collect();
    let prices: Vec<i32> = slots.iter().map(|s| s.price_cents).collect();
    let peaks: Vec<bool> = slots.iter().map(|s| s.is_peak_hour).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO time_slots (field_id, date, start_time, end_time, price_cents, is_peak_hour)
        SELECT $1, t.date, t.start_time, t.end_time, t.price_cents, t.is_peak_hour
        FROM UNNEST($2::date[], $3::time[], $4::time[], $5::int4[], $6::bool[])
             AS t(date, start_time, end_time, price_cents, is_peak_hour)
        ON CONFLICT (field_id, date, start_time) DO NOTHING
        "#,
    )
    .bind(field_id)
    .bind(&dates)
    .bind(&starts)
    .bind(&ends)
    .bind(&prices)
    .bind(&peaks)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<TimeSlotRow>> {
    sqlx::query_as::<_, TimeSlotRow>(&format!(
        "SELECT {SLOT_COLUMNS} FROM time_slots ts WHERE ts.id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_field_and_date<'e>(
    executor: impl PgExecutor<'e>,
    field_id: Uuid,
    date: NaiveDate,
) -> SqlxResult<Vec<TimeSlotRow>> {
    sqlx::query_as::<_, TimeSlotRow>(&format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM time_slots ts
        WHERE ts.field_id = $1 AND ts.date = $2
        ORDER BY ts.start_time ASC
        "#
    ))
    .bind(field_id)
    .bind(date)
    .fetch_all(executor)
    .await
}

/// Atomically take a slot out of availability.
///
/// A single conditional update: the row is claimed only while it is
/// available, not admin-blocked and its field is active. Concurrent callers
/// serialize on the row lock and at most one of them gets `Some`. The
/// returned row carries the values at claim time.
pub async fn try_claim<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<TimeSlotRow>> {
    sqlx::query_as::<_, TimeSlotRow>(&format!(
        r#"
        UPDATE time_slots ts
        SET is_available = false, updated_at = NOW()
        FROM fields f
        WHERE ts.id = $1
          AND f.id = ts.field_id
          AND f.status = 'active'
          AND ts.is_available = true
          AND ts.admin_blocked = false
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Make a slot available again, whatever its current state.
pub async fn release<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let result = sqlx::query(
        "UPDATE time_slots SET is_available = true, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateTimeSlot,
) -> SqlxResult<Option<TimeSlotRow>> {
    sqlx::query_as::<_, TimeSlotRow>(&format!(
        r#"
        UPDATE time_slots ts
        SET end_time = COALESCE($2, ts.end_time),
            price_cents = COALESCE($3, ts.price_cents),
            is_peak_hour = COALESCE($4, ts.is_peak_hour),
            updated_at = NOW()
        WHERE ts.id = $1
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(data.end_time)
    .bind(data.price_cents)
    .bind(data.is_peak_hour)
    .fetch_optional(executor)
    .await
}

pub async fn set_admin_blocked<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    blocked: bool,
) -> SqlxResult<Option<TimeSlotRow>> {
    sqlx::query_as::<_, TimeSlotRow>(&format!(
        r#"
        UPDATE time_slots ts
        SET admin_blocked = $2, updated_at = NOW()
        WHERE ts.id = $1
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(blocked)
    .fetch_optional(executor)
    .await
}

/// Release slots that are marked unavailable but carry no pending, confirmed
/// or completed booking. Only rows untouched for at least `grace_secs` are
/// considered, so an in-flight reservation is never raced.
pub async fn release_orphaned<'e>(
    executor: impl PgExecutor<'e>,
    grace_secs: f64,
) -> SqlxResult<Vec<TimeSlotRow>> {
    sqlx::query_as::<_, TimeSlotRow>(&format!(
        r#"
        UPDATE time_slots ts
        SET is_available = true, updated_at = NOW()
        WHERE ts.is_available = false
          AND ts.updated_at < NOW() - make_interval(secs => $1)
          AND NOT EXISTS (
              SELECT 1 FROM bookings b
              WHERE b.time_slot_id = ts.id
                AND b.status IN ('pending', 'confirmed', 'completed')
          )
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(grace_secs)
    .fetch_all(executor)
    .await
}
