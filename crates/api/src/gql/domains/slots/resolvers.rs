use async_graphql::{Context, Object, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::auth::permissions::require_venue_owner;
use crate::booking::amount_to_cents;
use crate::booking::schedule::{plan_slots, SchedulePlan};
use crate::error::DomainError;
use crate::gql::error::DomainResultExt;
use crate::gql::subscriptions::publish_slot_change;
use crate::gql::types::TimeSlot;
use crate::state::AppState;
use infra::models::{FieldRow, TimeSlotRow};
use infra::repos::{fields, time_slots, NewTimeSlot, UpdateTimeSlot};

use super::types::{
    parse_time, CreateTimeSlotInput, GenerateTimeSlotsInput, GenerateTimeSlotsResult,
    UpdateTimeSlotInput,
};

const SLOT_START_CONSTRAINT: &str = "time_slots_field_date_start_key";

#[derive(Default)]
pub struct TimeSlotQuery;

#[Object]
impl TimeSlotQuery {
    /// All slots of a field on one date, ordered by start time
    async fn time_slots(
        &self,
        ctx: &Context<'_>,
        field_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>> {
        let state = ctx.data::<AppState>()?;
        let rows = time_slots::list_by_field_and_date(&state.db, field_id, date)
            .await
            .into_gql()?;
        Ok(rows.into_iter().map(TimeSlot::from).collect())
    }
}

#[derive(Default)]
pub struct TimeSlotMutation;

#[Object]
impl TimeSlotMutation {
    async fn create_time_slot(
        &self,
        ctx: &Context<'_>,
        input: CreateTimeSlotInput,
    ) -> Result<TimeSlot> {
        let field = require_field_manager(ctx, input.field_id).await?;
        let state = ctx.data::<AppState>()?;

        let start_time = parse_time(&input.start_time, "startTime").into_gql()?;
        let end_time = parse_time(&input.end_time, "endTime").into_gql()?;
        if end_time <= start_time {
            return Err(DomainError::validation("endTime must be after startTime")).into_gql();
        }

        let price_cents = match input.price {
            Some(price) => amount_to_cents(price)
                .ok_or_else(|| DomainError::validation("price must be a non-negative amount"))
                .into_gql()?,
            None if input.is_peak_hour => field
                .peak_hour_rate_cents
                .unwrap_or(field.hourly_rate_cents),
            None => field.hourly_rate_cents,
        };

        let row = time_slots::create(
            &state.db,
            field.id,
            NewTimeSlot {
                date: input.date,
                start_time,
                end_time,
                price_cents,
                is_peak_hour: input.is_peak_hour,
            },
        )
        .await
        .map_err(|e| duplicate_start_to_validation(e, input.date))
        .into_gql()?;

        Ok(row.into())
    }

    /// Generate hourly slots for a date range. Slots that already exist are kept as they are.
    async fn generate_time_slots(
        &self,
        ctx: &Context<'_>,
        input: GenerateTimeSlotsInput,
    ) -> Result<GenerateTimeSlotsResult> {
        let field = require_field_manager(ctx, input.field_id).await?;
        let state = ctx.data::<AppState>()?;

        let peak_hours = match (input.peak_start.as_deref(), input.peak_end.as_deref()) {
            (Some(start), Some(end)) => Some((
                parse_time(start, "peakStart").into_gql()?,
                parse_time(end, "peakEnd").into_gql()?,
            )),
            (None, None) => None,
            _ => {
                return Err(DomainError::validation(
                    "peakStart and peakEnd must be given together",
                ))
                .into_gql()
            }
        };

        let plan = SchedulePlan {
            start_date: input.start_date,
            end_date: input.end_date,
            opens_at: parse_time(&input.opens_at, "opensAt").into_gql()?,
            closes_at: parse_time(&input.closes_at, "closesAt").into_gql()?,
            peak_hours,
        };
        let slots = plan_slots(&plan, field.hourly_rate_cents, field.peak_hour_rate_cents)
            .into_gql()?;

        let created = time_slots::create_many(&state.db, field.id, &slots)
            .await
            .into_gql()?;

        tracing::info!(
            field_id = %field.id,
            planned = slots.len(),
            created,
            "time slots generated"
        );

        Ok(GenerateTimeSlotsResult {
            planned: slots.len() as i32,
            created: created as i32,
        })
    }

    async fn update_time_slot(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateTimeSlotInput,
    ) -> Result<TimeSlot> {
        let slot = require_slot_manager(ctx, id).await?;
        let state = ctx.data::<AppState>()?;

        let end_time = match input.end_time.as_deref() {
            Some(value) => {
                let end_time = parse_time(value, "endTime").into_gql()?;
                if end_time <= slot.start_time {
                    return Err(DomainError::validation("endTime must be after startTime"))
                        .into_gql();
                }
                Some(end_time)
            }
            None => None,
        };
        let price_cents = input
            .price
            .map(|price| {
                amount_to_cents(price)
                    .ok_or_else(|| DomainError::validation("price must be a non-negative amount"))
            })
            .transpose()
            .into_gql()?;

        let row = time_slots::update(
            &state.db,
            id,
            UpdateTimeSlot {
                end_time,
                price_cents,
                is_peak_hour: input.is_peak_hour,
            },
        )
        .await
        .into_gql()?
        .ok_or_else(|| DomainError::not_found("Time slot", id))
        .into_gql()?;

        Ok(row.into())
    }

    /// Block a slot from reservation, or lift the block
    async fn set_time_slot_blocked(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        blocked: bool,
    ) -> Result<TimeSlot> {
        require_slot_manager(ctx, id).await?;
        let state = ctx.data::<AppState>()?;

        let row = time_slots::set_admin_blocked(&state.db, id, blocked)
            .await
            .into_gql()?
            .ok_or_else(|| DomainError::not_found("Time slot", id))
            .into_gql()?;

        publish_slot_change(&row);
        Ok(row.into())
    }
}

/// Load a field and check the caller manages its venue.
async fn require_field_manager(ctx: &Context<'_>, field_id: Uuid) -> Result<FieldRow> {
    let state = ctx.data::<AppState>()?;
    let field = fields::get_by_id(&state.db, field_id)
        .await
        .into_gql()?
        .ok_or_else(|| DomainError::not_found("Field", field_id))
        .into_gql()?;

    require_venue_owner(ctx, field.venue_id).await?;
    Ok(field)
}

async fn require_slot_manager(ctx: &Context<'_>, slot_id: Uuid) -> Result<TimeSlotRow> {
    let state = ctx.data::<AppState>()?;
    let slot = time_slots::get_by_id(&state.db, slot_id)
        .await
        .into_gql()?
        .ok_or_else(|| DomainError::not_found("Time slot", slot_id))
        .into_gql()?;

    require_field_manager(ctx, slot.field_id).await?;
    Ok(slot)
}

fn duplicate_start_to_validation(err: sqlx::Error, date: NaiveDate) -> DomainError {
    let duplicate = err
        .as_database_error()
        .and_then(|db| db.constraint())
        .is_some_and(|c| c == SLOT_START_CONSTRAINT);

    if duplicate {
        DomainError::validation(format!(
            "a slot already starts at that time on {date}"
        ))
    } else {
        err.into()
    }
}
