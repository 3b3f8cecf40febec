use chrono::{Duration, NaiveDate, NaiveTime};

use infra::repos::NewTimeSlot;

use crate::error::DomainError;

/// Longest date range a single generation request may cover, inclusive.
pub const MAX_RANGE_DAYS: i64 = 92;

/// Opening hours and pricing for a run of hourly slots on one field.
#[derive(Debug, Clone)]
pub struct SchedulePlan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    /// Slots starting in `[start, end)` are peak hours.
    pub peak_hours: Option<(NaiveTime, NaiveTime)>,
}

/// Expand a plan into one-hour slots. A slot that would run past closing time
/// is not produced.
pub fn plan_slots(
    plan: &SchedulePlan,
    hourly_rate_cents: i32,
    peak_rate_cents: Option<i32>,
) -> Result<Vec<NewTimeSlot>, DomainError> {
    if plan.end_date < plan.start_date {
        return Err(DomainError::validation("end date is before start date"));
    }
    let days = (plan.end_date - plan.start_date).num_days() + 1;
    if days > MAX_RANGE_DAYS {
        return Err(DomainError::validation(format!(
            "date range covers {days} days, at most {MAX_RANGE_DAYS} are allowed"
        )));
    }
    if plan.closes_at <= plan.opens_at {
        return Err(DomainError::validation("closing time must be after opening time"));
    }
    if let Some((start, end)) = plan.peak_hours {
        if end <= start {
            return Err(DomainError::validation("peak hours end before they start"));
        }
    }

    let hours = daily_hours(plan.opens_at, plan.closes_at);
    let mut slots = Vec::with_capacity(hours.len() * days as usize);

    for date in plan.start_date.iter_days().take(days as usize) {
        for &(start_time, end_time) in &hours {
            let is_peak_hour = plan
                .peak_hours
                .is_some_and(|(start, end)| start_time >= start && start_time < end);
            let price_cents = if is_peak_hour {
                peak_rate_cents.unwrap_or(hourly_rate_cents)
            } else {
                hourly_rate_cents
            };

            slots.push(NewTimeSlot {
                date,
                start_time,
                end_time,
                price_cents,
                is_peak_hour,
            });
        }
    }

    Ok(slots)
}

fn daily_hours(opens_at: NaiveTime, closes_at: NaiveTime) -> Vec<(NaiveTime, NaiveTime)> {
    let mut hours = Vec::new();
    let mut start = opens_at;
    loop {
        let (end, wrapped) = start.overflowing_add_signed(Duration::hours(1));
        if wrapped != 0 || end > closes_at {
            break;
        }
        hours.push((start, end));
        start = end;
    }
    hours
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn plan(start: NaiveDate, end: NaiveDate) -> SchedulePlan {
        SchedulePlan {
            start_date: start,
            end_date: end,
            opens_at: time(8, 0),
            closes_at: time(22, 0),
            peak_hours: Some((time(18, 0), time(21, 0))),
        }
    }

    #[test]
    fn hourly_slots_between_opening_hours() {
        let slots = plan_slots(&plan(date(1), date(2)), 3000, Some(4500)).unwrap();

        assert_eq!(slots.len(), 28);
        assert_eq!(slots[0].start_time, time(8, 0));
        assert_eq!(slots[13].end_time, time(22, 0));
        assert_eq!(slots[14].date, date(2));
    }

    #[test]
    fn peak_hours_use_peak_rate() {
        let slots = plan_slots(&plan(date(1), date(1)), 3000, Some(4500)).unwrap();
        let evening = slots.iter().find(|s| s.start_time == time(18, 0)).unwrap();
        let last_peak = slots.iter().find(|s| s.start_time == time(20, 0)).unwrap();
        let after = slots.iter().find(|s| s.start_time == time(21, 0)).unwrap();

        assert!(evening.is_peak_hour);
        assert_eq!(evening.price_cents, 4500);
        assert!(last_peak.is_peak_hour);
        assert!(!after.is_peak_hour);
        assert_eq!(after.price_cents, 3000);
    }

    #[test]
    fn peak_without_peak_rate_keeps_base_price() {
        let slots = plan_slots(&plan(date(1), date(1)), 3000, None).unwrap();
        assert!(slots.iter().all(|s| s.price_cents == 3000));
        assert!(slots.iter().any(|s| s.is_peak_hour));
    }

    #[test]
    fn partial_last_hour_is_dropped() {
        let mut p = plan(date(1), date(1));
        p.opens_at = time(9, 30);
        p.closes_at = time(12, 0);
        let slots = plan_slots(&p, 1000, None).unwrap();

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end_time, time(11, 30));
    }

    #[test]
    fn rejects_oversized_or_inverted_ranges() {
        let too_long = plan(date(1), date(1) + Duration::days(MAX_RANGE_DAYS));
        assert!(matches!(
            plan_slots(&too_long, 1000, None),
            Err(DomainError::Validation(_))
        ));
        assert!(plan_slots(&plan(date(2), date(1)), 1000, None).is_err());

        let mut closed = plan(date(1), date(1));
        closed.closes_at = closed.opens_at;
        assert!(plan_slots(&closed, 1000, None).is_err());
    }
}
