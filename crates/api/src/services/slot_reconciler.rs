use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::gql::subscriptions::publish_slot_change;
use crate::AppState;
use infra::repos::time_slots;

const DEFAULT_INTERVAL_SECS: u64 = 300;
const DEFAULT_GRACE_SECS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Time between sweeps; zero disables the reconciler
    pub interval: Duration,
    /// Slots touched more recently than this are never repaired
    pub grace: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            grace: Duration::from_secs(DEFAULT_GRACE_SECS),
        }
    }
}

impl ReconcilerConfig {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("SLOT_RECONCILE_INTERVAL_SECS").ok().as_deref(),
            std::env::var("SLOT_RECONCILE_GRACE_SECS").ok().as_deref(),
        )
    }

    fn from_values(interval: Option<&str>, grace: Option<&str>) -> Self {
        let secs = |value: Option<&str>, default: u64| {
            value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        };

        Self {
            interval: Duration::from_secs(secs(interval, DEFAULT_INTERVAL_SECS)),
            grace: Duration::from_secs(secs(grace, DEFAULT_GRACE_SECS)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }
}

/// Periodically releases slots that are marked unavailable but hold no
/// pending, confirmed or completed booking.
pub struct SlotReconciler {
    state: AppState,
    config: ReconcilerConfig,
    interval: Interval,
}

impl SlotReconciler {
    pub fn new(state: AppState, config: ReconcilerConfig) -> Self {
        let mut interval = interval(config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            state,
            config,
            interval,
        }
    }

    /// Start the background sweep loop
    pub async fn run(&mut self) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            grace_secs = self.config.grace.as_secs(),
            "Starting slot reconciler"
        );

        loop {
            self.interval.tick().await;

            if let Err(e) = self.sweep().await {
                error!("Error reconciling time slots: {}", e);
            }
        }
    }

    /// Release orphaned slots once; returns how many were released.
    pub async fn sweep(&self) -> Result<usize, sqlx::Error> {
        let released =
            time_slots::release_orphaned(&self.state.db, self.config.grace.as_secs_f64()).await?;

        for slot in &released {
            warn!(
                slot_id = %slot.id,
                field_id = %slot.field_id,
                "released orphaned time slot"
            );
            publish_slot_change(slot);
        }

        Ok(released.len())
    }
}

/// Spawn the reconciler, unless its interval is configured as zero.
pub fn spawn_slot_reconciler(
    state: AppState,
    config: ReconcilerConfig,
) -> Option<tokio::task::JoinHandle<()>> {
    if !config.is_enabled() {
        info!("Slot reconciler disabled (SLOT_RECONCILE_INTERVAL_SECS=0)");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut reconciler = SlotReconciler::new(state, config);
        reconciler.run().await;
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_or_garbage_values() {
        assert_eq!(
            ReconcilerConfig::from_values(None, Some("soon")),
            ReconcilerConfig::default()
        );
    }

    #[test]
    fn zero_interval_disables() {
        let config = ReconcilerConfig::from_values(Some("0"), Some("30"));
        assert!(!config.is_enabled());
        assert_eq!(config.grace, Duration::from_secs(30));
    }
}
