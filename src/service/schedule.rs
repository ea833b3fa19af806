use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{info, instrument};

use crate::error::{AttendanceError, Result};
use crate::model::schedule::{ScheduleConfig, ScheduleUpdate};
use crate::store::ScheduleStore;

/// Read side of the schedule, fronted by a short-lived cache that the
/// update path invalidates.
#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
    cache: Cache<(), ScheduleConfig>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>, ttl: Duration) -> Self {
        Self {
            store,
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Fails with `ConfigMissing` until an administrator has provisioned
    /// the schedule.
    pub async fn get(&self) -> Result<ScheduleConfig> {
        if let Some(config) = self.cache.get(&()).await {
            return Ok(config);
        }

        let config = self
            .store
            .load()
            .await?
            .ok_or(AttendanceError::ConfigMissing)?;
        self.cache.insert((), config.clone()).await;
        Ok(config)
    }

    #[instrument(name = "schedule_update", skip(self, update))]
    pub async fn update(&self, update: ScheduleUpdate) -> Result<ScheduleConfig> {
        let config = update.validate()?;
        self.store.save(&config).await?;
        self.cache.invalidate(&()).await;

        info!(
            start_work = %config.start_work,
            end_work = %config.end_work,
            late_tolerance_minutes = config.late_tolerance_minutes,
            "Work schedule updated"
        );
        Ok(config)
    }
}
