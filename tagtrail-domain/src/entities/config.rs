// Runtime configuration handed from infrastructure to the inner layers

use chrono::{Duration, NaiveDate, Weekday};
use uuid::Uuid;

/// Thresholds used by the pure pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Same-reader reads closer than this collapse into the first one.
    pub duplicate_window: Duration,
    /// A gap longer than this between two reads starts a new route.
    pub max_in_transit: Duration,
    /// Expected duration of a leg when the topology has no value for it.
    pub default_leg_expected_hours: f64,
    /// A leg dwelling longer than this many delivery standards is a stall.
    pub dwell_multiplier: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            duplicate_window: Duration::minutes(5),
            max_in_transit: Duration::hours(24),
            default_leg_expected_hours: 2.0,
            dwell_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    pub business_days: Vec<Weekday>,
    /// Minutes after local midnight; `day_end_minute` may be 1440.
    pub day_start_minute: u32,
    pub day_end_minute: u32,
    pub utc_offset_minutes: i32,
    pub holidays: Vec<NaiveDate>,
}

impl CalendarSettings {
    pub fn business_hours_per_day(&self) -> f64 {
        f64::from(self.day_end_minute.saturating_sub(self.day_start_minute)) / 60.0
    }
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            business_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            day_start_minute: 0,
            day_end_minute: 24 * 60,
            utc_offset_minutes: 0,
            holidays: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub topology_path: String,
    pub standards_path: String,
    pub default_batch_size: usize,
    pub max_batch_size: usize,
    pub tag_concurrency: usize,
    pub store_timeout_seconds: u64,
    pub batch_deadline_seconds: u64,
    pub schedule_enabled: bool,
    pub schedule_interval_seconds: u64,
    pub scheduled_accounts: Vec<Uuid>,
    pub pipeline: PipelineSettings,
    pub calendar: CalendarSettings,
}

impl RuntimeConfig {
    pub fn store_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.store_timeout_seconds.max(1))
    }

    pub fn batch_deadline(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.batch_deadline_seconds.max(1))
    }

    pub fn effective_batch_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_batch_size)
            .min(self.max_batch_size)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 120,
            topology_path: "./topology.yaml".to_string(),
            standards_path: "./standards.yaml".to_string(),
            default_batch_size: 5000,
            max_batch_size: 20_000,
            tag_concurrency: 4,
            store_timeout_seconds: 15,
            batch_deadline_seconds: 110,
            schedule_enabled: false,
            schedule_interval_seconds: 300,
            scheduled_accounts: Vec::new(),
            pipeline: PipelineSettings::default(),
            calendar: CalendarSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}
