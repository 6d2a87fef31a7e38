#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tagtrail_application::{AppState, Metrics};
use tagtrail_domain::ports::{Clock, EventRepository, HealthCheckService, RouteRepository};
use tagtrail_domain::{
    Anomaly, DomainError, NetworkTopology, PipelineSettings, RawEvent, ReaderClass, ReaderProfile,
    ReferenceData, RouteId, RouteRecord, RuntimeConfig, StandardsTable, TagCommit,
    TopologyDocument, WeekdayCalendar,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub fn account() -> Uuid {
    Uuid::from_u128(0x7a6)
}

pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap()
}

pub fn read(id: i64, tag: &str, reader: &str, time: DateTime<Utc>) -> RawEvent {
    RawEvent {
        id,
        event_id: format!("evt-{id}"),
        tag_id: tag.to_string(),
        reader_id: reader.to_string(),
        read_time: time,
        account_id: account(),
        ingested_at: Some(time),
        processed_at: None,
    }
}

/// Event table and route tables kept in memory.
#[derive(Default)]
pub struct InMemoryStore {
    pub events: Mutex<Vec<RawEvent>>,
    pub routes: Mutex<Vec<RouteRecord>>,
    pub unrouted: Mutex<Vec<Anomaly>>,
    /// Tags whose next commit fails before anything is written.
    pub fail_next_commit: Mutex<HashSet<String>>,
    /// Serve processed rows too, as a lagging replica would.
    pub stale_reads: Mutex<bool>,
}

impl InMemoryStore {
    pub fn with_events(events: Vec<RawEvent>) -> Arc<Self> {
        let store = Self::default();
        *store.events.lock().unwrap() = events;
        Arc::new(store)
    }

    pub fn processed_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.is_processed())
            .map(|event| event.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn route_count(&self) -> usize {
        self.routes.lock().unwrap().len()
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn fetch_unprocessed(&self, account_id: Uuid, limit: usize) -> anyhow::Result<Vec<RawEvent>> {
        let stale = *self.stale_reads.lock().unwrap();
        let mut events: Vec<RawEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.account_id == account_id && (stale || !event.is_processed()))
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.read_time, event.id));
        events.truncate(limit);
        Ok(events)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl RouteRepository for InMemoryStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn commit_tag(&self, commit: &TagCommit) -> anyhow::Result<Vec<RouteId>> {
        if self.fail_next_commit.lock().unwrap().remove(&commit.tag_id) {
            anyhow::bail!("connection reset while committing {}", commit.tag_id);
        }

        let mut events = self.events.lock().unwrap();
        let updated = events
            .iter()
            .filter(|event| commit.consumed_event_ids.contains(&event.id) && !event.is_processed())
            .count();
        if updated != commit.consumed_event_ids.len() {
            return Err(DomainError::AlreadyProcessed {
                expected: commit.consumed_event_ids.len(),
                updated: updated as u64,
            }
            .into());
        }
        for event in events.iter_mut() {
            if commit.consumed_event_ids.contains(&event.id) {
                event.processed_at = Some(commit.processed_at);
            }
        }

        let mut routes = self.routes.lock().unwrap();
        let mut ids = Vec::new();
        for record in &commit.routes {
            routes.push(record.clone());
            ids.push(RouteId(routes.len() as i64));
        }
        self.unrouted
            .lock()
            .unwrap()
            .extend(commit.unrouted_anomalies.iter().cloned());
        Ok(ids)
    }
}

/// A clock stuck at one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct AlwaysHealthy;

#[async_trait]
impl HealthCheckService for AlwaysHealthy {
    async fn check_database(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn check_reference_data(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

pub fn reference() -> ReferenceData {
    let reader = |id: &str, node: &str, class| ReaderProfile {
        reader_id: id.to_string(),
        node_id: node.to_string(),
        class,
    };
    ReferenceData {
        topology: Arc::new(NetworkTopology::from_document(TopologyDocument {
            readers: vec![
                reader("A", "MAD", ReaderClass::Origin),
                reader("B", "HUB", ReaderClass::Transit),
                reader("C", "BCN", ReaderClass::Destination),
            ],
            links: Vec::new(),
        })),
        calendar: Arc::new(WeekdayCalendar::around_the_clock()),
        standards: Arc::new(StandardsTable::default()),
    }
}

pub fn config() -> RuntimeConfig {
    RuntimeConfig {
        pipeline: PipelineSettings {
            max_in_transit: Duration::hours(12),
            default_leg_expected_hours: 12.0,
            ..PipelineSettings::default()
        },
        ..RuntimeConfig::default()
    }
}

/// State whose clock reads Tuesday 2024-03-05 12:00.
pub fn state(store: Arc<InMemoryStore>) -> AppState {
    state_at(store, at(5, 12, 0))
}

pub fn state_at(store: Arc<InMemoryStore>, now: DateTime<Utc>) -> AppState {
    AppState {
        config: config(),
        event_repo: store.clone(),
        route_repo: store,
        health: Arc::new(AlwaysHealthy),
        reference: reference(),
        clock: Arc::new(FixedClock(now)),
        metrics: Arc::new(Metrics::default()),
        shutdown: CancellationToken::new(),
    }
}
