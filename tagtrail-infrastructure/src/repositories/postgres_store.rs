use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use tagtrail_domain::ports::{EventRepository, RouteRepository};
use tagtrail_domain::{Anomaly, DbConfig, DomainError, RawEvent, RouteId, RouteRecord, TagCommit};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS routes (
        id BIGSERIAL PRIMARY KEY,
        account_id UUID NOT NULL,
        tag_id TEXT NOT NULL,
        origin_reader_id TEXT NOT NULL,
        destination_reader_id TEXT NOT NULL,
        started_at TIMESTAMPTZ NOT NULL,
        ended_at TIMESTAMPTZ NOT NULL,
        total_duration_hours DOUBLE PRECISION NOT NULL,
        waypoints JSONB NOT NULL,
        reader_sequence JSONB NOT NULL,
        event_count INTEGER NOT NULL,
        is_complete BOOLEAN NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS routes_account_tag_idx ON routes (account_id, tag_id, started_at)",
    r#"
    CREATE TABLE IF NOT EXISTS route_time_metrics (
        id BIGSERIAL PRIMARY KEY,
        route_id BIGINT NOT NULL REFERENCES routes (id) ON DELETE CASCADE,
        account_id UUID NOT NULL,
        tag_id TEXT NOT NULL,
        leg_index INTEGER NOT NULL,
        from_reader_id TEXT NOT NULL,
        to_reader_id TEXT NOT NULL,
        started_at TIMESTAMPTZ NOT NULL,
        ended_at TIMESTAMPTZ NOT NULL,
        elapsed_total_secs BIGINT NOT NULL,
        elapsed_business_secs BIGINT NOT NULL,
        expected_hours DOUBLE PRECISION,
        is_delayed BOOLEAN NOT NULL,
        delay_hours DOUBLE PRECISION
    )
    "#,
    "CREATE INDEX IF NOT EXISTS route_time_metrics_route_idx ON route_time_metrics (route_id)",
    r#"
    CREATE TABLE IF NOT EXISTS route_anomalies (
        id BIGSERIAL PRIMARY KEY,
        account_id UUID NOT NULL,
        route_id BIGINT REFERENCES routes (id) ON DELETE CASCADE,
        tag_id TEXT NOT NULL,
        kind TEXT NOT NULL,
        severity TEXT NOT NULL,
        description TEXT NOT NULL,
        reader_id TEXT,
        detected_at TIMESTAMPTZ NOT NULL,
        details JSONB NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS route_anomalies_account_idx ON route_anomalies (account_id, detected_at)",
];

/// Reads `rfid_events` and owns the route output tables.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(config: &DbConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds.max(1)))
            .connect(&config.database_url)
            .await
            .context("connecting to postgres")?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl EventRepository for PostgresStore {
    async fn fetch_unprocessed(&self, account_id: Uuid, limit: usize) -> anyhow::Result<Vec<RawEvent>> {
        let events = sqlx::query_as::<_, RawEvent>(
            r#"
            SELECT id, event_id, tag_id, reader_id, read_time, account_id, ingested_at, processed_at
            FROM rfid_events
            WHERE account_id = $1 AND processed_at IS NULL
            ORDER BY read_time ASC, id ASC
            LIMIT $2
            "#,
        )
        .bind(account_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .context("fetching unprocessed events")?;
        Ok(events)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RouteRepository for PostgresStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("creating route tables")?;
        }
        info!("route tables ready");
        Ok(())
    }

    async fn commit_tag(&self, commit: &TagCommit) -> anyhow::Result<Vec<RouteId>> {
        let mut tx = self.pool.begin().await.context("starting tag transaction")?;

        let mut route_ids = Vec::with_capacity(commit.routes.len());
        for record in &commit.routes {
            let route_id = insert_route(&mut tx, record).await?;
            for anomaly in &record.anomalies {
                insert_anomaly(&mut tx, Some(route_id), anomaly).await?;
            }
            route_ids.push(RouteId(route_id));
        }
        for anomaly in &commit.unrouted_anomalies {
            insert_anomaly(&mut tx, None, anomaly).await?;
        }

        let expected = commit.consumed_event_ids.len();
        let updated = sqlx::query(
            "UPDATE rfid_events SET processed_at = $1 WHERE id = ANY($2) AND processed_at IS NULL",
        )
        .bind(commit.processed_at)
        .bind(commit.consumed_event_ids.as_slice())
        .execute(&mut *tx)
        .await
        .context("marking events processed")?
        .rows_affected();

        if updated != expected as u64 {
            tx.rollback().await?;
            return Err(DomainError::AlreadyProcessed { expected, updated }.into());
        }

        tx.commit().await.context("committing tag transaction")?;
        debug!(
            tag_id = %commit.tag_id,
            routes = route_ids.len(),
            events = expected,
            "tag committed"
        );
        Ok(route_ids)
    }
}

async fn insert_route(tx: &mut Transaction<'_, Postgres>, record: &RouteRecord) -> anyhow::Result<i64> {
    let route = &record.route;
    let route_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO routes (
            account_id, tag_id, origin_reader_id, destination_reader_id, started_at, ended_at,
            total_duration_hours, waypoints, reader_sequence, event_count, is_complete
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(route.account_id)
    .bind(&route.tag_id)
    .bind(&route.origin_reader_id)
    .bind(&route.destination_reader_id)
    .bind(route.started_at)
    .bind(route.ended_at)
    .bind(route.total_duration_hours)
    .bind(Json(&route.waypoints))
    .bind(Json(&route.reader_sequence))
    .bind(route.event_count)
    .bind(route.is_complete)
    .fetch_one(&mut **tx)
    .await
    .context("inserting route")?;

    for metric in &record.metrics {
        sqlx::query(
            r#"
            INSERT INTO route_time_metrics (
                route_id, account_id, tag_id, leg_index, from_reader_id, to_reader_id,
                started_at, ended_at, elapsed_total_secs, elapsed_business_secs,
                expected_hours, is_delayed, delay_hours
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(route_id)
        .bind(metric.account_id)
        .bind(&metric.tag_id)
        .bind(metric.leg_index)
        .bind(&metric.from_reader_id)
        .bind(&metric.to_reader_id)
        .bind(metric.started_at)
        .bind(metric.ended_at)
        .bind(metric.elapsed_total_secs)
        .bind(metric.elapsed_business_secs)
        .bind(metric.expected_hours)
        .bind(metric.is_delayed)
        .bind(metric.delay_hours)
        .execute(&mut **tx)
        .await
        .context("inserting time metric")?;
    }
    Ok(route_id)
}

async fn insert_anomaly(
    tx: &mut Transaction<'_, Postgres>,
    route_id: Option<i64>,
    anomaly: &Anomaly,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO route_anomalies (
            account_id, route_id, tag_id, kind, severity, description, reader_id, detected_at, details
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(anomaly.account_id)
    .bind(route_id.or(anomaly.route_id.map(|id| id.0)))
    .bind(&anomaly.tag_id)
    .bind(anomaly.kind.as_str())
    .bind(anomaly.severity.as_str())
    .bind(&anomaly.description)
    .bind(&anomaly.reader_id)
    .bind(anomaly.detected_at)
    .bind(&anomaly.details)
    .execute(&mut **tx)
    .await
    .context("inserting anomaly")?;
    Ok(())
}
