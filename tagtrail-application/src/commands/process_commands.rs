use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use tagtrail_domain::{
    group_by_tag, BatchRequest, DomainError, ProcessingStats, RawEvent, ReadHorizon,
};

use crate::planner::{plan_tag, TagPlan};
use crate::{AppError, AppState, TagFailure};

enum TagOutcome {
    Committed {
        processed: usize,
        routes: usize,
        anomalies: usize,
        pending: usize,
    },
    Failed,
    Skipped(usize),
}

/// Reads fetched for one batch plus what the fetch says about the rest.
struct FetchWindow {
    events: Vec<RawEvent>,
    horizon: ReadHorizon,
}

struct PlannedTag {
    tag_id: String,
    read_count: usize,
    plan: Result<TagPlan, DomainError>,
}

impl PlannedTag {
    fn commits_anything(&self) -> bool {
        matches!(&self.plan, Ok(plan) if !plan.commit.is_empty())
    }
}

/// Fetches up to `batch_size` unprocessed reads of one account and turns
/// them into routes, one store transaction per tag.
///
/// A journey cut off by the fetch limit waits for a later batch. When that
/// leaves nothing to commit the fetch is widened, up to the configured
/// maximum, so every batch makes progress.
///
/// A failing tag leaves its events unmarked and does not affect the others.
/// Once the shutdown token fires or the batch deadline passes no further
/// tags are started; their events are reported as skipped.
pub async fn process_next_batch(
    state: &AppState,
    request: BatchRequest,
) -> Result<ProcessingStats, AppError> {
    let mut limit = state.config.effective_batch_size(request.batch_size);
    if limit == 0 {
        return Err(AppError::BadRequest("batch_size must be positive".to_string()));
    }
    let account_id = request.account_id;
    let deadline = Instant::now() + state.config.batch_deadline();
    let max_limit = state.config.max_batch_size.max(limit);
    let processed_at = state.clock.now();

    let (fetched, planned) = loop {
        let window = fetch_window(state, account_id, limit, processed_at).await?;
        let fetched = window.events.len();
        let planned = plan_window(state, account_id, &window, processed_at);
        if !window.horizon.truncated || planned.iter().any(PlannedTag::commits_anything) {
            break (fetched, planned);
        }
        if limit >= max_limit {
            // a single journey longer than the maximum batch is cut here
            warn!(
                %account_id,
                limit,
                "no journey closes within the largest batch, committing up to the limit"
            );
            let window = FetchWindow {
                horizon: ReadHorizon::complete(window.horizon.not_before),
                ..window
            };
            break (fetched, plan_window(state, account_id, &window, processed_at));
        }
        limit = limit.saturating_mul(2).min(max_limit);
        debug!(%account_id, limit, "every fetched journey is still open, widening the batch");
    };

    let tag_count = planned.len();
    let concurrency = state.config.tag_concurrency.max(1);

    let outcomes: Vec<TagOutcome> = stream::iter(planned)
        .map(|planned| async move {
            if state.shutdown.is_cancelled() || Instant::now() >= deadline {
                return TagOutcome::Skipped(planned.read_count);
            }
            let tag_id = planned.tag_id;
            match commit_tag(state, &tag_id, planned.plan).await {
                Ok(outcome) => outcome,
                Err(failure) => {
                    state.metrics.record_tag_error();
                    error!(
                        %account_id,
                        tag_id = %tag_id,
                        kind = failure.kind(),
                        retryable = failure.is_retryable(),
                        "tag processing failed: {}",
                        failure
                    );
                    TagOutcome::Failed
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut stats = ProcessingStats::default();
    for outcome in outcomes {
        match outcome {
            TagOutcome::Committed {
                processed,
                routes,
                anomalies,
                pending,
            } => {
                stats.processed += processed;
                stats.routes += routes;
                stats.anomalies += anomalies;
                stats.pending += pending;
            }
            TagOutcome::Failed => stats.errors += 1,
            TagOutcome::Skipped(events) => stats.skipped += events,
        }
    }

    if stats.skipped > 0 {
        warn!(
            %account_id,
            skipped = stats.skipped,
            "batch stopped early, remaining tags left for the next run"
        );
    }
    state.metrics.record_batch(&stats);
    info!(
        %account_id,
        fetched,
        tags = tag_count,
        processed = stats.processed,
        routes = stats.routes,
        anomalies = stats.anomalies,
        errors = stats.errors,
        pending = stats.pending,
        skipped = stats.skipped,
        "{}",
        stats.summary()
    );
    Ok(stats)
}

/// Fetches one read past `limit` to learn whether reads were left behind
/// and when the first of them happened.
async fn fetch_window(
    state: &AppState,
    account_id: Uuid,
    limit: usize,
    now: DateTime<Utc>,
) -> Result<FetchWindow, AppError> {
    let store_timeout = state.config.store_timeout();
    let mut events = match timeout(
        store_timeout,
        state
            .event_repo
            .fetch_unprocessed(account_id, limit.saturating_add(1)),
    )
    .await
    {
        Ok(Ok(events)) => events,
        Ok(Err(err)) => {
            state.metrics.record_batch_failure();
            error!(%account_id, "failed to fetch unprocessed events: {:#}", err);
            return Err(AppError::Internal(err));
        }
        Err(_) => {
            state.metrics.record_batch_failure();
            error!(%account_id, "fetching unprocessed events timed out after {:?}", store_timeout);
            return Err(AppError::Internal(anyhow::anyhow!(
                "fetching unprocessed events timed out"
            )));
        }
    };

    let horizon = if events.len() > limit {
        let first_left_out = events.split_off(limit);
        match first_left_out.first() {
            Some(next) => ReadHorizon::truncated_at(next.read_time),
            None => ReadHorizon::complete(now),
        }
    } else {
        ReadHorizon::complete(now)
    };
    Ok(FetchWindow { events, horizon })
}

fn plan_window(
    state: &AppState,
    account_id: Uuid,
    window: &FetchWindow,
    processed_at: DateTime<Utc>,
) -> Vec<PlannedTag> {
    group_by_tag(window.events.clone())
        .into_iter()
        .map(|(tag_id, reads)| {
            let read_count = reads.len();
            let plan = plan_tag(
                account_id,
                &tag_id,
                reads,
                &state.reference,
                &state.config.pipeline,
                window.horizon,
                processed_at,
            );
            PlannedTag {
                tag_id,
                read_count,
                plan,
            }
        })
        .collect()
}

async fn commit_tag(
    state: &AppState,
    tag_id: &str,
    plan: Result<TagPlan, DomainError>,
) -> Result<TagOutcome, TagFailure> {
    let plan = plan.map_err(TagFailure::Malformed)?;
    let pending = plan.pending_event_ids.len();

    if plan.commit.is_empty() {
        debug!(tag_id, pending, "nothing to commit yet");
        return Ok(TagOutcome::Committed {
            processed: 0,
            routes: 0,
            anomalies: 0,
            pending,
        });
    }

    let store_timeout = state.config.store_timeout();
    let route_ids = timeout(store_timeout, state.route_repo.commit_tag(&plan.commit))
        .await
        .map_err(|_| TagFailure::Timeout(store_timeout))?
        .map_err(TagFailure::from_store)?;

    for (route_id, record) in route_ids.iter().zip(&plan.commit.routes) {
        debug!(
            tag_id,
            route_id = route_id.0,
            origin = %record.route.origin_reader_id,
            destination = %record.route.destination_reader_id,
            waypoints = record.route.waypoints.len(),
            anomalies = record.anomalies.len(),
            "route stored"
        );
    }

    Ok(TagOutcome::Committed {
        processed: plan.commit.consumed_event_ids.len(),
        routes: plan.commit.routes.len(),
        anomalies: plan.commit.anomaly_count(),
        pending,
    })
}
