use std::sync::atomic::{AtomicU64, Ordering};

use tagtrail_domain::ProcessingStats;

#[derive(Debug, Default)]
pub struct Metrics {
    batches: AtomicU64,
    batch_failures: AtomicU64,
    events_processed: AtomicU64,
    routes: AtomicU64,
    anomalies: AtomicU64,
    tag_errors: AtomicU64,
    events_pending: AtomicU64,
    events_skipped: AtomicU64,
}

impl Metrics {
    pub fn record_batch(&self, stats: &ProcessingStats) {
        self.batches.fetch_add(1, Ordering::Relaxed);
        self.events_processed
            .fetch_add(stats.processed as u64, Ordering::Relaxed);
        self.routes.fetch_add(stats.routes as u64, Ordering::Relaxed);
        self.anomalies
            .fetch_add(stats.anomalies as u64, Ordering::Relaxed);
        self.events_pending
            .fetch_add(stats.pending as u64, Ordering::Relaxed);
        self.events_skipped
            .fetch_add(stats.skipped as u64, Ordering::Relaxed);
    }

    pub fn record_batch_failure(&self) {
        self.batch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_tag_error(&self) {
        self.tag_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let batches = self.batches.load(Ordering::Relaxed);
        let failures = self.batch_failures.load(Ordering::Relaxed);
        let processed = self.events_processed.load(Ordering::Relaxed);
        let routes = self.routes.load(Ordering::Relaxed);
        let anomalies = self.anomalies.load(Ordering::Relaxed);
        let tag_errors = self.tag_errors.load(Ordering::Relaxed);
        let pending = self.events_pending.load(Ordering::Relaxed);
        let skipped = self.events_skipped.load(Ordering::Relaxed);

        format!(
            "# TYPE tagtrail_batches_total counter\n\
tagtrail_batches_total {}\n\
# TYPE tagtrail_batch_failures_total counter\n\
tagtrail_batch_failures_total {}\n\
# TYPE tagtrail_events_processed_total counter\n\
tagtrail_events_processed_total {}\n\
# TYPE tagtrail_routes_total counter\n\
tagtrail_routes_total {}\n\
# TYPE tagtrail_anomalies_total counter\n\
tagtrail_anomalies_total {}\n\
# TYPE tagtrail_tag_errors_total counter\n\
tagtrail_tag_errors_total {}\n\
# TYPE tagtrail_events_pending_total counter\n\
tagtrail_events_pending_total {}\n\
# TYPE tagtrail_events_skipped_total counter\n\
tagtrail_events_skipped_total {}\n",
            batches, failures, processed, routes, anomalies, tag_errors, pending, skipped
        )
    }
}
