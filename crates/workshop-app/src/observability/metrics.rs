//! Request-lifecycle metrics for the workshop app.
//!
//! Metric names match what the workshop dashboards and alert rules query, so
//! they carry no service prefix:
//! - `http_requests_total` counter, labels `method`, `endpoint`, `status`
//! - `http_request_duration_seconds` histogram
//! - `active_connections` gauge (requests currently in flight)
//! - `error_rate` gauge (percentage of completed requests with status >= 400)
//!
//! # Ownership
//!
//! [`RequestMetrics`] owns its own Prometheus recorder. The recorder is built
//! with `build_recorder()` and never installed as the process-global
//! recorder, so every service instance (and every test server) has an
//! isolated registry whose lifetime is that of the owning `Arc`.
//!
//! Because the recorder is not installed, nothing drains its histogram
//! buffers in the background. The service runs [`spawn_upkeep`] so samples
//! recorded between scrapes do not accumulate without bound.
//!
//! # Cardinality
//!
//! - `method`: bounded by the HTTP methods the router accepts
//! - `endpoint`: the matched route template, or `unknown` when no handler ran
//! - `status`: numeric status code

use metrics::{
    Gauge, Histogram, Key, KeyName, Label, Level, Metadata, Recorder, SharedString, Unit,
};
use metrics_exporter_prometheus::{
    Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const ACTIVE_CONNECTIONS: &str = "active_connections";
pub const ERROR_RATE: &str = "error_rate";

/// Endpoint label for requests that resolved no handler (404, 405).
pub const UNKNOWN_ENDPOINT: &str = "unknown";

/// How often histogram buffers are drained, the exporter's own default.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Duration buckets in seconds. Wide enough to cover `/slow` at its default
/// two second delay.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.010, 0.025, 0.050, 0.075, 0.100, 0.250, 0.500, 0.750, 1.000, 2.500, 5.000, 7.500,
    10.000,
];

/// Error rate as a percentage, `0.0` when nothing has completed yet.
pub fn error_rate(failed: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        failed as f64 / total as f64 * 100.0
    }
}

/// Point-in-time view of the request counters.
///
/// `failed_requests <= total_requests` holds for every snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestStats {
    pub in_flight: u64,
    pub total_requests: u64,
    pub failed_requests: u64,
    pub error_rate: f64,
}

#[derive(Debug, Default)]
struct Completed {
    total: u64,
    failed: u64,
}

/// Counters, gauges and the Prometheus registry for HTTP requests.
pub struct RequestMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    in_flight: AtomicU64,
    // total/failed move together and the error_rate gauge is published while
    // holding the lock, so a late writer can never overwrite a newer rate.
    completed: Mutex<Completed>,
    active_connections: Gauge,
    error_rate: Gauge,
    request_duration: Histogram,
}

impl RequestMetrics {
    /// Build a fresh registry with all metrics described and the gauges at 0.
    ///
    /// # Errors
    ///
    /// Returns error if the histogram bucket configuration is rejected.
    pub fn new() -> Result<Self, String> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
                DURATION_BUCKETS,
            )
            .map_err(|e| format!("Failed to set HTTP request duration buckets: {e}"))?
            .build_recorder();
        let handle = recorder.handle();

        recorder.describe_counter(
            KeyName::from(HTTP_REQUESTS_TOTAL),
            None,
            SharedString::from("Total HTTP requests"),
        );
        recorder.describe_histogram(
            KeyName::from(HTTP_REQUEST_DURATION_SECONDS),
            Some(Unit::Seconds),
            SharedString::from("HTTP request duration"),
        );
        recorder.describe_gauge(
            KeyName::from(ACTIVE_CONNECTIONS),
            None,
            SharedString::from("Number of active connections"),
        );
        recorder.describe_gauge(
            KeyName::from(ERROR_RATE),
            None,
            SharedString::from("Current error rate percentage"),
        );

        let active_connections =
            recorder.register_gauge(&Key::from_static_name(ACTIVE_CONNECTIONS), &metadata());
        let error_rate =
            recorder.register_gauge(&Key::from_static_name(ERROR_RATE), &metadata());
        let request_duration = recorder.register_histogram(
            &Key::from_static_name(HTTP_REQUEST_DURATION_SECONDS),
            &metadata(),
        );
        active_connections.set(0.0);
        error_rate.set(0.0);

        Ok(Self {
            recorder,
            handle,
            in_flight: AtomicU64::new(0),
            completed: Mutex::new(Completed::default()),
            active_connections,
            error_rate,
            request_duration,
        })
    }

    /// Before-hook: mark a request as in flight.
    ///
    /// The returned guard must be completed with the response status. If it
    /// is dropped instead (the request future was cancelled), the in-flight
    /// count is still released but the request is not counted as completed.
    pub fn begin_request(&self) -> InFlightRequest<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.active_connections.increment(1.0);

        InFlightRequest {
            metrics: self,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Current counter values.
    pub fn snapshot(&self) -> RequestStats {
        let (total_requests, failed_requests) = {
            let completed = self.lock_completed();
            (completed.total, completed.failed)
        };

        RequestStats {
            in_flight: self.in_flight.load(Ordering::SeqCst),
            total_requests,
            failed_requests,
            error_rate: error_rate(failed_requests, total_requests),
        }
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Drain buffered histogram samples into their buckets.
    ///
    /// Rendering does this too; upkeep covers instances nobody scrapes.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }

    /// After-hook body, run once per completed request.
    fn record_completion(
        &self,
        method: &str,
        endpoint: &str,
        status_code: u16,
        duration: Duration,
    ) {
        self.release_in_flight();

        {
            let mut completed = self.lock_completed();
            completed.total += 1;
            if status_code >= 400 {
                completed.failed += 1;
            }
            self.error_rate
                .set(error_rate(completed.failed, completed.total));
        }

        let key = Key::from_parts(
            HTTP_REQUESTS_TOTAL,
            vec![
                Label::new("method", method.to_string()),
                Label::new("endpoint", endpoint.to_string()),
                Label::new("status", status_code.to_string()),
            ],
        );
        self.recorder
            .register_counter(&key, &metadata())
            .increment(1);

        self.request_duration.record(duration.as_secs_f64());
    }

    fn release_in_flight(&self) {
        // Saturating so a stray release can never wrap the counter.
        let _ = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_sub(1))
            });
        self.active_connections.decrement(1.0);
    }

    fn lock_completed(&self) -> std::sync::MutexGuard<'_, Completed> {
        // The critical section cannot panic, but a poisoned lock must not
        // take request handling down with it.
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A request between its before-hook and after-hook.
#[must_use = "an in-flight request must be completed with its response status"]
pub struct InFlightRequest<'a> {
    metrics: &'a RequestMetrics,
    started: Instant,
    finished: bool,
}

impl InFlightRequest<'_> {
    /// After-hook: record the completed request.
    pub fn complete(mut self, method: &str, endpoint: &str, status_code: u16) {
        self.finished = true;
        self.metrics
            .record_completion(method, endpoint, status_code, self.started.elapsed());
    }
}

impl Drop for InFlightRequest<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.metrics.release_in_flight();
        }
    }
}

/// Run [`RequestMetrics::run_upkeep`] every `period` until the task is aborted
/// or the runtime shuts down.
pub fn spawn_upkeep(metrics: Arc<RequestMetrics>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            metrics.run_upkeep();
        }
    })
}

fn metadata() -> Metadata<'static> {
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()))
}
