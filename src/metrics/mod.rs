// Metrics module - Prometheus-compatible upload metrics
// Provides counters and a duration summary for observability

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::constants::MAX_DURATION_SAMPLES;
use crate::pipeline::Stage;

/// Histogram represents percentile statistics for latency measurements
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Histogram {
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl Histogram {
    const EMPTY: Histogram = Histogram {
        p50: 0.0,
        p90: 0.0,
        p95: 0.0,
        p99: 0.0,
    };
}

/// Metrics struct tracks upload counters and processing durations
/// Thread-safe via atomic operations and mutexes
pub struct Metrics {
    uploads_total: AtomicU64,
    uploads_succeeded: AtomicU64,
    uploads_cancelled: AtomicU64,

    // Uploads rejected before the pipeline ran (bad form, too large)
    uploads_rejected: AtomicU64,

    // Failures by pipeline stage
    stage_failures: Mutex<HashMap<Stage, u64>>,

    // Responses by HTTP status
    status_counts: Mutex<HashMap<u16, u64>>,

    bytes_received: AtomicU64,
    bytes_written: AtomicU64,

    // Most recent processing durations in microseconds
    durations: Mutex<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            uploads_total: AtomicU64::new(0),
            uploads_succeeded: AtomicU64::new(0),
            uploads_cancelled: AtomicU64::new(0),
            uploads_rejected: AtomicU64::new(0),
            stage_failures: Mutex::new(HashMap::new()),
            status_counts: Mutex::new(HashMap::new()),
            bytes_received: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            durations: Mutex::new(VecDeque::new()),
        }
    }

    /// Count an upload request and the bytes it carried
    pub fn record_upload(&self, bytes: usize) {
        self.uploads_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_received
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_success(&self, bytes_written: usize, duration_ms: f64) {
        self.uploads_succeeded.fetch_add(1, Ordering::Relaxed);
        self.bytes_written
            .fetch_add(bytes_written as u64, Ordering::Relaxed);
        self.record_duration(duration_ms);
    }

    pub fn record_stage_failure(&self, stage: Stage) {
        if let Ok(mut failures) = self.stage_failures.lock() {
            *failures.entry(stage).or_insert(0) += 1;
        }
    }

    pub fn record_cancelled(&self) {
        self.uploads_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.uploads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_status_count(&self, status_code: u16) {
        if let Ok(mut counts) = self.status_counts.lock() {
            *counts.entry(status_code).or_insert(0) += 1;
        }
    }

    /// Record a processing duration in milliseconds
    pub fn record_duration(&self, duration_ms: f64) {
        let duration_us = (duration_ms * 1000.0) as u64;
        if let Ok(mut durations) = self.durations.lock() {
            if durations.len() >= MAX_DURATION_SAMPLES {
                durations.pop_front();
            }
            durations.push_back(duration_us);
        }
    }

    pub fn uploads_total(&self) -> u64 {
        self.uploads_total.load(Ordering::Relaxed)
    }

    pub fn uploads_succeeded(&self) -> u64 {
        self.uploads_succeeded.load(Ordering::Relaxed)
    }

    pub fn uploads_cancelled(&self) -> u64 {
        self.uploads_cancelled.load(Ordering::Relaxed)
    }

    pub fn uploads_rejected(&self) -> u64 {
        self.uploads_rejected.load(Ordering::Relaxed)
    }

    pub fn stage_failures(&self, stage: Stage) -> u64 {
        self.stage_failures
            .lock()
            .ok()
            .and_then(|failures| failures.get(&stage).copied())
            .unwrap_or(0)
    }

    pub fn status_count(&self, status_code: u16) -> u64 {
        self.status_counts
            .lock()
            .ok()
            .and_then(|counts| counts.get(&status_code).copied())
            .unwrap_or(0)
    }

    /// Calculate histogram from duration samples
    pub fn duration_histogram(&self) -> Histogram {
        match self.durations.lock() {
            Ok(durations) => calculate_histogram(durations.iter().copied()),
            Err(_) => Histogram::EMPTY,
        }
    }

    /// Export all metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let mut output = String::new();

        output.push_str("# HELP upmark_uploads_total Upload requests received\n");
        output.push_str("# TYPE upmark_uploads_total counter\n");
        output.push_str(&format!("upmark_uploads_total {}\n", self.uploads_total()));

        output.push_str("\n# HELP upmark_uploads_succeeded_total Uploads processed and stored\n");
        output.push_str("# TYPE upmark_uploads_succeeded_total counter\n");
        output.push_str(&format!(
            "upmark_uploads_succeeded_total {}\n",
            self.uploads_succeeded()
        ));

        output.push_str("\n# HELP upmark_uploads_rejected_total Uploads rejected before processing\n");
        output.push_str("# TYPE upmark_uploads_rejected_total counter\n");
        output.push_str(&format!(
            "upmark_uploads_rejected_total {}\n",
            self.uploads_rejected()
        ));

        output.push_str("\n# HELP upmark_uploads_cancelled_total Uploads cancelled by the request deadline\n");
        output.push_str("# TYPE upmark_uploads_cancelled_total counter\n");
        output.push_str(&format!(
            "upmark_uploads_cancelled_total {}\n",
            self.uploads_cancelled()
        ));

        output.push_str("\n# HELP upmark_stage_failures_total Pipeline failures by stage\n");
        output.push_str("# TYPE upmark_stage_failures_total counter\n");
        for stage in Stage::ALL {
            output.push_str(&format!(
                "upmark_stage_failures_total{{stage=\"{}\"}} {}\n",
                stage,
                self.stage_failures(stage)
            ));
        }

        output.push_str("\n# HELP upmark_responses_total Upload responses by status code\n");
        output.push_str("# TYPE upmark_responses_total counter\n");
        if let Ok(counts) = self.status_counts.lock() {
            let mut sorted: Vec<_> = counts.iter().collect();
            sorted.sort();
            for (status, count) in sorted {
                output.push_str(&format!(
                    "upmark_responses_total{{status=\"{}\"}} {}\n",
                    status, count
                ));
            }
        }

        output.push_str("\n# HELP upmark_bytes_received_total Upload bytes received\n");
        output.push_str("# TYPE upmark_bytes_received_total counter\n");
        output.push_str(&format!(
            "upmark_bytes_received_total {}\n",
            self.bytes_received.load(Ordering::Relaxed)
        ));

        output.push_str("\n# HELP upmark_bytes_written_total Encoded bytes written to storage\n");
        output.push_str("# TYPE upmark_bytes_written_total counter\n");
        output.push_str(&format!(
            "upmark_bytes_written_total {}\n",
            self.bytes_written.load(Ordering::Relaxed)
        ));

        // Processing duration summary (p50, p90, p95, p99)
        let histogram = self.duration_histogram();
        output.push_str("\n# HELP upmark_processing_duration_seconds Pipeline duration in seconds\n");
        output.push_str("# TYPE upmark_processing_duration_seconds summary\n");
        for (quantile, value) in [
            ("0.5", histogram.p50),
            ("0.9", histogram.p90),
            ("0.95", histogram.p95),
            ("0.99", histogram.p99),
        ] {
            output.push_str(&format!(
                "upmark_processing_duration_seconds{{quantile=\"{}\"}} {:.3}\n",
                quantile,
                value / 1000.0
            ));
        }

        output
    }
}

/// Percentiles in milliseconds from microsecond samples
fn calculate_histogram(samples: impl Iterator<Item = u64>) -> Histogram {
    let mut sorted: Vec<u64> = samples.collect();
    if sorted.is_empty() {
        return Histogram::EMPTY;
    }
    sorted.sort_unstable();

    let at = |p: f64| {
        let idx = (sorted.len() as f64 * p) as usize;
        sorted.get(idx.saturating_sub(1)).copied().unwrap_or(0) as f64 / 1000.0
    };

    Histogram {
        p50: at(0.50),
        p90: at(0.90),
        p95: at(0.95),
        p99: at(0.99),
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
