use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Running totals of the benchmark loop.
///
/// Both counters move by the bulk size on every submitted document, so after
/// `k` documents `total` reads `k * bulk_size`.
#[derive(Debug)]
pub struct Counters {
    bulk_size: u64,
    total: u64,
    since_last: u64,
    started: Instant,
    last_report: Instant,
}

impl Counters {
    pub fn start(bulk_size: u64) -> Self {
        let now = Instant::now();
        Self {
            bulk_size,
            total: 0,
            since_last: 0,
            started: now,
            last_report: now,
        }
    }

    pub fn record(&mut self) {
        self.total += self.bulk_size;
        self.since_last += self.bulk_size;
    }

    /// Snapshots the counters into a line and restarts the since-last window.
    pub fn report(&mut self, took: u64) -> ReportLine {
        let now = Instant::now();
        let line = ReportLine {
            timestamp: Utc::now(),
            took,
            total: self.total,
            total_elapsed: now.duration_since(self.started),
            since_last: self.since_last,
            since_last_elapsed: now.duration_since(self.last_report),
            bulk_size: self.bulk_size,
        };
        self.since_last = 0;
        self.last_report = now;
        line
    }

    pub fn get_total(&self) -> u64 {
        self.total
    }
    #[cfg(test)]
    pub fn get_since_last(&self) -> u64 {
        self.since_last
    }
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[derive(Debug, Clone)]
pub struct ReportLine {
    pub timestamp: DateTime<Utc>,
    pub took: u64,
    pub total: u64,
    pub total_elapsed: Duration,
    pub since_last: u64,
    pub since_last_elapsed: Duration,
    pub bulk_size: u64,
}

impl ReportLine {
    fn rate(&self, count: u64, elapsed: Duration) -> f64 {
        count as f64 / (elapsed.as_secs_f64() * self.bulk_size as f64)
    }

    pub fn total_rate(&self) -> f64 {
        self.rate(self.total, self.total_elapsed)
    }

    pub fn since_last_rate(&self) -> f64 {
        self.rate(self.since_last, self.since_last_elapsed)
    }
}

/// Shortest round-trip rendering with a `.0` on whole numbers and a signed,
/// two-digit exponent (`7.6e-08`, `1e+16`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let debug = format!("{:?}", value);
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => debug,
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.took,
            self.total,
            format_float(self.total_elapsed.as_secs_f64()),
            format_float(self.total_rate()),
            self.since_last,
            format_float(self.since_last_elapsed.as_secs_f64()),
            format_float(self.since_last_rate())
        )
    }
}
