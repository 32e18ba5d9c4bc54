use overbench_core::stats::{self, STANDARD_PERCENTILES};
use overbench_core::DistroConfig;
use serde::{Deserialize, Serialize};

/// Mean plus the standard percentile points over a floating-point metric.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DoubleSummary {
    pub avg: f64,
    pub p0: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub p100: f64,
}

impl DoubleSummary {
    pub fn from_samples(samples: &[f64]) -> Self {
        let p = stats::percentiles_double(samples, &STANDARD_PERCENTILES);
        Self {
            avg: stats::average_double(samples),
            p0: p[0],
            p50: p[1],
            p90: p[2],
            p99: p[3],
            p100: p[4],
        }
    }
}

/// Mean plus the standard percentile points over an integer metric
/// (byte counts, memory sizes). The mean is the truncating integer mean.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LongSummary {
    pub avg: i64,
    pub p0: i64,
    pub p50: i64,
    pub p90: i64,
    pub p99: i64,
    pub p100: i64,
}

impl LongSummary {
    pub fn from_samples(samples: &[i64]) -> Self {
        let p = stats::percentiles_long(samples, &STANDARD_PERCENTILES);
        Self {
            avg: stats::average_long(samples),
            p0: p[0],
            p50: p[1],
            p90: p[2],
            p99: p[3],
            p100: p[4],
        }
    }
}

/// All measured fields for one (config, distro variant) run.
///
/// Immutable once built; every numeric field is either a real measurement or
/// the aggregator sentinel, never a stale zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub distro: DistroConfig,
    pub startup_duration_ms: i64,
    pub run_duration_ms: i64,
    pub request_count: f64,
    pub request_rate: f64,
    pub request_latency: DoubleSummary,
    pub cpu: DoubleSummary,
    pub rss_mem: LongSummary,
    pub vms_mem: LongSummary,
    pub network_bytes_sent: LongSummary,
    pub network_bytes_recv: LongSummary,
    pub peak_threads: i64,
}

impl RunResult {
    pub fn builder(distro: DistroConfig) -> RunResultBuilder {
        RunResultBuilder {
            distro,
            startup_duration_ms: stats::SENTINEL,
            run_duration_ms: stats::SENTINEL,
            request_count: 0.0,
            request_rate: 0.0,
            request_latency: DoubleSummary::default(),
            cpu: DoubleSummary::default(),
            rss_mem: LongSummary::default(),
            vms_mem: LongSummary::default(),
            network_bytes_sent: LongSummary::default(),
            network_bytes_recv: LongSummary::default(),
            peak_threads: 0,
        }
    }

    pub fn min_rss_mem_mb(&self) -> f64 {
        bytes_to_megs(self.rss_mem.p0)
    }

    pub fn max_rss_mem_mb(&self) -> f64 {
        bytes_to_megs(self.rss_mem.p100)
    }

    pub fn min_vms_mem_mb(&self) -> f64 {
        bytes_to_megs(self.vms_mem.p0)
    }

    pub fn max_vms_mem_mb(&self) -> f64 {
        bytes_to_megs(self.vms_mem.p100)
    }
}

/// Sentinel-aware byte-to-megabyte conversion: negative (sentinel) inputs
/// stay negative so renderers still recognize them.
pub fn bytes_to_megs(bytes: i64) -> f64 {
    if bytes < 0 {
        return bytes as f64;
    }
    bytes as f64 / (1024.0 * 1024.0)
}

/// Populated by the collector in a fixed sequence: identity and durations,
/// then load-generator results, then profiler results.
#[derive(Debug)]
pub struct RunResultBuilder {
    distro: DistroConfig,
    startup_duration_ms: i64,
    run_duration_ms: i64,
    request_count: f64,
    request_rate: f64,
    request_latency: DoubleSummary,
    cpu: DoubleSummary,
    rss_mem: LongSummary,
    vms_mem: LongSummary,
    network_bytes_sent: LongSummary,
    network_bytes_recv: LongSummary,
    peak_threads: i64,
}

impl RunResultBuilder {
    pub fn startup_duration_ms(mut self, ms: i64) -> Self {
        self.startup_duration_ms = ms;
        self
    }

    pub fn run_duration_ms(mut self, ms: i64) -> Self {
        self.run_duration_ms = ms;
        self
    }

    pub fn load_results(
        mut self,
        request_count: f64,
        request_rate: f64,
        request_latency: DoubleSummary,
    ) -> Self {
        self.request_count = request_count;
        self.request_rate = request_rate;
        self.request_latency = request_latency;
        self
    }

    pub fn profiler_results(
        mut self,
        cpu: DoubleSummary,
        rss_mem: LongSummary,
        vms_mem: LongSummary,
        network_bytes_sent: LongSummary,
        network_bytes_recv: LongSummary,
        peak_threads: i64,
    ) -> Self {
        self.cpu = cpu;
        self.rss_mem = rss_mem;
        self.vms_mem = vms_mem;
        self.network_bytes_sent = network_bytes_sent;
        self.network_bytes_recv = network_bytes_recv;
        self.peak_threads = peak_threads;
        self
    }

    pub fn build(self) -> RunResult {
        RunResult {
            distro: self.distro,
            startup_duration_ms: self.startup_duration_ms,
            run_duration_ms: self.run_duration_ms,
            request_count: self.request_count,
            request_rate: self.request_rate,
            request_latency: self.request_latency,
            cpu: self.cpu,
            rss_mem: self.rss_mem,
            vms_mem: self.vms_mem,
            network_bytes_sent: self.network_bytes_sent,
            network_bytes_recv: self.network_bytes_recv,
            peak_threads: self.peak_threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overbench_core::stats::SENTINEL;

    #[test]
    fn test_summaries_from_samples() {
        let long = LongSummary::from_samples(&[10, 20, 30, 40, 50]);
        assert_eq!(long.avg, 30);
        assert_eq!(long.p0, 10);
        assert_eq!(long.p50, 30);
        assert_eq!(long.p90, 50);
        assert_eq!(long.p100, 50);

        let double = DoubleSummary::from_samples(&[1.0, 2.0, 3.0]);
        assert_eq!(double.avg, 2.0);
        assert_eq!(double.p0, 1.0);
        assert_eq!(double.p100, 3.0);
    }

    #[test]
    fn test_empty_samples_yield_sentinels() {
        let long = LongSummary::from_samples(&[]);
        assert_eq!(long.avg, SENTINEL);
        assert_eq!(long.p50, SENTINEL);
    }

    #[test]
    fn test_bytes_to_megs_preserves_sentinel() {
        assert_eq!(bytes_to_megs(2 * 1024 * 1024), 2.0);
        assert!(bytes_to_megs(SENTINEL) < 0.0);
    }
}
