//! Turns a run's on-disk artifacts into [`RunResult`]s.
//!
//! Three artifact files per variant: a plain-text startup duration, the load
//! generator's summary json, and the in-container profiler's json. A missing
//! or malformed file aborts the whole configuration pass; a partial
//! comparison report would be worse than a clear error.

use crate::results::{DoubleSummary, LongSummary, RunResult, RunResultBuilder};
use overbench_core::stats;
use overbench_core::{DistroConfig, NamingConvention, OverbenchError, Result, TestConfig};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct ResultsCollector<'a> {
    naming: &'a NamingConvention,
    /// Wall-clock elapsed per variant, accumulated by the driver.
    run_durations: &'a HashMap<String, i64>,
}

#[derive(Debug, Deserialize)]
struct ProfilerArtifact {
    peak_threads: i64,
    cpu_usage: Vec<f64>,
    rss_mem: Vec<i64>,
    vms_mem: Vec<i64>,
    network_bytes_sent: Vec<i64>,
    network_bytes_recv: Vec<i64>,
}

impl<'a> ResultsCollector<'a> {
    pub fn new(naming: &'a NamingConvention, run_durations: &'a HashMap<String, i64>) -> Self {
        Self {
            naming,
            run_durations,
        }
    }

    pub fn collect(&self, config: &TestConfig) -> Result<Vec<RunResult>> {
        config
            .distro_configs
            .iter()
            .map(|distro| self.read_distro_results(distro))
            .collect()
    }

    fn read_distro_results(&self, distro: &DistroConfig) -> Result<RunResult> {
        tracing::debug!("Collecting results for distro config '{}'", distro.name);

        let run_duration_ms = self
            .run_durations
            .get(&distro.name)
            .copied()
            .unwrap_or(stats::SENTINEL);

        let builder = RunResult::builder(distro.clone())
            .run_duration_ms(run_duration_ms)
            .startup_duration_ms(self.read_startup_duration(distro)?);
        let builder = self.add_k6_results(builder, distro)?;
        let builder = self.add_profiler_results(builder, distro)?;

        Ok(builder.build())
    }

    fn read_startup_duration(&self, distro: &DistroConfig) -> Result<i64> {
        let path = self.naming.startup_duration_file(distro);
        let text = read_artifact(&path, distro)?;
        text.trim().parse().map_err(|_| malformed(
            &path,
            format!("expected a single integer, got {:?}", text.trim()),
        ))
    }

    fn add_k6_results(
        &self,
        builder: RunResultBuilder,
        distro: &DistroConfig,
    ) -> Result<RunResultBuilder> {
        let path = self.naming.k6_results(distro);
        let json = read_artifact(&path, distro)?;
        let root: Value = serde_json::from_str(&json)
            .map_err(|e| malformed(&path, e.to_string()))?;

        let latency = DoubleSummary {
            avg: read_number(&root, &path, "/metrics/http_req_duration/avg")?,
            p0: read_number(&root, &path, "/metrics/http_req_duration/p(0)")?,
            p50: read_number(&root, &path, "/metrics/http_req_duration/p(50)")?,
            p90: read_number(&root, &path, "/metrics/http_req_duration/p(90)")?,
            p99: read_number(&root, &path, "/metrics/http_req_duration/p(99)")?,
            p100: read_number(&root, &path, "/metrics/http_req_duration/p(100)")?,
        };
        let count = read_number(&root, &path, "/metrics/http_reqs/count")?;
        let rate = read_number(&root, &path, "/metrics/http_reqs/rate")?;

        Ok(builder.load_results(count, rate, latency))
    }

    fn add_profiler_results(
        &self,
        builder: RunResultBuilder,
        distro: &DistroConfig,
    ) -> Result<RunResultBuilder> {
        let path = self.naming.performance_metrics_file(distro);
        let json = read_artifact(&path, distro)?;
        let artifact: ProfilerArtifact = serde_json::from_str(&json)
            .map_err(|e| malformed(&path, e.to_string()))?;

        if artifact.cpu_usage.is_empty() {
            tracing::warn!(
                "Profiler artifact {} has no CPU samples; reporting N/A",
                path.display()
            );
        }

        Ok(builder.profiler_results(
            DoubleSummary::from_samples(&artifact.cpu_usage),
            LongSummary::from_samples(&artifact.rss_mem),
            LongSummary::from_samples(&artifact.vms_mem),
            LongSummary::from_samples(&artifact.network_bytes_sent),
            LongSummary::from_samples(&artifact.network_bytes_recv),
            artifact.peak_threads,
        ))
    }
}

fn read_artifact(path: &Path, distro: &DistroConfig) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            OverbenchError::MissingArtifact {
                distro: distro.name.clone(),
                path: path.to_path_buf(),
            }
        } else {
            OverbenchError::Io(e)
        }
    })
}

fn read_number(root: &Value, path: &Path, pointer: &str) -> Result<f64> {
    root.pointer(pointer)
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed(path, format!("missing or non-numeric field {pointer}")))
}

fn malformed(path: &Path, reason: String) -> OverbenchError {
    OverbenchError::MalformedArtifact {
        path: path.to_path_buf(),
        reason,
    }
}
