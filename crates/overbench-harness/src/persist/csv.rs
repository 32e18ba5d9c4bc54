//! Appendable CSV report for longitudinal comparison in spreadsheet tools.
//!
//! One row per test pass, timestamp first, then every field for every distro
//! variant. The nesting is metric-major, variant-minor: for each field in the
//! fixed table, one column per variant, so variant columns for the same
//! metric sit side by side. The header row is written once when the file is
//! first created and is byte-stable across invocations.

use crate::persist::ResultsPersister;
use crate::results::RunResult;
use overbench_core::Result;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy)]
enum CsvValue {
    Long(i64),
    Double(f64),
}

impl fmt::Display for CsvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvValue::Long(v) => write!(f, "{v}"),
            CsvValue::Double(v) => write!(f, "{v}"),
        }
    }
}

struct FieldSpec {
    name: &'static str,
    get: fn(&RunResult) -> CsvValue,
}

const fn field(name: &'static str, get: fn(&RunResult) -> CsvValue) -> FieldSpec {
    FieldSpec { name, get }
}

// The output column order. Append-only: reordering or renaming breaks every
// spreadsheet built on previously written files.
static FIELDS: &[FieldSpec] = &[
    field("startupDurationMs", |r| CsvValue::Long(r.startup_duration_ms)),
    field("requestCount", |r| CsvValue::Double(r.request_count)),
    field("requestRate", |r| CsvValue::Double(r.request_rate)),
    field("requestLatencyAvg", |r| CsvValue::Double(r.request_latency.avg)),
    field("requestLatencyP0", |r| CsvValue::Double(r.request_latency.p0)),
    field("requestLatencyP50", |r| CsvValue::Double(r.request_latency.p50)),
    field("requestLatencyP90", |r| CsvValue::Double(r.request_latency.p90)),
    field("requestLatencyP99", |r| CsvValue::Double(r.request_latency.p99)),
    field("requestLatencyP100", |r| CsvValue::Double(r.request_latency.p100)),
    field("networkBytesSentAvg", |r| CsvValue::Long(r.network_bytes_sent.avg)),
    field("networkBytesSentP0", |r| CsvValue::Long(r.network_bytes_sent.p0)),
    field("networkBytesSentP50", |r| CsvValue::Long(r.network_bytes_sent.p50)),
    field("networkBytesSentP90", |r| CsvValue::Long(r.network_bytes_sent.p90)),
    field("networkBytesSentP99", |r| CsvValue::Long(r.network_bytes_sent.p99)),
    field("networkBytesSentP100", |r| CsvValue::Long(r.network_bytes_sent.p100)),
    field("networkBytesRecvAvg", |r| CsvValue::Long(r.network_bytes_recv.avg)),
    field("networkBytesRecvP0", |r| CsvValue::Long(r.network_bytes_recv.p0)),
    field("networkBytesRecvP50", |r| CsvValue::Long(r.network_bytes_recv.p50)),
    field("networkBytesRecvP90", |r| CsvValue::Long(r.network_bytes_recv.p90)),
    field("networkBytesRecvP99", |r| CsvValue::Long(r.network_bytes_recv.p99)),
    field("networkBytesRecvP100", |r| CsvValue::Long(r.network_bytes_recv.p100)),
    field("cpuAvg", |r| CsvValue::Double(r.cpu.avg)),
    field("cpuP0", |r| CsvValue::Double(r.cpu.p0)),
    field("cpuP50", |r| CsvValue::Double(r.cpu.p50)),
    field("cpuP90", |r| CsvValue::Double(r.cpu.p90)),
    field("cpuP99", |r| CsvValue::Double(r.cpu.p99)),
    field("cpuP100", |r| CsvValue::Double(r.cpu.p100)),
    field("rssMemAvg", |r| CsvValue::Long(r.rss_mem.avg)),
    field("rssMemP0", |r| CsvValue::Long(r.rss_mem.p0)),
    field("rssMemP50", |r| CsvValue::Long(r.rss_mem.p50)),
    field("rssMemP90", |r| CsvValue::Long(r.rss_mem.p90)),
    field("rssMemP99", |r| CsvValue::Long(r.rss_mem.p99)),
    field("rssMemP100", |r| CsvValue::Long(r.rss_mem.p100)),
    field("vmsMemAvg", |r| CsvValue::Long(r.vms_mem.avg)),
    field("vmsMemP0", |r| CsvValue::Long(r.vms_mem.p0)),
    field("vmsMemP50", |r| CsvValue::Long(r.vms_mem.p50)),
    field("vmsMemP90", |r| CsvValue::Long(r.vms_mem.p90)),
    field("vmsMemP99", |r| CsvValue::Long(r.vms_mem.p99)),
    field("vmsMemP100", |r| CsvValue::Long(r.vms_mem.p100)),
    field("peakThreadCount", |r| CsvValue::Long(r.peak_threads)),
    field("runDurationMs", |r| CsvValue::Long(r.run_duration_ms)),
];

pub struct CsvPersister {
    path: PathBuf,
}

impl CsvPersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn header_line(results: &[RunResult]) -> String {
        let mut line = String::from("timestamp");
        for f in FIELDS {
            for result in results {
                line.push(',');
                line.push_str(&result.distro.name);
                line.push(':');
                line.push_str(f.name);
            }
        }
        line.push('\n');
        line
    }

    fn data_line(results: &[RunResult], timestamp: u64) -> String {
        let mut line = timestamp.to_string();
        for f in FIELDS {
            for result in results {
                line.push(',');
                line.push_str(&(f.get)(result).to_string());
            }
        }
        line.push('\n');
        line
    }

    fn write_at(&self, results: &[RunResult], timestamp: u64) -> Result<()> {
        if !self.path.exists() {
            std::fs::write(&self.path, Self::header_line(results))?;
        }
        // Header plus row are each one complete newline-terminated write, so
        // an interrupted append can only lose whole lines.
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(Self::data_line(results, timestamp).as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl ResultsPersister for CsvPersister {
    fn write(&mut self, results: &[RunResult]) -> Result<()> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.write_at(results, timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{DoubleSummary, LongSummary};
    use overbench_core::DistroConfig;
    use tempfile::TempDir;

    fn sample_result(name: &str, startup_ms: i64) -> RunResult {
        RunResult::builder(DistroConfig::new(name, "d", false, &[], "img"))
            .startup_duration_ms(startup_ms)
            .run_duration_ms(60_000)
            .load_results(
                500.0,
                50.0,
                DoubleSummary {
                    avg: 10.0,
                    p0: 1.0,
                    p50: 8.0,
                    p90: 15.0,
                    p99: 25.0,
                    p100: 30.0,
                },
            )
            .profiler_results(
                DoubleSummary::from_samples(&[2.0, 4.0]),
                LongSummary::from_samples(&[100, 200]),
                LongSummary::from_samples(&[300, 400]),
                LongSummary::from_samples(&[10]),
                LongSummary::from_samples(&[20]),
                8,
            )
            .build()
    }

    #[test]
    fn test_header_written_once_and_stable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let results = vec![sample_result("none", 100), sample_result("adot", 200)];

        let persister = CsvPersister::new(&path);
        persister.write_at(&results, 1_700_000_000).unwrap();
        let first_header = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string();

        persister.write_at(&results, 1_700_000_060).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 3, "one header plus two data rows");
        assert_eq!(lines[0], first_header);
        assert!(lines[0].starts_with("timestamp,none:startupDurationMs,adot:startupDurationMs"));
    }

    #[test]
    fn test_row_is_metric_major_variant_minor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let results = vec![sample_result("none", 100), sample_result("adot", 200)];

        CsvPersister::new(&path)
            .write_at(&results, 1_700_000_000)
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let row = contents.lines().nth(1).unwrap();

        // timestamp, then both variants' startup durations side by side
        assert!(row.starts_with("1700000000,100,200,"));
        assert!(row.ends_with(",60000,60000"));
    }

    #[test]
    fn test_header_matches_data_width() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let results = vec![sample_result("none", 100)];

        CsvPersister::new(&path)
            .write_at(&results, 1_700_000_000)
            .unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0].split(',').count(),
            lines[1].split(',').count(),
        );
    }
}
