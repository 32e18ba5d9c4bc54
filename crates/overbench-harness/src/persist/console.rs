//! Fixed-width console report: one labeled row per metric, one column per
//! distro variant. Sentinel values render as `N/A` so a missing metric can
//! never be mistaken for a measured zero.

use crate::persist::ResultsPersister;
use crate::results::RunResult;
use overbench_core::{Result, TestConfig};
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

pub struct TextPersister<W: Write> {
    out: W,
    config: TestConfig,
}

impl<W: Write> TextPersister<W> {
    pub fn new(out: W, config: TestConfig) -> Self {
        Self { out, config }
    }

    fn display(
        &mut self,
        results: &[RunResult],
        label: &str,
        value: impl Fn(&RunResult) -> String,
    ) -> std::io::Result<()> {
        write!(self.out, "{label:<22}: ")?;
        for result in results {
            write!(self.out, "{:>25}", value(result))?;
        }
        writeln!(self.out)
    }
}

impl<W: Write> ResultsPersister for TextPersister<W> {
    fn write(&mut self, results: &[RunResult]) -> Result<()> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        writeln!(self.out, "----------------------------------------------------------")?;
        writeln!(self.out, " Run at {now} (unix)")?;
        writeln!(self.out, " {} : {}", self.config.name, self.config.description)?;
        writeln!(
            self.out,
            " {} users, {} duration, {} max rps",
            self.config.concurrent_connections, self.config.duration, self.config.max_request_rate
        )?;
        writeln!(self.out, "----------------------------------------------------------")?;

        self.display(results, "Distro config", |r| r.distro.name.clone())?;
        self.display(results, "Run duration", |r| fmt_duration(r.run_duration_ms))?;
        self.display(results, "Startup time (ms)", |r| fmt_long(r.startup_duration_ms))?;
        self.display(results, "Avg. CPU %", |r| fmt_double(r.cpu.avg))?;
        self.display(results, "CPU % p50", |r| fmt_double(r.cpu.p50))?;
        self.display(results, "CPU % p99", |r| fmt_double(r.cpu.p99))?;
        self.display(results, "Max. CPU %", |r| fmt_double(r.cpu.p100))?;
        self.display(results, "Min Resident Mem (MB)", |r| fmt_double(r.min_rss_mem_mb()))?;
        self.display(results, "Max Resident Mem (MB)", |r| fmt_double(r.max_rss_mem_mb()))?;
        self.display(results, "Min Virtual Mem (MB)", |r| fmt_double(r.min_vms_mem_mb()))?;
        self.display(results, "Max Virtual Mem (MB)", |r| fmt_double(r.max_vms_mem_mb()))?;
        self.display(results, "Request count", |r| fmt_double(r.request_count))?;
        self.display(results, "Request rate (rps)", |r| fmt_double(r.request_rate))?;
        self.display(results, "Req. mean (ms)", |r| fmt_double(r.request_latency.avg))?;
        self.display(results, "Req. p50 (ms)", |r| fmt_double(r.request_latency.p50))?;
        self.display(results, "Req. p90 (ms)", |r| fmt_double(r.request_latency.p90))?;
        self.display(results, "Req. p99 (ms)", |r| fmt_double(r.request_latency.p99))?;
        self.display(results, "Req. p100 (ms)", |r| fmt_double(r.request_latency.p100))?;
        self.display(results, "Net sent avg (bytes)", |r| fmt_long(r.network_bytes_sent.avg))?;
        self.display(results, "Net recv avg (bytes)", |r| fmt_long(r.network_bytes_recv.avg))?;
        self.display(results, "Peak threads", |r| fmt_long(r.peak_threads))?;
        self.out.flush()?;

        Ok(())
    }
}

fn fmt_double(d: f64) -> String {
    if d < 0.0 {
        "N/A".to_string()
    } else {
        format!("{d:.2}")
    }
}

fn fmt_long(v: i64) -> String {
    if v < 0 {
        "N/A".to_string()
    } else {
        v.to_string()
    }
}

fn fmt_duration(ms: i64) -> String {
    if ms < 0 {
        return "N/A".to_string();
    }
    let total_secs = ms / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs / 60) % 60,
        total_secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{DoubleSummary, LongSummary};
    use overbench_core::DistroConfig;

    fn sample_result(name: &str) -> RunResult {
        RunResult::builder(DistroConfig::new(name, "d", false, &[], "img"))
            .startup_duration_ms(1500)
            .run_duration_ms(61_000)
            .load_results(
                100.0,
                10.0,
                DoubleSummary {
                    avg: 12.0,
                    p0: 1.0,
                    p50: 10.0,
                    p90: 20.0,
                    p99: 30.0,
                    p100: 40.0,
                },
            )
            .profiler_results(
                DoubleSummary::from_samples(&[1.0, 2.0]),
                LongSummary::from_samples(&[1024 * 1024]),
                LongSummary::from_samples(&[2 * 1024 * 1024]),
                LongSummary::from_samples(&[5]),
                LongSummary::from_samples(&[7]),
                9,
            )
            .build()
    }

    fn render(results: &[RunResult]) -> String {
        let config = TestConfig::builder().name("t").description("d").build();
        let mut buf = Vec::new();
        TextPersister::new(&mut buf, config).write(results).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_one_column_per_variant() {
        let output = render(&[sample_result("none"), sample_result("instrumented")]);
        let distro_row = output
            .lines()
            .find(|l| l.starts_with("Distro config"))
            .unwrap();
        assert!(distro_row.contains("none"));
        assert!(distro_row.contains("instrumented"));
        let startup_row = output
            .lines()
            .find(|l| l.starts_with("Startup time (ms)"))
            .unwrap();
        assert_eq!(startup_row.matches("1500").count(), 2);
    }

    #[test]
    fn test_run_duration_formatting() {
        let output = render(&[sample_result("none")]);
        assert!(output.contains("00:01:01"));
    }

    #[test]
    fn test_sentinel_renders_as_na_not_zero() {
        let mut result = sample_result("none");
        result.cpu = DoubleSummary::from_samples(&[]);
        let output = render(&[result]);
        let cpu_row = output
            .lines()
            .find(|l| l.starts_with("Avg. CPU %"))
            .unwrap();
        assert!(cpu_row.trim_end().ends_with("N/A"));
        assert!(!cpu_row.contains("-1.00"));
        assert!(!cpu_row.contains("0.00"));
    }
}
