//! Container lifecycle against the plain docker CLI. The shared collector
//! container comes up once, before the first configuration, and goes down
//! after the last. Within a configuration, distro variants run strictly one
//! at a time (concurrent containers would contend for the measured cores):
//! service up, startup time recorded, in-container profiler started, load
//! generator run to completion, profiler artifact awaited, service down.
//! Artifacts land at the conventional paths and the accumulated run
//! durations feed the collector.

use crate::collector::ResultsCollector;
use crate::cores;
use crate::results::RunResult;
use overbench_core::{DistroConfig, NamingConventions, OverbenchError, Result, TestConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::sleep;

const NETWORK: &str = "overbench";
const COLLECTOR_NAME: &str = "overbench-collector";
const SERVICE_NAME: &str = "overbench-app";
const SERVICE_PORT: u16 = 8080;
const COLLECTOR_IMAGE: &str = "otel/opentelemetry-collector-contrib:latest";
const K6_IMAGE: &str = "grafana/k6:latest";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(60);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(250);
// The profiler flushes its artifact on its own cadence after load stops.
const PROFILER_ARTIFACT_TIMEOUT: Duration = Duration::from_secs(120);
const PROFILER_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct TestDriver {
    naming: NamingConventions,
    /// Host directory bind-mounted at /results in every container.
    results_mount: PathBuf,
    /// Host directory holding the load-generator scripts, mounted at /app.
    k6_scripts_dir: PathBuf,
    host_port: u16,
    run_durations: HashMap<String, i64>,
    started: bool,
}

impl TestDriver {
    pub fn new(results_dir: impl Into<PathBuf>, k6_scripts_dir: impl Into<PathBuf>) -> Self {
        let results_dir = results_dir.into();
        Self {
            naming: NamingConventions::new(&results_dir),
            results_mount: results_dir,
            k6_scripts_dir: k6_scripts_dir.into(),
            host_port: SERVICE_PORT,
            run_durations: HashMap::new(),
            started: false,
        }
    }

    /// Brings up the shared infrastructure: the network and the collector
    /// container. Called once before the first config; every config pass
    /// reuses the same collector.
    pub async fn start(&mut self) -> Result<()> {
        std::fs::create_dir_all(self.naming.local.root())?;
        // Docker rejects relative bind-mount sources.
        self.results_mount = self.naming.local.root().canonicalize()?;

        self.ensure_network().await?;
        self.start_collector().await?;
        self.started = true;
        Ok(())
    }

    /// Tears down the shared infrastructure, reverse start order. Failures
    /// only get logged so an earlier run error stays visible.
    pub async fn shutdown(&mut self) {
        if let Err(e) = self.docker(&["stop", COLLECTOR_NAME]).await {
            tracing::warn!("Failed to stop collector: {e}");
        }
        if let Err(e) = self.docker(&["network", "rm", NETWORK]).await {
            tracing::warn!("Failed to remove network: {e}");
        }
        self.started = false;
    }

    /// Runs every distro variant of `config` sequentially, then collects the
    /// artifacts into results. Any variant failure aborts the remaining
    /// variants; comparative results require all of them. [`TestDriver::start`]
    /// must have been called first.
    pub async fn run_config(&mut self, config: &TestConfig) -> Result<Vec<RunResult>> {
        if !self.started {
            return Err(OverbenchError::Container(
                "driver not started; call start() before run_config()".to_string(),
            ));
        }
        tracing::info!("Running test config '{}': {}", config.name, config.description);
        self.run_durations.clear();

        self.run_all_variants(config).await?;

        ResultsCollector::new(&self.naming.local, &self.run_durations).collect(config)
    }

    async fn run_all_variants(&mut self, config: &TestConfig) -> Result<()> {
        for distro in config.distro_configs.clone() {
            tracing::info!(
                "Running distro config '{}': {} ({})",
                distro.name,
                distro.description,
                config.name
            );
            self.run_app_once(config, &distro).await?;
        }
        Ok(())
    }

    async fn run_app_once(&mut self, config: &TestConfig, distro: &DistroConfig) -> Result<()> {
        let run_args = service_run_args(distro, &self.results_mount, self.host_port);
        let start = Instant::now();
        self.docker_owned(&run_args).await?;

        let startup = self.wait_for_health(start).await;
        if startup.is_err() {
            let _ = self.docker(&["stop", SERVICE_NAME]).await;
        }
        let startup_ms = startup?;
        std::fs::write(
            self.naming.local.startup_duration_file(distro),
            startup_ms.to_string(),
        )?;
        tracing::info!("Service '{}' up after {startup_ms}ms", distro.name);

        let test_start = Instant::now();
        self.start_profiler(distro).await?;

        let k6_args = k6_run_args(config, distro, &self.naming, &self.results_mount, &self.k6_scripts_dir);
        let load_result = self.docker_owned(&k6_args).await;

        let run_duration_ms = test_start.elapsed().as_millis() as i64;
        self.run_durations
            .insert(distro.name.clone(), run_duration_ms);

        // The profiler runs detached inside the service container; stopping
        // the service before its artifact lands would kill it mid-write and
        // leave the collector without its input.
        if load_result.is_ok() {
            let metrics_file = self.naming.local.performance_metrics_file(distro);
            if wait_for_file(&metrics_file, PROFILER_ARTIFACT_TIMEOUT, PROFILER_POLL_INTERVAL).await
            {
                tracing::info!("Profiler artifact {} present", metrics_file.display());
            } else {
                tracing::warn!(
                    "Profiler artifact {} still absent after {PROFILER_ARTIFACT_TIMEOUT:?}",
                    metrics_file.display()
                );
            }
        }

        let stop_result = self.docker(&["stop", SERVICE_NAME]).await;
        load_result?;
        stop_result?;
        Ok(())
    }

    async fn ensure_network(&self) -> Result<()> {
        // Inspect exits non-zero when the network is absent; the exit code is
        // stable across docker versions and locales where stderr text is not.
        let inspect = Command::new("docker")
            .args(["network", "inspect", NETWORK])
            .output()
            .await?;
        if inspect.status.success() {
            return Ok(());
        }
        self.docker(&["network", "create", NETWORK]).await
    }

    async fn start_collector(&self) -> Result<()> {
        let cores = cores::non_application_cores();
        self.docker(&[
            "run",
            "-d",
            "--rm",
            "--name",
            COLLECTOR_NAME,
            "--network",
            NETWORK,
            "--network-alias",
            "collector",
            "--cpuset-cpus",
            &cores,
            COLLECTOR_IMAGE,
        ])
        .await
    }

    /// Kicks off the in-container profiler; it samples the service process
    /// and writes the performance-metrics artifact under /results.
    async fn start_profiler(&self, distro: &DistroConfig) -> Result<()> {
        let metrics_file = self.naming.container.performance_metrics_file_name(distro);
        let results_root = self.naming.container.root().display().to_string();
        self.docker(&[
            "exec",
            "-d",
            SERVICE_NAME,
            "sh",
            "executeProfiler.sh",
            &metrics_file,
            &results_root,
        ])
        .await
    }

    async fn wait_for_health(&self, started: Instant) -> Result<i64> {
        let url = format!("http://localhost:{}/health-check", self.host_port);
        while started.elapsed() < STARTUP_TIMEOUT {
            match reqwest::get(&url).await {
                Ok(response) if response.status().is_success() => {
                    return Ok(started.elapsed().as_millis() as i64);
                }
                Ok(_) | Err(_) => sleep(HEALTH_POLL_INTERVAL).await,
            }
        }
        Err(OverbenchError::Container(format!(
            "service did not become healthy within {STARTUP_TIMEOUT:?}"
        )))
    }

    async fn docker(&self, args: &[&str]) -> Result<()> {
        let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        self.docker_owned(&owned).await
    }

    async fn docker_owned(&self, args: &[String]) -> Result<()> {
        tracing::debug!("docker {}", args.join(" "));
        let output = Command::new("docker").args(args).output().await?;
        if !output.status.success() {
            return Err(OverbenchError::Container(format!(
                "docker {} failed: {}",
                args.first().map(String::as_str).unwrap_or(""),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// Polls until `path` exists or `timeout` elapses. Returns whether the file
/// showed up.
async fn wait_for_file(path: &Path, timeout: Duration, poll: Duration) -> bool {
    let started = Instant::now();
    loop {
        if path.exists() {
            return true;
        }
        if started.elapsed() >= timeout {
            return false;
        }
        sleep(poll).await;
    }
}

fn service_run_args(distro: &DistroConfig, results_mount: &Path, host_port: u16) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "run".into(),
        "-d".into(),
        "--rm".into(),
        "--name".into(),
        SERVICE_NAME.into(),
        "--network".into(),
        NETWORK.into(),
        "--network-alias".into(),
        "backend".into(),
        "--cpuset-cpus".into(),
        cores::application_cores(),
        "-p".into(),
        format!("{host_port}:{SERVICE_PORT}"),
        "-v".into(),
        format!("{}:/results", results_mount.display()),
        "-e".into(),
        format!("TEST_NAME={}", distro.name),
    ];
    for (key, value) in &distro.env_overrides {
        args.push("-e".into());
        args.push(format!("{key}={value}"));
    }
    if distro.instrument {
        for (key, value) in [
            ("DO_INSTRUMENT", "true"),
            ("OTEL_TRACES_EXPORTER", "otlp"),
            ("OTEL_EXPORTER_OTLP_PROTOCOL", "http/protobuf"),
            ("OTEL_METRICS_EXPORTER", "none"),
            ("OTEL_METRIC_EXPORT_INTERVAL", "60000"),
            ("OTEL_EXPORTER_OTLP_INSECURE", "true"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4318"),
            ("OTEL_RESOURCE_ATTRIBUTES", "service.name=requests_server"),
        ] {
            args.push("-e".into());
            args.push(format!("{key}={value}"));
        }
    }
    args.push(distro.image.clone());
    args
}

fn k6_run_args(
    config: &TestConfig,
    distro: &DistroConfig,
    naming: &NamingConventions,
    results_mount: &Path,
    k6_scripts_dir: &Path,
) -> Vec<String> {
    vec![
        "run".into(),
        "--rm".into(),
        "--network".into(),
        NETWORK.into(),
        "--cpuset-cpus".into(),
        cores::non_application_cores(),
        "-v".into(),
        format!("{}:/app", k6_scripts_dir.display()),
        "-v".into(),
        format!("{}:/results", results_mount.display()),
        K6_IMAGE.into(),
        "run".into(),
        "--vus".into(),
        config.concurrent_connections.to_string(),
        "--duration".into(),
        config.duration.clone(),
        "--rps".into(),
        config.max_request_rate.to_string(),
        "--summary-export".into(),
        naming.container.k6_results(distro).display().to_string(),
        "--summary-trend-stats".into(),
        "avg,p(0),p(50),p(90),p(99),p(100),count".into(),
        "/app/performanceTest.js".into(),
    ]
}
