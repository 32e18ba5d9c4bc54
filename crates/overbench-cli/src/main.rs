use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use overbench_core::{DistroConfig, NamingConvention, TestConfig};
use overbench_harness::persist::{ReportPersister, ResultsPersister, TextPersister};
use overbench_harness::{ResultsCollector, TestDriver};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "overbench")]
#[command(about = "Overbench - instrumentation overhead measurement harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in test configs and distro variants
    Configs,

    /// Drive containers for one or all test configs, then collect and report
    Run {
        /// Test config name; runs all built-in configs when omitted
        #[arg(short, long)]
        config: Option<String>,

        /// Directory artifacts are written to and read from
        #[arg(long, default_value = "./results")]
        results_dir: PathBuf,

        /// Directory with the load-generator scripts
        #[arg(long, default_value = "./k6")]
        k6_dir: PathBuf,
    },

    /// Aggregate already-produced artifacts for a config and report
    Collect {
        /// Test config name
        #[arg(short, long)]
        config: String,

        /// Directory artifacts are read from
        #[arg(long, default_value = "./results")]
        results_dir: PathBuf,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Configs => cmd_configs(),
        Commands::Run {
            config,
            results_dir,
            k6_dir,
        } => cmd_run(config.as_deref(), &results_dir, &k6_dir).await,
        Commands::Collect {
            config,
            results_dir,
            output,
        } => cmd_collect(&config, &results_dir, &output),
    }
}

fn find_config(name: &str) -> Result<TestConfig> {
    match TestConfig::builtin().into_iter().find(|c| c.name == name) {
        Some(config) => Ok(config),
        None => {
            let known: Vec<String> = TestConfig::builtin().into_iter().map(|c| c.name).collect();
            bail!("Unknown test config '{}'. Known configs: {}", name, known.join(", "))
        }
    }
}

fn cmd_configs() -> Result<()> {
    println!();
    println!("Test configs:");
    println!("{:-<70}", "");
    for config in TestConfig::builtin() {
        println!(
            "  {:<14} {:<45} {} vus, {}",
            config.name, config.description, config.concurrent_connections, config.duration
        );
    }
    println!();
    println!("Distro variants:");
    println!("{:-<70}", "");
    for distro in DistroConfig::all() {
        println!("  {:<14} {}", distro.name, distro.description);
    }
    println!();
    Ok(())
}

async fn cmd_run(config_name: Option<&str>, results_dir: &PathBuf, k6_dir: &PathBuf) -> Result<()> {
    let configs = match config_name {
        Some(name) => vec![find_config(name)?],
        None => TestConfig::builtin(),
    };

    // One driver for the whole run: the collector container and network come
    // up before the first config and go down after the last.
    let mut driver = TestDriver::new(results_dir, k6_dir);
    driver.start().await?;
    let outcome = run_configs(&mut driver, configs, results_dir).await;
    driver.shutdown().await;
    outcome
}

async fn run_configs(
    driver: &mut TestDriver,
    configs: Vec<TestConfig>,
    results_dir: &PathBuf,
) -> Result<()> {
    for config in configs {
        let results = driver.run_config(&config).await?;
        ReportPersister::new(config, results_dir).write(&results)?;
    }
    Ok(())
}

fn cmd_collect(config_name: &str, results_dir: &PathBuf, output: &str) -> Result<()> {
    let config = find_config(config_name)?;
    let naming = NamingConvention::new(results_dir);
    // Wall-clock durations are only known to the driver; collected-after-the-
    // fact passes report them as N/A.
    let run_durations = HashMap::new();
    let results = ResultsCollector::new(&naming, &run_durations).collect(&config)?;

    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => {
            TextPersister::new(std::io::stdout(), config).write(&results)?;
        }
    }
    Ok(())
}
