//! Standard file naming for artifacts shared between containers and the
//! harness. Consolidating the naming in one place keeps the service, the
//! load generator, and the collector agreeing on where results live.

use crate::distro::DistroConfig;
use std::path::{Path, PathBuf};

const PERF_METRICS_PREFIX: &str = "performance-metrics-";

/// Artifact paths under a single results directory.
#[derive(Debug, Clone)]
pub struct NamingConvention {
    dir: PathBuf,
}

impl NamingConvention {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the load-generator summary json for a variant run.
    pub fn k6_results(&self, distro: &DistroConfig) -> PathBuf {
        self.dir.join(format!("k6_out_{}.json", distro.name))
    }

    /// Location of the resource-profiler output for a variant run.
    pub fn performance_metrics_file(&self, distro: &DistroConfig) -> PathBuf {
        self.dir.join(self.performance_metrics_file_name(distro))
    }

    /// Profiler output file name without the directory, for handing to the
    /// in-container profiler process.
    pub fn performance_metrics_file_name(&self, distro: &DistroConfig) -> String {
        format!("{}{}.json", PERF_METRICS_PREFIX, distro.name)
    }

    /// Location of the plain-text startup duration (ms) for a variant run.
    pub fn startup_duration_file(&self, distro: &DistroConfig) -> PathBuf {
        self.dir.join(format!("startup-time-{}.txt", distro.name))
    }

    pub fn root(&self) -> &Path {
        &self.dir
    }
}

/// The local and in-container naming conventions, paired.
#[derive(Debug, Clone)]
pub struct NamingConventions {
    pub container: NamingConvention,
    pub local: NamingConvention,
}

impl NamingConventions {
    pub fn new(local_dir: impl Into<PathBuf>) -> Self {
        Self {
            container: NamingConvention::new("/results"),
            local: NamingConvention::new(local_dir),
        }
    }
}

impl Default for NamingConventions {
    fn default() -> Self {
        Self::new("./results")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distro() -> DistroConfig {
        DistroConfig::new("none", "baseline", false, &[], "img")
    }

    #[test]
    fn test_artifact_paths() {
        let naming = NamingConvention::new("/tmp/results");
        let d = distro();
        assert_eq!(
            naming.k6_results(&d),
            PathBuf::from("/tmp/results/k6_out_none.json")
        );
        assert_eq!(
            naming.performance_metrics_file(&d),
            PathBuf::from("/tmp/results/performance-metrics-none.json")
        );
        assert_eq!(
            naming.startup_duration_file(&d),
            PathBuf::from("/tmp/results/startup-time-none.txt")
        );
    }

    #[test]
    fn test_container_and_local_roots() {
        let conventions = NamingConventions::default();
        assert_eq!(conventions.container.root(), Path::new("/results"));
        assert_eq!(conventions.local.root(), Path::new("./results"));
    }
}
