use crate::distro::DistroConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_REQUEST_RATE: u32 = 0; // unlimited
const DEFAULT_CONCURRENT_CONNECTIONS: u32 = 5;
const DEFAULT_DURATION: &str = "10s";

/// One named load scenario, applied to every distro variant in turn so the
/// variants can be compared under identical conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    pub name: String,
    pub description: String,
    pub distro_configs: Vec<DistroConfig>,
    /// Requests per second cap for the load generator; 0 means unlimited.
    pub max_request_rate: u32,
    pub concurrent_connections: u32,
    /// Load-generator duration string, e.g. "10s" or "5m".
    pub duration: String,
    pub warmup_seconds: u32,
}

impl TestConfig {
    pub fn builder() -> TestConfigBuilder {
        TestConfigBuilder::default()
    }

    /// The stock scenarios. `DURATION` and `CONCURRENCY` environment
    /// variables override the defaults for all of them, so CI can stretch a
    /// run without a rebuild.
    pub fn builtin() -> Vec<TestConfig> {
        vec![
            TestConfig::builder()
                .name("all-100-tps")
                .description("Compares all distro configs (100TPS test)")
                .distro_configs(DistroConfig::all())
                .warmup_seconds(10)
                .max_request_rate(100)
                .duration_env(std::env::var("DURATION").ok())
                .concurrent_connections_env(std::env::var("CONCURRENCY").ok())
                .build(),
            TestConfig::builder()
                .name("all-800-tps")
                .description("Compares all distro configs (800TPS test)")
                .distro_configs(DistroConfig::all())
                .warmup_seconds(10)
                .max_request_rate(800)
                .duration_env(std::env::var("DURATION").ok())
                .concurrent_connections_env(std::env::var("CONCURRENCY").ok())
                .build(),
        ]
    }
}

#[derive(Debug, Default)]
pub struct TestConfigBuilder {
    name: String,
    description: String,
    distro_configs: Vec<DistroConfig>,
    max_request_rate: Option<u32>,
    concurrent_connections: Option<u32>,
    duration: Option<String>,
    warmup_seconds: u32,
}

impl TestConfigBuilder {
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn distro_configs(mut self, distro_configs: Vec<DistroConfig>) -> Self {
        self.distro_configs = distro_configs;
        self
    }

    pub fn max_request_rate(mut self, rate: u32) -> Self {
        self.max_request_rate = Some(rate);
        self
    }

    pub fn concurrent_connections(mut self, connections: u32) -> Self {
        self.concurrent_connections = Some(connections);
        self
    }

    /// Applies a duration override if one is set and non-empty.
    pub fn duration_env(mut self, duration: Option<String>) -> Self {
        if let Some(d) = duration.filter(|d| !d.is_empty()) {
            self.duration = Some(d);
        }
        self
    }

    /// Applies a connection-count override if one parses as an integer.
    pub fn concurrent_connections_env(mut self, connections: Option<String>) -> Self {
        if let Some(c) = connections.and_then(|c| c.parse().ok()) {
            self.concurrent_connections = Some(c);
        }
        self
    }

    pub fn warmup_seconds(mut self, warmup_seconds: u32) -> Self {
        self.warmup_seconds = warmup_seconds;
        self
    }

    pub fn build(self) -> TestConfig {
        TestConfig {
            name: self.name,
            description: self.description,
            distro_configs: self.distro_configs,
            max_request_rate: self.max_request_rate.unwrap_or(DEFAULT_MAX_REQUEST_RATE),
            concurrent_connections: self
                .concurrent_connections
                .unwrap_or(DEFAULT_CONCURRENT_CONNECTIONS),
            duration: self.duration.unwrap_or_else(|| DEFAULT_DURATION.to_string()),
            warmup_seconds: self.warmup_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = TestConfig::builder().name("t").build();
        assert_eq!(config.max_request_rate, 0);
        assert_eq!(config.concurrent_connections, 5);
        assert_eq!(config.duration, "10s");
        assert_eq!(config.warmup_seconds, 0);
    }

    #[test]
    fn test_env_overrides_ignore_empty_and_unparsable() {
        let config = TestConfig::builder()
            .name("t")
            .duration_env(Some(String::new()))
            .concurrent_connections_env(Some("not-a-number".to_string()))
            .build();
        assert_eq!(config.duration, "10s");
        assert_eq!(config.concurrent_connections, 5);

        let config = TestConfig::builder()
            .name("t")
            .duration_env(Some("5m".to_string()))
            .concurrent_connections_env(Some("12".to_string()))
            .build();
        assert_eq!(config.duration, "5m");
        assert_eq!(config.concurrent_connections, 12);
    }

    #[test]
    fn test_builtin_configs_cover_all_variants() {
        let configs = TestConfig::builtin();
        assert_eq!(configs.len(), 2);
        for config in &configs {
            assert_eq!(config.distro_configs.len(), DistroConfig::all().len());
        }
        assert_eq!(configs[0].name, "all-100-tps");
        assert_eq!(configs[1].name, "all-800-tps");
    }
}
