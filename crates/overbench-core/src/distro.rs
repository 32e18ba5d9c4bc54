use serde::{Deserialize, Serialize};

/// One named configuration of the service under test: an image plus the
/// environment-variable overrides that select (or disable) the
/// auto-instrumentation distribution inside it.
///
/// Variants are plain constructed records, tagged by name, so new ones can be
/// added (or loaded from elsewhere) without touching any match arms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistroConfig {
    pub name: String,
    pub description: String,
    /// Whether the run should be started with instrumentation enabled.
    pub instrument: bool,
    /// Ordered so generated container commands are deterministic.
    pub env_overrides: Vec<(String, String)>,
    pub image: String,
}

impl DistroConfig {
    pub fn new(
        name: &str,
        description: &str,
        instrument: bool,
        env_overrides: &[(&str, &str)],
        image: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            instrument,
            env_overrides: env_overrides
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            image: image.to_string(),
        }
    }

    /// The stock variant table compared by the built-in test configs.
    pub fn all() -> Vec<DistroConfig> {
        vec![
            DistroConfig::new(
                "none",
                "no distro at all",
                false,
                &[],
                "performance-test/simple-requests-service",
            ),
            DistroConfig::new(
                "instrumented",
                "distro with per-service metrics disabled, 100% sampling",
                true,
                &[
                    ("OTEL_TRACES_SAMPLER", "traceidratio"),
                    ("OTEL_TRACES_SAMPLER_ARG", "1"),
                    ("OTEL_PYTHON_DISTRO", "aws_distro"),
                    ("OTEL_PYTHON_CONFIGURATOR", "aws_configurator"),
                ],
                "performance-test/simple-requests-service",
            ),
            DistroConfig::new(
                "app-signals",
                "distro with per-service metrics enabled, 100% sampling",
                true,
                &[
                    ("OTEL_TRACES_SAMPLER", "traceidratio"),
                    ("OTEL_TRACES_SAMPLER_ARG", "1"),
                    ("OTEL_PYTHON_DISTRO", "aws_distro"),
                    ("OTEL_PYTHON_CONFIGURATOR", "aws_configurator"),
                    ("OTEL_AWS_APPLICATION_SIGNALS_ENABLED", "true"),
                    (
                        "OTEL_AWS_APPLICATION_SIGNALS_EXPORTER_ENDPOINT",
                        "http://collector:4318/v1/metrics",
                    ),
                ],
                "performance-test/simple-requests-service",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_table() {
        let all = DistroConfig::all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "none");
        assert!(!all[0].instrument);
        assert!(all[0].env_overrides.is_empty());
        assert!(all[2].instrument);
        assert!(all[2]
            .env_overrides
            .iter()
            .any(|(k, _)| k == "OTEL_AWS_APPLICATION_SIGNALS_ENABLED"));
    }
}
