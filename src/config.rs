// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Every setting has a default; values that parse but are out of range are
//! treated as deployment errors rather than recoverable runtime conditions.

use anyhow::{ensure, Result};
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails validation for the
/// given environment variable.
macro_rules! assert_invalid_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Invalid configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub metrics: metrics::MetricsConfig,
    pub simulation: simulation::SimulationConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any configuration value is out of range.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            server: server::ServerConfig::from_env(),
            metrics: metrics::MetricsConfig::from_env(),
            simulation: simulation::SimulationConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---

    /// Listener configuration.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Socket address to bind. Defaults to `0.0.0.0:8000`.
        pub bind_addr: String,
    }

    impl ServerConfig {
        pub fn from_env() -> Self {
            // ---
            let bind_addr =
                std::env::var("APP_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
            Self { bind_addr }
        }
    }

    impl Default for ServerConfig {
        fn default() -> Self {
            Self {
                bind_addr: "0.0.0.0:8000".to_string(),
            }
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Metrics configuration
// ============================================================

mod metrics {
    // ---
    use super::*;

    /// Which `Metrics` implementation backs the service.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum MetricsBackend {
        #[default]
        Prometheus,
        Noop,
    }

    impl FromStr for MetricsBackend {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "prom" | "prometheus" => Ok(MetricsBackend::Prometheus),
                "noop" => Ok(MetricsBackend::Noop),
                other => Err(anyhow::anyhow!("unknown metrics backend: {other}")),
            }
        }
    }

    /// Metrics-related configuration.
    #[derive(Debug, Clone)]
    pub struct MetricsConfig {
        /// Backend selected by `APP_METRICS_TYPE`. Defaults to Prometheus.
        pub backend: MetricsBackend,

        /// Whether to export process metrics (uptime, CPU, memory). Defaults to true.
        pub process_metrics: bool,

        /// Distinct raw paths of unmatched requests kept as `route` label
        /// values before further paths collapse into `__other__`. Defaults to 100.
        pub max_unmatched_routes: usize,
    }

    impl MetricsConfig {
        pub fn from_env() -> Self {
            // ---
            Self {
                backend: optional_env_parse!("APP_METRICS_TYPE", MetricsBackend, MetricsBackend::Prometheus),
                process_metrics: optional_env_parse!("APP_PROCESS_METRICS", bool, true),
                max_unmatched_routes: optional_env_parse!("APP_MAX_UNMATCHED_ROUTES", usize, 100),
            }
        }
    }

    impl Default for MetricsConfig {
        fn default() -> Self {
            Self {
                backend: MetricsBackend::Prometheus,
                process_metrics: true,
                max_unmatched_routes: 100,
            }
        }
    }
}
pub use metrics::{MetricsBackend, MetricsConfig};

// ============================================================
// Simulated workload configuration
// ============================================================

mod simulation {
    // ---
    use super::*;

    /// Tuning for the demo endpoints' artificial latency and failure rate.
    #[derive(Debug, Clone)]
    pub struct SimulationConfig {
        /// Processing delay of `/api/data`. Defaults to 10..=100 ms.
        pub data_delay: RangeInclusive<Duration>,

        /// Processing delay of `/api/slow`. Defaults to 500..=2000 ms.
        pub slow_delay: RangeInclusive<Duration>,

        /// Probability that `/api/error` fails. Defaults to 0.3.
        pub error_rate: f64,
    }

    impl SimulationConfig {
        /// Builds a [`SimulationConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if a delay range is inverted or the error rate
        /// lies outside `[0, 1]`.
        pub fn from_env() -> Result<Self> {
            // ---
            let data_min = optional_env_parse!("APP_DATA_DELAY_MIN_MS", u64, 10);
            let data_max = optional_env_parse!("APP_DATA_DELAY_MAX_MS", u64, 100);
            let slow_min = optional_env_parse!("APP_SLOW_DELAY_MIN_MS", u64, 500);
            let slow_max = optional_env_parse!("APP_SLOW_DELAY_MAX_MS", u64, 2000);
            let error_rate = optional_env_parse!("APP_ERROR_RATE", f64, 0.3);

            ensure!(
                data_min <= data_max,
                "Invalid configuration: APP_DATA_DELAY_MIN_MS ({data_min}) exceeds APP_DATA_DELAY_MAX_MS ({data_max})"
            );
            ensure!(
                slow_min <= slow_max,
                "Invalid configuration: APP_SLOW_DELAY_MIN_MS ({slow_min}) exceeds APP_SLOW_DELAY_MAX_MS ({slow_max})"
            );
            ensure!(
                (0.0..=1.0).contains(&error_rate),
                "Invalid configuration: APP_ERROR_RATE must be within [0, 1], got {error_rate}"
            );

            Ok(Self {
                data_delay: Duration::from_millis(data_min)..=Duration::from_millis(data_max),
                slow_delay: Duration::from_millis(slow_min)..=Duration::from_millis(slow_max),
                error_rate,
            })
        }
    }

    impl Default for SimulationConfig {
        fn default() -> Self {
            Self {
                data_delay: Duration::from_millis(10)..=Duration::from_millis(100),
                slow_delay: Duration::from_millis(500)..=Duration::from_millis(2000),
                error_rate: 0.3,
            }
        }
    }
}
pub use simulation::SimulationConfig;

// ============================================================
// Tests
// ============================================================
