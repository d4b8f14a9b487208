// Test helpers are intentionally partially used
#![allow(dead_code)]

use metrics_demo_api::domain::MetricsPtr;
use metrics_demo_api::{build_router, create_prom_metrics, AppConfig, SimulationConfig};
use reqwest::Client;
use std::time::Duration;
use tokio::net::TcpListener;

// ============================================================================
// Test Setup
// ============================================================================

/// Configuration with short simulated delays so tests run quickly.
pub fn fast_config() -> AppConfig {
    // ---
    AppConfig {
        simulation: SimulationConfig {
            data_delay: Duration::ZERO..=Duration::from_millis(5),
            slow_delay: Duration::ZERO..=Duration::from_millis(10),
            error_rate: 0.3,
        },
        ..AppConfig::default()
    }
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
    /// Metrics backing this server; never shared with another server.
    pub metrics: MetricsPtr,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        Self::with_config(fast_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        // ---
        let metrics = create_prom_metrics(false).expect("Should be able to create metrics");
        Self::with_metrics(config, metrics).await
    }

    pub async fn with_metrics(config: AppConfig, metrics: MetricsPtr) -> Self {
        // --

        let app = build_router(&config, metrics.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = Client::new();

        Self {
            addr,
            client,
            metrics,
        }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        // ---
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap_or_else(|err| panic!("GET {path} failed: {err}"))
    }

    /// Scrape `/metrics` over HTTP.
    ///
    /// The scrape is itself an in-flight request while it renders, so the
    /// active gauge in the result includes it.
    pub async fn scrape(&self) -> String {
        // ---
        let res = self.get("/metrics").await;
        assert!(res.status().is_success());
        res.text().await.unwrap()
    }

    /// Render metrics in-process, without generating a request.
    pub fn snapshot(&self) -> String {
        self.metrics.render().unwrap()
    }
}

/// Value of the exposition line whose series (name plus labels) is exactly `series`.
pub fn sample(body: &str, series: &str) -> Option<f64> {
    // ---
    body.lines()
        .filter_map(|line| line.strip_prefix(series))
        .filter_map(|rest| rest.strip_prefix(' '))
        .find_map(|value| value.trim().parse().ok())
}
