use reqwest::Client;
use std::time::Duration;

/// Shared outbound client settings; `timeout_secs` bounds the whole request.
pub fn build_provider_client_with_timeout(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|error| {
            tracing::warn!(%error, "falling back to default HTTP client settings");
            Client::new()
        })
}
