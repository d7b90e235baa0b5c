//! Shared HTTP client for all provider adapters.
//!
//! A single `reqwest::Client` is reused across every request so that
//! connections are pooled, DNS lookups are minimized, and TLS handshakes are
//! reused where possible. The client carries a generous outer timeout; the
//! gateway enforces the real per-attempt deadline.

use lazy_static::lazy_static;
use std::time::Duration;

lazy_static! {
    static ref SHARED_HTTP_CLIENT: reqwest::Client = reqwest::ClientBuilder::new()
        // Keep idle connections alive between debate phases
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        // Outer safety net only; the gateway applies the per-attempt timeout
        .timeout(Duration::from_secs(300))
        .build()
        .expect("Failed to build HTTP client");
}

/// Get the shared HTTP client used by every provider adapter.
pub fn get_shared_http_client() -> reqwest::Client {
    SHARED_HTTP_CLIENT.clone()
}
