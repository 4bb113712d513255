//! Session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for one RPC session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Default per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Capacity of the outgoing frame queue shared by all callers.
    #[serde(default = "default_write_buffer")]
    pub write_buffer: usize,
    /// Maximum incoming frame size accepted by the WebSocket transport.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Backoff used by `connect_with_backoff`.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

fn default_request_timeout_ms() -> u64 { 30_000 }
fn default_write_buffer() -> usize { 1_024 }
fn default_max_frame_bytes() -> usize { 16 * 1024 * 1024 }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            write_buffer: default_write_buffer(),
            max_frame_bytes: default_max_frame_bytes(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Override the default request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }
}

/// Exponential backoff for establishing a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Attempts after the first one.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial backoff in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Cap on the backoff in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_retries() -> u32 { 5 }
fn default_initial_backoff_ms() -> u64 { 500 }
fn default_max_backoff_ms() -> u64 { 60_000 }
fn default_multiplier() -> f64 { 2.0 }

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            multiplier: default_multiplier(),
        }
    }
}
