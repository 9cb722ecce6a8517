//! HTTP client construction

use reqwest::blocking::Client;
use std::time::Duration;

/// Default timeout for a whole artifact transfer (5 minutes for large archives)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const USER_AGENT: &str = concat!("depman/", env!("CARGO_PKG_VERSION"));

/// Builds a blocking HTTP client with the given request timeout
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
