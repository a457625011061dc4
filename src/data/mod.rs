//! Upstream API clients, one module per data source.
//!
//! Each module keeps its wire types private and maps responses into `domain`
//! snapshot shapes. Pure mapping helpers are split from transport so they are
//! testable without network access.

pub mod bangumi;
pub mod bilibili;
pub mod github;
pub mod netease;
pub mod steam;

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::DEFAULT_USER_AGENT;
use crate::error::AppError;

/// Browser user agent for endpoints that reject obvious script clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the blocking HTTP client shared by one pipeline run.
pub fn build_client() -> Result<Client, AppError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|e| AppError::Network(format!("Failed to build HTTP client: {e}")))
}

/// Map a non-success response status into an `HttpStatus` error.
pub(crate) fn ensure_success(resp: &reqwest::blocking::Response) -> Result<(), AppError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(AppError::HttpStatus {
            status: status.as_u16(),
            url: resp.url().to_string(),
        })
    }
}
