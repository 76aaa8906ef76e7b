//! GitHub release creation
//!
//! One authenticated POST to `/repos/<repo>/releases`. A `201 Created`
//! response is success; anything else fails with the response body.

use crate::core::error::ReleaseError;
use crate::core::traits::{ReleaseNotifier, ReleaseRequest};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, USER_AGENT};
use secrecy::ExposeSecret;
use tracing::debug;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const GITHUB_ACCEPT: &str = "application/vnd.github.manifold-preview";
const CLIENT_USER_AGENT: &str = "package-release";

/// Release notifier for the GitHub REST API
#[derive(Debug, Clone)]
pub struct GithubReleaseNotifier {
    client: reqwest::Client,
    api_base: String,
}

impl Default for GithubReleaseNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubReleaseNotifier {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new(), GITHUB_API_BASE)
    }

    /// Use a custom client and API base URL (GitHub Enterprise, tests)
    pub fn with_client(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    pub fn releases_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/releases", self.api_base.trim_end_matches('/'), repo)
    }
}

#[async_trait]
impl ReleaseNotifier for GithubReleaseNotifier {
    async fn create_release(&self, request: &ReleaseRequest) -> Result<(), ReleaseError> {
        let url = self.releases_url(&request.repo);
        debug!(%url, tag = %request.payload.tag_name, "creating github release");

        let response = self
            .client
            .post(&url)
            .basic_auth(&request.username, Some(request.password.expose_secret()))
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&request.payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ReleaseError::NotifierRejected {
            status: status.as_u16(),
            body,
        })
    }
}
