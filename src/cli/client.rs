//! HTTP client for a running reviewer-assign server.

use anyhow::{Context, Result};
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::adapters::http::dto::{
    CreatePullRequestRequest, ErrorPayload, ErrorResponse, MergePullRequestRequest, PullRequestEnvelope,
    StatsResponse, TeamDto, TeamEnvelope,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Outcome of an API call that reached the server.
#[derive(Debug, Clone)]
pub enum ApiResponse<T> {
    Success(T),
    Failure { status: StatusCode, error: ErrorPayload },
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Status of a failed call, `None` on success.
    pub fn failure_status(&self) -> Option<StatusCode> {
        match self {
            Self::Success(_) => None,
            Self::Failure { status, .. } => Some(*status),
        }
    }

    /// Turn a failure into an error.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure { status, error } => {
                anyhow::bail!("server returned {status} {}: {}", error.code, error.message)
            }
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http_client: ReqwestClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(5))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn add_team(&self, team: &TeamDto) -> Result<ApiResponse<TeamEnvelope>> {
        self.post("/team/add", team).await
    }

    pub async fn create_pull_request(
        &self,
        id: &str,
        name: &str,
        author_id: &str,
    ) -> Result<ApiResponse<PullRequestEnvelope>> {
        let body = CreatePullRequestRequest {
            pull_request_id: id.to_string(),
            pull_request_name: name.to_string(),
            author_id: author_id.to_string(),
        };
        self.post("/pullRequest/create", &body).await
    }

    pub async fn merge_pull_request(&self, id: &str) -> Result<ApiResponse<PullRequestEnvelope>> {
        let body = MergePullRequestRequest {
            pull_request_id: id.to_string(),
        };
        self.post("/pullRequest/merge", &body).await
    }

    pub async fn assignment_stats(&self) -> Result<ApiResponse<StatsResponse>> {
        let url = format!("{}/stats/assignments", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
    let status = response.status();
    debug!(%status, url = %response.url(), "response received");

    if status.is_success() {
        let value = response
            .json::<T>()
            .await
            .context("Failed to decode response body")?;
        return Ok(ApiResponse::Success(value));
    }

    let text = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ErrorResponse>(&text)
        .map(|r| r.error)
        .unwrap_or_else(|_| ErrorPayload {
            code: "UNKNOWN".to_string(),
            message: text,
        });
    Ok(ApiResponse::Failure { status, error })
}
