//! HTTP client for the recommendation service.
//!
//! One request per call: no retries, no caching, no auth. Callers get a
//! typed [`ApiError`] back instead of a stuck loading state.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::model::{ErrorBody, RecommendRequest, RecommendResponse, Recommendation, SearchResult};

/// Page size the service assumes when the caller doesn't pick one.
pub const DEFAULT_PER_PAGE: u32 = 6;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /search?q=..`. Paging parameters are only sent when given.
    pub async fn search_songs(
        &self,
        query: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<Vec<SearchResult>, ApiError> {
        let mut params: Vec<(&str, String)> = vec![("q", query.to_string())];
        if let Some(p) = page {
            params.push(("page", p.to_string()));
        }
        if let Some(n) = per_page {
            params.push(("per_page", n.to_string()));
        }
        debug!("[api] GET /search q={:?} page={:?} per_page={:?}", query, page, per_page);

        let response = self
            .http
            .get(self.url("/search"))
            .query(&params)
            .send()
            .await?;
        decode(response).await
    }

    /// `POST /recommend` with a JSON body.
    pub async fn recommend_song(
        &self,
        song: &str,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<RecommendResponse, ApiError> {
        let body = RecommendRequest {
            song: song.to_string(),
            page: page.unwrap_or(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE),
        };
        debug!(
            "[api] POST /recommend song={:?} page={} per_page={}",
            body.song, body.page, body.per_page
        );

        let response = self
            .http
            .post(self.url("/recommend"))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    /// `GET /songs?page=..&per_page=..` — the default listing.
    pub async fn fetch_songs(
        &self,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<Vec<Recommendation>, ApiError> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
        debug!("[api] GET /songs page={} per_page={}", page, per_page);

        let response = self
            .http
            .get(self.url("/songs"))
            .query(&[("page", page), ("per_page", per_page)])
            .send()
            .await?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = error_message(status, &bytes);
        warn!("[api] {} {}", status.as_u16(), message);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let client = ApiClient::new(&ApiConfig {
            base_url: "http://127.0.0.1:5000/".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:5000");
        assert_eq!(client.url("/songs"), "http://127.0.0.1:5000/songs");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = ApiClient::new(&ApiConfig {
            base_url: "not a url".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap_err();
        assert_eq!(err, ApiError::InvalidBaseUrl("not a url".to_string()));
    }

    #[test]
    fn test_error_message_prefers_service_body() {
        let msg = error_message(
            StatusCode::NOT_FOUND,
            br#"{"error":"Song 'Nope' not found"}"#,
        );
        assert_eq!(msg, "Song 'Nope' not found");
        let msg = error_message(StatusCode::BAD_GATEWAY, b"<html>");
        assert_eq!(msg, "Bad Gateway");
    }
}
