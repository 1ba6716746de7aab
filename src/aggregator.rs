// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Client for the news aggregator HTTP API.
//!
//! The aggregator is the external system of record for news sources. The
//! operator only relies on three endpoints:
//!
//! - `POST {base}/sources` with `{"url": ...}` registers a source (idempotent)
//! - `DELETE {base}/sources` with `{"name": ...}` removes a source
//! - `GET {base}/news?sources=..&keywords=..&startDate=..&endDate=..` runs a query
//!
//! # Example
//!
//! ```rust,no_run
//! use news_operator::aggregator::AggregatorClient;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = AggregatorClient::new("http://aggregator:8080", Duration::from_secs(10))?;
//! client.add_source("https://feeds.bbci.co.uk/news/rss.xml").await?;
//! # Ok(())
//! # }
//! ```

use crate::constants::{AGGREGATOR_NEWS_PATH, AGGREGATOR_SOURCES_PATH};
use crate::errors::AggregatorError;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// A single article returned by the news query endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub source_name: String,
}

#[derive(Debug, Serialize)]
struct AddSourceRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteSourceRequest<'a> {
    name: &'a str,
}

/// HTTP client bound to one aggregator base URL.
#[derive(Debug, Clone)]
pub struct AggregatorClient {
    http: HttpClient,
    base_url: Url,
}

impl AggregatorClient {
    /// Build a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL or the
    /// underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AggregatorError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| AggregatorError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Self::with_http_client(http, base_url)
    }

    /// Build a client around an existing `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL.
    pub fn with_http_client(http: HttpClient, base_url: &str) -> Result<Self, AggregatorError> {
        let mut base_url = Url::parse(base_url).map_err(|source| AggregatorError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, AggregatorError> {
        self.base_url
            .join(path)
            .map_err(|source| AggregatorError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    /// URL of the news query endpoint, without query parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn news_endpoint(&self) -> Result<Url, AggregatorError> {
        self.endpoint(AGGREGATOR_NEWS_PATH)
    }

    /// Register a source. The aggregator treats an existing source as success.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx response.
    pub async fn add_source(&self, source_url: &str) -> Result<(), AggregatorError> {
        let url = self.endpoint(AGGREGATOR_SOURCES_PATH)?;
        self.send(Method::POST, url, &AddSourceRequest { url: source_url })
            .await
            .map(|_| ())
    }

    /// Remove a source by name.
    ///
    /// A 404 means the source is already gone and counts as success, so the
    /// call stays safe to repeat.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or any other non-2xx response.
    pub async fn delete_source(&self, name: &str) -> Result<(), AggregatorError> {
        let url = self.endpoint(AGGREGATOR_SOURCES_PATH)?;
        match self
            .send(Method::DELETE, url, &DeleteSourceRequest { name })
            .await
        {
            Ok(_) => Ok(()),
            Err(AggregatorError::Status { status: 404, url, .. }) => {
                info!(source = %name, url = %url, "Source already absent from aggregator");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Run a news query. `url` is a fully built query URL (see
    /// [`create_url`](crate::reconcilers::hotnews::create_url)).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, any status other than 200, or
    /// a body that is not a JSON array of articles.
    pub async fn fetch_news(&self, url: &Url) -> Result<Vec<Article>, AggregatorError> {
        debug!(url = %url, "Querying news aggregator");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| AggregatorError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(url = %url, status = %status, body = %body, "News query failed");
            return Err(AggregatorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let articles: Vec<Article> =
            response
                .json()
                .await
                .map_err(|source| AggregatorError::Decode {
                    url: url.to_string(),
                    source,
                })?;

        debug!(url = %url, articles = articles.len(), "News query succeeded");
        Ok(articles)
    }

    async fn send<T: Serialize + std::fmt::Debug>(
        &self,
        method: Method,
        url: Url,
        body: &T,
    ) -> Result<String, AggregatorError> {
        info!(method = %method, url = %url, body = ?body, "HTTP request to news aggregator");

        let response = self
            .http
            .request(method.clone(), url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| AggregatorError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!(
                method = %method,
                url = %url,
                status = %status,
                error = %text,
                "HTTP request to news aggregator failed"
            );
            return Err(AggregatorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(method = %method, url = %url, status = %status, "HTTP request to news aggregator succeeded");
        Ok(text)
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod aggregator_tests;
