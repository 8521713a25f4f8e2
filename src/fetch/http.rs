//! Static strategy: plain HTTP GET with revalidation.
//!
//! Requests carry `Cache-Control: max-age=<revalidate>` and successful bodies
//! are kept per URL for the same interval, so a seed page is downloaded at
//! most once per revalidation period no matter how often the aggregation cache
//! refreshes.

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument};
use url::Url;

use super::Fetcher;
use crate::error::{ConfigError, FetchError};

#[derive(Debug, Clone)]
struct CachedDocument {
    body: String,
    fetched_at: Instant,
}

/// HTTP fetcher backed by one shared [`reqwest::Client`].
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    revalidate: Duration,
    documents: Mutex<HashMap<String, CachedDocument>>,
}

impl HttpFetcher {
    /// Build a fetcher whose requests identify as `user_agent`, give up after
    /// `timeout`, and are reused for `revalidate`. A zero `revalidate`
    /// disables document reuse.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the TLS backend cannot be set up.
    pub fn new(user_agent: &str, timeout: Duration, revalidate: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self {
            client,
            timeout,
            revalidate,
            documents: Mutex::new(HashMap::new()),
        })
    }

    async fn cached(&self, url: &str) -> Option<String> {
        if self.revalidate.is_zero() {
            return None;
        }
        let documents = self.documents.lock().await;
        documents
            .get(url)
            .filter(|doc| doc.fetched_at.elapsed() < self.revalidate)
            .map(|doc| doc.body.clone())
    }

    fn transport(&self, url: &Url, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                after: self.timeout,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        if let Some(body) = self.cached(url.as_str()).await {
            debug!(bytes = body.len(), "Serving document within revalidation window");
            return Ok(body);
        }

        let t0 = std::time::Instant::now();
        let resp = self
            .client
            .get(url.clone())
            .header(CACHE_CONTROL, format!("max-age={}", self.revalidate.as_secs()))
            .send()
            .await
            .map_err(|e| self.transport(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| self.transport(url, e))?;
        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched document"
        );

        if !self.revalidate.is_zero() {
            self.documents.lock().await.insert(
                url.to_string(),
                CachedDocument {
                    body: body.clone(),
                    fetched_at: Instant::now(),
                },
            );
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const UA: &str = "khanhhoa-news-test/1.0";

    fn fetcher(revalidate: Duration) -> HttpFetcher {
        HttpFetcher::new(UA, Duration::from_secs(5), revalidate).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_with_revalidation_hint() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/tp-nha-trang.html")
                .header("cache-control", "max-age=3600")
                .header("user-agent", UA);
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html><body>Nha Trang</body></html>");
        });

        let url = Url::parse(&server.url("/tp-nha-trang.html")).unwrap();
        let body = fetcher(Duration::from_secs(3600)).fetch(&url).await.unwrap();

        mock.assert();
        assert_eq!(body, "<html><body>Nha Trang</body></html>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(503);
        });

        let url = Url::parse(&server.url("/gone")).unwrap();
        let err = fetcher(Duration::from_secs(3600)).fetch(&url).await.unwrap_err();

        mock.assert();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_document_reused_within_revalidation_window() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/list");
            then.status(200).body("cards");
        });

        let f = fetcher(Duration::from_secs(3600));
        let url = Url::parse(&server.url("/list")).unwrap();
        assert_eq!(f.fetch(&url).await.unwrap(), "cards");
        assert_eq!(f.fetch(&url).await.unwrap(), "cards");

        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_revalidate_always_refetches() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/list");
            then.status(200).body("cards");
        });

        let f = fetcher(Duration::ZERO);
        let url = Url::parse(&server.url("/list")).unwrap();
        f.fetch(&url).await.unwrap();
        f.fetch(&url).await.unwrap();

        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_status_is_not_cached() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(500);
        });

        let f = fetcher(Duration::from_secs(3600));
        let url = Url::parse(&server.url("/flaky")).unwrap();
        assert!(f.fetch(&url).await.is_err());
        assert!(f.fetch(&url).await.is_err());

        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let err = fetcher(Duration::ZERO).fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
