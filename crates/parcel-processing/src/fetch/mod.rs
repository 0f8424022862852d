//! Document fetching
//!
//! Retrieves the raw bytes of a submitted document. A fetch is a single attempt: any
//! failure is returned to the caller, which decides whether to resubmit.

mod url_guard;

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use parcel_core::FetchConfig;
use thiserror::Error;

pub use url_guard::validate_document_url;

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid document URL: {0}")]
    InvalidUrl(String),

    #[error("Document URL not allowed: {0}")]
    Blocked(String),

    #[error("HTTP {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Document too large: {size} bytes (max: {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("Document is empty")]
    Empty,
}

/// Retrieves document bytes from a dereferenceable location.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Fetches documents over HTTP(S).
pub struct HttpDocumentFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpDocumentFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            // Redirects are followed in `fetch` so every hop passes the URL guard.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn validate(&self, url: &str) -> Result<reqwest::Url, FetchError> {
        validate_document_url(
            url,
            self.config.allow_private_hosts,
            self.config.allowlist.as_deref(),
        )
        .await
    }

    fn map_request_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.config.timeout)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let mut url = self.validate(url).await?;

        let start = std::time::Instant::now();
        let max = self.config.max_document_size_bytes;

        let mut redirects = 0;
        let mut response = loop {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| self.map_request_error(e))?;

            if !response.status().is_redirection() {
                break response;
            }
            let location = response.headers().get(reqwest::header::LOCATION).cloned();
            let Some(location) = location else {
                break response;
            };

            redirects += 1;
            if redirects > MAX_REDIRECTS {
                return Err(FetchError::Network(format!(
                    "too many redirects (max: {})",
                    MAX_REDIRECTS
                )));
            }

            let location = location
                .to_str()
                .map_err(|_| FetchError::InvalidUrl("redirect location is not valid UTF-8".to_string()))?;
            let next = url
                .join(location)
                .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", location, e)))?;

            tracing::debug!(from = %url, to = %next, "Following document redirect");
            url = self.validate(next.as_str()).await?;
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        if let Some(length) = response.content_length() {
            if length as usize > max {
                return Err(FetchError::TooLarge {
                    size: length as usize,
                    max,
                });
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_request_error(e))?
        {
            if body.len() + chunk.len() > max {
                return Err(FetchError::TooLarge {
                    size: body.len() + chunk.len(),
                    max,
                });
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            return Err(FetchError::Empty);
        }

        tracing::info!(
            host = url.host_str().unwrap_or_default(),
            size_bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Document fetched"
        );

        Ok(body.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_document_size_bytes: usize) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(5),
            max_document_size_bytes,
            allow_private_hosts: true,
            allowlist: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/listing.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.4 body")
            .create_async()
            .await;

        let fetcher = HttpDocumentFetcher::new(config(1024)).unwrap();
        let bytes = fetcher
            .fetch(&format!("{}/listing.pdf", server.url()))
            .await
            .unwrap();

        assert_eq!(&bytes[..], b"%PDF-1.4 body");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.pdf")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpDocumentFetcher::new(config(1024)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing.pdf", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/big.pdf")
            .with_status(200)
            .with_body(vec![b'x'; 64])
            .create_async()
            .await;

        let fetcher = HttpDocumentFetcher::new(config(16)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/big.pdf", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::TooLarge { max: 16, .. }));
    }

    #[tokio::test]
    async fn test_fetch_empty_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/empty.pdf")
            .with_status(200)
            .create_async()
            .await;

        let fetcher = HttpDocumentFetcher::new(config(1024)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/empty.pdf", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Empty));
    }

    #[tokio::test]
    async fn test_fetch_blocks_private_hosts_by_default() {
        let mut config = config(1024);
        config.allow_private_hosts = false;
        let fetcher = HttpDocumentFetcher::new(config).unwrap();

        let err = fetcher
            .fetch("http://127.0.0.1:9/listing.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Blocked(_)));
    }

    #[tokio::test]
    async fn test_fetch_blocks_ipv4_mapped_loopback() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/secret.pdf")
            .with_status(200)
            .with_body("%PDF-internal")
            .expect(0)
            .create_async()
            .await;

        let mut config = config(1024);
        config.allow_private_hosts = false;
        let fetcher = HttpDocumentFetcher::new(config).unwrap();

        let port = server.socket_address().port();
        let err = fetcher
            .fetch(&format!("http://[::ffff:127.0.0.1]:{}/secret.pdf", port))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Blocked(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect_on_same_host() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/old.pdf")
            .with_status(302)
            .with_header("location", "/listing.pdf")
            .create_async()
            .await;
        server
            .mock("GET", "/listing.pdf")
            .with_status(200)
            .with_body("%PDF-1.4 moved")
            .create_async()
            .await;

        let fetcher = HttpDocumentFetcher::new(config(1024)).unwrap();
        let bytes = fetcher
            .fetch(&format!("{}/old.pdf", server.url()))
            .await
            .unwrap();

        assert_eq!(&bytes[..], b"%PDF-1.4 moved");
    }

    #[tokio::test]
    async fn test_fetch_checks_every_redirect_target() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/listing.pdf")
            .with_status(302)
            .with_header("location", "http://metadata.example.net/secret.pdf")
            .create_async()
            .await;

        let mut config = config(1024);
        config.allowlist = Some(vec!["127.0.0.1".to_string()]);
        let fetcher = HttpDocumentFetcher::new(config).unwrap();

        let err = fetcher
            .fetch(&format!("{}/listing.pdf", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Blocked(_)));
    }

    #[tokio::test]
    async fn test_fetch_stops_redirect_loops() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/loop.pdf")
            .with_status(302)
            .with_header("location", "/loop.pdf")
            .expect(MAX_REDIRECTS + 1)
            .create_async()
            .await;

        let fetcher = HttpDocumentFetcher::new(config(1024)).unwrap();
        let err = fetcher
            .fetch(&format!("{}/loop.pdf", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Network(ref msg) if msg.contains("too many redirects")));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        let fetcher = HttpDocumentFetcher::new(config(1024)).unwrap();
        let err = fetcher
            .fetch("http://127.0.0.1:9/listing.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
