// src/services/source.rs

//! JSON data sources.
//!
//! Fetch-layer failures are classified as connection, HTTP status or parse
//! errors; shape problems are left to the normalizer.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::utils::http::create_async_client;

/// Something that can produce a decoded JSON document for a URL.
#[async_trait]
pub trait JsonSource: Send + Sync {
    async fn fetch_json(&self, url: &Url) -> Result<Value>;
}

/// Fetches over HTTP(S).
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JsonSource for HttpSource {
    async fn fetch_json(&self, url: &Url) -> Result<Value> {
        log::debug!("Fetching {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::connection(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http_status(status.as_u16(), url.as_str()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::connection(url.as_str(), e))?;
        serde_json::from_str(&body).map_err(|e| AppError::parse(url.as_str(), e))
    }
}

/// Reads `file://` URLs from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileSource;

#[async_trait]
impl JsonSource for FileSource {
    async fn fetch_json(&self, url: &Url) -> Result<Value> {
        let path = url
            .to_file_path()
            .map_err(|_| AppError::connection(url.as_str(), "not a local file URL"))?;
        log::debug!("Reading {}", path.display());

        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::connection(url.as_str(), e))?;
        serde_json::from_str(&body).map_err(|e| AppError::parse(url.as_str(), e))
    }
}

/// Pick a source for the configured page: `file://` pages read from disk,
/// everything else goes over HTTP.
pub fn source_for(config: &SourceConfig) -> Result<Arc<dyn JsonSource>> {
    let page = config.page_url()?;
    if page.scheme() == "file" {
        Ok(Arc::new(FileSource))
    } else {
        Ok(Arc::new(HttpSource::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve one canned HTTP response on an ephemeral port.
    async fn serve_once(response: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        Url::parse(&format!("http://{addr}/data/materials.json?v=1")).unwrap()
    }

    fn source() -> HttpSource {
        HttpSource::new(&SourceConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_http_success_decodes_json() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 17\r\nConnection: close\r\n\r\n[{\"title\":\"L1\"}]\n",
        )
        .await;

        let value = source().fetch_json(&url).await.unwrap();
        assert_eq!(value[0]["title"], "L1");
    }

    #[tokio::test]
    async fn test_http_status_error_carries_code_and_url() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let err = source().fetch_json(&url).await.unwrap_err();
        match err {
            AppError::HttpStatus { status, url: failed } => {
                assert_eq!(status, 404);
                assert_eq!(failed, url.as_str());
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_body_is_parse_error() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 9\r\nConnection: close\r\n\r\n<html/>\r\n",
        )
        .await;

        let err = source().fetch_json(&url).await.unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/data/materials.json")).unwrap();

        let err = source().fetch_json(&url).await.unwrap_err();
        assert!(matches!(err, AppError::Connection { .. }), "got {err:?}");
        assert_eq!(err.url(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn test_silent_server_times_out_as_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        let url = Url::parse(&format!("http://{addr}/data/materials.json")).unwrap();
        let client = Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();

        let err = HttpSource::with_client(client).fetch_json(&url).await.unwrap_err();
        assert!(matches!(err, AppError::Connection { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_file_source_reads_local_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("announcements.json");
        std::fs::write(&path, r#"{"meta":{},"items":[{"title":"A"}]}"#).unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let value = FileSource.fetch_json(&url).await.unwrap();
        assert_eq!(value["items"][0]["title"], "A");
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.json")).unwrap();

        let err = FileSource.fetch_json(&url).await.unwrap_err();
        assert!(matches!(err, AppError::Connection { .. }));
    }

    #[test]
    fn test_source_for_picks_by_scheme() {
        let mut config = SourceConfig::default();
        assert!(source_for(&config).is_ok());
        config.base_url = "file:///srv/site/index.html".into();
        assert!(source_for(&config).is_ok());
        config.base_url = "::".into();
        assert!(source_for(&config).is_err());
    }
}
