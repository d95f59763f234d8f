//! Reading CRD manifests from local files or URLs

use crate::error::{Error, FetchError, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

/// Somewhere a CRD manifest can be read from
#[async_trait]
pub trait CrdSource: Send + Sync {
    /// Human readable location, used in log output
    fn location(&self) -> String;

    /// Read the full manifest
    async fn read(&self) -> Result<Vec<u8>>;
}

/// Manifest on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CrdSource for LocalFile {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn read(&self) -> Result<Vec<u8>> {
        if let Err(e) = tokio::fs::metadata(&self.path).await {
            if e.kind() == io::ErrorKind::NotFound {
                return Err(Error::NotFound(self.path.clone()));
            }
        }

        let contents = tokio::fs::read(&self.path).await.map_err(Error::Read)?;
        debug!("Read {} bytes from {}", contents.len(), self.path.display());
        Ok(contents)
    }
}

/// Manifest served over HTTP(S)
#[derive(Debug, Clone)]
pub struct RemoteUrl {
    url: Url,
    user_agent: String,
}

impl RemoteUrl {
    pub fn new(url: Url, user_agent: impl Into<String>) -> Self {
        Self {
            url,
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl CrdSource for RemoteUrl {
    fn location(&self) -> String {
        self.url.to_string()
    }

    async fn read(&self) -> Result<Vec<u8>> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(FetchError::Client)?;

        info!("Fetching {}", self.url);
        let response = client
            .get(self.url.clone())
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.to_string()).into());
        }

        let body = response.bytes().await.map_err(FetchError::Body)?;
        debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body.to_vec())
    }
}

/// Parse `arg` as a URL if it is an absolute, hierarchical URI with a scheme.
/// Opaque forms such as `widget:v1.yaml` are left to be read as paths.
pub fn parse_url(arg: &str) -> Option<Url> {
    Url::parse(arg)
        .ok()
        .filter(|url| !url.scheme().is_empty() && !url.cannot_be_a_base())
}

/// Pick the source for a command-line argument: a URL if it parses as one,
/// otherwise a filesystem path.
pub fn resolve(arg: &str, user_agent: &str) -> Box<dyn CrdSource> {
    match parse_url(arg) {
        Some(url) => Box::new(RemoteUrl::new(url, user_agent)),
        None => Box::new(LocalFile::new(arg)),
    }
}
