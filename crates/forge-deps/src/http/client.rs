//! HTTP client for remote repositories.
//!
//! This module wraps `reqwest` with repository-specific behavior:
//! - `404 Not Found` is an absent key (`Ok(None)`), not an error
//! - Status errors are classified so callers can tell transient failures
//!   (5xx, 429, transport errors) from permanent ones
//! - Streaming downloads straight to disk
//! - Custom User-Agent, proxy, custom CA certificate and credentials
//!
//! Retrying is left to the caller; the resolver retries transient failures
//! per repository with exponential backoff.
//!
//! # Examples
//!
//! ```no_run
//! use forge_deps::http::{HttpClient, HttpClientConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig::new()
//!     .with_timeout(Duration::from_secs(60))
//!     .with_proxy("http://proxy.example.com:8080".to_string());
//! let client = HttpClient::with_config(config)?;
//!
//! if let Some(index) = client.get_text("https://repo.example.com/org/example/lib/versions.json").await? {
//!     println!("{}", index);
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const DEFAULT_USER_AGENT: &str = concat!("forge-deps/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization error: {0}")]
    JsonParse(String),
}

impl HttpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Request(e) if e.is_timeout())
    }

    /// Server errors, rate limiting and transport failures
    pub fn is_transient(&self) -> bool {
        match self {
            HttpError::Request(_) => true,
            HttpError::HttpStatus { status, .. } => {
                *status >= 500 || *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
            }
            HttpError::Io(_) => false,
            HttpError::JsonParse(_) => false,
        }
    }
}

/// Credentials sent with every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpAuth {
    Basic { username: String, password: String },
    Bearer(String),
}

/// Cheap to clone; clones share the connection pool
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    auth: Option<HttpAuth>,
}

impl HttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .user_agent(&config.user_agent);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)?;
            builder = builder.proxy(proxy);
        }

        if let Some(cafile) = &config.cafile {
            match std::fs::read(cafile) {
                Ok(cert_bytes) => match reqwest::Certificate::from_pem(&cert_bytes) {
                    Ok(cert) => builder = builder.add_root_certificate(cert),
                    Err(e) => log::warn!("Ignoring CA file {}: {}", cafile.display(), e),
                },
                Err(e) => log::warn!("Cannot read CA file {}: {}", cafile.display(), e),
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            auth: config.auth,
        })
    }

    /// Set authentication
    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Perform a GET request; `404` yields `Ok(None)`
    pub async fn get(&self, url: &str) -> Result<Option<Response>, HttpError> {
        log::trace!("GET {}", url);
        let mut request = self.client.get(url).header("Accept-Encoding", "gzip");

        request = match &self.auth {
            Some(HttpAuth::Basic { username, password }) => request.basic_auth(username, Some(password)),
            Some(HttpAuth::Bearer(token)) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(Some(response))
        } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            Ok(None)
        } else {
            Err(HttpError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }

    /// GET a text document
    pub async fn get_text(&self, url: &str) -> Result<Option<String>, HttpError> {
        match self.get(url).await? {
            Some(response) => Ok(Some(response.text().await?)),
            None => Ok(None),
        }
    }

    /// GET JSON and deserialize
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, HttpError> {
        match self.get_text(url).await? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| HttpError::JsonParse(e.to_string())),
            None => Ok(None),
        }
    }

    /// Stream a file to `dest`; returns `false` when the server has no such file
    pub async fn download(&self, url: &str, dest: &Path) -> Result<bool, HttpError> {
        let Some(response) = self.get(url).await? else {
            return Ok(false);
        };

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();

        use futures_util::StreamExt;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;

        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub proxy: Option<String>,
    pub cafile: Option<PathBuf>,
    pub user_agent: String,
    pub auth: Option<HttpAuth>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            proxy: None,
            cafile: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auth: None,
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_cafile(mut self, cafile: PathBuf) -> Self {
        self.cafile = Some(cafile);
        self
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}
