// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Shared REST transport for HTTP-backed namespace adapters.
//!
//! A thin wrapper over a pooled `reqwest` client carrying the base URL,
//! default headers, and timeout/retry configuration. Adapters translate
//! [`RestClientError`] into the shared [`lance_namespace::NamespaceError`]
//! taxonomy; this layer only reports raw HTTP outcomes.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::Snafu;

/// Raw failure from the REST transport.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RestClientError {
    /// The server answered with an error status.
    #[snafu(display("HTTP {status}: {body}"))]
    Status { status: u16, body: String },

    /// The request never produced a usable response.
    #[snafu(display("Transport error: {message}"))]
    Transport { message: String },
}

impl RestClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(400)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(s) if s >= 500)
    }
}

pub type RestResult<T> = std::result::Result<T, RestClientError>;

/// Builder for [`RestClient`].
#[derive(Debug, Clone)]
pub struct RestClientBuilder {
    base_url: String,
    headers: Vec<(String, String)>,
    connect_timeout: Duration,
    read_timeout: Duration,
    max_retries: u32,
}

impl RestClientBuilder {
    const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
    const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;
    const DEFAULT_MAX_RETRIES: u32 = 3;
    const RETRY_DELAY_MS: u64 = 300;

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers: Vec::new(),
            connect_timeout: Duration::from_millis(Self::DEFAULT_CONNECT_TIMEOUT_MS),
            read_timeout: Duration::from_millis(Self::DEFAULT_READ_TIMEOUT_MS),
            max_retries: Self::DEFAULT_MAX_RETRIES,
        }
    }

    /// Add a default header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a bearer token as the `Authorization` header.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.header("Authorization", value)
    }

    pub fn connect_timeout_millis(mut self, millis: u64) -> Self {
        self.connect_timeout = Duration::from_millis(millis);
        self
    }

    pub fn read_timeout_millis(mut self, millis: u64) -> Self {
        self.read_timeout = Duration::from_millis(millis);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn build(self) -> RestClient {
        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &self.headers {
            if let (Ok(header_name), Ok(header_value)) = (
                reqwest::header::HeaderName::from_bytes(key.as_bytes()),
                reqwest::header::HeaderValue::from_str(value),
            ) {
                headers.insert(header_name, header_value);
            }
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(self.connect_timeout)
            .timeout(self.read_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        RestClient {
            client,
            base_url: self.base_url,
            max_retries: self.max_retries,
        }
    }
}

/// Pooled HTTP client bound to one backend endpoint.
///
/// Retries transport failures and 5xx responses up to `max_retries` times
/// with a linear delay; 4xx responses are surfaced immediately. Dropping
/// the client releases the connection pool.
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl RestClient {
    pub fn builder(base_url: impl Into<String>) -> RestClientBuilder {
        RestClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> RestResult<T> {
        let text = self
            .execute(reqwest::Method::GET, path, query, None)
            .await?;
        Self::parse(&text)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> RestResult<T> {
        let body = serde_json::to_value(body).map_err(|e| RestClientError::Transport {
            message: format!("failed to serialize request body: {}", e),
        })?;
        let text = self
            .execute(reqwest::Method::POST, path, &[], Some(body))
            .await?;
        Self::parse(&text)
    }

    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> RestResult<()> {
        self.execute(reqwest::Method::DELETE, path, query, None)
            .await?;
        Ok(())
    }

    /// Parse a response body, treating an empty body as JSON `null` so
    /// callers can deserialize into `Option<T>`.
    fn parse<T: DeserializeOwned>(text: &str) -> RestResult<T> {
        let result = if text.trim().is_empty() {
            serde_json::from_value(serde_json::Value::Null)
        } else {
            serde_json::from_str(text)
        };
        result.map_err(|e| RestClientError::Transport {
            message: format!("invalid response body: {} (body: {:?})", e, text),
        })
    }

    /// Append the pre-encoded path onto the base URL segment by segment.
    ///
    /// Parsing the concatenated URL would run dot-segment normalization,
    /// which collapses a literal `%2E` segment (the Gravitino root
    /// sentinel). Pushing segments onto an already-parsed URL keeps every
    /// pre-encoded segment byte-for-byte on the wire.
    fn request_url(&self, path: &str) -> RestResult<reqwest::Url> {
        let mut url =
            reqwest::Url::parse(&self.base_url).map_err(|e| RestClientError::Transport {
                message: format!("invalid base url {:?}: {}", self.base_url, e),
            })?;
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|_| RestClientError::Transport {
                        message: format!("base url {:?} cannot carry a path", self.base_url),
                    })?;
            segments.pop_if_empty();
            for part in path.split('/').filter(|p| !p.is_empty()) {
                segments.push(part);
            }
        }
        Ok(url)
    }

    async fn execute(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> RestResult<String> {
        let url = self.request_url(path)?;
        let mut attempt: u32 = 0;
        loop {
            let mut request = self.client.request(method.clone(), url.clone());
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            let outcome = match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    match response.text().await {
                        Ok(text) if status >= 400 => {
                            Err(RestClientError::Status { status, body: text })
                        }
                        Ok(text) => Ok(text),
                        Err(e) => Err(RestClientError::Transport {
                            message: format!("failed to read response body: {}", e),
                        }),
                    }
                }
                Err(e) => Err(RestClientError::Transport {
                    message: e.to_string(),
                }),
            };

            match outcome {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.max_retries
                    && (e.is_server_error() || e.status().is_none()) =>
                {
                    attempt += 1;
                    log::debug!(
                        "retrying {} {} after failure ({}), attempt {}/{}",
                        method,
                        url,
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(Duration::from_millis(
                        RestClientBuilder::RETRY_DELAY_MS * attempt as u64,
                    ))
                    .await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
