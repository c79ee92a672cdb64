//! HTTP connection to the database API.

use std::sync::Arc;

use reqwest::header::{HeaderMap, ACCEPT_ENCODING, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use crate::{
    config::{debug_flag_set, resolve_logger, ConnectionConfig, Credentials},
    cputime::Timing,
    diagnostics::{self, Logger, TimingReport},
    errors::{ConfigError, Error, ErrorKind, Result},
    types::{ApiResponse, JsonMap, Method, ResponseHeaders},
};

const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Authenticated connection to the database API.
///
/// Every verb issues exactly one HTTP request: no retries, no caching, no
/// batching. The underlying `reqwest::Client` is built once with the
/// configured request and connect timeouts and transparently decompresses
/// gzip and deflate bodies, so both the success and the error path see the
/// decompressed text. A `Connection` holds no mutable state and can be
/// shared between tasks.
pub struct Connection {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
    logger: Option<Arc<dyn Logger>>,
}

impl Connection {
    /// Builds a connection from `config`.
    ///
    /// If `DBWIRE_DEBUG` is set to a non-empty value in the process
    /// environment, a [`StderrLogger`](crate::StderrLogger) replaces the
    /// configured logger. The flag is read here, once; changing it later has
    /// no effect on this connection.
    pub fn new(config: ConnectionConfig) -> std::result::Result<Self, ConfigError> {
        let debug = debug_flag_set();
        Self::with_debug_flag(config, debug)
    }

    /// Builds a connection with the debug flag supplied by the caller
    /// instead of read from the environment.
    pub fn with_debug_flag(
        config: ConnectionConfig,
        debug: bool,
    ) -> std::result::Result<Self, ConfigError> {
        let base_url = config.base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                ConfigError::Client(e)
            })?;
        let credentials = config.credentials();
        let logger = resolve_logger(config.logger, debug);
        Ok(Self {
            http,
            base_url,
            credentials,
            logger,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches `path`, attaching `query` as URL parameters when non-empty.
    pub async fn get(&self, path: &str, query: Option<&JsonMap>) -> Result<ApiResponse> {
        self.execute(Method::Get, path, None, query).await
    }

    /// Posts `data` as the JSON body when it is a non-empty object.
    pub async fn post(&self, path: &str, data: Option<&JsonMap>) -> Result<ApiResponse> {
        self.execute(Method::Post, path, data, None).await
    }

    pub async fn put(&self, path: &str, data: Option<&JsonMap>) -> Result<ApiResponse> {
        self.execute(Method::Put, path, data, None).await
    }

    pub async fn patch(&self, path: &str, data: Option<&JsonMap>) -> Result<ApiResponse> {
        self.execute(Method::Patch, path, data, None).await
    }

    /// Deletes `path`. The response body is discarded.
    pub async fn delete(&self, path: &str, data: Option<&JsonMap>) -> Result<()> {
        let raw = self.send(Method::Delete, path, data, None).await?;
        match error_for_status(raw.status, &raw.text) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn url(&self, path: &str, query: Option<&JsonMap>) -> Result<Url> {
        // A ref is always relative to the endpoint, even when its first
        // segment contains a `:`.
        let relative = format!("./{}", path.trim_start_matches('/'));
        let mut url = self.base_url.join(&relative).map_err(|e| {
            tracing::error!("Invalid resource path {}: {}", path, e);
            Error::network("invalid path", format!("{}: {}", path, e))
        })?;
        // Credentials must never leave the configured endpoint.
        if url.origin() != self.base_url.origin() {
            return Err(Error::network("invalid path", path));
        }
        if let Some(query) = non_empty(query) {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, &diagnostics::scalar_to_string(value));
            }
        }
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        data: Option<&JsonMap>,
        query: Option<&JsonMap>,
    ) -> Result<ApiResponse> {
        let raw = self.send(method, path, data, query).await?;
        handle_response(raw.status, raw.headers, &raw.text)
    }

    /// Issues one request and reads the decompressed body as text.
    async fn send(
        &self,
        method: Method,
        path: &str,
        data: Option<&JsonMap>,
        query: Option<&JsonMap>,
    ) -> Result<RawResponse> {
        let body = non_empty(data);
        let query = non_empty(query);
        let url = self.url(path, query)?;

        let timing = self.logger.as_ref().map(|logger| {
            diagnostics::log_request(
                logger.as_ref(),
                method.as_str(),
                path,
                query,
                self.credentials.as_ref(),
                body,
            );
            Timing::start()
        });

        let mut request = self
            .http
            .request(method.into(), url)
            .header(ACCEPT_ENCODING, "gzip")
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }
        if let Some(body) = body {
            let encoded = serde_json::to_vec(body)
                .map_err(|e| Error::network("invalid request", e.to_string()))?;
            request = request.body(encoded);
        }

        let resp = request.send().await.map_err(|e| {
            tracing::error!("{} /{} failed: {}", method, path, e);
            transport_error(&e)
        })?;
        let status = resp.status().as_u16();
        let headers = collect_headers(resp.headers());
        let text = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            transport_error(&e)
        })?;

        if let (Some(logger), Some(timing)) = (&self.logger, timing) {
            let (network_latency, local_processing) = timing.finish();
            let logged_body = if text.is_empty() {
                Value::Object(JsonMap::new())
            } else {
                serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()))
            };
            diagnostics::log_response(
                logger.as_ref(),
                status,
                &headers,
                &logged_body,
                TimingReport {
                    network_latency,
                    local_processing,
                },
            );
        }

        Ok(RawResponse {
            status,
            headers,
            text,
        })
    }
}

struct RawResponse {
    status: u16,
    headers: ResponseHeaders,
    text: String,
}

/// Maps a status and decompressed body to the call's outcome.
///
/// 2xx decodes the body (empty decodes to `{}`); 400, 401, 403, 404 and 405
/// build their error kind from the JSON error payload; anything else is a
/// `NetworkError` carrying the raw body text.
pub fn handle_response(status: u16, headers: ResponseHeaders, text: &str) -> Result<ApiResponse> {
    if let Some(err) = error_for_status(status, text) {
        return Err(err);
    }
    let body = if text.is_empty() {
        Value::Object(JsonMap::new())
    } else {
        serde_json::from_str(text).map_err(|e| {
            tracing::error!("Failed to parse response: {} | body: {}", e, truncate_body(text));
            Error::network("invalid response", text)
        })?
    };
    Ok(ApiResponse {
        status,
        headers,
        body,
    })
}

/// The error for a non-2xx status, or `None` for 2xx.
fn error_for_status(status: u16, text: &str) -> Option<Error> {
    if (200..300).contains(&status) {
        return None;
    }
    let kind = ErrorKind::from_status(status);
    let err = if kind.has_payload() {
        serde_json::from_str::<Value>(text)
            .ok()
            .and_then(|payload| Error::from_payload(kind, &payload))
            .unwrap_or_else(|| fallback_error(kind, status, text))
    } else {
        Error::network(status_code_name(status), text)
    };
    tracing::warn!("Request failed with status {}: {}", status, err);
    Some(err)
}

/// The error for a recognized status whose body is not a usable payload.
fn fallback_error(kind: ErrorKind, status: u16, text: &str) -> Error {
    let err = Error::new(kind, status_code_name(status));
    if text.is_empty() {
        err
    } else {
        err.with_reason(text)
    }
}

/// Lower-cased canonical reason phrase, e.g. `not found` for 404.
fn status_code_name(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_lowercase)
        .unwrap_or_else(|| format!("http {}", status))
}

fn transport_error(err: &reqwest::Error) -> Error {
    let mut reason = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    Error::network("transport error", reason)
}

fn collect_headers(headers: &HeaderMap) -> ResponseHeaders {
    let mut collected = ResponseHeaders::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    collected
}

fn non_empty(map: Option<&JsonMap>) -> Option<&JsonMap> {
    map.filter(|m| !m.is_empty())
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
