//! Request and response shapes shared by the connection and its callers.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// A JSON object, used for request bodies and query parameters.
pub type JsonMap = Map<String, Value>;

/// Response headers keyed by lower-cased name. Repeated headers are joined
/// with `", "`.
pub type ResponseHeaders = BTreeMap<String, String>;

/// The HTTP verbs the connection issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A successful response: the decoded JSON body kept apart from the
/// response headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: ResponseHeaders,
    /// The decoded body. An empty body decodes to `{}`.
    pub body: Value,
}

impl ApiResponse {
    /// The body with a `headers` key holding the response headers, the
    /// single-mapping shape some callers expect.
    ///
    /// Returns `None` when the body is not an object, or when it already has
    /// a `headers` key that would otherwise be overwritten.
    pub fn merged(&self) -> Option<JsonMap> {
        let mut object = self.body.as_object()?.clone();
        if object.contains_key("headers") {
            return None;
        }
        let headers = self
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        object.insert("headers".to_string(), Value::Object(headers));
        Some(object)
    }
}
