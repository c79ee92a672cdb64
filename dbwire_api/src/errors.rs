//! Error types for the API client.

use std::fmt;

use serde_json::{Map, Value};

/// Structured detail attached to an error, keyed by field name.
pub type Parameters = Map<String, Value>;

/// Crate-level result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The category of a failed call, mapped from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// HTTP 404.
    NotFound,
    /// HTTP 400.
    BadRequest,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    PermissionDenied,
    /// HTTP 405.
    MethodNotAllowed,
    /// Any other non-2xx status, or a failure below the HTTP layer.
    NetworkError,
}

impl ErrorKind {
    /// Maps a non-success status code to its error kind.
    ///
    /// Statuses without a dedicated kind (including 2xx, which never reach
    /// this function from the connection) map to [`ErrorKind::NetworkError`].
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            _ => Self::NetworkError,
        }
    }

    /// Returns `true` when errors of this kind are built from a JSON payload.
    pub fn has_payload(self) -> bool {
        !matches!(self, Self::NetworkError)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::BadRequest => "BadRequest",
            Self::Unauthorized => "Unauthorized",
            Self::PermissionDenied => "PermissionDenied",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::NetworkError => "NetworkError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call: the kind, a short machine code, an optional human reason
/// and the structured parameters reported by the server.
///
/// Errors are never mutated after construction and never retried by the
/// connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    code: String,
    reason: Option<String>,
    parameters: Parameters,
}

impl Error {
    /// Builds an error from explicit values. The reason defaults to the code
    /// and the parameters default to empty.
    pub fn new(kind: ErrorKind, code: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            reason: None,
            parameters: Parameters::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Builds an error from an API failure payload of the form
    /// `{"error": .., "reason": .., "parameters": {..}}`.
    ///
    /// A null or missing `reason` leaves the reason unset, and a null or
    /// missing `parameters` yields an empty map. Returns `None` when the
    /// payload is not an object or carries no string `error` field.
    pub fn from_payload(kind: ErrorKind, payload: &Value) -> Option<Self> {
        let object = payload.as_object()?;
        let code = object.get("error")?.as_str()?;
        let reason = object
            .get("reason")
            .and_then(Value::as_str)
            .map(str::to_string);
        let parameters = object
            .get("parameters")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Some(Self {
            kind,
            code: code.to_string(),
            reason,
            parameters,
        })
    }

    /// Builds the catch-all error for an unrecognized status: the raw body
    /// text becomes the reason and no parameters are extracted.
    pub(crate) fn network(code: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, code).with_reason(raw)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// The human reason, falling back to the code when none was given.
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or(&self.code)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The message shown to callers and logs: the reason if present,
    /// otherwise the code.
    pub fn message(&self) -> &str {
        self.reason()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message())
    }
}

impl std::error::Error for Error {}

/// Errors raised while building a [`Connection`](crate::Connection).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Scheme, domain and port do not form a valid URL.
    #[error("Invalid endpoint {0}")]
    InvalidEndpoint(String),
    /// An environment variable held something other than the expected number.
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_payload_extracts_all_fields() {
        let payload = json!({
            "error": "not found",
            "reason": "no such ref",
            "parameters": {"ref": "x"}
        });
        let err = Error::from_payload(ErrorKind::NotFound, &payload).unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.code(), "not found");
        assert_eq!(err.reason(), "no such ref");
        assert_eq!(err.parameters().get("ref"), Some(&json!("x")));
    }

    #[test]
    fn explicit_code_only_defaults_reason_and_parameters() {
        let err = Error::new(ErrorKind::NotFound, "not found");
        assert_eq!(err.reason(), "not found");
        assert!(err.parameters().is_empty());
    }

    #[test]
    fn null_reason_and_parameters_fall_back() {
        let payload = json!({"error": "bad", "reason": null, "parameters": null});
        let err = Error::from_payload(ErrorKind::BadRequest, &payload).unwrap();
        assert_eq!(err.message(), "bad");
        assert!(err.parameters().is_empty());
    }

    #[test]
    fn payload_without_error_field_is_rejected() {
        assert!(Error::from_payload(ErrorKind::BadRequest, &json!({"reason": "x"})).is_none());
        assert!(Error::from_payload(ErrorKind::BadRequest, &json!(["error"])).is_none());
    }

    #[test]
    fn both_constructors_agree() {
        let mut params = Parameters::new();
        params.insert("name".to_string(), json!({"error": "required"}));
        let explicit = Error::new(ErrorKind::BadRequest, "validation failed")
            .with_reason("missing name")
            .with_parameters(params);
        let payload = json!({
            "error": "validation failed",
            "reason": "missing name",
            "parameters": {"name": {"error": "required"}}
        });
        assert_eq!(
            Error::from_payload(ErrorKind::BadRequest, &payload).unwrap(),
            explicit
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorKind::from_status(400), ErrorKind::BadRequest);
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Unauthorized);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::PermissionDenied);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(405), ErrorKind::MethodNotAllowed);
        assert_eq!(ErrorKind::from_status(409), ErrorKind::NetworkError);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::NetworkError);
    }

    #[test]
    fn display_uses_kind_and_message() {
        let err = Error::new(ErrorKind::Unauthorized, "unauthorized").with_reason("bad secret");
        assert_eq!(err.to_string(), "Unauthorized: bad secret");
    }
}
