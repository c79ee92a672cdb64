//! Wire diagnostics: the [`Logger`] sink and the lines written to it.
//!
//! Each call logs its request line, credentials and request JSON before
//! sending, then the response headers, response JSON and a timing summary
//! after the body is read. Logging is synchronous on the calling task and
//! never changes what the call returns.

use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use crate::config::Credentials;
use crate::types::{JsonMap, ResponseHeaders};

/// Response header carrying the server's own processing time in ms.
pub const PROCESSING_TIME_HEADER: &str = "x-http-request-processing-time";

/// A sink for wire diagnostic lines.
pub trait Logger: Send + Sync {
    fn log(&self, line: &str);
}

/// Writes each line to standard error. Installed by the `DBWIRE_DEBUG`
/// environment flag.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger;

impl Logger for StderrLogger {
    fn log(&self, line: &str) {
        eprintln!("{}", line);
    }
}

/// Forwards each line as a `tracing` debug event on target `dbwire::wire`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, line: &str) {
        tracing::debug!(target: "dbwire::wire", "{}", line);
    }
}

/// Keeps every line in memory. Useful for asserting on diagnostics.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Renders query parameters as `?k=v&k=v`, or nothing when empty.
/// Values are shown unencoded; strings without their JSON quotes.
pub fn query_string_for_logging(query: Option<&JsonMap>) -> String {
    match query {
        Some(query) if !query.is_empty() => {
            let pairs: Vec<String> = query
                .iter()
                .map(|(k, v)| format!("{}={}", k, scalar_to_string(v)))
                .collect();
            format!("?{}", pairs.join("&"))
        }
        _ => String::new(),
    }
}

/// The textual form of a scalar query value.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn log_request(
    logger: &dyn Logger,
    method: &str,
    path: &str,
    query: Option<&JsonMap>,
    credentials: Option<&Credentials>,
    body: Option<&JsonMap>,
) {
    logger.log(&format!(
        "DBWIRE {} /{}{}",
        method,
        path,
        query_string_for_logging(query)
    ));
    match credentials {
        Some(credentials) => logger.log(&format!("  Credentials: {}", credentials)),
        None => logger.log("  Credentials: None"),
    }
    if let Some(body) = body {
        logger.log(&format!("  Request JSON: {}", indent(&pretty(body))));
    }
}

/// What the timing line reports for one call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimingReport {
    pub network_latency: Duration,
    pub local_processing: Duration,
}

pub(crate) fn log_response(
    logger: &dyn Logger,
    status: u16,
    headers: &ResponseHeaders,
    body: &Value,
    timing: TimingReport,
) {
    logger.log(&format!("  Response headers: {}", indent(&pretty(headers))));
    logger.log(&format!("  Response JSON: {}", indent(&pretty(body))));
    let processing = headers
        .get(PROCESSING_TIME_HEADER)
        .map(String::as_str)
        .unwrap_or("N/A");
    logger.log(&format!(
        "  Response ({}): API processing {}ms, network latency {}ms, local processing {}ms",
        status,
        processing,
        timing.network_latency.as_millis(),
        timing.local_processing.as_millis()
    ));
}

fn pretty<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "<unprintable>".to_string())
}

/// Indents continuation lines so multi-line JSON sits under its label.
fn indent(text: &str) -> String {
    text.replace('\n', "\n  ")
}
