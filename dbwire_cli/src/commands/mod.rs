pub mod read;
pub mod write;

use anyhow::anyhow;
use dbwire_api::JsonMap;
use serde_json::Value;

/// Why a command did not produce a response.
#[derive(Debug)]
pub enum CommandError {
    /// The API answered with (or the transport raised) a typed error.
    Api(dbwire_api::Error),
    /// The command line arguments could not be turned into a request.
    Input(anyhow::Error),
}

impl From<dbwire_api::Error> for CommandError {
    fn from(e: dbwire_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(e: anyhow::Error) -> Self {
        Self::Input(e)
    }
}

/// Parses `k=v` pairs into a query map. Values that read as JSON scalars
/// (numbers, booleans) keep that type; everything else is a string.
pub fn parse_query(pairs: &[String]) -> anyhow::Result<JsonMap> {
    let mut query = JsonMap::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("query parameter '{}' must look like key=value", pair))?;
        if key.is_empty() {
            return Err(anyhow!("query parameter '{}' has an empty key", pair));
        }
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
            _ => Value::String(raw.to_string()),
        };
        query.insert(key.to_string(), value);
    }
    Ok(query)
}

/// Parses a `--data` argument, which must be a JSON object.
pub fn parse_data(raw: Option<&str>) -> anyhow::Result<Option<JsonMap>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(Some(map)),
        other => Err(anyhow!("--data must be a JSON object, got {}", other)),
    }
}
