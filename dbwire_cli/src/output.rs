use anyhow::Result;
use dbwire_api::{ApiResponse, Error};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorOutput<'a> {
    kind: &'a str,
    code: &'a str,
    reason: &'a str,
    parameters: &'a dbwire_api::Parameters,
}

/// Prints `{"status", "headers", "body"}` as pretty JSON on stdout.
pub fn print_response(resp: &ApiResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(resp)?);
    Ok(())
}

/// Prints an API error as pretty JSON on stderr.
pub fn print_api_error(err: &Error) -> Result<()> {
    eprintln!("{}", render_api_error(err)?);
    Ok(())
}

fn render_api_error(err: &Error) -> Result<String> {
    let out = ErrorOutput {
        kind: err.kind().as_str(),
        code: err.code(),
        reason: err.reason(),
        parameters: err.parameters(),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}
