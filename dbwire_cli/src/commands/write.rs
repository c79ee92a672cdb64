use clap::Args;
use dbwire_api::{ApiResponse, Connection};

use super::{parse_data, CommandError};

#[derive(Args)]
pub struct WriteArgs {
    /// Resource path, e.g. pigs/henwen
    pub path: String,

    /// Request body as a JSON object
    #[arg(long, short = 'd')]
    pub data: Option<String>,
}

/// The verbs that carry an optional JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Post,
    Put,
    Patch,
    Delete,
}

/// Runs a body-carrying verb. `delete` yields no response on success.
pub async fn run(
    verb: Verb,
    args: &WriteArgs,
    conn: &Connection,
) -> Result<Option<ApiResponse>, CommandError> {
    let data = parse_data(args.data.as_deref())?;
    let data = data.as_ref();
    let resp = match verb {
        Verb::Post => conn.post(&args.path, data).await?,
        Verb::Put => conn.put(&args.path, data).await?,
        Verb::Patch => conn.patch(&args.path, data).await?,
        Verb::Delete => {
            conn.delete(&args.path, data).await?;
            return Ok(None);
        }
    };
    Ok(Some(resp))
}
