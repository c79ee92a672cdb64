use clap::Args;
use dbwire_api::{ApiResponse, Connection};

use super::{parse_query, CommandError};

#[derive(Args)]
pub struct GetArgs {
    /// Resource path, e.g. pigs/henwen
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q')]
    pub query: Vec<String>,
}

pub async fn run(args: &GetArgs, conn: &Connection) -> Result<Option<ApiResponse>, CommandError> {
    let query = parse_query(&args.query)?;
    let resp = conn.get(&args.path, Some(&query)).await?;
    Ok(Some(resp))
}
