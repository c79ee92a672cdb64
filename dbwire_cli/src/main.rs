mod commands;
mod output;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dbwire_api::{Connection, ConnectionConfig, TracingLogger};

use crate::commands::write::Verb;

#[derive(Parser)]
#[command(name = "dbwire")]
#[command(about = "Issue authenticated requests against the database API")]
struct Cli {
    /// URL scheme: https or http
    #[arg(long, env = "DBWIRE_SCHEME", default_value = "https", global = true)]
    scheme: String,

    /// API host name
    #[arg(long, env = "DBWIRE_DOMAIN", default_value = "localhost", global = true)]
    domain: String,

    /// API port (defaults to 443 for https, 80 otherwise)
    #[arg(long, env = "DBWIRE_PORT", global = true)]
    port: Option<u16>,

    /// Secret token, split on the first ':' into Basic auth credentials
    #[arg(long, env = "DBWIRE_SECRET", hide_env_values = true, global = true)]
    secret: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "DBWIRE_TIMEOUT", default_value = "60", global = true)]
    timeout: u64,

    /// Connect timeout in seconds
    #[arg(long, env = "DBWIRE_CONNECT_TIMEOUT", default_value = "10", global = true)]
    connect_timeout: u64,

    /// Route wire diagnostics through the tracing subscriber (RUST_LOG=dbwire::wire=debug)
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a resource
    Get(commands::read::GetArgs),
    /// Create a resource
    Post(commands::write::WriteArgs),
    /// Replace a resource
    Put(commands::write::WriteArgs),
    /// Update part of a resource
    Patch(commands::write::WriteArgs),
    /// Delete a resource
    Delete(commands::write::WriteArgs),
}

impl Cli {
    fn connection_config(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new()
            .with_scheme(&self.scheme)
            .with_domain(&self.domain)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_connect_timeout(Duration::from_secs(self.connect_timeout));
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(secret) = &self.secret {
            config = config.with_secret(secret);
        }
        if self.trace {
            config = config.with_logger(Arc::new(TracingLogger));
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive("dbwire=info".parse()?);
    if cli.trace {
        filter = filter.add_directive("dbwire::wire=debug".parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let conn = Connection::new(cli.connection_config()).context("invalid connection settings")?;

    let outcome = match &cli.command {
        Commands::Get(args) => commands::read::run(args, &conn).await,
        Commands::Post(args) => commands::write::run(Verb::Post, args, &conn).await,
        Commands::Put(args) => commands::write::run(Verb::Put, args, &conn).await,
        Commands::Patch(args) => commands::write::run(Verb::Patch, args, &conn).await,
        Commands::Delete(args) => commands::write::run(Verb::Delete, args, &conn).await,
    };

    match outcome {
        Ok(Some(resp)) => output::print_response(&resp)?,
        Ok(None) => {}
        Err(commands::CommandError::Api(err)) => {
            output::print_api_error(&err)?;
            std::process::exit(1);
        }
        Err(commands::CommandError::Input(err)) => return Err(err),
    }

    Ok(())
}
