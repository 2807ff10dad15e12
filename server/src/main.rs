use std::{net::IpAddr, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use employees_server::{
    config::AppConfig,
    http::{self, AppState, ServeConfig},
    seed,
};
use platform_db::RestConnector;
use platform_obs::{ObsConfig, init_tracing};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "employees-server", version, about = "Employees CRUD function")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Insert demo employees (or those in a JSON file) through the backend.
    Seed(SeedCommand),
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[derive(Args, Debug)]
struct SeedCommand {
    #[arg(long, value_name = "FILE", help = "JSON array of employees")]
    file: Option<PathBuf>,
    #[arg(
        long,
        env = "SEED_AUTHORIZATION",
        help = "Authorization header sent to the backend (defaults to the anon key)"
    )]
    authorization: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let connector = Arc::new(RestConnector::new(config.backend.clone()));

    match cli.command {
        Command::Serve(cmd) => {
            let state = AppState::new(connector, config.body_limit);
            http::serve(cmd.into(), state).await
        }
        Command::Seed(cmd) => {
            let count = seed::run(
                connector.as_ref(),
                cmd.file.as_deref(),
                cmd.authorization.as_deref(),
            )
            .await?;
            info!(count, "seed complete");
            Ok(())
        }
    }
}
