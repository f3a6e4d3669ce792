use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use taskmaster_client::modules::tracker::adapters::outbound::api_gateway_http::HttpApiGateway;
use taskmaster_client::modules::tracker::session::store::Session;
use taskmaster_client::shared::core::clock::SystemClock;
use taskmaster_client::shared::infrastructure::confirmation::terminal::TerminalConfirm;
use taskmaster_client::shared::infrastructure::confirmation::{Confirm, FixedAnswer};
use taskmaster_client::shared::infrastructure::notifications::tracing_sink::TracingNotifications;
use taskmaster_client::shared::infrastructure::session_storage::file::FileSessionStorage;
use taskmaster_client::shell::cli::{self, Cli, Command};
use taskmaster_client::shell::config::ClientConfig;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let config = ClientConfig::from_env().context("reading configuration")?;
    tracing::info!(api_base = %config.api_base, state_file = %config.state_file.display(), "starting client");

    let confirm: Arc<dyn Confirm> = if args.yes {
        Arc::new(FixedAnswer(true))
    } else {
        Arc::new(TerminalConfirm::stdio())
    };
    let session = Arc::new(Session::new(
        Arc::new(HttpApiGateway::new(config.api_base.clone())),
        Arc::new(TracingNotifications),
        Arc::new(FileSessionStorage::new(config.state_file.clone())),
        Arc::new(SystemClock),
        confirm,
    ));
    if let Err(error) = session.restore().await {
        tracing::warn!(%error, "could not restore the session");
    }

    match args.command {
        Command::Watch { project } => {
            cli::watch(session, project, config.refresh_period, |snapshot| {
                println!("{snapshot:#}");
            })
            .await
        }
        command => {
            let rendered = cli::execute(&session, command).await?;
            println!("{}", serde_json::to_string_pretty(&rendered)?);
            Ok(())
        }
    }
}
