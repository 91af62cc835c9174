//! Klipp CLI entry point.

use anyhow::Result;
use clap::Parser;
use klipp::cli::{commands, Cli, Commands};
use klipp::config::Settings;
use klipp::tools::{ToolContext, ToolRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging; stdout belongs to MCP and JSON output
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("klipp={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match &cli.command {
        Commands::Mcp => {
            commands::run_mcp(registry(&settings)?).await?;
        }

        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| settings.server.host.clone());
            let port = port.unwrap_or(settings.server.port);
            commands::run_serve(&host, port, registry(&settings)?).await?;
        }

        Commands::Tools { json } => {
            commands::run_tools(*json)?;
        }

        Commands::ModelInfo { models, json } => {
            let ctx = ToolContext::from_settings(&settings)?;
            commands::run_model_info(models, *json, &ctx).await?;
        }

        Commands::RemoveBg {
            image,
            format,
            output,
            json,
        } => {
            let ctx = ToolContext::from_settings(&settings)?;
            commands::run_remove_bg(image, *format, output.clone(), *json, &ctx).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path)?;
        }
    }

    Ok(())
}

fn registry(settings: &Settings) -> Result<ToolRegistry> {
    Ok(ToolRegistry::new(ToolContext::from_settings(settings)?))
}
