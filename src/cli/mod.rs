//! CLI module for Klipp.

pub mod commands;
mod output;

pub use output::Output;

use crate::media::ImageFormat;
use clap::{Parser, Subcommand};

/// Klipp - media tools for AI agents
///
/// Look up video generation models and remove image backgrounds, from the
/// terminal or as tools served over MCP and HTTP.
#[derive(Parser, Debug)]
#[command(name = "klipp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "KLIPP_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start MCP server for AI assistant integration
    Mcp,

    /// Start HTTP API server exposing the tools
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List available tools
    Tools {
        /// Print full definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what one or more video generation models can do
    ModelInfo {
        /// Model identifiers (e.g. "kling/v2.1-master")
        #[arg(required = true)]
        models: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the background from an image
    RemoveBg {
        /// Image URL, data URI or local file path
        image: String,

        /// Output format (png, webp)
        #[arg(short, long)]
        format: Option<ImageFormat>,

        /// Where to save the result
        #[arg(short, long)]
        output: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_info() {
        let cli = Cli::parse_from(["klipp", "-vv", "model-info", "veo-3", "kling/v2.1", "--json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::ModelInfo { models, json } => {
                assert_eq!(models, vec!["veo-3", "kling/v2.1"]);
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_remove_bg_format() {
        let cli = Cli::parse_from(["klipp", "remove-bg", "cat.jpg", "-f", "webp", "-o", "out/"]);
        match cli.command {
            Commands::RemoveBg { image, format, output, json } => {
                assert_eq!(image, "cat.jpg");
                assert_eq!(format, Some(ImageFormat::Webp));
                assert_eq!(output.as_deref(), Some("out/"));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_model_info_requires_a_model() {
        assert!(Cli::try_parse_from(["klipp", "model-info"]).is_err());
        assert!(Cli::try_parse_from(["klipp", "remove-bg", "a.png", "-f", "gif"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
