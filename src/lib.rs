//! Klipp - media tools for AI agents
//!
//! Two tools an agent can call: one describes a video generation model,
//! the other removes the background from an image. Both are served over MCP
//! (stdio) and a small HTTP API, and can be run directly from the CLI.
//!
//! # Architecture
//!
//! - `tools` - tool barrels, definitions and the name-based registry
//! - `provider` - media API abstraction (HTTP and in-memory)
//! - `media` - image and video value types
//! - `mcp` - MCP server
//! - `config` - configuration management
//! - `cli` - command line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use klipp::config::Settings;
//! use klipp::tools::get_video_model_info::{get_video_model_info, GetVideoModelInfoInput};
//! use klipp::tools::ToolContext;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let ctx = ToolContext::from_settings(&settings)?;
//!
//!     let info = get_video_model_info(&ctx, GetVideoModelInfoInput::new("kling/v2.1-master")).await?;
//!     println!("{}", info.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod media;
pub mod provider;
pub mod tools;

pub use error::{KlippError, Result};
