//! CLI command implementations.

mod config;
mod mcp;
mod model_info;
mod remove_bg;
mod serve;
mod tools;

pub use config::run_config;
pub use mcp::run_mcp;
pub use model_info::run_model_info;
pub use remove_bg::run_remove_bg;
pub use serve::run_serve;
pub use tools::run_tools;
