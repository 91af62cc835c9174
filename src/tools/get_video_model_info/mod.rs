//! `get_video_model_info` tool.
//!
//! The operation and its tool definition come from the handler; schemas and
//! argument/result types come from the schema module.
//!
//! ```
//! use klipp::tools::get_video_model_info::{
//!     get_video_model_info_input_schema, get_video_model_info_tool_definition,
//!     GetVideoModelInfoInput,
//! };
//!
//! let def = get_video_model_info_tool_definition();
//! assert_eq!(def.name, "get_video_model_info");
//! assert_eq!(&def.input_schema, get_video_model_info_input_schema());
//! assert!(GetVideoModelInfoInput::new("veo-3").validate().is_ok());
//! ```
//!
//! Internals stay behind the barrel:
//!
//! ```compile_fail
//! use klipp::tools::get_video_model_info::handler::get_video_model_info;
//! ```
//!
//! ```compile_fail
//! use klipp::tools::get_video_model_info::is_valid_model_id;
//! ```

mod handler;
mod schema;

pub use handler::{get_video_model_info, get_video_model_info_tool_definition};
pub use schema::{
    get_video_model_info_input_schema, get_video_model_info_output_schema, GetVideoModelInfoInput,
    GetVideoModelInfoOutput,
};
