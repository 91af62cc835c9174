//! Shared media value types used by the tool schemas and providers.

mod image;
mod video;

pub use image::{detect_content_type, ImageFormat, ImageSource};
pub use video::{Pricing, VideoCapability};
