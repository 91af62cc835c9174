//! `image_background_removal` tool.
//!
//! ```
//! use klipp::tools::image_background_removal::{
//!     image_background_removal_output_schema, image_background_removal_tool_definition,
//!     ImageBackgroundRemovalInput,
//! };
//!
//! let def = image_background_removal_tool_definition();
//! assert_eq!(def.name, "image_background_removal");
//! assert_eq!(&def.output_schema, image_background_removal_output_schema());
//! assert!(ImageBackgroundRemovalInput::new("https://example.com/cat.jpg").validate().is_ok());
//! ```
//!
//! ```compile_fail
//! use klipp::tools::image_background_removal::schema::ImageBackgroundRemovalInput;
//! ```
//!
//! ```compile_fail
//! use klipp::tools::image_background_removal::resolve_output_path;
//! ```

mod handler;
mod schema;

pub use handler::{image_background_removal, image_background_removal_tool_definition};
pub use schema::{
    image_background_removal_input_schema, image_background_removal_output_schema,
    ImageBackgroundRemovalInput, ImageBackgroundRemovalOutput,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{BackgroundRemovalResponse, MemoryMediaProvider};
    use crate::tools::ToolContext;
    use std::any::TypeId;
    use std::sync::Arc;

    #[test]
    fn test_values_are_the_origin_values() {
        assert!(std::ptr::eq(
            image_background_removal_tool_definition(),
            handler::image_background_removal_tool_definition()
        ));
        assert!(std::ptr::eq(
            image_background_removal_input_schema(),
            schema::image_background_removal_input_schema()
        ));
        assert!(std::ptr::eq(
            image_background_removal_output_schema(),
            schema::image_background_removal_output_schema()
        ));
    }

    #[test]
    fn test_types_are_the_origin_types() {
        assert_eq!(
            TypeId::of::<ImageBackgroundRemovalInput>(),
            TypeId::of::<schema::ImageBackgroundRemovalInput>()
        );
        assert_eq!(
            TypeId::of::<ImageBackgroundRemovalOutput>(),
            TypeId::of::<schema::ImageBackgroundRemovalOutput>()
        );
    }

    #[tokio::test]
    async fn test_call_through_barrel_matches_direct_call() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MemoryMediaProvider::new().with_removal_response(BackgroundRemovalResponse {
            image_url: Some("https://cdn.test/cutout.png".to_string()),
            width: Some(10),
            height: Some(10),
            ..Default::default()
        });
        let ctx = ToolContext::new(Arc::new(provider), dir.path().to_path_buf());

        let via_barrel = image_background_removal(&ctx, ImageBackgroundRemovalInput::new("https://x.test/a.jpg"))
            .await
            .unwrap();
        let direct = handler::image_background_removal(
            &ctx,
            schema::ImageBackgroundRemovalInput::new("https://x.test/a.jpg"),
        )
        .await
        .unwrap();

        assert_eq!(via_barrel, direct);
    }
}
