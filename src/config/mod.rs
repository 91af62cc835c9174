//! Configuration module for Klipp.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    BackgroundRemovalSettings, GeneralSettings, ProviderKind, ProviderSettings, ServerSettings,
    Settings,
};
