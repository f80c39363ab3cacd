//! Layered settings for Rollaball binaries.
//!
//! Each settings type owns a named section. Defaults come from `Default`, the
//! settings file only stores the delta against those defaults.

#[cfg(feature = "bevy")]
mod bevy_adapter;

mod errors;
mod settings;
mod store;

#[cfg(feature = "bevy")]
pub use bevy_adapter::*;

pub use errors::SettingsError;
pub use settings::Settings;
pub use store::{SettingsStore, SettingsStoreBuilder};
