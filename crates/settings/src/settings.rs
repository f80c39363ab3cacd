use serde::{Serialize, de::DeserializeOwned};

/// A value that can be stored in the settings file.
///
/// `SECTION` is the top-level key the type is stored under. The type must
/// serialize to a struct (a RON map); defaults are never written to disk.
pub trait Settings: Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    const SECTION: &'static str;

    fn name() -> &'static str {
        Self::SECTION
    }
}
