//! Where Rollaball binaries keep their files.
//!
//! Layout below the base directory:
//!
//! ```text
//! <base>/<studio>/<project>/<app_id>.settings.ron
//! <base>/<studio>/<project>/logs/<app_id>.<timestamp>.log
//! ```
//!
//! Installed binaries use the platform's local data directory as base.

use std::io;
use std::path::{Path, PathBuf};

const SETTINGS_EXTENSION: &str = "settings.ron";
const LOGS_DIR: &str = "logs";
const LOG_TIMESTAMP: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    project_root: PathBuf,
    app_id: &'static str,
}

impl PathContext {
    /// Paths below the platform data directory, or the working directory where
    /// the platform has none.
    pub fn new(studio: &str, project_id: &str, app_id: &'static str) -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_base_path(base, studio, project_id, app_id)
    }

    pub fn with_base_path(
        base_path: impl AsRef<Path>,
        studio: &str,
        project_id: &str,
        app_id: &'static str,
    ) -> Self {
        Self {
            project_root: base_path.as_ref().join(studio).join(project_id),
            app_id,
        }
    }

    pub fn app_id(&self) -> &str {
        self.app_id
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Settings file of `app_id`, or of this application when `None`.
    pub fn settings_file(&self, app_id: Option<&str>) -> PathBuf {
        let app_id = app_id.unwrap_or(self.app_id);
        self.project_root
            .join(format!("{app_id}.{SETTINGS_EXTENSION}"))
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.project_root.join(LOGS_DIR)
    }

    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir()
            .join(format!("{}.{timestamp}.log", self.app_id))
    }

    /// Log file named after the current local time.
    pub fn log_file_now(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format(LOG_TIMESTAMP).to_string();
        self.log_file(&timestamp)
    }

    /// Creates the project root and its log directory.
    pub fn ensure_directories(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.logs_dir())
    }
}
