//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\bridge-ai\
//!   macOS:   ~/Library/Application Support/bridge-ai/
//!   Linux:   ~/.config/bridge-ai/
//!
//! Data dir (whisper models):
//!   Windows: %LOCALAPPDATA%\bridge-ai\models\
//!   macOS:   ~/Library/Application Support/bridge-ai/models/
//!   Linux:   ~/.local/share/bridge-ai/models/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory searched for GGML model files before the system locations.
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "bridge-ai";

    /// Resolves all paths using the `dirs` crate, falling back to the
    /// current directory if the platform has no standard location.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let models_dir = data_dir.join("models");

        Self {
            config_dir,
            settings_file,
            models_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
