//! Finding the whisper.cpp executable and its GGML model on disk.
//!
//! Search order for the executable:
//! 1. `stt.binary_path` from the config;
//! 2. each `stt.search_paths` directory;
//! 3. the usual source-build and package-manager locations;
//! 4. every directory on `PATH`.
//!
//! The model file `ggml-<model>.bin` is searched for in `stt.model_path`, the
//! `stt.search_paths`, the app's models directory, the usual shared
//! locations, and finally next to the executable.

use std::path::{Path, PathBuf};

use crate::config::{AppPaths, SttConfig};
use crate::stt::engine::SttError;

/// Executable names whisper.cpp has shipped under.
pub const BINARY_NAMES: &[&str] = &["whisper-cli", "whisper-cpp", "main"];

/// File name of the GGML model for `model` (e.g. `"base.en"`).
pub fn model_file_name(model: &str) -> String {
    format!("ggml-{model}.bin")
}

fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Candidate executable paths, in search order.
pub fn binary_candidates(config: &SttConfig) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    candidates.extend(config.binary_path.iter().cloned());

    for dir in &config.search_paths {
        candidates.extend(BINARY_NAMES.iter().map(|name| dir.join(name)));
    }

    if let Some(home) = home_dir() {
        let checkout = home.join("whisper.cpp");
        candidates.push(checkout.join("build/bin/whisper-cli"));
        candidates.push(checkout.join("build/bin/main"));
        candidates.push(checkout.join("main"));
    }
    for prefix in ["/usr/local/bin", "/opt/homebrew/bin", "/usr/bin"] {
        candidates.push(Path::new(prefix).join("whisper-cli"));
        candidates.push(Path::new(prefix).join("whisper-cpp"));
    }

    if let Some(path) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path) {
            candidates.push(dir.join("whisper-cli"));
            candidates.push(dir.join("whisper-cpp"));
        }
    }

    candidates
}

/// Candidate model paths, in search order.
pub fn model_candidates(config: &SttConfig, binary: &Path) -> Vec<PathBuf> {
    let file_name = model_file_name(&config.model);
    let mut candidates = Vec::new();
    candidates.extend(config.model_path.iter().cloned());

    for dir in &config.search_paths {
        candidates.push(dir.join(&file_name));
    }
    candidates.push(AppPaths::new().models_dir.join(&file_name));

    if let Some(home) = home_dir() {
        candidates.push(home.join(".cache/whisper").join(&file_name));
        candidates.push(home.join("whisper.cpp/models").join(&file_name));
    }
    for dir in ["/usr/local/share/whisper", "/opt/homebrew/share/whisper"] {
        candidates.push(Path::new(dir).join(&file_name));
    }

    // `<checkout>/main` and `<checkout>/build/bin/whisper-cli` layouts.
    for ancestor in binary.ancestors().skip(1).take(3) {
        candidates.push(ancestor.join("models").join(&file_name));
    }

    candidates
}

fn first_file(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_file()).cloned()
}

fn searched(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locate the whisper.cpp executable.
pub fn locate_binary(config: &SttConfig) -> Result<PathBuf, SttError> {
    let candidates = binary_candidates(config);
    first_file(&candidates).ok_or_else(|| SttError::BinaryNotFound(searched(&candidates)))
}

/// Locate the GGML model for `config.model`.
pub fn locate_model(config: &SttConfig, binary: &Path) -> Result<PathBuf, SttError> {
    let candidates = model_candidates(config, binary);
    first_file(&candidates).ok_or_else(|| SttError::ModelNotFound(searched(&candidates)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn model_file_name_format() {
        assert_eq!(model_file_name("base.en"), "ggml-base.en.bin");
    }

    #[test]
    fn configured_binary_comes_first() {
        let dir = tempdir().unwrap();
        let binary = dir.path().join("my-whisper");
        touch(&binary);

        let config = SttConfig {
            binary_path: Some(binary.clone()),
            ..SttConfig::default()
        };
        assert_eq!(binary_candidates(&config)[0], binary);
        assert_eq!(locate_binary(&config).unwrap(), binary);
    }

    #[test]
    fn finds_binary_in_search_path() {
        let dir = tempdir().unwrap();
        let binary = dir.path().join("whisper-cli");
        touch(&binary);

        let config = SttConfig {
            search_paths: vec![dir.path().to_path_buf()],
            ..SttConfig::default()
        };
        assert_eq!(locate_binary(&config).unwrap(), binary);
    }

    #[test]
    fn directories_are_not_binaries() {
        let dir = tempdir().unwrap();
        let config = SttConfig {
            binary_path: Some(dir.path().to_path_buf()),
            ..SttConfig::default()
        };
        assert_ne!(locate_binary(&config).ok(), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn finds_model_in_search_path() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("ggml-tiny.en.bin");
        touch(&model);

        let config = SttConfig {
            model: "tiny.en".into(),
            search_paths: vec![dir.path().to_path_buf()],
            ..SttConfig::default()
        };
        assert_eq!(locate_model(&config, Path::new("/nonexistent/main")).unwrap(), model);
    }

    #[test]
    fn finds_model_next_to_source_build() {
        let dir = tempdir().unwrap();
        let binary = dir.path().join("build/bin/whisper-cli");
        let model = dir.path().join("models/ggml-unlikely-test-model.bin");
        touch(&binary);
        touch(&model);

        let config = SttConfig {
            model: "unlikely-test-model".into(),
            ..SttConfig::default()
        };
        assert_eq!(locate_model(&config, &binary).unwrap(), model);
    }

    #[test]
    fn missing_model_lists_searched_paths() {
        let config = SttConfig {
            model: "does-not-exist-anywhere".into(),
            ..SttConfig::default()
        };
        let err = locate_model(&config, Path::new("/nonexistent/main")).unwrap_err();
        match err {
            SttError::ModelNotFound(searched) => {
                assert!(searched.contains("ggml-does-not-exist-anywhere.bin"));
            }
            other => panic!("expected ModelNotFound, got {other:?}"),
        }
    }
}
