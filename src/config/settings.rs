//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section is `#[serde(default)]`, so a partial `settings.toml` only
//! overrides the keys it names.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

/// Where the game listens for commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
    /// Seconds allowed for the TCP connect.
    pub connect_timeout_secs: u64,
    /// Seconds to wait for the game's reply line after a send.
    pub ack_timeout_secs: u64,
}

impl NetworkConfig {
    /// `host:port` as passed to `TcpStream::connect`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.ack_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5005,
            connect_timeout_secs: 5,
            ack_timeout_secs: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the external whisper.cpp transcriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Explicit path to the whisper.cpp executable.  `None` searches the
    /// usual install locations.
    pub binary_path: Option<PathBuf>,
    /// Explicit path to a GGML model file.  `None` searches for
    /// `ggml-<model>.bin`.
    pub model_path: Option<PathBuf>,
    /// Model name / file stem (e.g. `"base.en"`).
    pub model: String,
    /// Spoken language as an ISO-639-1 code.
    pub language: String,
    /// Seconds before a transcription subprocess is killed.
    pub timeout_secs: u64,
    /// Extra directories searched for both the binary and the model.
    pub search_paths: Vec<PathBuf>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            model_path: None,
            model: "base.en".into(),
            language: "en".into(),
            timeout_secs: 30,
            search_paths: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// LlmProvider
// ---------------------------------------------------------------------------

/// Selects which LLM backend interprets utterances the fast path misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Ollama running locally, native `/api/chat`.  No authentication.
    Ollama,
    /// Any OpenAI-compatible REST API (OpenAI, Groq, LM Studio …).
    OpenAiCompatible,
    /// Google Gemini `generateContent`.  Requires an API key.
    Gemini,
    /// No LLM; only the fast path resolves commands.
    Disabled,
}

impl LlmProvider {
    /// Endpoint used when `llm.base_url` is not set.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAiCompatible => "https://api.openai.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::Disabled => "",
        }
    }

    /// Model used when `llm.model` is empty or still the Ollama default.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Ollama => OLLAMA_DEFAULT_MODEL,
            Self::OpenAiCompatible => "gpt-4o-mini",
            Self::Gemini => "gemini-1.5-flash",
            Self::Disabled => "",
        }
    }
}

const OLLAMA_DEFAULT_MODEL: &str = "tinyllama";

impl Default for LlmProvider {
    fn default() -> Self {
        Self::Ollama
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "open_ai" | "openai_compatible" | "open_ai_compatible" => {
                Ok(Self::OpenAiCompatible)
            }
            "gemini" => Ok(Self::Gemini),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            other => Err(format!(
                "unknown LLM provider '{other}' (expected ollama, openai, gemini or disabled)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the LLM fallback parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which backend to use.
    pub provider: LlmProvider,
    /// Base URL of the API endpoint.  `None` uses the provider's default.
    pub base_url: Option<String>,
    /// API key.  `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"tinyllama"`).
    pub model: String,
    /// Sampling temperature.  Kept low for consistent JSON.
    pub temperature: f32,
    /// Maximum seconds to wait for an LLM response.
    pub timeout_secs: u64,
    /// Replies below this confidence are rejected.
    pub min_confidence: f64,
}

impl LlmConfig {
    /// Configured base URL or the provider default, without a trailing `/`.
    pub fn endpoint(&self) -> String {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Model identifier to send to the provider.
    ///
    /// The shipped default names an Ollama model, so switching `provider`
    /// without setting `model` picks that provider's own default instead.
    pub fn model_name(&self) -> &str {
        let model = self.model.trim();
        let inherited = self.provider != LlmProvider::Ollama && model == OLLAMA_DEFAULT_MODEL;
        if model.is_empty() || inherited {
            self.provider.default_model()
        } else {
            model
        }
    }

    /// The API key if one is set and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: None,
            api_key: None,
            model: OLLAMA_DEFAULT_MODEL.into(),
            temperature: 0.1,
            timeout_secs: 30,
            min_confidence: 0.3,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for microphone capture and silence detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Input device name (substring match); the system default when unset.
    pub device: Option<String>,
    /// Samples per RMS window.
    pub window: usize,
    /// RMS level (0.0 – 1.0 full scale) above which a window counts as speech.
    pub silence_threshold: f32,
    /// Seconds of quiet after speech that end a recording.
    pub silence_duration_secs: f32,
    /// Hard cap on a single recording.
    pub max_record_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            window: 1024,
            silence_threshold: 0.015,
            silence_duration_secs: 1.5,
            max_record_secs: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// ResolverConfig
// ---------------------------------------------------------------------------

/// Settings for utterance resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Try the deterministic pattern matcher before the LLM.
    pub fast_path: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { fast_path: true }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use bridge_ai::config::{AppConfig, AppPaths};
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load_from(&AppPaths::new().settings_file).unwrap();
/// assert_eq!(config.network.port, 5005);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub stt: SttConfig,
    pub llm: LlmConfig,
    pub audio: AudioConfig,
    pub resolver: ResolverConfig,
}

impl AppConfig {
    /// Load from `path`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.network.host, "127.0.0.1");
        assert_eq!(cfg.network.port, 5005);
        assert_eq!(cfg.network.address(), "127.0.0.1:5005");
        assert_eq!(cfg.network.ack_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.stt.model, "base.en");
        assert_eq!(cfg.stt.language, "en");
        assert_eq!(cfg.stt.timeout_secs, 30);
        assert_eq!(cfg.llm.provider, LlmProvider::Ollama);
        assert_eq!(cfg.llm.model, "tinyllama");
        assert_eq!(cfg.llm.min_confidence, 0.3);
        assert_eq!(cfg.llm.endpoint(), "http://localhost:11434");
        assert!(cfg.llm.api_key.is_none());
        assert_eq!(cfg.audio.window, 1024);
        assert_eq!(cfg.audio.silence_duration_secs, 1.5);
        assert_eq!(cfg.audio.max_record_secs, 10.0);
        assert!(cfg.resolver.fast_path);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[network]\nport = 6000\n\n[llm]\nprovider = \"gemini\"\napi_key = \"k\"\n",
        )
        .expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.network.port, 6000);
        assert_eq!(cfg.network.host, "127.0.0.1");
        assert_eq!(cfg.llm.provider, LlmProvider::Gemini);
        assert_eq!(cfg.llm.endpoint(), "https://generativelanguage.googleapis.com");
        assert_eq!(cfg.llm.api_key(), Some("k"));
        assert_eq!(cfg.stt.model, "base.en");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.network.host = "192.168.1.20".into();
        cfg.stt.binary_path = Some(PathBuf::from("/opt/whisper/main"));
        cfg.stt.search_paths = vec![PathBuf::from("/srv/models")];
        cfg.llm.provider = LlmProvider::OpenAiCompatible;
        cfg.llm.base_url = Some("https://api.groq.com/openai/".into());
        cfg.llm.api_key = Some("sk-test".into());
        cfg.resolver.fast_path = false;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
        assert_eq!(loaded.llm.endpoint(), "https://api.groq.com/openai");
    }

    #[test]
    fn model_follows_provider_unless_set() {
        let mut cfg = LlmConfig::default();
        assert_eq!(cfg.model_name(), "tinyllama");

        cfg.provider = LlmProvider::Gemini;
        assert_eq!(cfg.model_name(), "gemini-1.5-flash");
        cfg.provider = LlmProvider::OpenAiCompatible;
        assert_eq!(cfg.model_name(), "gpt-4o-mini");

        cfg.model = "llama-3.1-8b-instant".into();
        assert_eq!(cfg.model_name(), "llama-3.1-8b-instant");

        cfg.provider = LlmProvider::Ollama;
        cfg.model = "  ".into();
        assert_eq!(cfg.model_name(), "tinyllama");
    }

    #[test]
    fn partial_gemini_file_gets_a_gemini_model() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("gemini.toml");
        std::fs::write(&path, "[llm]\nprovider = \"gemini\"\napi_key = \"k\"\n").expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.llm.model_name(), "gemini-1.5-flash");
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        let cfg = LlmConfig {
            api_key: Some(String::new()),
            ..LlmConfig::default()
        };
        assert_eq!(cfg.api_key(), None);
    }

    #[test]
    fn provider_parses_from_cli_spellings() {
        assert_eq!("ollama".parse::<LlmProvider>(), Ok(LlmProvider::Ollama));
        assert_eq!("OpenAI".parse::<LlmProvider>(), Ok(LlmProvider::OpenAiCompatible));
        assert_eq!("open-ai-compatible".parse::<LlmProvider>(), Ok(LlmProvider::OpenAiCompatible));
        assert_eq!("gemini".parse::<LlmProvider>(), Ok(LlmProvider::Gemini));
        assert_eq!("off".parse::<LlmProvider>(), Ok(LlmProvider::Disabled));
        assert!("claude".parse::<LlmProvider>().is_err());
    }
}
