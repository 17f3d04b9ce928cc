//! Application entry point: bridge-ai.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (defaults on first run) and apply CLI
//!    overrides.
//! 3. Build the LLM fallback and check that its endpoint answers.
//! 4. Locate whisper.cpp and its model, and probe the microphone
//!    (voice mode only).
//! 5. Run the pipeline until Ctrl-C (voice) or end of input (typed).
//!
//! Missing whisper.cpp, a missing model, no microphone or an unreachable
//! LLM are fatal.  Everything after startup is logged and retried.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;

use bridge_ai::{
    audio::{input_device_names, MicrophoneRecorder},
    config::{AppConfig, AppPaths, LlmProvider},
    intent::IntentResolver,
    llm::{backend_from_config, FallbackInterpreter, LlmInterpreter},
    pipeline::BridgePipeline,
    stt::WhisperCli,
    transport::GameClient,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Speak (or type) bridge orders and relay them to the game.
#[derive(Debug, Parser)]
#[command(name = "bridge-ai", version, about)]
struct Cli {
    /// Settings file (default: <config dir>/bridge-ai/settings.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Game host.
    #[arg(long)]
    host: Option<String>,

    /// Game port.
    #[arg(long)]
    port: Option<u16>,

    /// LLM provider: ollama, openai_compatible, gemini or disabled.
    #[arg(long, value_parser = parse_provider)]
    provider: Option<LlmProvider>,

    /// LLM model name.
    #[arg(long)]
    model: Option<String>,

    /// API key for cloud LLM providers.
    #[arg(long, env = "BRIDGE_AI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Input device name (substring match).
    #[arg(long)]
    device: Option<String>,

    /// List input devices and exit.
    #[arg(long)]
    list_devices: bool,

    /// Read orders from stdin instead of the microphone.
    #[arg(long)]
    typed: bool,

    /// Write the effective settings to the settings file and exit.
    #[arg(long)]
    write_config: bool,
}

fn parse_provider(raw: &str) -> Result<LlmProvider, String> {
    raw.parse()
}

impl Cli {
    fn settings_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| AppPaths::new().settings_file)
    }

    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.network.host = host.clone();
        }
        if let Some(port) = self.port {
            config.network.port = port;
        }
        if let Some(provider) = self.provider {
            config.llm.provider = provider;
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(key) = &self.api_key {
            config.llm.api_key = Some(key.clone());
        }
        if let Some(device) = &self.device {
            config.audio.device = Some(device.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

async fn build_resolver(config: &AppConfig) -> Result<IntentResolver> {
    let interpreter = match backend_from_config(&config.llm)? {
        Some(backend) => {
            backend.health_check().await.with_context(|| {
                format!("LLM backend '{}' is not reachable", backend.name())
            })?;
            let interpreter = LlmInterpreter::new(backend, config.llm.min_confidence);
            log::info!(
                "LLM fallback: {} ({})",
                interpreter.backend().name(),
                config.llm.model_name()
            );
            Some(FallbackInterpreter::new(Box::new(interpreter)))
        }
        None => {
            log::info!("LLM fallback disabled; only fast-path phrases will be understood");
            None
        }
    };

    if !config.resolver.fast_path && interpreter.is_none() {
        anyhow::bail!("both the fast path and the LLM are disabled; nothing can parse orders");
    }

    Ok(IntentResolver::new(config.resolver.fast_path, interpreter))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("interrupt received, standing down");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    log::info!("bridge-ai {} starting up", env!("CARGO_PKG_VERSION"));

    // 2. Configuration
    let settings = cli.settings_path();
    let mut config = AppConfig::load_from(&settings)
        .with_context(|| format!("failed to load {}", settings.display()))?;
    cli.apply(&mut config);

    if cli.list_devices {
        for name in input_device_names()? {
            println!("{name}");
        }
        return Ok(());
    }

    if cli.write_config {
        config
            .save_to(&settings)
            .with_context(|| format!("failed to write {}", settings.display()))?;
        println!("wrote {}", settings.display());
        return Ok(());
    }

    // 3. Intent resolution
    let resolver = build_resolver(&config).await?;

    // 4. Game link; the game may start after us.
    let mut link = GameClient::from_config(&config.network);
    if let Err(e) = link.connect().await {
        log::warn!("{e}; will retry on the first order");
    }
    let pipeline = BridgePipeline::new(resolver, Box::new(link));

    // 5. Run
    if cli.typed {
        let mut pipeline = pipeline;
        println!("Type orders, one per line (Ctrl-D to finish).");
        let stdin = BufReader::new(tokio::io::stdin());
        let delivered = tokio::select! {
            delivered = pipeline.run_typed(stdin) => Some(delivered),
            _ = shutdown_signal() => None,
        };
        // run_typed closes the link itself on both of its own exits.
        match delivered {
            Some(Ok(n)) => log::info!("{n} order(s) delivered"),
            Some(Err(e)) => return Err(e).context("failed to read typed orders"),
            None => pipeline.shutdown().await,
        }
        return Ok(());
    }

    let stt = WhisperCli::from_config(&config.stt)
        .context("whisper.cpp is required for voice mode (or run with --typed)")?;
    let recorder = MicrophoneRecorder::new(config.audio.clone());
    let device = recorder
        .probe()
        .context("no usable microphone (or run with --typed)")?;
    log::info!("microphone: {device}");

    let mut pipeline = pipeline.with_voice(Box::new(recorder), Box::new(stt));
    pipeline.run(shutdown_signal()).await;
    Ok(())
}
