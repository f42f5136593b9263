//! Application entry point — voice-controlled Christmas tree.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load `local.env` (optional) and read [`Config`] from the environment.
//! 3. Parse CLI flags (TTS engine, LLM provider).
//! 4. Create [`tokio`] runtime (multi-thread, 2 workers — the LLM providers
//!    run on it, bridged from the audio thread).
//! 5. Build the speech recogniser (fatal when the Vosk model is missing).
//! 6. Choose the TTS engine and LLM provider.
//! 7. Start microphone capture.
//! 8. Spawn the three workers: `lights`, `audio`, `voice`.
//! 9. Block on Ctrl-C, then signal shutdown and join each worker with a
//!    bounded wait.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};

use voice_tree::{
    audio::{AudioController, Player},
    config::Config,
    lights::{LightingController, MemoryTree},
    llm::{GreenPt, LlmProvider, Ollama},
    state::SharedState,
    tts::{EnginePreference, Synthesizer},
    voice::{AudioChunk, Microphone, VoiceRecognizer},
};

/// How long to wait for each worker to exit after shutdown is signalled.
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "voice-tree", about = "Offline voice-controlled Christmas tree")]
struct Cli {
    /// Speech synthesis engine.
    #[arg(long, value_enum, default_value_t = TtsEngineArg::Auto)]
    tts_engine: TtsEngineArg,

    /// Joke / flattery provider.
    #[arg(long, value_enum, default_value_t = LlmProviderArg::Greenpt)]
    llm_provider: LlmProviderArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TtsEngineArg {
    Auto,
    Piper,
    Espeak,
}

impl From<TtsEngineArg> for EnginePreference {
    fn from(arg: TtsEngineArg) -> Self {
        match arg {
            TtsEngineArg::Auto => EnginePreference::Auto,
            TtsEngineArg::Piper => EnginePreference::Piper,
            TtsEngineArg::Espeak => EnginePreference::Espeak,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LlmProviderArg {
    Greenpt,
    Ollama,
}

// ---------------------------------------------------------------------------
// Bounded join
// ---------------------------------------------------------------------------

/// Join `handle` with a timeout; workers that fail to exit are left behind
/// rather than force-killed (best-effort shutdown).
fn join_with_timeout(name: &str, handle: JoinHandle<()>) {
    let deadline = Instant::now() + JOIN_TIMEOUT;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            log::warn!("{name} worker did not exit within {JOIN_TIMEOUT:?}");
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    if handle.join().is_err() {
        log::error!("{name} worker panicked");
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice-tree starting up");

    // 2. Configuration — local.env is optional, real env vars win.
    if dotenvy::from_filename("local.env").is_ok() {
        log::info!("loaded local.env");
    }
    let config = Config::from_env();

    // 3. CLI flags
    let cli = Cli::parse();

    // 4. Tokio runtime for the LLM providers
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 5. Shared state + speech recognition.  A missing model is fatal; the
    //    rest of the system is useless without voice input.
    let state = Arc::new(SharedState::new());
    let (chunk_tx, chunk_rx) = mpsc::channel::<AudioChunk>();
    let recognizer = VoiceRecognizer::new(&config.vosk, Arc::clone(&state), chunk_rx)
        .context("speech recognition unavailable")?;

    // 6. TTS engine + LLM provider
    let synthesizer = Synthesizer::choose(cli.tts_engine.into(), &config.tts);
    let llm: Arc<dyn LlmProvider> = match cli.llm_provider {
        LlmProviderArg::Greenpt => Arc::new(GreenPt::from_config(&config.greenpt)),
        LlmProviderArg::Ollama => Arc::new(Ollama::from_config(&config.ollama)),
    };

    log::info!(
        "configuration: model={} volume={}% tts={}/{} llm={}/{}",
        config.vosk.display_name(),
        config.audio.volume,
        synthesizer.engine_name(),
        synthesizer.voice(),
        llm.provider_name(),
        llm.model_name(),
    );

    // 7. Microphone capture.  The handle must outlive the workers; dropping
    //    it stops the cpal stream.
    let microphone =
        Microphone::open(&config.audio.mic_device).context("microphone unavailable")?;
    let _stream = microphone
        .start(chunk_tx)
        .context("failed to start microphone capture")?;
    log::info!(
        "capture started ({} Hz, {} ch)",
        microphone.sample_rate(),
        microphone.channels()
    );

    // 8. Workers
    let lights = {
        let controller = LightingController::new(MemoryTree::new(), Arc::clone(&state));
        std::thread::Builder::new()
            .name("lights".into())
            .spawn(move || controller.run())
            .context("failed to spawn lights worker")?
    };

    let audio = {
        let player = Player::new(&config.audio.output_device, config.audio.volume);
        let controller = AudioController::new(
            Arc::clone(&state),
            player,
            synthesizer,
            llm,
            rt.handle().clone(),
            &config,
        );
        std::thread::Builder::new()
            .name("audio".into())
            .spawn(move || controller.run())
            .context("failed to spawn audio worker")?
    };

    let voice = std::thread::Builder::new()
        .name("voice".into())
        .spawn(move || recognizer.run())
        .context("failed to spawn voice worker")?;

    log::info!("ready — say \"christmas tree <command>\"");

    // 9. Wait for Ctrl-C, then shut everything down.
    rt.block_on(tokio::signal::ctrl_c())
        .context("failed to listen for ctrl-c")?;
    log::info!("shutting down");
    state.signal_shutdown();

    join_with_timeout("lights", lights);
    join_with_timeout("audio", audio);
    join_with_timeout("voice", voice);

    log::info!("goodbye");
    Ok(())
}
