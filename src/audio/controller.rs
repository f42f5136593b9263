//! The audio worker — serialises all audio output and coordinates the
//! lighting suppression around it.
//!
//! The worker blocks on the shared audio-request signal with a 500 ms
//! timeout so shutdown is noticed promptly even when nobody is talking to
//! the tree.  On a request it claims the single-slot mailbox (which
//! overrides the lighting mode), dispatches by kind, and restores the mode
//! when done.  Every failure along the way is logged and swallowed — the
//! request is always cleared so the system cannot wedge, and no error ever
//! crosses the thread boundary.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::config::Config;
use crate::llm::LlmProvider;
use crate::state::{AudioKind, AudioRequest, SharedState};
use crate::tts::Synthesis;

use super::player::Playback;

/// Bounded wait on the audio-request signal, so the shutdown flag is
/// re-checked twice a second.
pub const REQUEST_WAIT: Duration = Duration::from_millis(500);

/// Maximum playback time for the bundled "speak" clip.
pub const CLIP_DURATION_CAP: Duration = Duration::from_secs(10);

/// Spoken when "generate" arrives without trailing text.
pub const DEFAULT_GENERATE_TEXT: &str = "Hello everyone, this is your Christmas tree talking";

// ---------------------------------------------------------------------------
// AudioController
// ---------------------------------------------------------------------------

/// Owns the playback stack, the synthesis engines and the LLM provider.
/// Exactly one audio action runs at a time; playback blocks the worker for
/// its full duration by design.
pub struct AudioController<P: Playback, S: Synthesis> {
    state: Arc<SharedState>,
    player: P,
    synth: S,
    llm: Arc<dyn LlmProvider>,
    /// Handle into the tokio runtime the providers live on; the worker
    /// bridges with `block_on`.
    runtime: Handle,
    clip_path: PathBuf,
    song_path: PathBuf,
    /// `JOKE_TEXT` override: spoken verbatim, provider and history bypassed.
    joke_override: Option<String>,
}

impl<P: Playback, S: Synthesis> AudioController<P, S> {
    pub fn new(
        state: Arc<SharedState>,
        player: P,
        synth: S,
        llm: Arc<dyn LlmProvider>,
        runtime: Handle,
        config: &Config,
    ) -> Self {
        Self {
            state,
            player,
            synth,
            llm,
            runtime,
            clip_path: config.audio.clip_path.clone(),
            song_path: config.audio.song_path.clone(),
            joke_override: config.joke_text.clone(),
        }
    }

    /// Worker loop.
    pub fn run(self) {
        log::info!("audio worker started");
        while !self.state.is_shutdown() {
            self.service_next(REQUEST_WAIT);
        }
        log::info!("audio worker stopped");
    }

    /// Wait up to `timeout` for a request and service it.  Returns `true`
    /// when a request was dispatched (tests drive this directly).
    pub fn service_next(&self, timeout: Duration) -> bool {
        if !self.state.wait_audio_request(timeout) {
            return false;
        }
        if self.state.is_shutdown() {
            return false;
        }

        // A raised signal without a kind in the slot is a spurious wake;
        // end_playback just clears the signal in that case.
        let Some(request) = self.state.begin_playback() else {
            self.state.end_playback();
            return false;
        };

        log::info!("audio request: {}", request.kind.word());
        self.dispatch(request);
        self.state.end_playback();
        true
    }

    fn dispatch(&self, request: AudioRequest) {
        match request.kind {
            AudioKind::Clip => self.play_file(&self.clip_path, Some(CLIP_DURATION_CAP)),
            AudioKind::Song => self.play_file(&self.song_path, None),
            AudioKind::Synthesize => {
                let text = request
                    .text
                    .unwrap_or_else(|| DEFAULT_GENERATE_TEXT.to_string());
                self.speak(&text);
            }
            AudioKind::Joke => self.tell_joke(),
            AudioKind::Flattery => self.flatter(),
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    fn play_file(&self, path: &Path, cap: Option<Duration>) {
        if let Err(err) = self.player.play(path, cap) {
            log::warn!("skipping playback of {}: {err}", path.display());
        }
    }

    /// Synthesise and play; the scratch WAV lives until the play returns.
    fn speak(&self, text: &str) {
        log::info!("speaking: {text}");
        match self.synth.to_wav(text) {
            Ok(wav) => self.play_file(wav.path(), None),
            Err(err) => log::warn!("speech synthesis failed: {err}"),
        }
    }

    fn tell_joke(&self) {
        if let Some(joke) = &self.joke_override {
            self.speak(joke);
            return;
        }

        let history = self.state.joke_history();
        match self.runtime.block_on(self.llm.joke(&history)) {
            Ok(joke) => {
                self.state.push_joke(joke.clone());
                self.speak(&joke);
            }
            Err(err) => log::warn!("failed to fetch joke: {err}"),
        }
    }

    fn flatter(&self) {
        let history = self.state.flattery_history();
        match self.runtime.block_on(self.llm.flattery(&history)) {
            Ok(flattery) => {
                self.state.push_flattery(flattery.clone());
                self.speak(&flattery);
            }
            Err(err) => log::warn!("failed to fetch flattery: {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::player::PlaybackError;
    use crate::lights::NamedColour;
    use crate::llm::LlmError;
    use crate::state::Mode;
    use crate::tts::TtsError;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Records every play call; optionally fails them all.
    #[derive(Clone, Default)]
    struct RecordingPlayer {
        plays: Arc<Mutex<Vec<(PathBuf, Option<Duration>)>>>,
        fail_missing: bool,
    }

    impl Playback for RecordingPlayer {
        fn play(&self, path: &Path, cap: Option<Duration>) -> Result<(), PlaybackError> {
            if self.fail_missing {
                return Err(PlaybackError::Missing(path.into()));
            }
            self.plays.lock().unwrap().push((path.into(), cap));
            Ok(())
        }
    }

    /// Writes the text into a scratch "WAV" so the play path is exercised.
    struct FakeSynth;

    impl Synthesis for FakeSynth {
        fn to_wav(&self, text: &str) -> Result<tempfile::NamedTempFile, TtsError> {
            let mut wav = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
            wav.write_all(text.as_bytes()).unwrap();
            Ok(wav)
        }
    }

    /// Fixed responses; `None` means the call fails.
    struct FakeLlm {
        joke: Option<String>,
        flattery: Option<String>,
        joke_calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl FakeLlm {
        fn returning(joke: Option<&str>, flattery: Option<&str>) -> Self {
            Self {
                joke: joke.map(String::from),
                flattery: flattery.map(String::from),
                joke_calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for FakeLlm {
        async fn joke(&self, history: &[String]) -> Result<String, LlmError> {
            self.joke_calls.lock().unwrap().push(history.to_vec());
            self.joke.clone().ok_or(LlmError::EmptyResponse)
        }

        async fn flattery(&self, _history: &[String]) -> Result<String, LlmError> {
            self.flattery.clone().ok_or(LlmError::EmptyResponse)
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }

        fn model_name(&self) -> String {
            "fake-model".into()
        }
    }

    struct Fixture {
        state: Arc<SharedState>,
        plays: Arc<Mutex<Vec<(PathBuf, Option<Duration>)>>>,
        joke_calls: Arc<Mutex<Vec<Vec<String>>>>,
        controller: AudioController<RecordingPlayer, FakeSynth>,
        _rt: tokio::runtime::Runtime,
    }

    fn fixture(config: Config, llm: FakeLlm, fail_playback: bool) -> Fixture {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let state = Arc::new(SharedState::new());
        let player = RecordingPlayer {
            fail_missing: fail_playback,
            ..RecordingPlayer::default()
        };
        let plays = Arc::clone(&player.plays);
        let joke_calls = Arc::clone(&llm.joke_calls);
        let controller = AudioController::new(
            Arc::clone(&state),
            player,
            FakeSynth,
            Arc::new(llm),
            rt.handle().clone(),
            &config,
        );
        Fixture {
            state,
            plays,
            joke_calls,
            controller,
            _rt: rt,
        }
    }

    fn config() -> Config {
        Config {
            joke_text: None,
            ..Config::default()
        }
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    #[test]
    fn clip_plays_with_duration_cap() {
        let fx = fixture(config(), FakeLlm::returning(None, None), false);
        fx.state.request_audio(AudioKind::Clip, None);
        assert!(fx.controller.service_next(Duration::from_millis(10)));

        let plays = fx.plays.lock().unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].0, PathBuf::from("speech.mp3"));
        assert_eq!(plays[0].1, Some(CLIP_DURATION_CAP));
    }

    #[test]
    fn song_plays_uncapped() {
        let fx = fixture(config(), FakeLlm::returning(None, None), false);
        fx.state.request_audio(AudioKind::Song, None);
        fx.controller.service_next(Duration::from_millis(10));

        let plays = fx.plays.lock().unwrap();
        assert_eq!(plays[0].0, PathBuf::from("song.mp3"));
        assert_eq!(plays[0].1, None);
    }

    #[test]
    fn generate_speaks_pending_text() {
        let fx = fixture(config(), FakeLlm::returning(None, None), false);
        fx.state
            .request_audio(AudioKind::Synthesize, Some("hello world".into()));
        fx.controller.service_next(Duration::from_millis(10));

        // One play of a synthesized scratch wav, to completion.
        let plays = fx.plays.lock().unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].1, None);
        assert_eq!(plays[0].0.extension().unwrap(), "wav");
    }

    #[test]
    fn generate_without_text_uses_default() {
        // The default text synthesizes fine; just check one play happened.
        let fx = fixture(config(), FakeLlm::returning(None, None), false);
        fx.state.request_audio(AudioKind::Synthesize, None);
        fx.controller.service_next(Duration::from_millis(10));
        assert_eq!(fx.plays.lock().unwrap().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Jokes and flattery
    // -----------------------------------------------------------------------

    #[test]
    fn joke_success_appends_history_and_speaks() {
        let fx = fixture(config(), FakeLlm::returning(Some("why did..."), None), false);
        fx.state.request_audio(AudioKind::Joke, None);
        fx.controller.service_next(Duration::from_millis(10));

        assert_eq!(fx.state.joke_history(), vec!["why did...".to_string()]);
        assert_eq!(fx.plays.lock().unwrap().len(), 1);
    }

    #[test]
    fn joke_failure_is_logged_skip() {
        let fx = fixture(config(), FakeLlm::returning(None, None), false);
        fx.state.request_audio(AudioKind::Joke, None);
        fx.controller.service_next(Duration::from_millis(10));

        assert!(fx.state.joke_history().is_empty());
        assert!(fx.plays.lock().unwrap().is_empty());
        // The request was still cleared.
        assert!(!fx.state.wait_audio_request(Duration::from_millis(1)));
    }

    #[test]
    fn joke_passes_history_to_provider() {
        let fx = fixture(config(), FakeLlm::returning(Some("new joke"), None), false);
        fx.state.push_joke("old joke".into());
        fx.state.request_audio(AudioKind::Joke, None);
        fx.controller.service_next(Duration::from_millis(10));

        let calls = fx.joke_calls.lock().unwrap();
        assert_eq!(calls[0], vec!["old joke".to_string()]);
    }

    #[test]
    fn hardcoded_joke_bypasses_provider_and_history() {
        let cfg = Config {
            joke_text: Some("the canned one".into()),
            ..Config::default()
        };
        let fx = fixture(cfg, FakeLlm::returning(Some("api joke"), None), false);
        fx.state.request_audio(AudioKind::Joke, None);
        fx.controller.service_next(Duration::from_millis(10));

        assert!(fx.joke_calls.lock().unwrap().is_empty());
        assert!(fx.state.joke_history().is_empty());
        assert_eq!(fx.plays.lock().unwrap().len(), 1);
    }

    #[test]
    fn flattery_success_appends_its_own_history() {
        let fx = fixture(config(), FakeLlm::returning(None, Some("dazzling")), false);
        fx.state.request_audio(AudioKind::Flattery, None);
        fx.controller.service_next(Duration::from_millis(10));

        assert_eq!(fx.state.flattery_history(), vec!["dazzling".to_string()]);
        assert!(fx.state.joke_history().is_empty());
    }

    // -----------------------------------------------------------------------
    // Mode restoration / failure semantics
    // -----------------------------------------------------------------------

    #[test]
    fn mode_is_restored_after_service() {
        let fx = fixture(config(), FakeLlm::returning(None, None), false);
        fx.state.set_mode(Mode::Solid(NamedColour::Green));
        fx.state.request_audio(AudioKind::Clip, None);
        fx.controller.service_next(Duration::from_millis(10));
        assert_eq!(fx.state.mode(), Mode::Solid(NamedColour::Green));
    }

    #[test]
    fn playback_failure_still_clears_request_and_restores_mode() {
        let fx = fixture(config(), FakeLlm::returning(None, None), true);
        fx.state.set_mode(Mode::Phase);
        fx.state.request_audio(AudioKind::Song, None);
        fx.controller.service_next(Duration::from_millis(10));

        assert_eq!(fx.state.mode(), Mode::Phase);
        assert!(!fx.state.wait_audio_request(Duration::from_millis(1)));
    }

    #[test]
    fn timeout_without_request_returns_false() {
        let fx = fixture(config(), FakeLlm::returning(None, None), false);
        assert!(!fx.controller.service_next(Duration::from_millis(10)));
    }

    #[test]
    fn run_exits_promptly_on_shutdown() {
        let fx = fixture(config(), FakeLlm::returning(None, None), false);
        let state = Arc::clone(&fx.state);
        let controller = fx.controller;

        let handle = std::thread::spawn(move || controller.run());
        std::thread::sleep(Duration::from_millis(50));
        state.signal_shutdown();
        handle.join().expect("audio worker should exit");
    }
}
