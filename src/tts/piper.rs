//! Piper TTS — the preferred, higher-quality engine.
//!
//! Piper is an external neural synthesiser driven as a subprocess:
//! `piper --model <voice.onnx> --output_file <out.wav>` with the text on
//! stdin.  Both the executable and a voice model must be present for the
//! engine to be eligible; discovery happens once at startup and the result
//! is fixed for the process lifetime.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::TtsConfig;

use super::engine::{TtsEngine, TtsError, validate_output};

const ENGINE_NAME: &str = "Piper TTS";

/// Synthesis deadline.  Piper on a Pi takes a few seconds for a sentence;
/// anything past this is wedged.
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Install locations probed when `PIPER_EXECUTABLE_PATH` is not set, in
/// order (after a `PATH` lookup).
const PROBE_PATHS: [&str; 5] = [
    "/usr/local/bin/piper/piper",
    "/usr/local/bin/piper",
    "/usr/bin/piper",
    "~/.local/bin/piper",
    "/usr/local/piper/piper",
];

// ---------------------------------------------------------------------------
// PiperTts
// ---------------------------------------------------------------------------

/// A discovered, ready-to-run Piper installation.
pub struct PiperTts {
    executable: PathBuf,
    model: PathBuf,
}

impl PiperTts {
    /// Locate Piper from config.  Returns `None` when the executable or the
    /// voice model cannot be found — the caller falls back to espeak-ng.
    pub fn discover(config: &TtsConfig) -> Option<Self> {
        let model = config.piper_model.clone()?;
        if !model.is_file() {
            log::warn!("piper voice model not found: {}", model.display());
            return None;
        }

        let executable = match &config.piper_executable {
            Some(explicit) => {
                if is_executable(explicit) {
                    Some(explicit.clone())
                } else {
                    log::warn!(
                        "PIPER_EXECUTABLE_PATH is not an executable file: {}",
                        explicit.display()
                    );
                    None
                }
            }
            None => find_executable(),
        }?;

        Some(Self { executable, model })
    }

    /// Model file stem, e.g. `en_US-lessac-medium`.
    fn model_name(&self) -> String {
        self.model
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.model.display().to_string())
    }
}

impl TtsEngine for PiperTts {
    fn synthesize(&self, text: &str, output: &Path) -> Result<(), TtsError> {
        let mut child = Command::new(&self.executable)
            .arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TtsError::Spawn {
                engine: "piper",
                source,
            })?;

        // Feed the text and close stdin so piper starts synthesising.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|source| TtsError::Stdin {
                    engine: "piper",
                    source,
                })?;
        }

        // std::process has no built-in deadline; poll try_wait and kill on
        // overrun.
        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        let stderr = child
                            .stderr
                            .take()
                            .map(|mut s| {
                                let mut buf = String::new();
                                use std::io::Read;
                                let _ = s.read_to_string(&mut buf);
                                buf.trim().to_string()
                            })
                            .unwrap_or_default();
                        return Err(TtsError::Failed {
                            engine: "piper",
                            status: status.to_string(),
                            stderr,
                        });
                    }
                    break;
                }
                Ok(None) => {
                    if started.elapsed() >= SYNTHESIS_TIMEOUT {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(TtsError::Timeout {
                            engine: "piper",
                            seconds: SYNTHESIS_TIMEOUT.as_secs(),
                        });
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(source) => {
                    return Err(TtsError::Spawn {
                        engine: "piper",
                        source,
                    });
                }
            }
        }

        validate_output("piper", output)
    }

    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn voice(&self) -> String {
        self.model_name()
    }
}

// ---------------------------------------------------------------------------
// Discovery helpers
// ---------------------------------------------------------------------------

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.is_file()
            && std::fs::metadata(path)
                .map(|m| m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// `PATH` lookup first, then the standard install locations.
fn find_executable() -> Option<PathBuf> {
    if let Some(path_var) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&path_var) {
            let candidate = dir.join("piper");
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }

    PROBE_PATHS
        .iter()
        .map(|p| crate::config::paths::expand(p))
        .find(|candidate| is_executable(candidate))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discover_requires_model_path() {
        let config = TtsConfig {
            piper_model: None,
            ..TtsConfig::default()
        };
        assert!(PiperTts::discover(&config).is_none());
    }

    #[test]
    fn discover_rejects_missing_model_file() {
        let config = TtsConfig {
            piper_model: Some(PathBuf::from("/definitely/not/here.onnx")),
            ..TtsConfig::default()
        };
        assert!(PiperTts::discover(&config).is_none());
    }

    #[test]
    fn discover_rejects_non_executable_explicit_path() {
        let model = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(model.path(), b"onnx").unwrap();
        let not_exec = tempfile::NamedTempFile::new().unwrap();

        let config = TtsConfig {
            piper_model: Some(model.path().to_path_buf()),
            piper_executable: Some(not_exec.path().to_path_buf()),
            ..TtsConfig::default()
        };
        assert!(PiperTts::discover(&config).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn discover_accepts_executable_and_model() {
        use std::os::unix::fs::PermissionsExt;

        let model = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(model.path(), b"onnx").unwrap();

        let exe = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(exe.path(), b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(exe.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = TtsConfig {
            piper_model: Some(model.path().to_path_buf()),
            piper_executable: Some(exe.path().to_path_buf()),
            ..TtsConfig::default()
        };
        let piper = PiperTts::discover(&config).expect("should be eligible");
        assert_eq!(piper.name(), "Piper TTS");
    }

    #[cfg(unix)]
    #[test]
    fn synthesize_validates_output_written_by_subprocess() {
        use std::os::unix::fs::PermissionsExt;

        let model = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(model.path(), b"onnx").unwrap();

        // A fake piper that writes a few bytes to the --output_file arg.
        let exe = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            exe.path(),
            b"#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--output_file\" ]; then out=\"$2\"; fi\n  shift\ndone\ncat > /dev/null\necho fakewav > \"$out\"\n",
        )
        .unwrap();
        std::fs::set_permissions(exe.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
        // Close the write handle so exec doesn't hit ETXTBSY; the path stays alive.
        let exe = exe.into_temp_path();

        let config = TtsConfig {
            piper_model: Some(model.path().to_path_buf()),
            piper_executable: Some(exe.to_path_buf()),
            ..TtsConfig::default()
        };
        let piper = PiperTts::discover(&config).unwrap();

        let out = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        piper
            .synthesize("hello tree", out.path())
            .expect("fake piper should succeed");
    }
}
