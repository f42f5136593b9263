//! The command grammar and utterance parsing.
//!
//! Every valid utterance has the shape `christmas tree <word> [trailing
//! text]`.  [`grammar_phrases`] enumerates the full phrase set handed to
//! the recogniser to bias decoding; [`parse_utterance`] turns a finalised
//! lowercase transcript into a [`Command`]; [`Command::apply`] performs
//! the matching state mutation.  Anything unmatched is a silent no-op.

use std::sync::Arc;

use crate::lights::NamedColour;
use crate::state::{AudioKind, Mode, SharedState};

/// Every utterance starts with this wake phrase.
pub const WAKE_PHRASE: &str = "christmas tree";

/// Command words other than colour names, in grammar order.
const COMMAND_WORDS: [&str; 8] = [
    "disco", "phase", "speak", "generate", "sing", "joke", "flatter", "gb",
];

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// The full phrase list for grammar-constrained recognition: one
/// `christmas tree <word>` phrase per colour and per command word.
pub fn grammar_phrases() -> Vec<String> {
    NamedColour::ALL
        .iter()
        .map(|c| c.word())
        .chain(COMMAND_WORDS)
        .map(|word| format!("{WAKE_PHRASE} {word}"))
        .collect()
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed voice command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetMode(Mode),
    /// Raise an audio request; text only for the "generate" command.
    Audio(AudioKind, Option<String>),
}

/// Parse a finalised lowercase transcript.  Returns `None` for anything
/// that is not `christmas tree <known word> [trailing text]`.
pub fn parse_utterance(utterance: &str) -> Option<Command> {
    let rest = utterance.trim().strip_prefix(WAKE_PHRASE)?;
    // The wake phrase must be a whole-word prefix.
    let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();

    let (word, trailing) = match rest.split_once(char::is_whitespace) {
        Some((word, trailing)) => (word, trailing.trim()),
        None => (rest, ""),
    };
    if word.is_empty() {
        return None;
    }

    if let Some(colour) = NamedColour::from_word(word) {
        return Some(Command::SetMode(Mode::Solid(colour)));
    }

    match word {
        "disco" => Some(Command::SetMode(Mode::Disco)),
        "phase" => Some(Command::SetMode(Mode::Phase)),
        "gb" => Some(Command::SetMode(Mode::Flag)),
        "speak" => Some(Command::Audio(AudioKind::Clip, None)),
        "sing" => Some(Command::Audio(AudioKind::Song, None)),
        "generate" => {
            let text = (!trailing.is_empty()).then(|| trailing.to_string());
            Some(Command::Audio(AudioKind::Synthesize, text))
        }
        "joke" => Some(Command::Audio(AudioKind::Joke, None)),
        "flatter" => Some(Command::Audio(AudioKind::Flattery, None)),
        _ => None,
    }
}

impl Command {
    /// Apply this command to the shared state.
    pub fn apply(self, state: &Arc<SharedState>) {
        match self {
            Command::SetMode(mode) => state.set_mode(mode),
            Command::Audio(kind, text) => state.request_audio(kind, text),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_covers_every_colour_and_command() {
        let phrases = grammar_phrases();
        assert_eq!(phrases.len(), NamedColour::ALL.len() + COMMAND_WORDS.len());
        assert!(phrases.contains(&"christmas tree red".to_string()));
        assert!(phrases.contains(&"christmas tree gb".to_string()));
        assert!(phrases.iter().all(|p| p.starts_with("christmas tree ")));
    }

    #[test]
    fn colour_words_become_solid_modes() {
        assert_eq!(
            parse_utterance("christmas tree red"),
            Some(Command::SetMode(Mode::Solid(NamedColour::Red)))
        );
        assert_eq!(
            parse_utterance("christmas tree black"),
            Some(Command::SetMode(Mode::Solid(NamedColour::Black)))
        );
    }

    #[test]
    fn pattern_words_become_modes() {
        assert_eq!(
            parse_utterance("christmas tree disco"),
            Some(Command::SetMode(Mode::Disco))
        );
        assert_eq!(
            parse_utterance("christmas tree phase"),
            Some(Command::SetMode(Mode::Phase))
        );
        assert_eq!(
            parse_utterance("christmas tree gb"),
            Some(Command::SetMode(Mode::Flag))
        );
    }

    #[test]
    fn audio_words_become_requests() {
        assert_eq!(
            parse_utterance("christmas tree speak"),
            Some(Command::Audio(AudioKind::Clip, None))
        );
        assert_eq!(
            parse_utterance("christmas tree sing"),
            Some(Command::Audio(AudioKind::Song, None))
        );
        assert_eq!(
            parse_utterance("christmas tree joke"),
            Some(Command::Audio(AudioKind::Joke, None))
        );
        assert_eq!(
            parse_utterance("christmas tree flatter"),
            Some(Command::Audio(AudioKind::Flattery, None))
        );
    }

    #[test]
    fn generate_captures_trailing_text() {
        assert_eq!(
            parse_utterance("christmas tree generate merry christmas everyone"),
            Some(Command::Audio(
                AudioKind::Synthesize,
                Some("merry christmas everyone".into())
            ))
        );
    }

    #[test]
    fn generate_without_text_carries_none() {
        assert_eq!(
            parse_utterance("christmas tree generate"),
            Some(Command::Audio(AudioKind::Synthesize, None))
        );
    }

    #[test]
    fn trailing_text_on_other_commands_is_ignored() {
        // The word still matches; the extra text is discarded.
        assert_eq!(
            parse_utterance("christmas tree disco party time"),
            Some(Command::SetMode(Mode::Disco))
        );
    }

    #[test]
    fn unmatched_utterances_are_none() {
        assert_eq!(parse_utterance(""), None);
        assert_eq!(parse_utterance("christmas tree"), None);
        assert_eq!(parse_utterance("christmas tree sparkle"), None);
        assert_eq!(parse_utterance("hello tree red"), None);
        assert_eq!(parse_utterance("christmas treehouse red"), None);
    }

    #[test]
    fn apply_mutates_shared_state() {
        let state = Arc::new(SharedState::new());

        parse_utterance("christmas tree green")
            .unwrap()
            .apply(&state);
        assert_eq!(state.mode(), Mode::Solid(NamedColour::Green));

        parse_utterance("christmas tree generate ho ho ho")
            .unwrap()
            .apply(&state);
        assert!(state.wait_audio_request(std::time::Duration::from_millis(1)));
        let request = state.begin_playback().unwrap();
        assert_eq!(request.kind, AudioKind::Synthesize);
        assert_eq!(request.text.as_deref(), Some("ho ho ho"));
    }
}
