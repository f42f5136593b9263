//! Prompt construction for the joke and flattery requests.
//!
//! Provider-independent: both backends send the same prompt text.  Joke
//! prompts are randomised (type × topic, plus a temperature drawn from
//! [0.85, 1.0]) so the tree doesn't tell the same pun every evening;
//! flattery uses a fixed prompt at the default temperature.  When the
//! session history is non-empty it is appended as a do-not-repeat clause.

use rand::Rng;

/// Token budget for either request — enough for ~50 words with headroom.
pub const MAX_TOKENS: u32 = 150;

/// Default sampling temperature (used for flattery).
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const JOKE_TYPES: [&str; 8] = [
    "pun",
    "one-liner",
    "knock-knock joke",
    "wordplay joke",
    "dad joke",
    "clever joke",
    "silly joke",
    "witty joke",
];

const JOKE_TOPICS: [&str; 8] = [
    "Christmas",
    "the holidays",
    "winter",
    "Santa",
    "reindeer",
    "snow",
    "gifts",
    "family gatherings",
];

const FLATTERY_PROMPT: &str = "Write a humorous, absurdly over-the-top piece of sycophantic \
effusive praise for me. Make it ridiculously flattering. Under 50 words. \
No emojis or non-alphabetic characters.";

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build a randomised joke prompt.  Returns the prompt and the sampling
/// temperature to use for this request.
pub fn joke_prompt<R: Rng>(history: &[String], rng: &mut R) -> (String, f32) {
    let joke_type = JOKE_TYPES[rng.gen_range(0..JOKE_TYPES.len())];
    let topic = JOKE_TOPICS[rng.gen_range(0..JOKE_TOPICS.len())];

    let mut prompt = format!(
        "Share a new, family-friendly {joke_type} about {topic}. Maximum 50 words. \
         Return only the joke text. No emojis or non-alphabetic characters. \
         Be creative and original."
    );
    if !history.is_empty() {
        prompt.push_str("\n\nDo NOT repeat any of these jokes:\n");
        prompt.push_str(&bullets(history));
        prompt.push_str("\n\nMake sure your joke is completely different from all of the above.");
    }

    let temperature = rng.gen_range(0.85..=1.0);
    (prompt, temperature)
}

/// Build the flattery prompt (fixed wording, default temperature).
pub fn flattery_prompt(history: &[String]) -> String {
    let mut prompt = FLATTERY_PROMPT.to_string();
    if !history.is_empty() {
        prompt.push_str("\n\nDo NOT repeat any of this flattery:\n");
        prompt.push_str(&bullets(history));
        prompt
            .push_str("\n\nMake sure your flattery is completely different from all of the above.");
    }
    prompt
}

fn bullets(entries: &[String]) -> String {
    entries
        .iter()
        .map(|e| format!("- {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn joke_prompt_mentions_a_known_type_and_topic() {
        let mut rng = SmallRng::seed_from_u64(1);
        let (prompt, temperature) = joke_prompt(&[], &mut rng);
        assert!(prompt.starts_with("Share a new, family-friendly "));
        assert!(JOKE_TYPES.iter().any(|t| prompt.contains(t)));
        assert!(JOKE_TOPICS.iter().any(|t| prompt.contains(t)));
        assert!((0.85..=1.0).contains(&temperature));
        assert!(!prompt.contains("Do NOT repeat"));
    }

    #[test]
    fn joke_history_becomes_bullet_list() {
        let mut rng = SmallRng::seed_from_u64(2);
        let history = vec![
            "Why did Santa...".to_string(),
            "A snowman walks...".to_string(),
        ];
        let (prompt, _) = joke_prompt(&history, &mut rng);
        assert!(prompt.contains("Do NOT repeat any of these jokes:"));
        assert!(prompt.contains("- Why did Santa..."));
        assert!(prompt.contains("- A snowman walks..."));
    }

    #[test]
    fn flattery_prompt_is_fixed_without_history() {
        assert_eq!(flattery_prompt(&[]), FLATTERY_PROMPT);
    }

    #[test]
    fn flattery_history_clause_uses_flattery_wording() {
        let prompt = flattery_prompt(&["You are magnificent".to_string()]);
        assert!(prompt.contains("Do NOT repeat any of this flattery:"));
        assert!(prompt.contains("- You are magnificent"));
    }

    #[test]
    fn temperatures_vary_across_draws() {
        let mut rng = SmallRng::seed_from_u64(3);
        let temps: Vec<f32> = (0..10).map(|_| joke_prompt(&[], &mut rng).1).collect();
        assert!(temps.iter().any(|t| (t - temps[0]).abs() > 1e-6));
    }
}
