use std::{fs, path::Path};

use anyhow::{anyhow, Result};
use rand::{seq::SliceRandom, RngCore};
use tracing::{debug, warn};

use super::{choose_difficulty, judge, read_answer, QuestionProvider, STANDARD_MAX_VALUES};
use crate::{
    console::Console,
    models::{Difficulty, GameConfig, Outcome, ProviderOptions},
};

/// Seconds per word, indexed by difficulty.
const ANSWER_TIMEOUTS: [u64; 4] = [20, 15, 10, 5];

const BUILTIN_WORDS: &[&str] = &[
    "cosa", "anno", "uomo", "momento", "modo", "mondo", "parola", "mano", "maggio",
    "commissione", "dito", "passione", "fenomeno", "banana", "computer", "bicchiere",
    "aspirina", "penna", "canapa", "scottex", "mouse", "cotone", "finestra", "tavolo", "rock",
];

/// Built-in word pool used when no word file is available.
pub fn default_words() -> Vec<String> {
    BUILTIN_WORDS.iter().map(|word| word.to_string()).collect()
}

/// Load one word per line, falling back to [`default_words`] on any failure.
pub fn load_words(path: Option<&Path>) -> Vec<String> {
    let Some(path) = path else {
        return default_words();
    };
    match fs::read_to_string(path) {
        Ok(content) => {
            let mut words: Vec<String> = content
                .lines()
                .map(|line| line.trim_end_matches('\r').to_string())
                .filter(|line| !line.is_empty())
                .collect();
            words.sort();
            words.dedup();
            if words.is_empty() {
                warn!("word file {} is empty; using built-in words", path.display());
                default_words()
            } else {
                debug!("loaded {} words from {}", words.len(), path.display());
                words
            }
        }
        Err(err) => {
            warn!("failed to read word file {}: {err}", path.display());
            default_words()
        }
    }
}

/// Shows the code points of a word and expects the word back.
#[derive(Debug, Clone)]
pub struct RecognizeWord {
    id: String,
    words: Vec<String>,
}

impl RecognizeWord {
    /// Game registered under `id` drawing from `words`.
    pub fn new(id: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            id: id.into(),
            words,
        }
    }

    /// Ask about a specific `word` with the given time limit.
    pub fn ask(&self, word: &str, timeout_secs: u64, console: &mut dyn Console) -> Result<Outcome> {
        console.writeln("Code points:")?;
        let points: String = word
            .chars()
            .map(|ch| format!("{:02x} ", u32::from(ch)))
            .collect();
        console.writeln(&points)?;
        Ok(match read_answer(console, "Write the word: ", timeout_secs)? {
            Some(answer) => judge(answer == word),
            None => Outcome::TimedOut,
        })
    }
}

impl QuestionProvider for RecognizeWord {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Recognize code points"
    }

    fn description(&self) -> String {
        "Decode words written as a sequence of hexadecimal numbers \
         to their correspondent sequence of unicode characters.\n\
         Novice: you'll have twenty seconds for every word; \
         intermediate: fifteen seconds; expert: ten seconds; master: five seconds.\n\
         Three errors allowed.\n"
            .to_string()
    }

    fn setup(&self, console: &mut dyn Console, preset: Option<Difficulty>) -> Result<GameConfig> {
        let difficulty = choose_difficulty(console, preset)?;
        let words = if self.words.is_empty() {
            default_words()
        } else {
            self.words.clone()
        };
        Ok(
            GameConfig::new(difficulty, STANDARD_MAX_VALUES[difficulty.index()]).with_options(
                ProviderOptions::Words {
                    words,
                    answer_timeout: ANSWER_TIMEOUTS[difficulty.index()],
                },
            ),
        )
    }

    fn run(
        &self,
        config: &GameConfig,
        console: &mut dyn Console,
        rng: &mut dyn RngCore,
    ) -> Result<Outcome> {
        let ProviderOptions::Words {
            words,
            answer_timeout,
        } = &config.options
        else {
            return Err(anyhow!("game `{}` was not set up with a word list", self.id));
        };
        let word = words
            .choose(rng)
            .ok_or_else(|| anyhow!("game `{}` has an empty word list", self.id))?;
        self.ask(word, *answer_timeout, console)
    }
}
