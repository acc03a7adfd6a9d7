//! Question providers: one type per game kind.

use anyhow::Result;
use rand::RngCore;

use crate::{
    console::{Console, ReadOutcome},
    models::{Difficulty, GameConfig, Outcome},
};

/// Binary to hexadecimal conversion.
pub mod bin2hex;
/// Hexadecimal to decimal and back.
pub mod conversion;
/// Code-point word recognition.
pub mod codepoint;
/// Hexadecimal arithmetic.
pub mod arithmetic;
/// Ordered catalogue of games keyed by id.
pub mod registry;

pub use arithmetic::HexArithmetic;
pub use bin2hex::BinToHex;
pub use codepoint::{default_words, load_words, RecognizeWord};
pub use conversion::{DecToHex, HexToDec};
pub use registry::GameRegistry;

/// Operand bounds used by most games, indexed by difficulty.
pub const STANDARD_MAX_VALUES: [i64; 4] = [0xf, 0x7f, 0xff, 0xfff];

/// Description snippet shared by games using [`STANDARD_MAX_VALUES`].
pub const STANDARD_DESCRIPTION: &str = "Three errors allowed.\n\n\
    Novice: numbers up to F.\nIntermediate: numbers up to 7F.\n\
    Expert: numbers up to FF.\nMaster: numbers up to FFF.\n";

/// A pluggable game: builds its config, then asks one question per round.
pub trait QuestionProvider {
    /// Stable identifier used to key high scores. Never reuse one.
    fn id(&self) -> &str;

    /// Name shown in the menu.
    fn name(&self) -> &str;

    /// Rules shown before the session starts.
    fn description(&self) -> String;

    /// Build the session config, prompting for a difficulty unless `preset` is given.
    fn setup(&self, console: &mut dyn Console, preset: Option<Difficulty>) -> Result<GameConfig>;

    /// Ask one question and classify the reply.
    ///
    /// Unparseable answers are reported as [`Outcome::TimedOut`], never as errors.
    fn run(
        &self,
        config: &GameConfig,
        console: &mut dyn Console,
        rng: &mut dyn RngCore,
    ) -> Result<Outcome>;
}

/// Ask for a difficulty until a listed number is entered.
pub fn choose_difficulty(
    console: &mut dyn Console,
    preset: Option<Difficulty>,
) -> Result<Difficulty> {
    if let Some(difficulty) = preset {
        return Ok(difficulty);
    }

    let mut prompt = String::from("Set difficulty:\n");
    for (index, level) in Difficulty::ALL.iter().enumerate() {
        prompt.push_str(&format!("({}) {}\n", index + 1, level));
    }
    prompt.push_str("\n>>> ");

    loop {
        console.clear()?;
        let Some(line) = console.read_line(&prompt, 0)?.into_line() else {
            continue;
        };
        let choice = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| Difficulty::ALL.get(index).copied());
        if let Some(difficulty) = choice {
            return Ok(difficulty);
        }
    }
}

/// Standard setup: pick a difficulty and map it to an operand bound.
pub fn setup_max_value(
    console: &mut dyn Console,
    preset: Option<Difficulty>,
    max_values: &[i64; 4],
) -> Result<GameConfig> {
    let difficulty = choose_difficulty(console, preset)?;
    Ok(GameConfig::new(difficulty, max_values[difficulty.index()]))
}

/// Read an answer line, mapping an expired deadline to `None`.
pub(crate) fn read_answer(
    console: &mut dyn Console,
    prompt: &str,
    timeout_secs: u64,
) -> Result<Option<String>> {
    Ok(match console.read_line(prompt, timeout_secs)? {
        ReadOutcome::Line(line) => Some(line),
        ReadOutcome::TimedOut => None,
    })
}

/// Boolean verdict to round outcome.
pub(crate) fn judge(correct: bool) -> Outcome {
    if correct {
        Outcome::Correct
    } else {
        Outcome::Wrong
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;

    #[test]
    fn difficulty_prompt_repeats_until_valid() -> Result<()> {
        let mut console = ScriptedConsole::with_lines(["0", "x", "5", "3"]);
        let difficulty = choose_difficulty(&mut console, None)?;
        assert_eq!(difficulty, Difficulty::Expert);
        assert_eq!(console.clears(), 4);
        assert!(console.output().contains("(4) Master"));
        Ok(())
    }

    #[test]
    fn preset_skips_prompt() -> Result<()> {
        let mut console = ScriptedConsole::new();
        let config = setup_max_value(&mut console, Some(Difficulty::Master), &STANDARD_MAX_VALUES)?;
        assert_eq!(config.max_value, 0xfff);
        assert_eq!(config.allowed_errors, 3);
        assert!(console.output().is_empty());
        Ok(())
    }
}
