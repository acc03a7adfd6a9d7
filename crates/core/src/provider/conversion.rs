use anyhow::Result;
use rand::{Rng, RngCore};
use tracing::debug;

use super::{
    judge, read_answer, setup_max_value, QuestionProvider, STANDARD_DESCRIPTION,
    STANDARD_MAX_VALUES,
};
use crate::{
    answer::{parse_decimal, parse_hex},
    console::Console,
    error::AnswerError,
    models::{Difficulty, GameConfig, Outcome},
};

const ANSWER_TIMEOUT: u64 = 6;

/// Shows a hex number and expects it in decimal.
#[derive(Debug, Clone)]
pub struct HexToDec {
    id: String,
}

/// Shows a decimal number and expects it in hex.
#[derive(Debug, Clone)]
pub struct DecToHex {
    id: String,
}

/// A malformed answer scores like a missed deadline.
fn grade(parsed: Result<i64, AnswerError>, expected: i64) -> Outcome {
    match parsed {
        Ok(value) => judge(value == expected),
        Err(err) => {
            debug!("treating malformed answer as timeout: {err}");
            Outcome::TimedOut
        }
    }
}

impl HexToDec {
    /// Game registered under `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Ask about a specific `value`.
    pub fn ask(&self, value: i64, console: &mut dyn Console) -> Result<Outcome> {
        console.writeln(&format!("{value:02x}"))?;
        Ok(
            match read_answer(console, "What is the correspondent decimal? ", ANSWER_TIMEOUT)? {
                Some(answer) => grade(parse_decimal(&answer), value),
                None => Outcome::TimedOut,
            },
        )
    }
}

impl DecToHex {
    /// Game registered under `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Ask about a specific `value`.
    pub fn ask(&self, value: i64, console: &mut dyn Console) -> Result<Outcome> {
        console.writeln(&value.to_string())?;
        Ok(
            match read_answer(
                console,
                "What is the correspondent hexadecimal? ",
                ANSWER_TIMEOUT,
            )? {
                Some(answer) => grade(parse_hex(&answer), value),
                None => Outcome::TimedOut,
            },
        )
    }
}

impl QuestionProvider for HexToDec {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Hex2dec"
    }

    fn description(&self) -> String {
        format!(
            "Convert the hexadecimal numbers to decimal notation.\n\
             You'll have six seconds for every number.\n{STANDARD_DESCRIPTION}"
        )
    }

    fn setup(&self, console: &mut dyn Console, preset: Option<Difficulty>) -> Result<GameConfig> {
        setup_max_value(console, preset, &STANDARD_MAX_VALUES)
    }

    fn run(
        &self,
        config: &GameConfig,
        console: &mut dyn Console,
        rng: &mut dyn RngCore,
    ) -> Result<Outcome> {
        let value = rng.gen_range(1..=config.max_value.max(1));
        self.ask(value, console)
    }
}

impl QuestionProvider for DecToHex {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Dec2hex"
    }

    fn description(&self) -> String {
        format!(
            "Convert the decimal numbers to hexadecimal notation.\n\
             You'll have six seconds for every number.\n{STANDARD_DESCRIPTION}"
        )
    }

    fn setup(&self, console: &mut dyn Console, preset: Option<Difficulty>) -> Result<GameConfig> {
        setup_max_value(console, preset, &STANDARD_MAX_VALUES)
    }

    fn run(
        &self,
        config: &GameConfig,
        console: &mut dyn Console,
        rng: &mut dyn RngCore,
    ) -> Result<Outcome> {
        let value = rng.gen_range(1..=config.max_value.max(1));
        self.ask(value, console)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;

    #[test]
    fn hex_to_dec_pads_and_grades() -> Result<()> {
        let game = HexToDec::new("game_dec_6_sec");
        let mut console = ScriptedConsole::with_lines(["10", "11", "ten"]);
        assert_eq!(game.ask(10, &mut console)?, Outcome::Correct);
        assert_eq!(game.ask(10, &mut console)?, Outcome::Wrong);
        assert_eq!(game.ask(10, &mut console)?, Outcome::TimedOut);
        assert!(console.output().starts_with("0a\nWhat is the correspondent decimal? "));
        assert_eq!(console.timeouts(), &[6, 6, 6]);
        Ok(())
    }

    #[test]
    fn dec_to_hex_accepts_prefix_and_case() -> Result<()> {
        let game = DecToHex::new("game_hex_6_sec");
        let mut console = ScriptedConsole::with_lines(["0xFF", "ff", "fe", "0xg"]);
        assert_eq!(game.ask(255, &mut console)?, Outcome::Correct);
        assert_eq!(game.ask(255, &mut console)?, Outcome::Correct);
        assert_eq!(game.ask(255, &mut console)?, Outcome::Wrong);
        assert_eq!(game.ask(255, &mut console)?, Outcome::TimedOut);
        assert!(console.output().starts_with("255\n"));
        Ok(())
    }

    #[test]
    fn empty_answer_counts_as_malformed() -> Result<()> {
        let game = DecToHex::new("game_hex_6_sec");
        let mut console = ScriptedConsole::with_lines([""]);
        assert_eq!(game.ask(3, &mut console)?, Outcome::TimedOut);
        Ok(())
    }
}
