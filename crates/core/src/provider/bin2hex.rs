use anyhow::Result;
use rand::{Rng, RngCore};

use super::{judge, read_answer, setup_max_value, QuestionProvider};
use crate::{
    answer::{grouped_binary, hex_matches},
    console::Console,
    models::{Difficulty, GameConfig, Outcome},
};

const ANSWER_TIMEOUT: u64 = 3;
const MAX_VALUES: [i64; 4] = [0xf, 0xff, 0xffff, 0xff_ffff];

/// Shows a nibble-grouped binary number and expects its hex value.
#[derive(Debug, Clone)]
pub struct BinToHex {
    id: String,
}

impl BinToHex {
    /// Game registered under `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Ask about a specific `value`.
    pub fn ask(&self, value: i64, console: &mut dyn Console) -> Result<Outcome> {
        console.writeln(&grouped_binary(value.unsigned_abs()))?;
        Ok(
            match read_answer(console, "What is the correspondent hex? ", ANSWER_TIMEOUT)? {
                Some(answer) => judge(hex_matches(&answer, value)),
                None => Outcome::TimedOut,
            },
        )
    }
}

impl QuestionProvider for BinToHex {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Bin2hex (3 seconds)"
    }

    fn description(&self) -> String {
        "Convert binary numbers to their hexadecimal equivalents.\n\
         You'll have three seconds for every number.\n\
         Three errors allowed.\n\n\
         Novice: numbers up to F.\nIntermediate: numbers up to FF.\n\
         Expert: numbers up to FFFF.\nMaster: numbers up to FFFFFF.\n"
            .to_string()
    }

    fn setup(&self, console: &mut dyn Console, preset: Option<Difficulty>) -> Result<GameConfig> {
        setup_max_value(console, preset, &MAX_VALUES)
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
