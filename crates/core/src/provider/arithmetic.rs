use anyhow::{anyhow, Result};
use rand::{seq::SliceRandom, Rng, RngCore};

use super::{
    judge, read_answer, setup_max_value, QuestionProvider, STANDARD_DESCRIPTION,
    STANDARD_MAX_VALUES,
};
use crate::{
    answer::{format_signed_hex, normalize_hex},
    console::Console,
    models::{Difficulty, GameConfig, Operation, Operator, Outcome, ProviderOptions},
};

const ANSWER_TIMEOUT: u64 = 10;

/// Arithmetic between two hex operands with one or more operators.
#[derive(Debug, Clone)]
pub struct HexArithmetic {
    id: String,
    name: String,
    noun: &'static str,
    operations: Vec<Operation>,
}

impl HexArithmetic {
    /// Mixed game drawing from `+`, `-` and `×` (the latter on operands divided by 0x10).
    pub fn mixed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "Hex arithmetic".to_string(),
            noun: "result of the arithmetic operation between",
            operations: vec![
                Operation::new(Operator::Add),
                Operation::new(Operator::Sub),
                Operation::scaled(Operator::Mul, 0x10),
            ],
        }
    }

    /// Single-operator game.
    pub fn single(id: impl Into<String>, operator: Operator) -> Self {
        let (name, noun) = match operator {
            Operator::Add => ("Hex sum", "sum of"),
            Operator::Sub => ("Hex diff", "difference of"),
            Operator::Mul => ("Hex mul", "product of"),
        };
        Self {
            id: id.into(),
            name: name.to_string(),
            noun,
            operations: vec![Operation::new(operator)],
        }
    }

    /// Operations a round may draw from.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Expected hex answer for `a OP b` after applying the operation's coefficient.
    pub fn expected(operation: Operation, a: i64, b: i64) -> String {
        let (a, b) = scale(operation, a, b);
        format_signed_hex(operation.operator.apply(a, b))
    }

    /// Ask about specific raw operands.
    pub fn ask(
        &self,
        operation: Operation,
        a: i64,
        b: i64,
        console: &mut dyn Console,
    ) -> Result<Outcome> {
        let expected = Self::expected(operation, a, b);
        let (a, b) = scale(operation, a, b);
        let prompt = format!("{a:x} {} {b:x} = ", operation.operator.glyph());
        Ok(match read_answer(console, &prompt, ANSWER_TIMEOUT)? {
            Some(answer) => judge(normalize_hex(&answer) == expected),
            None => Outcome::TimedOut,
        })
    }
}

fn scale(operation: Operation, a: i64, b: i64) -> (i64, i64) {
    let coefficient = operation.coefficient.max(1);
    (a / coefficient, b / coefficient)
}

impl QuestionProvider for HexArithmetic {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> String {
        let subject = if self.operations.len() > 1 {
            "two hexadecimal numbers"
        } else {
            "the two hexadecimal numbers"
        };
        format!(
            "Calculate the {} {subject}.\n\
             You'll have ten seconds for every operation.\n{STANDARD_DESCRIPTION}",
            self.noun
        )
    }

    fn setup(&self, console: &mut dyn Console, preset: Option<Difficulty>) -> Result<GameConfig> {
        let config = setup_max_value(console, preset, &STANDARD_MAX_VALUES)?;
        Ok(config.with_options(ProviderOptions::Operations(self.operations.clone())))
    }

    fn run(
        &self,
        config: &GameConfig,
        console: &mut dyn Console,
        rng: &mut dyn RngCore,
    ) -> Result<Outcome> {
        let operations = match &config.options {
            ProviderOptions::Operations(operations) => operations.as_slice(),
            _ => self.operations.as_slice(),
        };
        let a = rng.gen_range(0..=config.max_value);
        let b = rng.gen_range(0..=config.max_value);
        let operation = *operations
            .choose(rng)
            .ok_or_else(|| anyhow!("game `{}` has no operators configured", self.id))?;
        self.ask(operation, a, b, console)
    }
}
