//! Shared domain models.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Allowed errors when a provider does not say otherwise.
pub const DEFAULT_ALLOWED_ERRORS: u32 = 3;

/// Discrete difficulty setting chosen before a session starts.
///
/// Deserializes from the same spellings the command line accepts, so config
/// files and `NUMCONV_DIFFICULTY` take `n`, `Expert` or `master` alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Difficulty {
    /// Smallest ranges and longest time limits.
    Novice,
    /// Second level.
    Intermediate,
    /// Third level.
    Expert,
    /// Widest ranges and shortest time limits.
    Master,
}

impl Difficulty {
    /// All levels in menu order.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Novice,
        Difficulty::Intermediate,
        Difficulty::Expert,
        Difficulty::Master,
    ];

    /// Zero-based position in [`Difficulty::ALL`], used to index per-level tables.
    pub fn index(self) -> usize {
        match self {
            Difficulty::Novice => 0,
            Difficulty::Intermediate => 1,
            Difficulty::Expert => 2,
            Difficulty::Master => 3,
        }
    }

    /// Label shown in menus and stored with high scores.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Novice => "Novice",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Expert => "Expert",
            Difficulty::Master => "Master",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "n" | "novice" => Ok(Difficulty::Novice),
            "i" | "intermediate" => Ok(Difficulty::Intermediate),
            "e" | "expert" => Ok(Difficulty::Expert),
            "m" | "master" => Ok(Difficulty::Master),
            other => Err(format!(
                "unknown difficulty '{other}' (expected novice, intermediate, expert or master)"
            )),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Arithmetic operator offered by the hex arithmetic games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Addition.
    Add,
    /// Subtraction; results may be negative.
    Sub,
    /// Multiplication.
    Mul,
}

impl Operator {
    /// Symbol printed between the operands.
    pub fn glyph(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "\u{00d7}",
        }
    }

    /// Evaluate `a <op> b`.
    pub fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
        }
    }
}

/// An operator together with the divisor applied to both operands before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Operator applied to the scaled operands.
    pub operator: Operator,
    /// Keeps results in range for operators that grow fast; `1` means no scaling.
    pub coefficient: i64,
}

impl Operation {
    /// Unscaled operation.
    pub const fn new(operator: Operator) -> Self {
        Self {
            operator,
            coefficient: 1,
        }
    }

    /// Operation whose operands are divided by `coefficient` first.
    pub const fn scaled(operator: Operator, coefficient: i64) -> Self {
        Self {
            operator,
            coefficient,
        }
    }
}

/// Settings owned by a single provider kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderOptions {
    /// Provider needs nothing beyond the common fields.
    #[default]
    None,
    /// Operators a hex arithmetic round picks from.
    Operations(Vec<Operation>),
    /// Word pool and per-word time limit for code-point recognition.
    Words {
        /// Candidate words, never empty once setup has run.
        words: Vec<String>,
        /// Seconds allowed per answer.
        answer_timeout: u64,
    },
}

/// Session parameters fixed by setup and read-only while rounds run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Level chosen at setup.
    pub difficulty: Difficulty,
    /// Inclusive upper bound for generated operands.
    pub max_value: i64,
    /// Failed rounds tolerated; the next one ends the session.
    pub allowed_errors: u32,
    /// Points lost on a wrong answer.
    pub error_penalty: u32,
    /// Points lost when the time limit passes.
    pub timeout_penalty: u32,
    /// Provider-specific settings.
    pub options: ProviderOptions,
}

impl GameConfig {
    /// Config with default rules (three errors allowed, no penalties).
    pub fn new(difficulty: Difficulty, max_value: i64) -> Self {
        Self {
            difficulty,
            max_value,
            allowed_errors: DEFAULT_ALLOWED_ERRORS,
            error_penalty: 0,
            timeout_penalty: 0,
            options: ProviderOptions::None,
        }
    }

    /// Replace the provider-specific settings.
    pub fn with_options(mut self, options: ProviderOptions) -> Self {
        self.options = options;
        self
    }

    /// Apply rule overrides from user configuration.
    pub fn with_rules(mut self, rules: &RuleOverrides) -> Self {
        if let Some(value) = rules.allowed_errors {
            self.allowed_errors = value;
        }
        if let Some(value) = rules.error_penalty {
            self.error_penalty = value;
        }
        if let Some(value) = rules.timeout_penalty {
            self.timeout_penalty = value;
        }
        self
    }
}

/// Optional replacements for the scoring rules a provider sets up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOverrides {
    /// Replaces [`GameConfig::allowed_errors`].
    #[serde(default)]
    pub allowed_errors: Option<u32>,
    /// Replaces [`GameConfig::error_penalty`].
    #[serde(default)]
    pub error_penalty: Option<u32>,
    /// Replaces [`GameConfig::timeout_penalty`].
    #[serde(default)]
    pub timeout_penalty: Option<u32>,
}

/// Classification of a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Answer matched; scores a point.
    Correct,
    /// Answer given but wrong.
    Wrong,
    /// No usable answer before the time limit.
    TimedOut,
}
