//! Game session: setup, the round loop, scoring and termination.

use anyhow::Result;
use rand::RngCore;
use tracing::{debug, info};

use crate::{
    console::Console,
    error::SessionError,
    models::{Difficulty, GameConfig, Outcome, RuleOverrides},
    provider::QuestionProvider,
};

/// Mutable counters of a running session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    /// May go negative once penalties apply.
    pub score: i64,
    /// Wrong and timed-out rounds so far.
    pub error_count: u32,
    /// Outcome of the most recent round.
    pub last_outcome: Option<Outcome>,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Created; the provider has not been configured yet.
    AwaitingSetup,
    /// Rounds are being played with this config.
    Running(GameConfig),
    /// The error limit was exceeded; no more rounds.
    Finished,
}

/// One play-through of a single game.
pub struct GameSession<'a> {
    provider: &'a dyn QuestionProvider,
    rules: RuleOverrides,
    phase: Phase,
    state: SessionState,
    difficulty: Option<Difficulty>,
}

impl<'a> GameSession<'a> {
    /// Session for `provider`, awaiting setup.
    pub fn new(provider: &'a dyn QuestionProvider) -> Self {
        Self {
            provider,
            rules: RuleOverrides::default(),
            phase: Phase::AwaitingSetup,
            state: SessionState::default(),
            difficulty: None,
        }
    }

    /// Replace the provider's scoring rules where `rules` sets a value.
    pub fn with_rules(mut self, rules: RuleOverrides) -> Self {
        self.rules = rules;
        self
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Snapshot of the counters.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session has ended.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// Difficulty chosen during setup.
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    /// Fix the config for the rest of the session.
    pub fn setup(&mut self, console: &mut dyn Console, preset: Option<Difficulty>) -> Result<()> {
        match self.phase {
            Phase::AwaitingSetup => {}
            Phase::Running(_) => return Ok(()),
            Phase::Finished => return Err(SessionError::AlreadyFinished.into()),
        }
        let config = self.provider.setup(console, preset)?.with_rules(&self.rules);
        debug!(
            game = self.provider.id(),
            difficulty = %config.difficulty,
            max_value = config.max_value,
            allowed_errors = config.allowed_errors,
            "session configured"
        );
        self.difficulty = Some(config.difficulty);
        self.phase = Phase::Running(config);
        Ok(())
    }

    /// Play exactly one round and account for it.
    pub fn play_round(
        &mut self,
        console: &mut dyn Console,
        rng: &mut dyn RngCore,
    ) -> Result<Outcome> {
        let config = match &self.phase {
            Phase::Running(config) => config,
            Phase::AwaitingSetup => return Err(SessionError::NotConfigured.into()),
            Phase::Finished => return Err(SessionError::AlreadyFinished.into()),
        };
        let outcome = self.provider.run(config, console, rng)?;
        let (allowed_errors, error_penalty, timeout_penalty) = (
            config.allowed_errors,
            config.error_penalty,
            config.timeout_penalty,
        );
        debug!(game = self.provider.id(), ?outcome, "round finished");
        self.state.last_outcome = Some(outcome);

        match outcome {
            Outcome::Correct => {
                console.writeln("Good!\n")?;
                self.state.score += 1;
                return Ok(outcome);
            }
            Outcome::Wrong => {
                console.writeln("Wrong!")?;
                self.state.score -= i64::from(error_penalty);
            }
            Outcome::TimedOut => {
                console.writeln("\nTime's passed.")?;
                self.state.score -= i64::from(timeout_penalty);
            }
        }

        self.state.error_count += 1;
        if self.state.error_count > allowed_errors {
            info!(
                game = self.provider.id(),
                score = self.state.score,
                "session finished"
            );
            self.phase = Phase::Finished;
            return Ok(outcome);
        }

        let mut notice = format!("Error nr. {}", self.state.error_count);
        if self.state.error_count == allowed_errors {
            notice.push_str(" and last error allowed.");
        } else {
            notice.push('.');
        }
        console.write(&notice)?;
        // The reply, or a lapse, never changes the round's score.
        console.read_line("\nReady to next op?\n", 0)?;
        Ok(outcome)
    }

    /// Run rounds until the error limit is exceeded and return the final score.
    pub fn run(&mut self, console: &mut dyn Console, rng: &mut dyn RngCore) -> Result<i64> {
        while !self.is_finished() {
            self.play_round(console, rng)?;
        }
        Ok(self.state.score)
    }

    /// Full play-through: intro, setup, rounds and the closing message.
    pub fn play(
        &mut self,
        console: &mut dyn Console,
        rng: &mut dyn RngCore,
        preset: Option<Difficulty>,
    ) -> Result<i64> {
        console.clear()?;
        console.writeln(&format!(
            "{}\n\nGame description:\n\n{}",
            self.provider.name(),
            self.provider.description()
        ))?;
        console.pause("Press enter when you're ready to begin.\n")?;
        self.setup(console, preset)?;
        let score = self.run(console, rng)?;
        console.writeln(&format!("\nGame over. You made {score} points!"))?;
        console.pause("")?;
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque};

    use super::*;
    use crate::{
        console::ScriptedConsole,
        models::Operator,
        provider::{HexArithmetic, STANDARD_MAX_VALUES},
    };
    use rand::{rngs::StdRng, SeedableRng};

    /// Provider replaying fixed outcomes.
    struct Replay {
        outcomes: RefCell<VecDeque<Outcome>>,
        error_penalty: u32,
        timeout_penalty: u32,
    }

    impl Replay {
        fn new(outcomes: &[Outcome]) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.iter().copied().collect()),
                error_penalty: 0,
                timeout_penalty: 0,
            }
        }

        fn penalties(mut self, error_penalty: u32, timeout_penalty: u32) -> Self {
            self.error_penalty = error_penalty;
            self.timeout_penalty = timeout_penalty;
            self
        }
    }

    impl QuestionProvider for Replay {
        fn id(&self) -> &str {
            "replay"
        }

        fn name(&self) -> &str {
            "Replay"
        }

        fn description(&self) -> String {
            "Replays outcomes.".to_string()
        }

        fn setup(
            &self,
            _console: &mut dyn Console,
            preset: Option<Difficulty>,
        ) -> Result<GameConfig> {
            let difficulty = preset.unwrap_or(Difficulty::Novice);
            let mut config = GameConfig::new(difficulty, STANDARD_MAX_VALUES[difficulty.index()]);
            config.error_penalty = self.error_penalty;
            config.timeout_penalty = self.timeout_penalty;
            Ok(config)
        }

        fn run(
            &self,
            _config: &GameConfig,
            _console: &mut dyn Console,
            _rng: &mut dyn RngCore,
        ) -> Result<Outcome> {
            Ok(self
                .outcomes
                .borrow_mut()
                .pop_front()
                .unwrap_or(Outcome::Correct))
        }
    }

    fn acks(count: usize) -> ScriptedConsole {
        ScriptedConsole::with_lines(std::iter::repeat("").take(count))
    }

    #[test]
    fn three_errors_do_not_end_the_session() -> Result<()> {
        use Outcome::*;
        let provider = Replay::new(&[Wrong, TimedOut, Wrong, Correct]);
        let mut session = GameSession::new(&provider);
        let mut console = acks(3);
        let mut rng = StdRng::seed_from_u64(0);
        session.setup(&mut console, None)?;

        for _ in 0..4 {
            session.play_round(&mut console, &mut rng)?;
        }
        assert!(!session.is_finished());
        assert_eq!(session.state().error_count, 3);
        assert_eq!(session.state().score, 1);
        assert!(console.output().contains("Error nr. 3 and last error allowed."));
        assert!(console.output().contains("Error nr. 1."));
        Ok(())
    }

    #[test]
    fn fourth_error_ends_the_session() -> Result<()> {
        use Outcome::*;
        let provider = Replay::new(&[Correct, Wrong, TimedOut, Wrong, TimedOut, Correct]);
        let mut session = GameSession::new(&provider);
        let mut console = acks(3);
        let mut rng = StdRng::seed_from_u64(0);
        session.setup(&mut console, None)?;

        let score = session.run(&mut console, &mut rng)?;
        assert_eq!(score, 1);
        assert!(session.is_finished());
        assert_eq!(session.state().error_count, 4);
        assert_eq!(session.state().last_outcome, Some(TimedOut));
        assert_eq!(console.remaining(), 0);
        assert!(!console.output().contains("Error nr. 4"));
        assert!(session.play_round(&mut console, &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn penalties_are_exclusive_per_round() -> Result<()> {
        use Outcome::*;
        let provider = Replay::new(&[Wrong, TimedOut]).penalties(2, 5);
        let mut session = GameSession::new(&provider);
        let mut console = ScriptedConsole::new();
        console.push_timeout().push_line("");
        let mut rng = StdRng::seed_from_u64(0);
        session.setup(&mut console, None)?;

        session.play_round(&mut console, &mut rng)?;
        assert_eq!(session.state().score, -2);
        session.play_round(&mut console, &mut rng)?;
        assert_eq!(session.state().score, -7);
        assert_eq!(session.state().error_count, 2);
        assert!(console.output().contains("Wrong!"));
        assert!(console.output().contains("Time's passed."));
        Ok(())
    }

    #[test]
    fn rule_overrides_change_the_limit() -> Result<()> {
        use Outcome::*;
        let provider = Replay::new(&[Wrong, Wrong]);
        let rules = RuleOverrides {
            allowed_errors: Some(0),
            error_penalty: Some(1),
            timeout_penalty: None,
        };
        let mut session = GameSession::new(&provider).with_rules(rules);
        let mut console = ScriptedConsole::new();
        let mut rng = StdRng::seed_from_u64(0);
        session.setup(&mut console, None)?;

        assert_eq!(session.run(&mut console, &mut rng)?, -1);
        assert_eq!(session.state().error_count, 1);
        Ok(())
    }

    #[test]
    fn rounds_require_setup() {
        let provider = Replay::new(&[]);
        let mut session = GameSession::new(&provider);
        let mut rng = StdRng::seed_from_u64(0);
        let err = session
            .play_round(&mut ScriptedConsole::new(), &mut rng)
            .err()
            .and_then(|err| err.downcast::<SessionError>().ok());
        assert_eq!(err, Some(SessionError::NotConfigured));
        assert_eq!(session.phase(), &Phase::AwaitingSetup);
    }

    #[test]
    fn full_play_through_with_real_provider() -> Result<()> {
        let provider = HexArithmetic::single("game_hexsum", Operator::Add);
        let mut console = ScriptedConsole::new();
        console.push_line("");
        console.push_line("1");
        for _ in 0..4 {
            console.push_timeout();
            console.push_line("");
        }
        console.push_line("");
        let mut rng = StdRng::seed_from_u64(42);

        let mut session = GameSession::new(&provider);
        let score = session.play(&mut console, &mut rng, None)?;
        assert_eq!(score, 0);
        assert_eq!(session.difficulty(), Some(Difficulty::Novice));
        assert!(console.output().starts_with("Hex sum\n\nGame description:\n\n"));
        assert!(console.output().contains("Game over. You made 0 points!"));
        Ok(())
    }
}
