use anyhow::Result;
use numconv_core::{
    config::AppConfig, provider::GameRegistry, scores::ScoreStore, session::GameSession, Console,
};
use rand::rngs::StdRng;
use tracing::{debug, info};

/// A parsed main-menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Play(usize),
    Exit,
    Invalid,
}

fn parse_choice(input: &str, games: usize) -> MenuChoice {
    match input.trim().parse::<usize>() {
        Ok(number) if number == games + 1 => MenuChoice::Exit,
        Ok(number) if (1..=games).contains(&number) => MenuChoice::Play(number - 1),
        _ => MenuChoice::Invalid,
    }
}

/// Main menu: pick a game, play it, record and show the high scores.
pub struct QuizApp<C: Console> {
    registry: GameRegistry,
    store: ScoreStore,
    config: AppConfig,
    console: C,
    rng: StdRng,
}

impl<C: Console> QuizApp<C> {
    pub fn new(
        registry: GameRegistry,
        store: ScoreStore,
        config: AppConfig,
        console: C,
        rng: StdRng,
    ) -> Self {
        Self {
            registry,
            store,
            config,
            console,
            rng,
        }
    }

    /// Show the menu until the player picks Exit.
    pub fn run(&mut self) -> Result<()> {
        info!(scores = %self.store.path().display(), "starting menu");
        loop {
            self.console.clear()?;
            self.console
                .writeln("Welcome to the bin2hex challenge!\nWhat game do you want to play?")?;
            for (index, game) in self.registry.iter().enumerate() {
                self.console
                    .writeln(&format!("({}) {}", index + 1, game.name()))?;
            }
            self.console
                .writeln(&format!("({}) Exit", self.registry.len() + 1))?;

            let Some(line) = self.console.read_line(">>> ", 0)?.into_line() else {
                continue;
            };
            match parse_choice(&line, self.registry.len()) {
                MenuChoice::Exit => return Ok(()),
                MenuChoice::Play(index) => self.play(index)?,
                MenuChoice::Invalid => debug!(input = %line, "ignoring menu input"),
            }
        }
    }

    fn play(&mut self, index: usize) -> Result<()> {
        let Some(game) = self.registry.get(index) else {
            return Ok(());
        };
        let console = &mut self.console;
        let mut session = GameSession::new(game).with_rules(self.config.rules.clone());
        let score = session.play(console, &mut self.rng, self.config.difficulty)?;

        let difficulty = session.difficulty().map(|level| level.label());
        self.store.save(game.id(), score, difficulty, || {
            console.writeln("Congratulations! You are in the top ten!")?;
            Ok(console
                .read_line("Enter your name: ", 0)?
                .into_line()
                .unwrap_or_default())
        })?;
        console.writeln(&self.store.render(game.id()))?;
        console.pause("")
    }
}
