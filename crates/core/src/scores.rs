//! High-score persistence: one ranked top-ten list per game id.
//!
//! The whole file is read, changed in memory and rewritten on every save.
//! There is no locking across processes, so two instances saving at the same
//! time can lose one of the updates.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Entries kept per game.
pub const MAX_ENTRIES: usize = 10;
/// Directory under the platform data dir holding the score file.
pub const APP_DIR_NAME: &str = "Numconversiongame";
/// Score file name.
pub const SCORE_FILE_NAME: &str = "highscores.json";
/// Format of [`HighScoreEntry::timestamp`].
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H.%M";

const FORMAT_VERSION: u32 = 1;
const EMPTY_MESSAGE: &str = "No scores have been recorded for this game yet.";
const COLUMN_MARGIN: usize = 2;

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player name as entered.
    pub name: String,
    /// Final session score.
    pub score: i64,
    /// Local time formatted with [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    /// Difficulty label; absent in files written before levels were recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl HighScoreEntry {
    /// Entry stamped with the current local time.
    pub fn now(name: impl Into<String>, score: i64, difficulty: Option<&str>) -> Self {
        Self {
            name: name.into(),
            score,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            difficulty: difficulty.map(str::to_string),
        }
    }
}

/// Every game's leaderboard, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBook {
    /// File format version.
    #[serde(default = "format_version")]
    pub version: u32,
    /// Leaderboards keyed by game id, best first.
    #[serde(default)]
    pub games: BTreeMap<String, Vec<HighScoreEntry>>,
}

fn format_version() -> u32 {
    FORMAT_VERSION
}

/// On-disk shape before individual records are validated.
#[derive(Debug, Deserialize)]
struct RawBook {
    #[serde(default = "format_version")]
    version: u32,
    #[serde(default)]
    games: BTreeMap<String, Vec<Value>>,
}

impl ScoreBook {
    /// Empty book with a list for each known id.
    pub fn with_games<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: FORMAT_VERSION,
            games: ids.into_iter().map(|id| (id.into(), Vec::new())).collect(),
        }
    }

    /// Leaderboard for `game_id`, best first. Empty when unknown.
    pub fn ranked(&self, game_id: &str) -> Vec<HighScoreEntry> {
        let mut entries = self.games.get(game_id).cloned().unwrap_or_default();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries
    }

    /// Whether `score` would enter the leaderboard of `game_id`.
    pub fn qualifies(&self, game_id: &str, score: i64) -> bool {
        let entries = self.games.get(game_id).map(Vec::as_slice).unwrap_or(&[]);
        entries.len() < MAX_ENTRIES
            || entries
                .iter()
                .map(|entry| entry.score)
                .min()
                .map(|lowest| score > lowest)
                .unwrap_or(true)
    }

    /// Insert `entry` at its rank, evicting the lowest score when full.
    ///
    /// Returns `false`, leaving the book untouched, when the list is full and
    /// the score does not beat the current minimum. Ties rank below existing entries.
    pub fn insert(&mut self, game_id: &str, entry: HighScoreEntry) -> bool {
        if !self.qualifies(game_id, entry.score) {
            return false;
        }
        let entries = self.games.entry(game_id.to_string()).or_default();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        while entries.len() >= MAX_ENTRIES {
            entries.pop();
        }
        let position = entries.partition_point(|existing| existing.score >= entry.score);
        entries.insert(position, entry);
        true
    }

    fn from_raw(raw: RawBook) -> Self {
        let games = raw
            .games
            .into_iter()
            .map(|(id, records)| {
                let entries = records
                    .into_iter()
                    .filter_map(|record| match serde_json::from_value(record) {
                        Ok(entry) => Some(entry),
                        Err(err) => {
                            warn!("skipping malformed score record for {id}: {err}");
                            None
                        }
                    })
                    .collect();
                (id, entries)
            })
            .collect();
        Self {
            version: raw.version,
            games,
        }
    }
}

/// Reads and rewrites the score file.
pub struct ScoreStore {
    path: PathBuf,
    known_ids: Vec<String>,
}

impl ScoreStore {
    /// Store at `path`; `known_ids` get an empty list whenever the file is loaded.
    pub fn new(path: impl Into<PathBuf>, known_ids: Vec<String>) -> Self {
        Self {
            path: path.into(),
            known_ids,
        }
    }

    /// Platform data location, or next to the executable in debug mode.
    pub fn default_path(debug: bool) -> PathBuf {
        if debug {
            let beside_exe = std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf));
            return beside_exe
                .unwrap_or_else(|| PathBuf::from("."))
                .join(SCORE_FILE_NAME);
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(SCORE_FILE_NAME)
    }

    /// Location of the score file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the book strictly, reporting why it could not be used.
    pub fn try_load(&self) -> Result<ScoreBook, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let mut book = if content.trim().is_empty() {
            ScoreBook::default()
        } else {
            let raw: RawBook =
                serde_json::from_str(&content).map_err(|err| StoreError::Corrupted {
                    path: self.path.clone(),
                    reason: err.to_string(),
                })?;
            ScoreBook::from_raw(raw)
        };
        book.version = FORMAT_VERSION;
        for id in &self.known_ids {
            book.games.entry(id.clone()).or_default();
        }
        Ok(book)
    }

    /// Read the book, substituting an empty one when the file is unusable.
    pub fn load(&self) -> ScoreBook {
        self.try_load().unwrap_or_else(|err| {
            warn!("{err}; starting from empty high scores");
            ScoreBook::with_games(self.known_ids.iter().cloned())
        })
    }

    /// Record `score` for `game_id` if it makes the top ten.
    ///
    /// `ask_name` runs only when the score is accepted.
    pub fn save<F>(
        &self,
        game_id: &str,
        score: i64,
        difficulty: Option<&str>,
        ask_name: F,
    ) -> Result<bool>
    where
        F: FnOnce() -> Result<String>,
    {
        let mut book = self.load();
        if !book.qualifies(game_id, score) {
            debug!(game_id, score, "score below the leaderboard minimum");
            return Ok(false);
        }
        let name = ask_name()?;
        let inserted = book.insert(game_id, HighScoreEntry::now(name.trim(), score, difficulty));
        if inserted {
            self.write(&book)?;
            info!(game_id, score, "high score recorded");
        }
        Ok(inserted)
    }

    /// Leaderboard table for `game_id`.
    pub fn render(&self, game_id: &str) -> String {
        render_table(&self.load().ranked(game_id))
    }

    fn write(&self, book: &ScoreBook) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let serialised = serde_json::to_vec_pretty(book)?;
        let mut file = NamedTempFile::new_in(&parent)
            .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
        file.write_all(&serialised)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        file.persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Column-aligned leaderboard; every column is as wide as its widest value plus a margin.
pub fn render_table(entries: &[HighScoreEntry]) -> String {
    let headers = ["Nr.", "Name", "Score", "Date and time", "Difficulty"];
    let rows: Vec<[String; 5]> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            [
                (index + 1).to_string(),
                entry.name.clone(),
                entry.score.to_string(),
                entry.timestamp.clone(),
                entry.difficulty.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = headers.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: [&str; 5]| {
        let mut line = String::new();
        for (cell, width) in cells.iter().zip(widths) {
            line.push_str(cell);
            let padding = width + COLUMN_MARGIN - cell.chars().count();
            line.push_str(&" ".repeat(padding));
        }
        line.trim_end().to_string()
    };

    let mut output = String::from("Best scores:\n");
    output.push_str(&format_line(headers));
    output.push('\n');
    if rows.is_empty() {
        output.push_str(EMPTY_MESSAGE);
        output.push('\n');
    }
    for row in &rows {
        output.push_str(&format_line([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
            row[4].as_str(),
        ]));
        output.push('\n');
    }
    output
}
