//! Application configuration: defaults, optional TOML file, `NUMCONV_*` environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    models::{Difficulty, RuleOverrides},
    scores::ScoreStore,
};

/// Directory under the user config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "numconv";
/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"# numconv configuration

# Where high scores are kept. Defaults to the platform data directory.
# score_file = "/path/to/highscores.json"

# Word list for the code point game, one word per line.
# words_file = "/path/to/words.txt"

# Skip the difficulty prompt: novice, intermediate, expert or master.
# difficulty = "intermediate"

# Scoring rule overrides applied to every game.
[rules]
# allowed_errors = 3
# error_penalty = 0
# timeout_penalty = 0
"#;

/// Settings resolved once at startup and passed down explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// High score file; the platform data directory when unset.
    #[serde(default)]
    pub score_file: Option<PathBuf>,
    /// Word list for the code point game, one word per line.
    #[serde(default)]
    pub words_file: Option<PathBuf>,
    /// Preset level that skips the difficulty prompt.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    /// Scoring rules applied on top of every game's setup.
    #[serde(default)]
    pub rules: RuleOverrides,
}

impl AppConfig {
    /// Load from the default config file location.
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_path())
    }

    /// Load from `path` (optional) layered under `NUMCONV_*` variables.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("NUMCONV").separator("__"))
            .build()
            .with_context(|| format!("failed to load configuration from {}", path.display()))?;
        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Score file honouring the `score_file` override.
    pub fn score_path(&self, debug: bool) -> PathBuf {
        self.score_file
            .clone()
            .unwrap_or_else(|| ScoreStore::default_path(debug))
    }
}

/// `config.toml` under the user config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Write a commented template at the default location if none exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = default_config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    info!("created default config at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn template_parses_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("cfg").join(CONFIG_FILE_NAME);
        write_default_config(&path)?;
        assert!(path.exists());
        assert_eq!(AppConfig::load_from(&path)?, AppConfig::default());
        Ok(())
    }

    #[test]
    fn file_values_are_read() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "score_file = \"/tmp/scores.json\"\ndifficulty = \"expert\"\n\n[rules]\nerror_penalty = 2\n",
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.difficulty, Some(Difficulty::Expert));
        assert_eq!(config.rules.error_penalty, Some(2));
        assert_eq!(config.rules.allowed_errors, None);
        assert_eq!(config.score_path(false), PathBuf::from("/tmp/scores.json"));
        Ok(())
    }

    #[test]
    fn difficulty_takes_short_and_capitalised_names() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "difficulty = \"n\"\n")?;
        assert_eq!(AppConfig::load_from(&path)?.difficulty, Some(Difficulty::Novice));
        fs::write(&path, "difficulty = \"Expert\"\n")?;
        assert_eq!(AppConfig::load_from(&path)?.difficulty, Some(Difficulty::Expert));
        fs::write(&path, "difficulty = \"hard\"\n")?;
        assert!(AppConfig::load_from(&path).is_err());
        Ok(())
    }

    #[test]
    fn missing_file_is_not_an_error() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(&dir.path().join("absent.toml"))?;
        assert_eq!(config.words_file, None);
        Ok(())
    }

    #[test]
    fn existing_config_is_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "difficulty = \"n\"\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "difficulty = \"n\"\n");
        Ok(())
    }
}
