//! Settings, merged from compiled defaults, config files and the environment
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bookshelf/bookshelf.toml`
//! 3. Local config: `<data_dir>/.bookshelf.toml`
//! 4. Environment variables: `BOOKSHELF_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{DEFAULT_CAPACITY, MAX_CAPACITY};

/// Unified configuration for bookshelf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the data files (default: ~/.bookshelf)
    pub data_dir: PathBuf,
    /// Books file name, relative to `data_dir` unless absolute
    pub books_file: String,
    /// Members file name, relative to `data_dir` unless absolute
    pub members_file: String,
    /// Maximum number of titles in the relationship graph
    pub graph_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            books_file: "books.txt".into(),
            members_file: "members.txt".into(),
            graph_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub books_file: Option<String>,
    pub members_file: Option<String>,
    pub graph_capacity: Option<usize>,
}

/// Get the default data directory (~/.bookshelf).
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".bookshelf"))
        .unwrap_or_else(|| PathBuf::from("~/.bookshelf"))
}

/// Get the XDG config directory for bookshelf.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bookshelf").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bookshelf.toml"))
}

/// Get the path to the local config file in a data directory.
pub fn local_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".bookshelf.toml")
}

impl RawSettings {
    /// Parse one config file. Only the keys present in the file are `Some`.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let text = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
            message: format!("read {}: {e}", path.display()),
        })?;
        toml::from_str(&text).map_err(|e| ApplicationError::Config {
            message: format!("parse {}: {e}", path.display()),
        })
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    pub fn books_path(&self) -> PathBuf {
        self.data_dir.join(&self.books_file)
    }

    pub fn members_path(&self) -> PathBuf {
        self.data_dir.join(&self.members_file)
    }

    /// Expand shell variables and tilde in `data_dir`.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            books_file: overlay
                .books_file
                .clone()
                .unwrap_or_else(|| self.books_file.clone()),
            members_file: overlay
                .members_file
                .clone()
                .unwrap_or_else(|| self.members_file.clone()),
            graph_capacity: overlay.graph_capacity.unwrap_or(self.graph_capacity),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `data_dir` - Explicit data directory (e.g. from the command line). It
    ///   replaces whatever the global config says and selects the local config.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/bookshelf/bookshelf.toml`
    /// 3. Local config: `<data_dir>/.bookshelf.toml`
    /// 4. Environment variables: `BOOKSHELF_*` prefix
    pub fn load(data_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut settings = Self::default();
        if let Some(global) = global_config_path().filter(|p| p.exists()) {
            settings = settings.merge_with(&RawSettings::from_file(&global)?);
        }

        // the explicit directory decides which local file applies
        if let Some(dir) = data_dir {
            settings.data_dir = dir.to_path_buf();
        }
        settings.expand_paths();

        let local = local_config_path(&settings.data_dir);
        if local.exists() {
            settings = settings.merge_with(&RawSettings::from_file(&local)?);
        }

        let mut settings = Self::apply_env_overrides(settings)?;
        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the library cannot be built with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if !(1..=MAX_CAPACITY).contains(&self.graph_capacity) {
            return Err(ApplicationError::Config {
                message: format!(
                    "graph_capacity must be between 1 and {MAX_CAPACITY}, got {}",
                    self.graph_capacity
                ),
            });
        }
        Ok(())
    }

    /// Apply BOOKSHELF_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let env = Config::builder()
            .add_source(Environment::with_prefix("BOOKSHELF"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = env.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = env.get_string("books_file") {
            settings.books_file = val;
        }
        if let Ok(val) = env.get_string("members_file") {
            settings.members_file = val;
        }
        if let Ok(val) = env.get_int("graph_capacity") {
            settings.graph_capacity = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("graph_capacity must not be negative: {val}"),
            })?;
        }

        Ok(settings)
    }

    /// Effective settings rendered as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Commented config file listing every key with its default.
    pub fn template() -> String {
        r#"# bookshelf configuration
#
# Later entries override earlier ones:
#   Global: ~/.config/bookshelf/bookshelf.toml
#   Local:  <data_dir>/.bookshelf.toml
#   Env:    BOOKSHELF_* environment variables

# Directory holding the data files
# data_dir = "~/.bookshelf"

# One "title,author,identifier" line per book, sorted by title
# books_file = "books.txt"

# One "name,id" line per member, in insertion order
# members_file = "members.txt"

# Maximum number of titles in the recommendation graph (1 to 4096)
# graph_capacity = 100
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
