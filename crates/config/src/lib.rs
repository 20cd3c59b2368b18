//! Configuration loading and validation.
//!
//! Configuration is merged from, lowest priority first:
//!
//! 1. built-in defaults,
//! 2. a TOML file (explicit, or `booklink.toml` in the platform config dir),
//! 3. `BOOKLINK_*` environment variables,
//! 4. command-line [`Overrides`].
//!
//! The result is a [`Config`] value that `main` builds once and passes down to
//! everything that needs a path.
//!
//! ```toml
//! source = "/srv/calibre"
//! target = "/srv/mirror"
//! debounce_ms = 500
//! ```

pub mod error;
mod probe;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "BOOKLINK_";
pub const CONFIG_FILE_NAME: &str = "booklink.toml";
const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the author/book library being mirrored
    pub source: PathBuf,
    /// Root of the flat, series-aware mirror
    pub target: PathBuf,
    /// Quiet period before a burst of filesystem events triggers a sync
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// Values supplied on the command line; unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

/// Location of the configuration file when none is given explicitly.
pub fn default_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "booklink").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl Config {
    /// Build the layered [`Figment`] without extracting it.
    ///
    /// An explicitly given `file` must exist; the default one is optional.
    pub fn figment(file: Option<&Path>, overrides: &Overrides) -> Figment {
        let mut figment = Figment::new().merge(Serialized::default("debounce_ms", DEFAULT_DEBOUNCE_MS));
        match file {
            Some(file) => figment = figment.merge(Toml::file_exact(file)),
            None => {
                if let Some(file) = default_config_file() {
                    figment = figment.merge(Toml::file_exact(file));
                }
            },
        }
        figment.merge(Env::prefixed(ENV_PREFIX)).merge(Serialized::defaults(overrides))
    }

    /// Load configuration from every layer. Does not touch the filesystem
    /// beyond reading the configuration file; see [`validate`](Self::validate).
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::figment(file, overrides).extract().or_raise(|| ErrorKind::Load)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Checks both roots are directories that can be hardlinked between, and
    /// resolves them to canonical absolute paths.
    #[tracing::instrument(skip_all, fields(source = %self.source.display(), target = %self.target.display()))]
    pub fn validate(mut self) -> Result<Self> {
        self.source = directory("source", &self.source)?;
        self.target = directory("target", &self.target)?;
        probe::hardlink(&self.source, &self.target)?;
        tracing::debug!("Configuration validated");
        Ok(self)
    }
}

fn directory(role: &'static str, path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        exn::bail!(ErrorKind::NotADirectory { role, path: path.to_path_buf() });
    }
    path.canonicalize().or_raise(|| ErrorKind::NotADirectory { role, path: path.to_path_buf() })
}
