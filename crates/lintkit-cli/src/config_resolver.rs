//! Locating `lintkit.toml`.
//!
//! Lookup order, first hit wins:
//!
//! 1. `--config <path>` (trusted as-is, a missing file is a load error)
//! 2. `lintkit.toml`, then `.lintkit.toml`, in the working directory
//! 3. `config.toml` in the global directory: `$LINTKIT_CONFIG_DIR`, else
//!    `~/.lintkit`
//! 4. built-in defaults

use std::fmt;
use std::path::{Path, PathBuf};

/// Where the configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the working directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Path of the config file, unless defaults are used.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Whether the file came from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{} (--config)", p.display()),
            Self::Project(p) => write!(f, "{}", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Default => f.write_str("built-in defaults"),
        }
    }
}

const PROJECT_NAMES: [&str; 2] = ["lintkit.toml", ".lintkit.toml"];
const GLOBAL_NAME: &str = "config.toml";
const GLOBAL_DIR_ENV: &str = "LINTKIT_CONFIG_DIR";

/// Resolves the configuration for a run started in `project_dir`.
#[must_use]
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    let source = resolve_in(project_dir, explicit, global_dir().as_deref());
    tracing::debug!("Configuration: {source}");
    source
}

fn resolve_in(project_dir: &Path, explicit: Option<&Path>, global: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    let project = PROJECT_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|p| p.is_file())
        .map(ConfigSource::Project);

    project
        .or_else(|| {
            global
                .map(|dir| dir.join(GLOBAL_NAME))
                .filter(|p| p.is_file())
                .map(ConfigSource::Global)
        })
        .unwrap_or(ConfigSource::Default)
}

/// The global config directory, if one can be determined.
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    std::env::var_os(GLOBAL_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".lintkit")))
}
