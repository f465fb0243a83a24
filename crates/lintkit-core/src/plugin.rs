//! Plugin extension point.
//!
//! Extra checkers are loaded once per run, before selection, through an
//! [`ExtensionLoader`]. The bundled [`ManifestLoader`] reads a TOML manifest
//! of line-pattern checkers:
//!
//! ```toml
//! [plugin]
//! name = "house-style"
//!
//! [[checkers]]
//! name = "no-dbg"
//! tags = ["style"]
//! summary = "Leftover dbg! calls"
//! pattern = 'dbg!\('
//! message = "remove dbg! before merging"
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::context::RunContext;
use crate::registry::CheckerInfo;
use crate::rule::{Check, CheckError};
use crate::types::{Pos, Warning};

/// Errors while loading a plugin.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin file could not be read.
    #[error("failed to read plugin {}: {source}", .path.display())]
    Io {
        /// Plugin path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The manifest is not valid TOML for the expected shape.
    #[error("failed to parse plugin {}: {message}", .path.display())]
    Parse {
        /// Plugin path.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// A checker pattern failed to compile.
    #[error("{checker}: invalid pattern: {source}")]
    Pattern {
        /// Checker the pattern belongs to.
        checker: String,
        /// Regex compile error.
        source: regex::Error,
    },

    /// The manifest defines a checker twice.
    #[error("{checker}: defined more than once")]
    Duplicate {
        /// Checker name.
        checker: String,
    },
}

/// Loads extra registration entries from a plugin artifact.
///
/// Implementations must either return every entry of the artifact or fail;
/// callers register nothing from a failed load.
pub trait ExtensionLoader {
    /// Loads the entries provided by the artifact at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] describing why the artifact is unusable.
    fn load_extras(&self, path: &Path) -> Result<Vec<CheckerInfo>, PluginError>;
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    plugin: PluginMeta,
    #[serde(default)]
    checkers: Vec<CheckerDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginMeta {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckerDef {
    name: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    summary: String,
    pattern: String,
    message: String,
}

/// Loads line-pattern checkers from TOML manifests.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestLoader;

impl ManifestLoader {
    /// Creates a manifest loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds entries from manifest text; `path` is used for messages only.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML, invalid patterns or duplicate names.
    pub fn parse(&self, path: &Path, content: &str) -> Result<Vec<CheckerInfo>, PluginError> {
        let manifest: Manifest = toml::from_str(content).map_err(|e| PluginError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(
            "Plugin {} {}",
            manifest.plugin.name,
            manifest.plugin.version.as_deref().unwrap_or("(unversioned)")
        );

        let mut seen = std::collections::HashSet::new();
        let mut entries = Vec::with_capacity(manifest.checkers.len());
        for def in manifest.checkers {
            if !seen.insert(def.name.clone()) {
                return Err(PluginError::Duplicate { checker: def.name });
            }
            let pattern = Regex::new(&def.pattern).map_err(|source| PluginError::Pattern {
                checker: def.name.clone(),
                source,
            })?;
            let message = def.message;
            entries.push(
                CheckerInfo::new(def.name, move |_| {
                    Box::new(LinePattern {
                        pattern: pattern.clone(),
                        message: message.clone(),
                    })
                })
                .tags(def.tags)
                .summary(def.summary),
            );
        }

        info!(
            "Plugin {} provides {} checkers",
            manifest.plugin.name,
            entries.len()
        );
        Ok(entries)
    }
}

impl ExtensionLoader for ManifestLoader {
    fn load_extras(&self, path: &Path) -> Result<Vec<CheckerInfo>, PluginError> {
        let content = std::fs::read_to_string(path).map_err(|source| PluginError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &content)
    }
}

/// Flags every match of a regex, line by line.
struct LinePattern {
    pattern: Regex,
    message: String,
}

impl Check for LinePattern {
    fn check(
        &mut self,
        ctx: &RunContext<'_>,
        _file: &syn::File,
        out: &mut Vec<Warning>,
    ) -> Result<(), CheckError> {
        for (index, line) in ctx.unit().source().lines().enumerate() {
            for m in self.pattern.find_iter(line) {
                let column = line[..m.start()].chars().count() + 1;
                out.push(Warning::new(Pos::new(index + 1, column), self.message.clone()));
            }
        }
        Ok(())
    }
}
