//! Tag/name based checker selection.

use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::registry::CheckerInfo;

/// Default tag-exclude pattern: risky checker categories stay off.
pub const DEFAULT_DISABLE_TAGS: &str = "^experimental$|^performance$|^opinionated$";

/// Default name-exclude pattern. Checker names are never empty, so this
/// matches nothing.
pub const DEFAULT_DISABLE: &str = "^$";

/// Default tag-include pattern.
pub const DEFAULT_ENABLE_TAGS: &str = ".*";

/// Default name-include pattern.
pub const DEFAULT_ENABLE: &str = ".*";

/// The four user-supplied selection patterns, uncompiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPatterns {
    /// Checkers with any tag matching this are disabled.
    #[serde(default = "default_disable_tags")]
    pub disable_tags: String,
    /// Checkers whose name matches this are disabled.
    #[serde(default = "default_disable")]
    pub disable: String,
    /// Untagged checkers, or checkers with a tag matching this, are enabled.
    #[serde(default = "default_enable_tags")]
    pub enable_tags: String,
    /// Checkers whose name matches this are enabled.
    #[serde(default = "default_enable")]
    pub enable: String,
}

impl Default for FilterPatterns {
    fn default() -> Self {
        Self {
            disable_tags: default_disable_tags(),
            disable: default_disable(),
            enable_tags: default_enable_tags(),
            enable: default_enable(),
        }
    }
}

fn default_disable_tags() -> String {
    DEFAULT_DISABLE_TAGS.to_string()
}

fn default_disable() -> String {
    DEFAULT_DISABLE.to_string()
}

fn default_enable_tags() -> String {
    DEFAULT_ENABLE_TAGS.to_string()
}

fn default_enable() -> String {
    DEFAULT_ENABLE.to_string()
}

/// Selection errors. Both are configuration errors.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A pattern failed to compile.
    #[error("--{flag}: {source}")]
    Pattern {
        /// Flag the pattern came from.
        flag: &'static str,
        /// Regex compile error.
        source: regex::Error,
    },

    /// No checker survived selection.
    #[error("empty checkers set selected")]
    EmptySelection,
}

/// Outcome of the selection filter for one checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A tag matched the tag-exclude pattern.
    DisabledByTags,
    /// The name matched the name-exclude pattern.
    DisabledByName,
    /// Untagged, or a tag matched the tag-include pattern.
    EnabledByTags,
    /// The name matched the name-include pattern.
    EnabledByName,
    /// Nothing enabled it.
    NotEnabled,
}

impl Decision {
    /// Whether the checker runs.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::EnabledByTags | Self::EnabledByName)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let notice = match self {
            Self::DisabledByTags => "disabled by tags (--disable-tags)",
            Self::DisabledByName => "disabled by name (--disable)",
            Self::EnabledByTags => "enabled by tags (--enable-tags)",
            Self::EnabledByName => "enabled by name (--enable)",
            Self::NotEnabled => "was not enabled",
        };
        f.write_str(notice)
    }
}

/// Compiled selection patterns, fixed for a session.
#[derive(Debug, Clone)]
pub struct Filters {
    disable_tags: Regex,
    disable: Regex,
    enable_tags: Regex,
    enable: Regex,
}

impl Filters {
    /// Compiles the four patterns.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Pattern`] naming the first invalid pattern.
    pub fn new(patterns: &FilterPatterns) -> Result<Self, FilterError> {
        let compile = |flag: &'static str, pattern: &str| {
            Regex::new(pattern).map_err(|source| FilterError::Pattern { flag, source })
        };
        Ok(Self {
            disable_tags: compile("disable-tags", &patterns.disable_tags)?,
            disable: compile("disable", &patterns.disable)?,
            enable_tags: compile("enable-tags", &patterns.enable_tags)?,
            enable: compile("enable", &patterns.enable)?,
        })
    }

    /// Decides whether one checker is enabled. First matching step wins.
    #[must_use]
    pub fn decide(&self, info: &CheckerInfo) -> Decision {
        let tags = info.tag_list();
        let any_tag = |re: &Regex| tags.iter().any(|t| re.is_match(t));

        if !tags.is_empty() && any_tag(&self.disable_tags) {
            Decision::DisabledByTags
        } else if self.disable.is_match(info.name()) {
            Decision::DisabledByName
        } else if tags.is_empty() || any_tag(&self.enable_tags) {
            Decision::EnabledByTags
        } else if self.enable.is_match(info.name()) {
            Decision::EnabledByName
        } else {
            Decision::NotEnabled
        }
    }

    /// Selects the enabled checkers, keeping catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptySelection`] if nothing is enabled.
    pub fn select(
        &self,
        entries: &[Arc<CheckerInfo>],
    ) -> Result<Vec<Arc<CheckerInfo>>, FilterError> {
        let mut selected = Vec::new();
        for info in entries {
            let decision = self.decide(info);
            debug!("{}: {}", info.name(), decision);
            if decision.is_enabled() {
                selected.push(Arc::clone(info));
            }
        }

        if selected.is_empty() {
            return Err(FilterError::EmptySelection);
        }
        Ok(selected)
    }
}
