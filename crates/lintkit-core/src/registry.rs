//! Checker registry.
//!
//! Rules are registered into a [`Registry`] during a bounded registration
//! phase (built-ins first, then plugin extras). [`Registry::freeze`] ends
//! that phase and hands out an immutable [`Catalog`] for selection.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::context::LintContext;
use crate::rule::CheckBox;

/// Constructor producing a fresh rule instance for one run.
pub type Constructor = Arc<dyn Fn(&LintContext) -> CheckBox + Send + Sync>;

/// Registration entry describing one checker.
#[derive(Clone)]
pub struct CheckerInfo {
    name: String,
    tags: Vec<String>,
    summary: String,
    constructor: Constructor,
}

impl std::fmt::Debug for CheckerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerInfo")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl CheckerInfo {
    /// Creates an untagged entry.
    #[must_use]
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&LintContext) -> CheckBox + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            tags: Vec::new(),
            summary: String::new(),
            constructor: Arc::new(constructor),
        }
    }

    /// Sets the classification tags.
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the one-line summary shown by `list-rules`.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Unique checker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classification tags, possibly empty.
    #[must_use]
    pub fn tag_list(&self) -> &[String] {
        &self.tags
    }

    /// One-line summary.
    #[must_use]
    pub fn summary_text(&self) -> &str {
        &self.summary
    }

    /// Builds a new rule instance.
    #[must_use]
    pub fn instantiate(&self, ctx: &LintContext) -> CheckBox {
        (self.constructor)(ctx)
    }
}

/// Errors raised while registering checkers.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A checker without a name.
    #[error("checker name must not be empty")]
    EmptyName,

    /// A checker tagged with an empty string.
    #[error("{name}: empty tag")]
    EmptyTag {
        /// Offending checker.
        name: String,
    },

    /// Two checkers share a name.
    #[error("{name}: checker already registered")]
    Duplicate {
        /// Offending checker.
        name: String,
    },
}

/// Append-only collection of registration entries.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Arc<CheckerInfo>>,
    names: HashSet<String>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, a tag is empty, or the name
    /// is already taken.
    pub fn register(&mut self, info: CheckerInfo) -> Result<(), RegistryError> {
        self.validate(&info)?;
        self.names.insert(info.name.clone());
        self.entries.push(Arc::new(info));
        Ok(())
    }

    /// Adds a batch of entries, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns the first validation error; the registry is left unchanged.
    pub fn extend<I>(&mut self, batch: I) -> Result<usize, RegistryError>
    where
        I: IntoIterator<Item = CheckerInfo>,
    {
        let batch: Vec<CheckerInfo> = batch.into_iter().collect();
        let mut pending = HashSet::new();
        for info in &batch {
            self.validate(info)?;
            if !pending.insert(info.name.as_str()) {
                return Err(RegistryError::Duplicate {
                    name: info.name.clone(),
                });
            }
        }

        let added = batch.len();
        for info in batch {
            self.names.insert(info.name.clone());
            self.entries.push(Arc::new(info));
        }
        Ok(added)
    }

    fn validate(&self, info: &CheckerInfo) -> Result<(), RegistryError> {
        if info.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if info.tags.iter().any(String::is_empty) {
            return Err(RegistryError::EmptyTag {
                name: info.name.clone(),
            });
        }
        if self.names.contains(&info.name) {
            return Err(RegistryError::Duplicate {
                name: info.name.clone(),
            });
        }
        Ok(())
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ends the registration phase.
    #[must_use]
    pub fn freeze(self) -> Catalog {
        Catalog {
            entries: self.entries.into(),
        }
    }
}

/// Frozen, enumerable view of every registered checker.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Arc<[Arc<CheckerInfo>]>,
}

impl Catalog {
    /// All entries, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[Arc<CheckerInfo>] {
        &self.entries
    }

    /// Looks up an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<CheckerInfo>> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunContext;
    use crate::rule::{Check, CheckError};
    use crate::types::Warning;

    struct Noop;

    impl Check for Noop {
        fn check(
            &mut self,
            _ctx: &RunContext<'_>,
            _file: &syn::File,
            _out: &mut Vec<Warning>,
        ) -> Result<(), CheckError> {
            Ok(())
        }
    }

    fn entry(name: &str) -> CheckerInfo {
        CheckerInfo::new(name, |_| Box::new(Noop))
    }

    #[test]
    fn register_rejects_duplicates_and_empty_names() {
        let mut registry = Registry::new();
        registry.register(entry("a")).unwrap();

        assert!(matches!(
            registry.register(entry("a")),
            Err(RegistryError::Duplicate { .. })
        ));
        assert!(matches!(
            registry.register(entry("")),
            Err(RegistryError::EmptyName)
        ));
        assert!(matches!(
            registry.register(entry("b").tags([""])),
            Err(RegistryError::EmptyTag { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn extend_is_all_or_nothing() {
        let mut registry = Registry::new();
        registry.register(entry("a")).unwrap();

        let err = registry
            .extend([entry("b"), entry("c"), entry("a")])
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { name } if name == "a"));
        assert_eq!(registry.len(), 1);

        let err = registry.extend([entry("b"), entry("b")]).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { .. }));
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.extend([entry("b"), entry("c")]).unwrap(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn freeze_keeps_registration_order() {
        let mut registry = Registry::new();
        registry
            .register(entry("first").tags(["style"]).summary("one"))
            .unwrap();
        registry.register(entry("second")).unwrap();

        let catalog = registry.freeze();
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["first", "second"]);

        let first = catalog.get("first").unwrap();
        assert_eq!(first.tag_list(), ["style"]);
        assert_eq!(first.summary_text(), "one");
        assert!(catalog.get("third").is_none());
    }
}
