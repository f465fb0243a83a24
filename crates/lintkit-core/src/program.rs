//! Loaded program model: packages, compilation units and semantic info.
//!
//! A [`SourceLoader`] turns package identifiers into a [`Program`]. The
//! orchestrator never reads or parses source itself; it only consumes what
//! the loader hands back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::loader::LoadError;

/// Suffix appended to a package identifier to name its external test package.
pub const TEST_VARIANT_SUFFIX: &str = "_test";

/// One source file of a package.
///
/// The unit is stored as text and re-parsed by whoever needs an AST.
/// `syn` trees hold `proc_macro2` spans, which cannot cross threads.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    path: PathBuf,
    source: Arc<str>,
    in_test_package: bool,
}

impl SourceUnit {
    /// Creates a unit from its path and already-validated source text.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, source: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            in_test_package: false,
        }
    }

    /// Marks the unit as belonging to an external test package.
    #[must_use]
    pub fn in_test_package(mut self, yes: bool) -> Self {
        self.in_test_package = yes;
        self
    }

    /// Path of the unit as it was loaded.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Base file name of the unit, without any directory.
    ///
    /// Test-unit detection and checker file identity use this name only.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Whether this is a test unit.
    ///
    /// Every unit of an external test package is one; elsewhere the base
    /// file name decides.
    #[must_use]
    pub fn is_test(&self) -> bool {
        if self.in_test_package {
            return true;
        }
        let name = self.file_name();
        name.ends_with("_test.rs")
            || name.ends_with("_tests.rs")
            || name.starts_with("test_")
            || name == "tests.rs"
    }

    /// Text of the leading comment group, if the file starts with one.
    ///
    /// Blank lines before the group are skipped. Line comments (`//`, `//!`,
    /// `///`) and block comments are both accepted; comment markers are
    /// stripped and lines are joined with `\n`.
    #[must_use]
    pub fn leading_comments(&self) -> Option<String> {
        let mut lines = Vec::new();
        let mut in_block = false;

        for raw in self.source.lines() {
            let line = raw.trim();
            if in_block {
                if let Some(end) = line.find("*/") {
                    lines.push(line[..end].trim_start_matches('*').trim().to_string());
                    in_block = false;
                } else {
                    lines.push(line.trim_start_matches('*').trim().to_string());
                }
                continue;
            }
            if line.is_empty() {
                if lines.is_empty() {
                    continue;
                }
                break;
            }
            if let Some(rest) = line.strip_prefix("//") {
                lines.push(rest.trim_start_matches(['/', '!']).trim().to_string());
            } else if let Some(rest) = line.strip_prefix("/*") {
                let rest = rest.trim_start_matches(['*', '!']);
                if let Some(end) = rest.find("*/") {
                    lines.push(rest[..end].trim().to_string());
                } else {
                    lines.push(rest.trim().to_string());
                    in_block = true;
                }
            } else {
                break;
            }
        }

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Parses the unit into a fresh syntax tree.
    ///
    /// # Errors
    ///
    /// Returns the `syn` error if the text does not parse.
    pub fn parse(&self) -> Result<syn::File, syn::Error> {
        syn::parse_file(&self.source)
    }
}

/// Kind of a top-level item recorded in [`SemanticInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// A free function.
    Fn {
        /// Declared `async`.
        is_async: bool,
        /// Return type is spelled `Result<..>` (any path ending in `Result`).
        returns_result: bool,
    },
    /// A struct.
    Struct,
    /// An enum.
    Enum,
    /// A trait.
    Trait,
    /// A type alias.
    Type,
    /// A const or static.
    Value,
    /// An inline or out-of-line module.
    Mod,
}

/// Package-wide symbol table built by the loader.
///
/// Maps top-level item names to their kind. Names declared in more than one
/// unit keep the first declaration seen.
#[derive(Debug, Clone, Default)]
pub struct SemanticInfo {
    items: BTreeMap<String, ItemKind>,
}

impl SemanticInfo {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every top-level item of `file`.
    pub fn record_file(&mut self, file: &syn::File) {
        for item in &file.items {
            if let Some((name, kind)) = item_entry(item) {
                self.items.entry(name).or_insert(kind);
            }
        }
    }

    /// Looks up a top-level item by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ItemKind> {
        self.items.get(name).copied()
    }

    /// Whether `name` is a package function returning `Result`.
    #[must_use]
    pub fn returns_result(&self, name: &str) -> bool {
        matches!(
            self.lookup(name),
            Some(ItemKind::Fn {
                returns_result: true,
                ..
            })
        )
    }

    /// Number of recorded items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn item_entry(item: &syn::Item) -> Option<(String, ItemKind)> {
    let entry = match item {
        syn::Item::Fn(f) => (
            f.sig.ident.to_string(),
            ItemKind::Fn {
                is_async: f.sig.asyncness.is_some(),
                returns_result: returns_result(&f.sig.output),
            },
        ),
        syn::Item::Struct(s) => (s.ident.to_string(), ItemKind::Struct),
        syn::Item::Enum(e) => (e.ident.to_string(), ItemKind::Enum),
        syn::Item::Trait(t) => (t.ident.to_string(), ItemKind::Trait),
        syn::Item::Type(t) => (t.ident.to_string(), ItemKind::Type),
        syn::Item::Const(c) => (c.ident.to_string(), ItemKind::Value),
        syn::Item::Static(s) => (s.ident.to_string(), ItemKind::Value),
        syn::Item::Mod(m) => (m.ident.to_string(), ItemKind::Mod),
        _ => return None,
    };
    Some(entry)
}

fn returns_result(output: &syn::ReturnType) -> bool {
    let syn::ReturnType::Type(_, ty) = output else {
        return false;
    };
    let syn::Type::Path(path) = ty.as_ref() else {
        return false;
    };
    path.path
        .segments
        .last()
        .is_some_and(|seg| seg.ident == "Result")
}

/// A loaded package: its units plus what the loader learned about it.
#[derive(Debug, Clone)]
pub struct Package {
    id: String,
    units: Vec<SourceUnit>,
    info: SemanticInfo,
    transitively_error_free: bool,
}

impl Package {
    /// Creates a package.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        units: Vec<SourceUnit>,
        info: SemanticInfo,
        transitively_error_free: bool,
    ) -> Self {
        Self {
            id: id.into(),
            units,
            info,
            transitively_error_free,
        }
    }

    /// Folds the dependency status into the error-free flag.
    #[must_use]
    pub fn with_dependencies_clean(mut self, clean: bool) -> Self {
        self.transitively_error_free &= clean;
        self
    }

    /// Package identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Compilation units, in load order.
    #[must_use]
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Semantic information for the package.
    #[must_use]
    pub fn info(&self) -> &SemanticInfo {
        &self.info
    }

    /// Whether the package and all of its dependencies loaded cleanly.
    #[must_use]
    pub fn is_transitively_error_free(&self) -> bool {
        self.transitively_error_free
    }
}

/// Everything the loader produced for one run.
#[derive(Debug, Clone, Default)]
pub struct Program {
    packages: BTreeMap<String, Package>,
}

impl Program {
    /// Creates an empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package, replacing one with the same identifier.
    pub fn insert(&mut self, package: Package) {
        self.packages.insert(package.id.clone(), package);
    }

    /// Looks up a package by identifier.
    #[must_use]
    pub fn package(&self, id: &str) -> Option<&Package> {
        self.packages.get(id)
    }

    /// Looks up the external test package of `id`, if one was loaded.
    #[must_use]
    pub fn test_variant(&self, id: &str) -> Option<&Package> {
        self.packages.get(&format!("{id}{TEST_VARIANT_SUFFIX}"))
    }

    /// Number of loaded packages, test variants included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns true if no package was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Produces a [`Program`] from package identifiers.
pub trait SourceLoader {
    /// Loads the given packages and their external test packages.
    ///
    /// A package that fails to compile is still returned, flagged as not
    /// error-free; the orchestrator decides what to do with it.
    ///
    /// # Errors
    ///
    /// Returns an error when an identifier cannot be resolved at all.
    fn load(&self, packages: &[String]) -> Result<Program, LoadError>;
}
