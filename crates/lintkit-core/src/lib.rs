//! # lintkit-core
//!
//! Checker orchestration runtime for `syn` based Rust linters.
//!
//! This crate provides everything between "a set of rules" and "a list of
//! findings":
//!
//! - [`Registry`] / [`Catalog`] for registering checkers explicitly
//! - [`Filters`] for tag/name based selection
//! - [`Check`] and [`Checker`], the rule contract and its per-run instance
//! - [`Linter`], which loads crates and dispatches every selected checker
//!   over each unit concurrently
//! - [`ExtensionLoader`] / [`ManifestLoader`] for plugin checkers
//! - [`linttest`], a golden-file harness for rule tests
//!
//! ## Example
//!
//! ```ignore
//! use lintkit_core::{Linter, Printer, Registry};
//!
//! let mut registry = Registry::new();
//! lintkit_rules::register_all(&mut registry)?;
//!
//! let summary = Linter::builder()
//!     .registry(registry)
//!     .build()
//!     .run(&["crates/app".to_string()], &Printer::new())?;
//!
//! if summary.found_issues {
//!     std::process::exit(1);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod filter;
mod linter;
mod loader;
mod plugin;
mod program;
mod registry;
mod report;
mod rule;
mod types;

pub mod linttest;

pub use config::{Config, ConfigError};
pub use context::{LintContext, RunContext, TargetSizes};
pub use filter::{
    Decision, FilterError, FilterPatterns, Filters, DEFAULT_DISABLE, DEFAULT_DISABLE_TAGS,
    DEFAULT_ENABLE, DEFAULT_ENABLE_TAGS,
};
pub use linter::{is_generated_marker, LintError, Linter, LinterBuilder, Summary};
pub use loader::{CrateLoader, LoadError};
pub use plugin::{ExtensionLoader, ManifestLoader, PluginError};
pub use program::{
    ItemKind, Package, Program, SemanticInfo, SourceLoader, SourceUnit, TEST_VARIANT_SUFFIX,
};
pub use registry::{Catalog, CheckerInfo, Constructor, Registry, RegistryError};
pub use report::{Collector, Format, Printer, Report, Reporter, RootAliases};
pub use rule::{Check, CheckBox, CheckError, Checker};
pub use types::{Pos, Position, Warning};
