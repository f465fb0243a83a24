//! The orchestrator: loads the program, builds the active checker set and
//! dispatches it over every unit.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use regex::Regex;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::context::{LintContext, RunContext, TargetSizes};
use crate::filter::{FilterError, FilterPatterns, Filters};
use crate::loader::{CrateLoader, LoadError};
use crate::plugin::{ExtensionLoader, ManifestLoader, PluginError};
use crate::program::{Package, Program, SourceLoader, SourceUnit};
use crate::registry::{Registry, RegistryError};
use crate::report::Reporter;
use crate::rule::{CheckError, Checker};

/// Fatal errors of a lint run.
#[derive(Debug, Error)]
pub enum LintError {
    /// The source loader could not resolve the requested packages.
    #[error("load program: {0}")]
    Load(#[from] LoadError),

    /// A requested package is missing from the loaded program.
    #[error("load program: package {0} was not loaded")]
    NotLoaded(String),

    /// A requested package or one of its dependencies has errors.
    #[error("load program: package {0} (or its dependencies) has errors")]
    Broken(String),

    /// The plugin could not be loaded.
    #[error("load plugin: {0}")]
    Plugin(#[from] PluginError),

    /// Plugin entries conflict with registered checkers.
    #[error("load plugin: {0}")]
    Registry(#[from] RegistryError),

    /// No size information for the target architecture.
    #[error("init checkers: can't find sizes info for {0}")]
    UnknownTarget(String),

    /// Invalid selection pattern or empty selection.
    #[error("init checkers: {0}")]
    Filter(#[from] FilterError),

    /// The checker thread pool could not be started.
    #[error("init checkers: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),

    /// A checker faulted while inspecting a unit.
    #[error("run checkers: {rule}: {source}")]
    RuleFault {
        /// Name of the faulting checker.
        rule: String,
        /// The fault it returned.
        source: CheckError,
    },
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// At least one warning was reported.
    pub found_issues: bool,
    /// Total warnings reported.
    pub warnings: usize,
    /// Units handed to the checkers.
    pub units_checked: usize,
    /// Units skipped as test or generated.
    pub units_skipped: usize,
}

/// Builder for a [`Linter`].
pub struct LinterBuilder {
    registry: Registry,
    loader: Box<dyn SourceLoader>,
    extensions: Box<dyn ExtensionLoader>,
    filters: FilterPatterns,
    plugin: Option<PathBuf>,
    target_arch: Option<String>,
    check_tests: bool,
    check_generated: bool,
    jobs: usize,
}

impl Default for LinterBuilder {
    fn default() -> Self {
        Self {
            registry: Registry::new(),
            loader: Box::new(CrateLoader::new()),
            extensions: Box::new(ManifestLoader::new()),
            filters: FilterPatterns::default(),
            plugin: None,
            target_arch: None,
            check_tests: true,
            check_generated: false,
            jobs: 0,
        }
    }
}

impl LinterBuilder {
    /// Creates a builder with the default loaders and settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the registry holding the built-in checkers.
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the source loader.
    #[must_use]
    pub fn loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Sets the plugin loader.
    #[must_use]
    pub fn extensions(mut self, loader: impl ExtensionLoader + 'static) -> Self {
        self.extensions = Box::new(loader);
        self
    }

    /// Sets the selection patterns.
    #[must_use]
    pub fn filters(mut self, filters: FilterPatterns) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the plugin to load before selection.
    #[must_use]
    pub fn plugin(mut self, path: Option<PathBuf>) -> Self {
        self.plugin = path;
        self
    }

    /// Overrides the target architecture (default: host).
    #[must_use]
    pub fn target_arch(mut self, arch: Option<String>) -> Self {
        self.target_arch = arch;
        self
    }

    /// Sets whether test units are checked (default: true).
    #[must_use]
    pub fn check_tests(mut self, yes: bool) -> Self {
        self.check_tests = yes;
        self
    }

    /// Sets whether generated units are checked (default: false).
    #[must_use]
    pub fn check_generated(mut self, yes: bool) -> Self {
        self.check_generated = yes;
        self
    }

    /// Sets the number of checker threads (default: 0, one per CPU).
    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Builds the linter.
    #[must_use]
    pub fn build(self) -> Linter {
        Linter {
            registry: self.registry,
            loader: self.loader,
            extensions: self.extensions,
            filters: self.filters,
            plugin: self.plugin,
            target_arch: self.target_arch,
            check_tests: self.check_tests,
            check_generated: self.check_generated,
            jobs: self.jobs,
        }
    }
}

/// Drives one lint session.
///
/// Use [`Linter::builder()`] to construct an instance. A linter owns its
/// registry and is consumed by [`Linter::run`], so plugin entries can never
/// leak into a later run.
pub struct Linter {
    registry: Registry,
    loader: Box<dyn SourceLoader>,
    extensions: Box<dyn ExtensionLoader>,
    filters: FilterPatterns,
    plugin: Option<PathBuf>,
    target_arch: Option<String>,
    check_tests: bool,
    check_generated: bool,
    jobs: usize,
}

impl Linter {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> LinterBuilder {
        LinterBuilder::new()
    }

    /// Runs every selected checker over `packages` and their test variants.
    ///
    /// Warnings go to `reporter` as soon as a checker returns them.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Nothing is checked unless every
    /// package loaded cleanly and the checker set could be built.
    pub fn run(self, packages: &[String], reporter: &dyn Reporter) -> Result<Summary, LintError> {
        let Self {
            mut registry,
            loader,
            extensions,
            filters,
            plugin,
            target_arch,
            check_tests,
            check_generated,
            jobs,
        } = self;

        info!("Loading {} packages", packages.len());
        let program = loader.load(packages)?;
        validate(&program, packages)?;

        if let Some(path) = &plugin {
            info!("Loading plugin {}", path.display());
            let extras = extensions.load_extras(path)?;
            let added = registry.extend(extras)?;
            debug!("Plugin registered {added} checkers");
        }

        let arch = target_arch.unwrap_or_else(|| std::env::consts::ARCH.to_string());
        let sizes = TargetSizes::for_arch(&arch).ok_or(LintError::UnknownTarget(arch))?;
        let lint = LintContext::new(sizes);

        let catalog = registry.freeze();
        let selected = Filters::new(&filters)?.select(catalog.entries())?;
        let mut checkers: Vec<Checker> = selected
            .into_iter()
            .map(|info| Checker::new(&lint, info))
            .collect();
        let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
        info!(
            "Running {} of {} checkers on {} threads",
            checkers.len(),
            catalog.entries().len(),
            pool.current_num_threads()
        );

        let session = Session {
            lint: &lint,
            pool: &pool,
            reporter,
            check_tests,
            check_generated,
        };
        let mut summary = Summary::default();
        for id in packages {
            if let Some(package) = program.package(id) {
                session.check_package(&mut checkers, package, &mut summary)?;
            }
            if let Some(tests) = program.test_variant(id) {
                session.check_package(&mut checkers, tests, &mut summary)?;
            }
        }

        info!(
            "Checked {} units ({} skipped), {} warnings",
            summary.units_checked, summary.units_skipped, summary.warnings
        );
        Ok(summary)
    }
}

fn validate(program: &Program, packages: &[String]) -> Result<(), LintError> {
    for id in packages {
        let package = program
            .package(id)
            .ok_or_else(|| LintError::NotLoaded(id.clone()))?;
        if !package.is_transitively_error_free() {
            return Err(LintError::Broken(id.clone()));
        }
        if let Some(tests) = program.test_variant(id) {
            if !tests.is_transitively_error_free() {
                return Err(LintError::Broken(tests.id().to_string()));
            }
        }
    }
    Ok(())
}

/// Generated-code marker. The final `.` is any character, so
/// `DO NOT EDIT!` counts too; `.` never crosses a line break.
const GENERATED_MARKER: &str = "Code generated .* DO NOT EDIT.";

/// Whether a leading comment group carries the generated-code marker on
/// one of its lines.
#[must_use]
pub fn is_generated_marker(comments: &str) -> bool {
    static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    MARKER
        .get_or_init(|| Regex::new(GENERATED_MARKER).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(comments))
}

struct Session<'a> {
    lint: &'a LintContext,
    pool: &'a ThreadPool,
    reporter: &'a dyn Reporter,
    check_tests: bool,
    check_generated: bool,
}

impl Session<'_> {
    fn check_package(
        &self,
        checkers: &mut [Checker],
        package: &Package,
        summary: &mut Summary,
    ) -> Result<(), LintError> {
        debug!("Checking package {}", package.id());
        for unit in package.units() {
            if let Some(reason) = self.skip_reason(unit) {
                debug!("Skipping {} ({reason})", unit.path().display());
                summary.units_skipped += 1;
                continue;
            }
            let found = self.check_unit(checkers, package, unit)?;
            summary.units_checked += 1;
            summary.warnings += found;
            summary.found_issues |= found > 0;
        }
        Ok(())
    }

    fn skip_reason(&self, unit: &SourceUnit) -> Option<&'static str> {
        if !self.check_tests && unit.is_test() {
            return Some("test");
        }
        if !self.check_generated
            && unit
                .leading_comments()
                .is_some_and(|c| is_generated_marker(&c))
        {
            return Some("generated");
        }
        None
    }

    /// Runs every checker on one unit concurrently and waits for all of them.
    fn check_unit(
        &self,
        checkers: &mut [Checker],
        package: &Package,
        unit: &SourceUnit,
    ) -> Result<usize, LintError> {
        let ctx = RunContext::new(self.lint, package, unit);
        let reporter = self.reporter;
        let found = AtomicUsize::new(0);
        let faults = Mutex::new(Vec::new());

        self.pool.scope(|scope| {
            for checker in checkers.iter_mut() {
                let found = &found;
                let faults = &faults;
                scope.spawn(move |_| {
                    let rule = checker.info().name().to_string();
                    match checker.check(&ctx) {
                        Ok(warnings) => {
                            for warning in warnings {
                                reporter.report(&rule, &ctx.position(warning.pos), &warning.text);
                            }
                            found.fetch_add(warnings.len(), Ordering::Relaxed);
                        }
                        Err(err) => {
                            error!("{rule}: error: {err}");
                            faults
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .push((rule, err));
                        }
                    }
                });
            }
        });

        let faults = faults.into_inner().unwrap_or_else(PoisonError::into_inner);
        if let Some((rule, source)) = faults.into_iter().next() {
            return Err(LintError::RuleFault { rule, source });
        }
        Ok(found.into_inner())
    }
}
