//! Default source loader for Rust crates.
//!
//! A package identifier is a crate directory. Units are the `.rs` files under
//! its `src/` directory (or the directory itself when there is no `src/`).
//! The crate's `tests/` directory becomes the external test package
//! `<id>_test`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::program::{
    Package, Program, SemanticInfo, SourceLoader, SourceUnit, TEST_VARIANT_SUFFIX,
};

/// Errors that stop the loader before a program exists.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The identifier does not name a directory.
    #[error("cannot resolve package `{id}`: {} is not a directory", .path.display())]
    Resolve {
        /// Identifier as requested.
        id: String,
        /// Path it was resolved to.
        path: PathBuf,
    },

    /// IO error while walking or reading sources.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error.
    #[error("walk error: {0}")]
    Walk(#[from] ignore::Error),

    /// Invalid exclude pattern.
    #[error("invalid exclude pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Sections of `Cargo.toml` whose `path` entries are followed.
const DEPENDENCY_TABLES: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

/// Loads Rust crates from disk.
#[derive(Debug, Default)]
pub struct CrateLoader {
    exclude: Vec<glob::Pattern>,
}

impl CrateLoader {
    /// Creates a loader with no exclusions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds glob patterns for files that must not become units.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn with_excludes<I, S>(mut self, patterns: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.exclude.push(glob::Pattern::new(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// Loads every `.rs` file under `dir` as one package.
    ///
    /// Files that fail to parse are logged and left out; the package is then
    /// flagged as not error-free.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be walked or read.
    pub fn load_dir(&self, id: &str, dir: &Path, test_package: bool) -> Result<Package, LoadError> {
        let mut units = Vec::new();
        let mut info = SemanticInfo::new();
        let mut clean = true;

        for path in self.discover(dir)? {
            let source = std::fs::read_to_string(&path)?;
            match syn::parse_file(&source) {
                Ok(file) => {
                    info.record_file(&file);
                    units.push(SourceUnit::new(path, source).in_test_package(test_package));
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    clean = false;
                }
            }
            proc_macro2::extra::invalidate_current_thread_spans();
        }

        debug!("Package {id}: {} units, {} items", units.len(), info.len());
        Ok(Package::new(id, units, info, clean))
    }

    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let mut builder = ignore::WalkBuilder::new(dir);
        builder.hidden(false).git_ignore(true);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("rs") {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|p| p.matches(&path_str))
    }

    /// Checks that every crate reachable from `dir` through path
    /// dependencies is sound: its manifest parses and, for crates other than
    /// `dir` itself, its sources parse.
    ///
    /// The walk tracks visited crates, so dependency cycles terminate. Only
    /// per-crate facts are cached, so the verdict never depends on which
    /// package was resolved first.
    fn dependencies_clean(&self, dir: &Path, cache: &mut CrateCache) -> bool {
        let root = canonical(dir);
        let mut visited = HashSet::from([root.clone()]);
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let key = canonical(&current);
            if key != root {
                let sources_clean = *cache.sources.entry(key.clone()).or_insert_with(|| {
                    current.is_dir()
                        && self
                            .load_dir(&current.to_string_lossy(), &source_root(&current), false)
                            .is_ok_and(|p| p.is_transitively_error_free())
                });
                if !sources_clean {
                    warn!("Dependency {} is not properly loaded", current.display());
                    return false;
                }
            }

            let Some(deps) = cache
                .manifests
                .entry(key)
                .or_insert_with(|| manifest_deps(&current))
            else {
                return false;
            };
            for dep in &*deps {
                if visited.insert(canonical(dep)) {
                    pending.push(dep.clone());
                }
            }
        }
        true
    }
}

/// Facts about single crates, gathered once per load.
#[derive(Debug, Default)]
struct CrateCache {
    /// Path dependencies per crate; `None` for an invalid manifest.
    manifests: HashMap<PathBuf, Option<Vec<PathBuf>>>,
    /// Whether the crate's own sources parse.
    sources: HashMap<PathBuf, bool>,
}

fn canonical(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

/// Path dependencies declared in `dir/Cargo.toml`.
///
/// A missing manifest means no dependencies; an unreadable or invalid
/// one yields `None`.
fn manifest_deps(dir: &Path) -> Option<Vec<PathBuf>> {
    let manifest = dir.join("Cargo.toml");
    if !manifest.exists() {
        return Some(Vec::new());
    }
    let content = std::fs::read_to_string(&manifest).ok()?;
    let Ok(table) = content.parse::<toml::Table>() else {
        warn!("Invalid manifest: {}", manifest.display());
        return None;
    };

    let deps = DEPENDENCY_TABLES
        .iter()
        .filter_map(|name| table.get(*name).and_then(toml::Value::as_table))
        .flat_map(|deps| deps.values())
        .filter_map(|dep| dep.get("path").and_then(toml::Value::as_str))
        .map(|p| dir.join(p))
        .collect();
    Some(deps)
}

/// Directory holding the crate's library/binary sources.
fn source_root(dir: &Path) -> PathBuf {
    let src = dir.join("src");
    if src.is_dir() {
        src
    } else {
        dir.to_path_buf()
    }
}

impl SourceLoader for CrateLoader {
    fn load(&self, packages: &[String]) -> Result<Program, LoadError> {
        let mut program = Program::new();
        let mut cache = CrateCache::default();

        for id in packages {
            let dir = PathBuf::from(id);
            if !dir.is_dir() {
                return Err(LoadError::Resolve {
                    id: id.clone(),
                    path: dir,
                });
            }

            let deps_clean = self.dependencies_clean(&dir, &mut cache);
            let package = self.load_dir(id, &source_root(&dir), false)?;
            program.insert(package.with_dependencies_clean(deps_clean));

            let tests = dir.join("tests");
            if tests.is_dir() {
                let test_id = format!("{id}{TEST_VARIANT_SUFFIX}");
                let variant = self.load_dir(&test_id, &tests, true)?;
                program.insert(variant.with_dependencies_clean(deps_clean));
            }
        }

        info!("Loaded {} packages", program.len());
        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn id(dir: &Path) -> String {
        dir.to_string_lossy().into_owned()
    }

    #[test]
    fn loads_src_units_and_test_variant() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Cargo.toml", "[package]\nname = \"demo\"\n");
        write(tmp.path(), "src/lib.rs", "pub fn a() -> Result<(), ()> { Ok(()) }\n");
        write(tmp.path(), "src/util.rs", "pub struct U;\n");
        write(tmp.path(), "tests/it.rs", "#[test]\nfn t() {}\n");

        let pkg_id = id(tmp.path());
        let program = CrateLoader::new().load(&[pkg_id.clone()]).unwrap();

        let package = program.package(&pkg_id).unwrap();
        assert!(package.is_transitively_error_free());
        assert_eq!(package.units().len(), 2);
        assert!(package.info().returns_result("a"));
        assert!(package.units().iter().all(|u| !u.is_test()));

        let variant = program.test_variant(&pkg_id).unwrap();
        assert_eq!(variant.units().len(), 1);
        assert!(variant.units()[0].is_test());
    }

    #[test]
    fn parse_failure_marks_package_broken() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/lib.rs", "fn ok() {}\n");
        write(tmp.path(), "src/bad.rs", "fn broken( {\n");

        let pkg_id = id(tmp.path());
        let program = CrateLoader::new().load(&[pkg_id.clone()]).unwrap();
        let package = program.package(&pkg_id).unwrap();

        assert!(!package.is_transitively_error_free());
        assert_eq!(package.units().len(), 1);
    }

    #[test]
    fn broken_path_dependency_marks_package_broken() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "app/Cargo.toml",
            "[package]\nname = \"app\"\n\n[dependencies]\ndep = { path = \"../dep\" }\n",
        );
        write(tmp.path(), "app/src/lib.rs", "fn ok() {}\n");
        write(tmp.path(), "dep/Cargo.toml", "[package]\nname = \"dep\"\n");
        write(tmp.path(), "dep/src/lib.rs", "fn broken( {\n");

        let pkg_id = id(&tmp.path().join("app"));
        let program = CrateLoader::new().load(&[pkg_id.clone()]).unwrap();

        assert!(!program.package(&pkg_id).unwrap().is_transitively_error_free());
    }

    #[test]
    fn dependency_cycle_terminates() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "a/Cargo.toml",
            "[package]\nname = \"a\"\n[dev-dependencies]\nb = { path = \"../b\" }\n",
        );
        write(tmp.path(), "a/src/lib.rs", "fn a() {}\n");
        write(
            tmp.path(),
            "b/Cargo.toml",
            "[package]\nname = \"b\"\n[dependencies]\na = { path = \"../a\" }\n",
        );
        write(tmp.path(), "b/src/lib.rs", "fn b() {}\n");

        let pkg_id = id(&tmp.path().join("a"));
        let program = CrateLoader::new().load(&[pkg_id.clone()]).unwrap();

        assert!(program.package(&pkg_id).unwrap().is_transitively_error_free());
    }

    #[test]
    fn cycle_through_broken_crate_is_broken_in_any_order() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "a/Cargo.toml",
            "[package]\nname = \"a\"\n[dependencies]\nb = { path = \"../b\" }\n\
             [dev-dependencies]\nc = { path = \"../c\" }\n",
        );
        write(tmp.path(), "a/src/lib.rs", "fn a() {}\n");
        write(
            tmp.path(),
            "b/Cargo.toml",
            "[package]\nname = \"b\"\n[dev-dependencies]\na = { path = \"../a\" }\n",
        );
        write(tmp.path(), "b/src/lib.rs", "fn b() {}\n");
        write(tmp.path(), "c/src/lib.rs", "fn broken( {\n");

        let a = id(&tmp.path().join("a"));
        let b = id(&tmp.path().join("b"));
        let loader = CrateLoader::new();
        for order in [vec![b.clone()], vec![a.clone(), b.clone()], vec![b.clone(), a.clone()]] {
            let program = loader.load(&order).unwrap();
            for pkg in &order {
                assert!(
                    !program.package(pkg).unwrap().is_transitively_error_free(),
                    "{pkg} clean when loading {order:?}"
                );
            }
        }
    }

    #[test]
    fn invalid_manifest_marks_package_broken() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Cargo.toml", "[package\n");
        write(tmp.path(), "src/lib.rs", "fn ok() {}\n");

        let pkg_id = id(tmp.path());
        let program = CrateLoader::new().load(&[pkg_id.clone()]).unwrap();

        assert!(!program.package(&pkg_id).unwrap().is_transitively_error_free());
    }

    #[test]
    fn missing_directory_is_a_resolve_error() {
        let err = CrateLoader::new()
            .load(&["/definitely/not/here".to_string()])
            .unwrap_err();
        assert!(matches!(err, LoadError::Resolve { .. }));
    }

    #[test]
    fn exclude_patterns_skip_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/lib.rs", "fn ok() {}\n");
        write(tmp.path(), "src/generated/out.rs", "fn gen() {}\n");

        let pkg_id = id(tmp.path());
        let program = CrateLoader::new()
            .with_excludes(["**/generated/**"])
            .unwrap()
            .load(&[pkg_id.clone()])
            .unwrap();

        assert_eq!(program.package(&pkg_id).unwrap().units().len(), 1);
    }
}
