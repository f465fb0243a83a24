//! Golden-file regression harness for checkers.
//!
//! A fixture directory holds `.rs` files annotated with `// want: <text>`
//! comment lines. Each directive expects exactly one warning with that text
//! on the next line of code. Several directives may stack up for one line.
//!
//! ```ignore
//! fn read(path: &str) -> String {
//!     // want: avoid unwrap outside tests
//!     std::fs::read_to_string(path).unwrap()
//! }
//! ```
//!
//! Checkers should first pass [`sanity_check`] over a shared fixture, so a
//! crashing rule is reported once instead of failing every golden test.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::context::{LintContext, RunContext, TargetSizes};
use crate::loader::{CrateLoader, LoadError};
use crate::program::{Package, SourceUnit};
use crate::registry::{Catalog, CheckerInfo};
use crate::rule::{CheckError, Checker};

const DIRECTIVE: &str = "// want: ";

/// Harness failures that are not golden mismatches.
#[derive(Debug, Error)]
pub enum LinttestError {
    /// The fixture directory could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A fixture file does not parse.
    #[error("{} package is not properly loaded", .0.display())]
    Broken(PathBuf),

    /// The host architecture has no size information.
    #[error("can't find sizes info for {0}")]
    UnknownTarget(&'static str),

    /// The checker returned a fault.
    #[error("{rule}: {}: {source}", .file.display())]
    Fault {
        /// Checker name.
        rule: String,
        /// Unit being checked.
        file: PathBuf,
        /// The fault.
        source: CheckError,
    },

    /// The checker panicked.
    #[error("{rule}: unexpected panic: {message}")]
    Panic {
        /// Checker name.
        rule: String,
        /// Panic payload, if it was a string.
        message: String,
    },
}

#[derive(Debug)]
struct Want {
    text: String,
    matched: bool,
}

/// Expected warnings of one unit, keyed by line.
fn parse_wants(source: &str) -> BTreeMap<usize, Vec<Want>> {
    let mut wants: BTreeMap<usize, Vec<Want>> = BTreeMap::new();
    let mut pending = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if let Some(text) = line.strip_prefix(DIRECTIVE) {
            pending.push(Want {
                text: text.trim().to_string(),
                matched: false,
            });
        } else if !line.is_empty() && !line.starts_with("//") && !pending.is_empty() {
            wants.entry(index + 1).or_default().append(&mut pending);
        }
    }
    wants
}

/// Turns every directive into an empty `//` comment, so checkers that look
/// at comments or raw lines do not report on the directives themselves.
/// Line numbers and columns of code are unchanged.
fn strip_directives(source: &str) -> String {
    source
        .split_inclusive('\n')
        .map(|raw| {
            let body = raw.trim_start();
            if body.trim_end().starts_with(DIRECTIVE) {
                let indent = &raw[..raw.len() - body.len()];
                let newline = if raw.ends_with('\n') { "\n" } else { "" };
                format!("{indent}//{newline}")
            } else {
                raw.to_string()
            }
        })
        .collect()
}

fn load(dir: &Path) -> Result<Package, LinttestError> {
    let package = CrateLoader::new().load_dir(&dir.to_string_lossy(), dir, false)?;
    if !package.is_transitively_error_free() {
        return Err(LinttestError::Broken(dir.to_path_buf()));
    }
    Ok(package)
}

fn lint_context() -> Result<LintContext, LinttestError> {
    TargetSizes::host()
        .map(LintContext::new)
        .ok_or(LinttestError::UnknownTarget(std::env::consts::ARCH))
}

fn check_unit(
    checker: &mut Checker,
    lint: &LintContext,
    package: &Package,
    unit: &SourceUnit,
) -> Result<Vec<crate::types::Warning>, LinttestError> {
    let rule = checker.info().name().to_string();
    checker
        .check(&RunContext::new(lint, package, unit))
        .map(<[_]>::to_vec)
        .map_err(|source| LinttestError::Fault {
            rule,
            file: unit.path().to_path_buf(),
            source,
        })
}

/// Compares the checker's warnings on `dir` against its `// want:` lines.
///
/// Returns one message per mismatch; an empty list means the fixture passed.
///
/// # Errors
///
/// Returns an error if the fixture cannot be loaded or the checker faults.
pub fn check_golden(info: &CheckerInfo, dir: &Path) -> Result<Vec<String>, LinttestError> {
    let package = load(dir)?;
    let lint = lint_context()?;
    let mut checker = Checker::new(&lint, Arc::new(info.clone()));
    let mut mismatches = Vec::new();

    for unit in package.units() {
        let file = unit.path().display();
        let mut wants = parse_wants(unit.source());
        let stripped = SourceUnit::new(unit.path().to_path_buf(), strip_directives(unit.source()));

        for warning in check_unit(&mut checker, &lint, &package, &stripped)? {
            let line = warning.pos.line;
            let found = wants.get_mut(&line).and_then(|ws| {
                let index = ws
                    .iter()
                    .position(|w| w.text == warning.text && !w.matched)
                    .or_else(|| ws.iter().position(|w| w.text == warning.text))?;
                ws.get_mut(index)
            });
            match found {
                Some(want) if want.matched => {
                    mismatches.push(format!("{file}:{line}: multiple matches for {}", want.text));
                }
                Some(want) => want.matched = true,
                None => {
                    mismatches.push(format!("{file}:{line}: unexpected warn: {}", warning.text));
                }
            }
        }

        for (line, ws) in &wants {
            for want in ws.iter().filter(|w| !w.matched) {
                mismatches.push(format!("{file}:{line}: unmatched warn: {}", want.text));
            }
        }
    }

    Ok(mismatches)
}

/// Panics with every mismatch if the golden fixture does not pass.
///
/// # Panics
///
/// Panics on harness errors and on any mismatch.
pub fn assert_golden(info: &CheckerInfo, dir: &Path) {
    match check_golden(info, dir) {
        Ok(mismatches) if mismatches.is_empty() => {}
        Ok(mismatches) => panic!(
            "{}: {} golden mismatches\n{}",
            info.name(),
            mismatches.len(),
            mismatches.join("\n")
        ),
        Err(err) => panic!("{}: {err}", info.name()),
    }
}

/// Runs the checker over every unit in `dir`, ignoring its warnings.
///
/// # Errors
///
/// Returns an error if the checker faults or panics, or the fixture cannot be
/// loaded.
pub fn sanity_check(info: &CheckerInfo, dir: &Path) -> Result<(), LinttestError> {
    let package = load(dir)?;
    let lint = lint_context()?;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<(), LinttestError> {
        let mut checker = Checker::new(&lint, Arc::new(info.clone()));
        for unit in package.units() {
            check_unit(&mut checker, &lint, &package, unit)?;
        }
        Ok(())
    }));

    outcome.unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Err(LinttestError::Panic {
            rule: info.name().to_string(),
            message,
        })
    })
}

/// Sanity-checks every catalog entry over `testdata/sanity`, then runs the
/// golden fixture `testdata/<name>` of each sane entry.
///
/// # Panics
///
/// Panics listing every insane checker and every golden mismatch.
pub fn assert_catalog(catalog: &Catalog, testdata: &Path) {
    let sanity = testdata.join("sanity");
    let mut failures = Vec::new();

    for info in catalog.entries() {
        if let Err(err) = sanity_check(info, &sanity) {
            failures.push(format!("sanity/{}: {err}", info.name()));
            continue;
        }
        match check_golden(info, &testdata.join(info.name())) {
            Ok(mismatches) => failures.extend(mismatches),
            Err(err) => failures.push(format!("{}: {err}", info.name())),
        }
    }

    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Check;
    use crate::types::{Pos, Warning};
    use std::fs;
    use tempfile::TempDir;

    /// Flags every function whose name starts with `bad`.
    struct BadFns;

    impl Check for BadFns {
        fn check(
            &mut self,
            _ctx: &RunContext<'_>,
            file: &syn::File,
            out: &mut Vec<Warning>,
        ) -> Result<(), CheckError> {
            for item in &file.items {
                if let syn::Item::Fn(f) = item {
                    let name = f.sig.ident.to_string();
                    if name.starts_with("bad") {
                        out.push(Warning::at(f.sig.ident.span(), format!("bad fn {name}")));
                    }
                }
            }
            Ok(())
        }
    }

    struct Panics;

    impl Check for Panics {
        fn check(
            &mut self,
            _ctx: &RunContext<'_>,
            _file: &syn::File,
            _out: &mut Vec<Warning>,
        ) -> Result<(), CheckError> {
            panic!("rule bug")
        }
    }

    /// Flags every `TODO`, comments included.
    struct Todos;

    impl Check for Todos {
        fn check(
            &mut self,
            ctx: &RunContext<'_>,
            _file: &syn::File,
            out: &mut Vec<Warning>,
        ) -> Result<(), CheckError> {
            for (index, line) in ctx.unit().source().lines().enumerate() {
                for (column, _) in line.match_indices("TODO") {
                    out.push(Warning::new(Pos::new(index + 1, column + 1), "TODO found"));
                }
            }
            Ok(())
        }
    }

    fn fixture(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(tmp.path().join(name), content).unwrap();
        }
        tmp
    }

    fn bad_fns() -> CheckerInfo {
        CheckerInfo::new("bad-fns", |_| Box::new(BadFns))
    }

    #[test]
    fn directives_attach_to_next_code_line() {
        let wants = parse_wants("// want: a\n\n// want: b\n// plain comment\nfn x() {}\nfn y() {}\n");
        assert_eq!(wants.len(), 1);
        let texts: Vec<&str> = wants[&5].iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["a", "b"]);
    }

    #[test]
    fn passing_fixture_has_no_mismatches() {
        let tmp = fixture(&[(
            "a.rs",
            "// want: bad fn bad_one\nfn bad_one() {}\nfn good() {}\n",
        )]);
        assert!(check_golden(&bad_fns(), tmp.path()).unwrap().is_empty());
        assert_golden(&bad_fns(), tmp.path());
    }

    #[test]
    fn unexpected_and_unmatched_are_reported() {
        let tmp = fixture(&[(
            "a.rs",
            "fn bad_one() {}\n// want: bad fn never\nfn good() {}\n",
        )]);
        let mismatches = check_golden(&bad_fns(), tmp.path()).unwrap();
        assert_eq!(mismatches.len(), 2);
        assert!(mismatches[0].ends_with("a.rs:1: unexpected warn: bad fn bad_one"));
        assert!(mismatches[1].ends_with("a.rs:3: unmatched warn: bad fn never"));
    }

    #[test]
    fn broken_fixture_is_an_error() {
        let tmp = fixture(&[("a.rs", "fn (")]);
        let err = check_golden(&bad_fns(), tmp.path()).unwrap_err();
        assert!(matches!(err, LinttestError::Broken(_)));
    }

    #[test]
    fn sanity_catches_panics() {
        let tmp = fixture(&[("a.rs", "fn a() {}\n")]);
        assert!(sanity_check(&bad_fns(), tmp.path()).is_ok());

        let info = CheckerInfo::new("panics", |_| Box::new(Panics));
        let err = sanity_check(&info, tmp.path()).unwrap_err();
        assert!(matches!(err, LinttestError::Panic { ref message, .. } if message == "rule bug"));
    }

    #[test]
    fn stacked_identical_directives_each_match_once() {
        let info = CheckerInfo::new("todos", |_| Box::new(Todos));
        let tmp = fixture(&[(
            "a.rs",
            "// want: TODO found\n// want: TODO found\nfn a() {} // TODO TODO\n",
        )]);
        assert_eq!(check_golden(&info, tmp.path()).unwrap(), Vec::<String>::new());

        let tmp = fixture(&[("a.rs", "// want: TODO found\nfn a() {} // TODO TODO\n")]);
        let mismatches = check_golden(&info, tmp.path()).unwrap();
        assert_eq!(mismatches.len(), 1);
        assert!(mismatches[0].ends_with("a.rs:2: multiple matches for TODO found"));
    }

    #[test]
    fn checkers_do_not_see_directives() {
        let info = CheckerInfo::new("todos", |_| Box::new(Todos));
        let tmp = fixture(&[(
            "a.rs",
            "fn a() {\n    // want: TODO found\n    let _x = 1; // TODO\n}\n",
        )]);
        assert_eq!(check_golden(&info, tmp.path()).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn stripping_keeps_line_layout() {
        let source = "fn a() {}\n    // want: x\n// want: y";
        assert_eq!(strip_directives(source), "fn a() {}\n    //\n//");
    }
}
