//! Golden-file tests for every built-in checker.

use std::path::PathBuf;

use lintkit_core::{linttest, Registry};

fn testdata() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/testdata")
}

#[test]
fn builtin_checkers_match_golden_files() {
    let mut registry = Registry::new();
    lintkit_rules::register_all(&mut registry).unwrap();
    linttest::assert_catalog(&registry.freeze(), &testdata());
}

#[test]
fn every_builtin_has_a_fixture() {
    for info in lintkit_rules::builtin() {
        let dir = testdata().join(info.name());
        assert!(dir.is_dir(), "missing fixture {}", dir.display());
    }
}

#[test]
fn unwrap_call_golden() {
    linttest::assert_golden(&lintkit_rules::unwrap_call::info(), &testdata().join("unwrap-call"));
}
