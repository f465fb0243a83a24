//! Shared helpers for checker unit tests.

use std::sync::Arc;

use lintkit_core::{
    Checker, CheckerInfo, LintContext, Package, RunContext, SemanticInfo, SourceUnit,
    TargetSizes, Warning,
};

/// Runs `info` over `code` as the only unit `path` of a package.
pub fn check_at(info: CheckerInfo, path: &str, code: &str) -> Vec<Warning> {
    let unit = SourceUnit::new(path, code);
    let mut semantic = SemanticInfo::new();
    semantic.record_file(&unit.parse().expect("fixture parses"));
    let package = Package::new("fixture", vec![unit.clone()], semantic, true);

    let lint = LintContext::new(TargetSizes::for_arch("x86_64").expect("known arch"));
    let mut checker = Checker::new(&lint, Arc::new(info));
    checker
        .check(&RunContext::new(&lint, &package, &unit))
        .expect("checker does not fault")
        .to_vec()
}

/// Runs `info` over `code` as `src/lib.rs`.
pub fn check(info: CheckerInfo, code: &str) -> Vec<Warning> {
    check_at(info, "src/lib.rs", code)
}

/// Renders warnings as `line:column: text`, one per line.
pub fn render(warnings: &[Warning]) -> String {
    warnings
        .iter()
        .map(|w| format!("{}:{}: {}", w.pos.line, w.pos.column, w.text))
        .collect::<Vec<_>>()
        .join("\n")
}
