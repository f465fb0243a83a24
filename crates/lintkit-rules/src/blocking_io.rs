//! Checker flagging blocking calls inside async code.
//!
//! Blocking the executor thread stalls every task scheduled on it.
//!
//! # Detected Patterns
//!
//! - `std::fs` free functions and `std::fs::File::{open, create}`
//! - `std::thread::sleep`
//!
//! Both the fully qualified form and the `fs::...`/`thread::...` form (after
//! `use std::{fs, thread}`) are recognised, inside `async fn` bodies and
//! `async` blocks. A plain `fn` nested in async code starts a fresh, blocking
//! context.

use lintkit_core::{Check, CheckError, CheckerInfo, RunContext, Warning};
use syn::visit::Visit;
use syn::{Expr, ExprAsync, ExprCall, ExprPath, ImplItemFn, ItemFn};

use crate::util::path_to_string;

/// Checker name.
pub const NAME: &str = "blocking-io";

/// Blocking calls, spelled out from `std`.
const BLOCKING: &[&str] = &[
    "std::fs::read",
    "std::fs::read_to_string",
    "std::fs::write",
    "std::fs::copy",
    "std::fs::create_dir",
    "std::fs::create_dir_all",
    "std::fs::remove_file",
    "std::fs::remove_dir",
    "std::fs::remove_dir_all",
    "std::fs::rename",
    "std::fs::metadata",
    "std::fs::symlink_metadata",
    "std::fs::canonicalize",
    "std::fs::read_link",
    "std::fs::read_dir",
    "std::fs::File::open",
    "std::fs::File::create",
    "std::thread::sleep",
];

/// Registration entry for this checker.
#[must_use]
pub fn info() -> CheckerInfo {
    CheckerInfo::new(NAME, |_| Box::new(BlockingIo))
        .tags(["performance"])
        .summary("Detects blocking std::fs and thread::sleep calls in async code")
}

/// Flags blocking calls in async contexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingIo;

impl Check for BlockingIo {
    fn check(
        &mut self,
        _ctx: &RunContext<'_>,
        file: &syn::File,
        out: &mut Vec<Warning>,
    ) -> Result<(), CheckError> {
        let mut visitor = BlockingVisitor {
            out,
            scopes: Vec::new(),
        };
        visitor.visit_file(file);
        Ok(())
    }
}

/// Whether a call path names a blocking function.
fn is_blocking(path: &str) -> bool {
    BLOCKING
        .iter()
        .any(|b| *b == path || b.strip_prefix("std::") == Some(path))
}

struct BlockingVisitor<'a> {
    out: &'a mut Vec<Warning>,
    /// Innermost function-like scope: `Some(label)` when async.
    scopes: Vec<Option<String>>,
}

impl BlockingVisitor<'_> {
    fn scoped(&mut self, scope: Option<String>, visit: impl FnOnce(&mut Self)) {
        self.scopes.push(scope);
        visit(self);
        self.scopes.pop();
    }

    fn async_scope(&self) -> Option<&str> {
        self.scopes.last().and_then(Option::as_deref)
    }
}

fn fn_scope(sig: &syn::Signature) -> Option<String> {
    sig.asyncness
        .map(|_| format!("async fn `{}`", sig.ident))
}

impl<'ast> Visit<'ast> for BlockingVisitor<'_> {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.scoped(fn_scope(&node.sig), |v| syn::visit::visit_item_fn(v, node));
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        self.scoped(fn_scope(&node.sig), |v| {
            syn::visit::visit_impl_item_fn(v, node);
        });
    }

    fn visit_expr_async(&mut self, node: &'ast ExprAsync) {
        self.scoped(Some("async block".to_string()), |v| {
            syn::visit::visit_expr_async(v, node);
        });
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        if let Some(scope) = self.async_scope() {
            if let Expr::Path(ExprPath { path, .. }) = &*node.func {
                let name = path_to_string(path);
                if is_blocking(&name) {
                    let span = path
                        .segments
                        .last()
                        .map_or_else(proc_macro2::Span::call_site, |s| s.ident.span());
                    let text = format!("blocking call `{name}` inside {scope}");
                    self.out.push(Warning::at(span, text));
                }
            }
        }
        syn::visit::visit_expr_call(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, render};

    #[test]
    fn detects_blocking_calls_in_async_fn() {
        let warnings = check(
            info(),
            r#"
async fn load(path: &str) -> String {
    std::thread::sleep(std::time::Duration::from_millis(5));
    std::fs::read_to_string(path).unwrap_or_default()
}
"#,
        );
        insta::assert_snapshot!(render(&warnings), @r"
        3:18: blocking call `std::thread::sleep` inside async fn `load`
        4:14: blocking call `std::fs::read_to_string` inside async fn `load`
        ");
    }

    #[test]
    fn short_paths_and_async_blocks() {
        let warnings = check(
            info(),
            r#"
use std::fs;

fn spawn() {
    let _task = async {
        fs::write("out", "data")
    };
}
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(
            warnings[0].text,
            "blocking call `fs::write` inside async block"
        );
    }

    #[test]
    fn sync_code_is_fine() {
        let warnings = check(
            info(),
            r#"
fn load(path: &str) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

async fn outer() {
    fn inner() {
        std::thread::sleep(std::time::Duration::ZERO);
    }
    tokio::fs::read_to_string("x").await;
}
"#,
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn async_methods_are_checked() {
        let warnings = check(
            info(),
            r#"
struct Store;

impl Store {
    async fn open(&self) {
        let _f = std::fs::File::open("db");
    }
}
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].text.ends_with("inside async fn `open`"));
    }

    #[test]
    fn is_tagged_performance() {
        assert_eq!(info().tag_list(), ["performance"]);
    }
}
