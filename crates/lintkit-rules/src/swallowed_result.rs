//! Checker flagging `let _ = f(..)` where `f` is a package function
//! returning `Result`.
//!
//! `let _ =` silences the `#[must_use]` warning on `Result`, so the error
//! disappears without a trace. The callee is resolved through the package's
//! semantic info; calls to anything it does not know are left alone.
//!
//! # Detected Patterns
//!
//! ```ignore
//! fn save() -> Result<(), Error> { .. }
//! async fn flush() -> Result<(), Error> { .. }
//!
//! let _ = save();
//! let _ = crate::save();
//! let _ = flush().await;
//! ```

use lintkit_core::{Check, CheckError, CheckerInfo, ItemKind, RunContext, SemanticInfo, Warning};
use syn::visit::Visit;
use syn::{Expr, ExprCall, ItemFn, ItemMod, Local, Pat};

use crate::util::{has_cfg_test, has_test_attr};

/// Checker name.
pub const NAME: &str = "swallowed-result";

/// Registration entry for this checker.
#[must_use]
pub fn info() -> CheckerInfo {
    CheckerInfo::new(NAME, |_| Box::new(SwallowedResult))
        .tags(["experimental"])
        .summary("Detects `let _ =` discarding a Result from a package function")
}

/// Flags discarded results of package functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwallowedResult;

impl Check for SwallowedResult {
    fn check(
        &mut self,
        ctx: &RunContext<'_>,
        file: &syn::File,
        out: &mut Vec<Warning>,
    ) -> Result<(), CheckError> {
        if ctx.unit().is_test() {
            return Ok(());
        }
        let mut visitor = DropVisitor {
            info: ctx.info(),
            out,
            in_test: false,
        };
        visitor.visit_file(file);
        Ok(())
    }
}

struct DropVisitor<'a> {
    info: &'a SemanticInfo,
    out: &'a mut Vec<Warning>,
    in_test: bool,
}

impl DropVisitor<'_> {
    /// Name of the package function whose `Result` `expr` evaluates to.
    fn discarded_callee(&self, expr: &Expr) -> Option<String> {
        let (call, awaited) = match expr {
            Expr::Call(call) => (call, false),
            Expr::Await(awaited) => match &*awaited.base {
                Expr::Call(call) => (call, true),
                _ => return None,
            },
            _ => return None,
        };
        let name = local_fn_name(call)?;
        match self.info.lookup(&name)? {
            ItemKind::Fn {
                is_async,
                returns_result: true,
            } if is_async == awaited => Some(name),
            _ => None,
        }
    }
}

/// Name of a call to a function of the current crate: `f`, `self::f`,
/// `crate::f` or `super::f`.
fn local_fn_name(call: &ExprCall) -> Option<String> {
    let Expr::Path(path) = &*call.func else {
        return None;
    };
    let segments = &path.path.segments;
    let last = segments.last()?;
    let local = match segments.len() {
        1 => true,
        2 => ["self", "crate", "super"]
            .iter()
            .any(|root| segments[0].ident == *root),
        _ => false,
    };
    local.then(|| last.ident.to_string())
}

impl<'ast> Visit<'ast> for DropVisitor<'_> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        let was_in_test = self.in_test;
        self.in_test |= has_cfg_test(&node.attrs);
        syn::visit::visit_item_mod(self, node);
        self.in_test = was_in_test;
    }

    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        let was_in_test = self.in_test;
        self.in_test |= has_test_attr(&node.attrs);
        syn::visit::visit_item_fn(self, node);
        self.in_test = was_in_test;
    }

    fn visit_local(&mut self, node: &'ast Local) {
        if !self.in_test {
            if let (Pat::Wild(wild), Some(init)) = (&node.pat, &node.init) {
                if let Some(name) = self.discarded_callee(&init.expr) {
                    self.out.push(Warning::at(
                        wild.underscore_token.span,
                        format!("result of `{name}` is discarded"),
                    ));
                }
            }
        }
        syn::visit::visit_local(self, node);
    }
}
