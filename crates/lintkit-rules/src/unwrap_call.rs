//! Checker flagging `.unwrap()` and `.expect()` outside test code.
//!
//! # Rationale
//!
//! Both calls panic on `None`/`Err`. Library and service code should
//! propagate the failure instead.
//!
//! # Skipped
//!
//! - test units, `#[cfg(test)]` modules and `#[test]` functions
//! - items carrying `#[allow(clippy::unwrap_used)]` or
//!   `#[allow(clippy::expect_used)]`

use lintkit_core::{Check, CheckError, CheckerInfo, RunContext, Warning};
use syn::visit::Visit;
use syn::{Expr, ExprMethodCall, ItemFn, ItemImpl, ItemMod};

use crate::util::{has_allow_attr, has_cfg_test, has_test_attr};

/// Checker name.
pub const NAME: &str = "unwrap-call";

const ALLOW_LINTS: &[&str] = &["clippy::unwrap_used", "clippy::expect_used"];

/// Registration entry for this checker.
#[must_use]
pub fn info() -> CheckerInfo {
    CheckerInfo::new(NAME, |_| Box::new(UnwrapCall::new()))
        .summary("Detects .unwrap()/.expect() calls outside test code")
}

/// Flags `.unwrap()` and `.expect()` calls.
#[derive(Debug, Clone)]
pub struct UnwrapCall {
    /// Allow `.expect()`, only flag `.unwrap()`.
    pub allow_expect: bool,
}

impl Default for UnwrapCall {
    fn default() -> Self {
        Self::new()
    }
}

impl UnwrapCall {
    /// Creates the checker with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allow_expect: false,
        }
    }

    /// Sets whether `.expect()` is allowed.
    #[must_use]
    pub fn allow_expect(mut self, allow: bool) -> Self {
        self.allow_expect = allow;
        self
    }
}

impl Check for UnwrapCall {
    fn check(
        &mut self,
        ctx: &RunContext<'_>,
        file: &syn::File,
        out: &mut Vec<Warning>,
    ) -> Result<(), CheckError> {
        if ctx.unit().is_test() {
            return Ok(());
        }

        let mut visitor = UnwrapVisitor {
            allow_expect: self.allow_expect,
            out,
            skip_depth: 0,
        };
        visitor.visit_file(file);
        Ok(())
    }
}

struct UnwrapVisitor<'a> {
    allow_expect: bool,
    out: &'a mut Vec<Warning>,
    skip_depth: usize,
}

impl UnwrapVisitor<'_> {
    fn skipping(&mut self, skip: bool, visit: impl FnOnce(&mut Self)) {
        if skip {
            self.skip_depth += 1;
        }
        visit(self);
        if skip {
            self.skip_depth -= 1;
        }
    }
}

impl<'ast> Visit<'ast> for UnwrapVisitor<'_> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        let skip = has_cfg_test(&node.attrs) || has_allow_attr(&node.attrs, ALLOW_LINTS);
        self.skipping(skip, |v| syn::visit::visit_item_mod(v, node));
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        let skip = has_cfg_test(&node.attrs) || has_allow_attr(&node.attrs, ALLOW_LINTS);
        self.skipping(skip, |v| syn::visit::visit_item_impl(v, node));
    }

    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        let skip = has_test_attr(&node.attrs)
            || has_cfg_test(&node.attrs)
            || has_allow_attr(&node.attrs, ALLOW_LINTS);
        self.skipping(skip, |v| syn::visit::visit_item_fn(v, node));
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        if self.skip_depth == 0 && node.args.len() <= 1 {
            let method = node.method.to_string();
            let flagged = match method.as_str() {
                "unwrap" => node.args.is_empty(),
                "expect" => !self.allow_expect && node.args.len() == 1,
                _ => false,
            };
            if flagged {
                let mut text = format!(".{method}() outside test code");
                if method == "unwrap" && is_partial_cmp(&node.receiver) {
                    text.push_str(" (NaN comparison danger with partial_cmp)");
                }
                self.out.push(Warning::at(node.method.span(), text));
            }
        }

        syn::visit::visit_expr_method_call(self, node);
    }
}

fn is_partial_cmp(expr: &Expr) -> bool {
    matches!(expr, Expr::MethodCall(call) if call.method == "partial_cmp")
}
