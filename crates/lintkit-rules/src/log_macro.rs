//! Checker flagging `log` crate macros where `tracing` is preferred.
//!
//! # Detected Patterns
//!
//! - `log::info!`, `log::error!`, `log::warn!`, `log::debug!`, `log::trace!`
//! - any other macro invoked through the `log::` path
//! - `use log::...` imports
//!
//! # Good Patterns
//!
//! ```ignore
//! tracing::info!(user = %id, "logged in");
//! ```

use lintkit_core::{Check, CheckError, CheckerInfo, RunContext, Warning};
use syn::visit::Visit;
use syn::{ItemUse, UseTree};

use crate::util::path_to_string;

/// Checker name.
pub const NAME: &str = "log-macro";

/// Registration entry for this checker.
#[must_use]
pub fn info() -> CheckerInfo {
    CheckerInfo::new(NAME, |_| Box::new(LogMacro))
        .tags(["style"])
        .summary("Detects log crate macros where tracing is preferred")
}

/// Flags `log::` macros and imports.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMacro;

impl Check for LogMacro {
    fn check(
        &mut self,
        _ctx: &RunContext<'_>,
        file: &syn::File,
        out: &mut Vec<Warning>,
    ) -> Result<(), CheckError> {
        LogVisitor { out }.visit_file(file);
        Ok(())
    }
}

struct LogVisitor<'a> {
    out: &'a mut Vec<Warning>,
}

impl<'ast> Visit<'ast> for LogVisitor<'_> {
    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        let path = path_to_string(&node.path);
        if let Some(name) = path.strip_prefix("log::") {
            if let Some(first) = node.path.segments.first() {
                self.out.push(Warning::at(
                    first.ident.span(),
                    format!("use `tracing::{name}!` instead of `log::{name}!`"),
                ));
            }
        }
        syn::visit::visit_macro(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast ItemUse) {
        if let UseTree::Path(path) = &node.tree {
            if path.ident == "log" {
                self.out.push(Warning::at(
                    path.ident.span(),
                    "import from `tracing` instead of `log`",
                ));
            }
        }
        syn::visit::visit_item_use(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{check, render};

    #[test]
    fn detects_log_macros() {
        let warnings = check(
            info(),
            r#"
fn foo(e: &str) {
    log::info!("message");
    log::error!("error: {}", e);
}
"#,
        );
        insta::assert_snapshot!(render(&warnings), @r"
        3:5: use `tracing::info!` instead of `log::info!`
        4:5: use `tracing::error!` instead of `log::error!`
        ");
    }

    #[test]
    fn detects_log_imports() {
        let warnings = check(info(), "use log::{info, warn};\nuse std::fmt;\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].text, "import from `tracing` instead of `log`");
    }

    #[test]
    fn allows_tracing() {
        let warnings = check(
            info(),
            r#"
fn foo() {
    tracing::info!("message");
    info!("bare macro");
}
"#,
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn detects_every_level() {
        let warnings = check(
            info(),
            r#"
fn foo() {
    log::debug!("debug");
    log::info!("info");
    log::warn!("warn");
    log::error!("error");
    log::trace!("trace");
}
"#,
        );
        assert_eq!(warnings.len(), 5);
    }

    #[test]
    fn is_tagged_style() {
        assert_eq!(info().tag_list(), ["style"]);
    }
}
