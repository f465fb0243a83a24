//! Checker contract: the trait rules implement and the per-run instance.

use std::sync::Arc;

use crate::context::{LintContext, RunContext};
use crate::registry::CheckerInfo;
use crate::types::Warning;

/// Fault raised by a checker that cannot continue.
///
/// This is not a finding: returning no warnings means "no issues", a
/// `CheckError` means the checker itself is broken. The orchestrator treats
/// every fault as fatal for the whole run.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CheckError(Box<dyn std::error::Error + Send + Sync>);

impl CheckError {
    /// Wraps any error as a checker fault.
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self(error.into())
    }

    /// Creates a fault from a plain message.
    pub fn msg(message: impl std::fmt::Display) -> Self {
        Self(message.to_string().into())
    }
}

/// The analysis logic of one rule.
///
/// Implementations receive the unit already parsed and push their findings
/// onto `out`, in the order they want them reported.
///
/// # Example
///
/// ```ignore
/// use lintkit_core::{Check, CheckError, RunContext, Warning};
///
/// struct NoMain;
///
/// impl Check for NoMain {
///     fn check(
///         &mut self,
///         _ctx: &RunContext<'_>,
///         file: &syn::File,
///         out: &mut Vec<Warning>,
///     ) -> Result<(), CheckError> {
///         for item in &file.items {
///             if let syn::Item::Fn(f) = item {
///                 if f.sig.ident == "main" {
///                     out.push(Warning::at(f.sig.ident.span(), "main in a library"));
///                 }
///             }
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Check: Send {
    /// Inspects one unit.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] when the rule hits an internal fault.
    fn check(
        &mut self,
        ctx: &RunContext<'_>,
        file: &syn::File,
        out: &mut Vec<Warning>,
    ) -> Result<(), CheckError>;
}

/// Type alias for boxed [`Check`] trait objects.
pub type CheckBox = Box<dyn Check>;

/// A rule instance bound to its registration entry for one run.
///
/// Owns a reusable warnings buffer. [`Checker::check`] takes `&mut self`, so
/// one instance never runs concurrently with itself, and the slice it
/// returns is gone by the next call.
pub struct Checker {
    info: Arc<CheckerInfo>,
    check: CheckBox,
    warnings: Vec<Warning>,
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("info", &self.info)
            .field("warnings", &self.warnings.len())
            .finish_non_exhaustive()
    }
}

impl Checker {
    /// Instantiates the rule described by `info`.
    #[must_use]
    pub fn new(ctx: &LintContext, info: Arc<CheckerInfo>) -> Self {
        let check = info.instantiate(ctx);
        Self {
            info,
            check,
            warnings: Vec::new(),
        }
    }

    /// Registration metadata of this checker.
    #[must_use]
    pub fn info(&self) -> &CheckerInfo {
        &self.info
    }

    /// Runs the checker over the unit bound in `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckError`] if the unit no longer parses or the rule
    /// faults.
    pub fn check(&mut self, ctx: &RunContext<'_>) -> Result<&[Warning], CheckError> {
        self.warnings.clear();
        let outcome = match ctx.unit().parse() {
            Ok(file) => self.check.check(ctx, &file, &mut self.warnings),
            Err(e) => Err(CheckError::new(e)),
        };
        // Warnings hold resolved positions, so no span outlives the AST.
        proc_macro2::extra::invalidate_current_thread_spans();
        outcome?;
        Ok(&self.warnings)
    }
}
