//! # lintkit-rules
//!
//! Built-in checkers for lintkit.
//!
//! ## Available Checkers
//!
//! | Name | Tags | Description |
//! |------|------|-------------|
//! | `unwrap-call` | | `.unwrap()`/`.expect()` outside test code |
//! | `log-macro` | `style` | `log` crate macros where `tracing` is preferred |
//! | `blocking-io` | `performance` | blocking `std::fs`/`thread::sleep` calls in async code |
//! | `swallowed-result` | `experimental` | `let _ = f()` dropping a package function's `Result` |
//!
//! `performance` and `experimental` checkers are disabled by the default
//! selection patterns.
//!
//! ## Usage
//!
//! ```ignore
//! use lintkit_core::Registry;
//!
//! let mut registry = Registry::new();
//! lintkit_rules::register_all(&mut registry)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod blocking_io;
pub mod log_macro;
pub mod swallowed_result;
pub mod unwrap_call;

mod util;

#[cfg(test)]
mod testing;

use lintkit_core::{CheckerInfo, Registry, RegistryError};

pub use blocking_io::BlockingIo;
pub use log_macro::LogMacro;
pub use swallowed_result::SwallowedResult;
pub use unwrap_call::UnwrapCall;

/// Registration entries of every built-in checker, in a stable order.
#[must_use]
pub fn builtin() -> Vec<CheckerInfo> {
    vec![
        unwrap_call::info(),
        log_macro::info(),
        blocking_io::info(),
        swallowed_result::info(),
    ]
}

/// Registers every built-in checker.
///
/// # Errors
///
/// Returns an error if one of the names is already taken; nothing is
/// registered in that case.
pub fn register_all(registry: &mut Registry) -> Result<(), RegistryError> {
    let added = registry.extend(builtin())?;
    tracing::debug!("Registered {added} built-in checkers");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_every_builtin_once() {
        let mut registry = Registry::new();
        register_all(&mut registry).unwrap();
        assert_eq!(registry.len(), 4);

        assert!(matches!(
            register_all(&mut registry),
            Err(RegistryError::Duplicate { .. })
        ));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn every_builtin_has_a_summary() {
        for info in builtin() {
            assert!(!info.summary_text().is_empty(), "{}", info.name());
        }
    }
}
