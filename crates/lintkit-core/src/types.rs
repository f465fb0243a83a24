//! Core types for checker findings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Line and column inside the unit being checked.
///
/// Both values are 1-indexed. This is what a checker records; the
/// orchestrator attaches the file to turn it into a [`Position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Pos {
    /// Creates a new position with explicit values.
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Creates a position from the start of a `syn` span.
    ///
    /// `proc_macro2` columns are 0-indexed, so one is added.
    #[must_use]
    pub fn from_span(span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            line: start.line,
            column: start.column + 1,
        }
    }
}

/// A single issue reported by a checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Where the issue is, relative to the unit.
    pub pos: Pos,
    /// Human-readable message.
    pub text: String,
}

impl Warning {
    /// Creates a new warning.
    #[must_use]
    pub fn new(pos: Pos, text: impl Into<String>) -> Self {
        Self {
            pos,
            text: text.into(),
        }
    }

    /// Creates a warning located at the start of `span`.
    #[must_use]
    pub fn at(span: proc_macro2::Span, text: impl Into<String>) -> Self {
        Self::new(Pos::from_span(span), text)
    }
}

/// A resolved source location, rendered as `file:line:column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Path of the unit as it was loaded.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, pos: Pos) -> Self {
        Self {
            file: file.into(),
            line: pos.line,
            column: pos.column,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_display_is_file_line_column() {
        let pos = Position::new("src/lib.rs", Pos::new(42, 10));
        assert_eq!(pos.to_string(), "src/lib.rs:42:10");
    }

    #[test]
    fn warning_from_span_is_one_indexed() {
        let file = syn::parse_file("fn main() {\n    foo();\n}\n").unwrap();
        let syn::Item::Fn(item) = &file.items[0] else {
            panic!("expected fn");
        };
        let warn = Warning::at(item.sig.ident.span(), "named main");
        assert_eq!(warn.pos, Pos::new(1, 4));
        assert_eq!(warn.text, "named main");
    }
}
