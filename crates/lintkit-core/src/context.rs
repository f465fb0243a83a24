//! Context types handed to checkers.

use crate::program::{Package, SemanticInfo, SourceUnit};
use crate::types::{Pos, Position};

/// Size information for the target architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSizes {
    /// Pointer and `usize` width in bytes.
    pub word_size: usize,
    /// Largest alignment of any primitive type in bytes.
    pub max_align: usize,
}

impl TargetSizes {
    /// Looks up sizes for a `std::env::consts::ARCH` style name.
    ///
    /// Returns `None` for architectures without known sizes.
    #[must_use]
    pub fn for_arch(arch: &str) -> Option<Self> {
        let (word_size, max_align) = match arch {
            "x86_64" | "aarch64" | "riscv64" | "powerpc64" | "s390x" | "mips64"
            | "loongarch64" | "sparc64" => (8, 8),
            "x86" | "arm" | "riscv32" | "powerpc" | "mips" => (4, 4),
            "wasm32" => (4, 8),
            "wasm64" => (8, 8),
            _ => return None,
        };
        Some(Self {
            word_size,
            max_align,
        })
    }

    /// Sizes of the architecture this binary was built for.
    #[must_use]
    pub fn host() -> Option<Self> {
        Self::for_arch(std::env::consts::ARCH)
    }
}

/// Session-wide state shared by every checker of one run.
///
/// Passed to checker constructors and reachable from every [`RunContext`].
#[derive(Debug, Clone)]
pub struct LintContext {
    sizes: TargetSizes,
}

impl LintContext {
    /// Creates a session context.
    #[must_use]
    pub fn new(sizes: TargetSizes) -> Self {
        Self { sizes }
    }

    /// Target size information.
    #[must_use]
    pub fn sizes(&self) -> TargetSizes {
        self.sizes
    }
}

/// Everything a checker sees while it inspects one unit.
///
/// The orchestrator builds a fresh view for every unit. Checkers must not
/// keep anything borrowed from it past the call it was passed to.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    lint: &'a LintContext,
    package: &'a Package,
    unit: &'a SourceUnit,
}

impl<'a> RunContext<'a> {
    /// Binds the session context to one unit of `package`.
    #[must_use]
    pub fn new(lint: &'a LintContext, package: &'a Package, unit: &'a SourceUnit) -> Self {
        Self {
            lint,
            package,
            unit,
        }
    }

    /// Session-wide context.
    #[must_use]
    pub fn lint(&self) -> &'a LintContext {
        self.lint
    }

    /// Package the current unit belongs to.
    #[must_use]
    pub fn package(&self) -> &'a Package {
        self.package
    }

    /// Semantic information of the current package.
    #[must_use]
    pub fn info(&self) -> &'a SemanticInfo {
        self.package.info()
    }

    /// Unit being checked.
    #[must_use]
    pub fn unit(&self) -> &'a SourceUnit {
        self.unit
    }

    /// Base file name of the unit being checked.
    #[must_use]
    pub fn filename(&self) -> &'a str {
        self.unit.file_name()
    }

    /// Resolves a unit-relative position into a full source position.
    #[must_use]
    pub fn position(&self, pos: Pos) -> Position {
        Position::new(self.unit.path(), pos)
    }
}
