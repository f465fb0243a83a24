//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# lintkit configuration
# Every value below is the built-in default. Command-line flags win over
# anything set here.

# Exit code when any issue was found
exit_code = 1

# Check test units (`*_test.rs`, `tests/`) and the package's test variant
check_tests = true

# Check files marked "Code generated ... DO NOT EDIT."
check_generated = false

# Abbreviate toolchain and cargo registry paths in locations
shorter_locations = true

# Colorize text output
colored_output = true

# Glob patterns for files that are never loaded
exclude = ["**/target/**"]

# Plugin manifest providing extra line-pattern checkers
# plugin = "lintkit-plugin.toml"

# Target architecture for size information (default: host)
# target_arch = "x86_64"

# Checker threads, 0 for one per CPU
jobs = 0

# Checker selection, applied in order:
#   1. any tag matches disable_tags  -> disabled
#   2. name matches disable          -> disabled
#   3. untagged, or a tag matches enable_tags -> enabled
#   4. name matches enable           -> enabled
[filters]
disable_tags = "^experimental$|^performance$|^opinionated$"
disable = "^$"
enable_tags = ".*"
enable = ".*"
"#;

/// Runs the init command.
pub fn run(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {} to select checkers", config_path.display());
    println!("  2. Run: lintkit list-rules");
    println!("  3. Run: lintkit check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintkit_core::Config;
    use tempfile::TempDir;

    #[test]
    fn template_spells_out_the_defaults() {
        assert_eq!(Config::parse(DEFAULT_CONFIG).unwrap(), Config::default());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lintkit.toml");
        std::fs::write(&path, "exit_code = 7\n").unwrap();

        let err = run(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "exit_code = 7\n");

        run(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
