//! List rules command implementation.

use anyhow::{Context, Result};
use lintkit_core::{Catalog, ExtensionLoader, Filters, ManifestLoader, Registry};
use std::fmt::Write as _;
use std::path::Path;

use crate::config_resolver::ConfigSource;

/// Runs the list-rules command.
pub fn run(plugin: Option<&Path>, source: &ConfigSource) -> Result<()> {
    let config = super::load_config(source)?;

    let mut registry = Registry::new();
    lintkit_rules::register_all(&mut registry).context("Failed to register built-in checkers")?;

    if let Some(path) = plugin.or(config.plugin.as_deref()) {
        let extras = ManifestLoader::new()
            .load_extras(path)
            .with_context(|| format!("Failed to load plugin: {}", path.display()))?;
        registry.extend(extras)?;
    }

    let filters = Filters::new(&config.filters).context("Invalid selection pattern")?;
    print!("{}", render(&registry.freeze(), &filters));

    println!("\nSelection uses --disable-tags, --disable, --enable-tags and --enable, e.g.:");
    println!("  lintkit check --enable-tags '^performance$'");
    println!("  lintkit check --disable '^unwrap-call$'");

    Ok(())
}

fn render(catalog: &Catalog, filters: &Filters) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:<14} {:<34} Summary", "Name", "Tags", "Status");
    let _ = writeln!(out, "{}", "-".repeat(100));

    for info in catalog.entries() {
        let tags = info.tag_list().join(",");
        let decision = filters.decide(info);
        let _ = writeln!(
            out,
            "{:<20} {:<14} {:<34} {}",
            info.name(),
            if tags.is_empty() { "-" } else { tags.as_str() },
            decision.to_string(),
            info.summary_text()
        );
    }
    out
}
