//! Check command implementation.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use lintkit_core::{Config, CrateLoader, Format, Linter, Printer, Registry, RootAliases};
use std::path::PathBuf;

use crate::config_resolver::ConfigSource;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `<location>: <rule>: <message>`
    #[default]
    Text,
    /// One JSON object per finding
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// Arguments of `lintkit check`. Anything given here wins over the config
/// file.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Crate directories to check
    #[arg(default_value = ".")]
    pub packages: Vec<PathBuf>,

    /// Plugin manifest providing extra checkers
    #[arg(long)]
    pub plugin: Option<PathBuf>,

    /// Disable checkers with any tag matching this regex
    #[arg(long, value_name = "REGEX")]
    pub disable_tags: Option<String>,

    /// Disable checkers whose name matches this regex
    #[arg(long, value_name = "REGEX")]
    pub disable: Option<String>,

    /// Enable untagged checkers and checkers with a tag matching this regex
    #[arg(long, value_name = "REGEX")]
    pub enable_tags: Option<String>,

    /// Enable checkers whose name matches this regex
    #[arg(long, value_name = "REGEX")]
    pub enable: Option<String>,

    /// Exit code when any issue was found
    #[arg(long)]
    pub exit_code: Option<i32>,

    /// Check test units
    #[arg(long, value_name = "BOOL")]
    pub check_tests: Option<bool>,

    /// Check machine-generated units
    #[arg(long, value_name = "BOOL")]
    pub check_generated: Option<bool>,

    /// Abbreviate toolchain paths in locations
    #[arg(long, value_name = "BOOL")]
    pub shorter_locations: Option<bool>,

    /// Colorize text output
    #[arg(long, value_name = "BOOL")]
    pub colored_output: Option<bool>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Target architecture for size information
    #[arg(long)]
    pub target_arch: Option<String>,

    /// Checker threads (0: one per CPU)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Additional glob patterns to exclude
    #[arg(short, long)]
    pub exclude: Vec<String>,
}

impl CheckArgs {
    /// Overrides `config` with every option given on the command line.
    pub fn apply(&self, config: &mut Config) {
        let filters = &mut config.filters;
        for (arg, field) in [
            (&self.disable_tags, &mut filters.disable_tags),
            (&self.disable, &mut filters.disable),
            (&self.enable_tags, &mut filters.enable_tags),
            (&self.enable, &mut filters.enable),
        ] {
            if let Some(pattern) = arg {
                field.clone_from(pattern);
            }
        }

        if let Some(code) = self.exit_code {
            config.exit_code = code;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        for (arg, field) in [
            (self.check_tests, &mut config.check_tests),
            (self.check_generated, &mut config.check_generated),
            (self.shorter_locations, &mut config.shorter_locations),
            (self.colored_output, &mut config.colored_output),
        ] {
            if let Some(value) = arg {
                *field = value;
            }
        }

        if self.plugin.is_some() {
            config.plugin.clone_from(&self.plugin);
        }
        if self.target_arch.is_some() {
            config.target_arch.clone_from(&self.target_arch);
        }
        config.exclude.extend(self.exclude.iter().cloned());
    }

    fn package_ids(&self) -> Vec<String> {
        self.packages
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }
}

fn printer(config: &Config, format: OutputFormat) -> Printer {
    let printer = Printer::new()
        .format(format.into())
        .colored(config.colored_output && format == OutputFormat::Text);
    if config.shorter_locations {
        printer.shorten_with(RootAliases::toolchain())
    } else {
        printer
    }
}

/// Runs the check command.
pub fn run(args: &CheckArgs, source: &ConfigSource) -> Result<()> {
    let mut config = super::load_config(source)?;
    args.apply(&mut config);

    let mut registry = Registry::new();
    lintkit_rules::register_all(&mut registry).context("Failed to register built-in checkers")?;

    let loader = CrateLoader::new()
        .with_excludes(&config.exclude)
        .context("Invalid exclude pattern")?;

    let linter = Linter::builder()
        .registry(registry)
        .loader(loader)
        .filters(config.filters.clone())
        .plugin(config.plugin.clone())
        .target_arch(config.target_arch.clone())
        .check_tests(config.check_tests)
        .check_generated(config.check_generated)
        .jobs(config.jobs)
        .build();

    let packages = args.package_ids();
    tracing::debug!("Checking {} package(s)", packages.len());

    let summary = linter
        .run(&packages, &printer(&config, args.format))
        .context("Check failed")?;

    tracing::debug!(
        "Checked {} unit(s), skipped {}, {} warning(s)",
        summary.units_checked,
        summary.units_skipped,
        summary.warnings
    );

    if summary.found_issues {
        std::process::exit(config.exit_code);
    }

    Ok(())
}
