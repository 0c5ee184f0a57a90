// FILE: crates/cli/src/commands.rs

use anyhow::{bail, Context, Result};
use chapterplay_config::{Config, ConfigManager};
use chapterplay_content_sources::{LocalSummaryProvider, SummaryProvider};
use chapterplay_core::{AppError, BookSummary, PlaybackSpeed};
use clap::ArgMatches;
use console::style;
use std::path::{Path, PathBuf};

/// Bundle directory from `--bundle`, else the configured one
pub fn resolve_bundle(matches: &ArgMatches, config: &Config) -> PathBuf {
    matches
        .get_one::<PathBuf>("bundle")
        .cloned()
        .unwrap_or_else(|| config.app.bundle_path.clone())
}

/// Speed from `--speed`, else the configured default
pub fn resolve_speed(matches: &ArgMatches, config: &Config) -> Result<PlaybackSpeed> {
    match matches.get_one::<String>("speed") {
        Some(raw) => Ok(parse_speed(raw)?),
        None => Ok(config.player.playback_speed()),
    }
}

fn parse_speed(raw: &str) -> std::result::Result<PlaybackSpeed, AppError> {
    let invalid = |reason: String| AppError::InvalidConfiguration {
        setting: "--speed".to_string(),
        value: raw.to_string(),
        reason,
    };

    let value = raw.trim().parse::<f32>().map_err(|e| invalid(e.to_string()))?;
    PlaybackSpeed::try_from(value).map_err(|e| invalid(e.to_string()))
}

/// List the chapters of the bundle at `bundle`
pub fn list_chapters(bundle: &Path) -> Result<()> {
    let provider = LocalSummaryProvider::from_directory(bundle)
        .with_context(|| format!("Failed to read bundle at {}", bundle.display()))?;

    if !provider.is_available() {
        bail!("Bundle directory not found: {}", bundle.display());
    }

    let summary = provider.load().map_err(|e| AppError::SummaryUnavailable {
        reason: e.to_string(),
    })?;

    println!(
        "\n{} ({})",
        style(&provider.metadata().name).bold().cyan(),
        provider.metadata().description
    );
    println!("{}", "=".repeat(60));

    if summary.is_empty() {
        println!("No playable chapters found.");
        return Ok(());
    }

    for line in chapter_lines(&summary) {
        println!("{}", line);
    }
    println!("\nCover: {}", summary.cover_path.display());

    Ok(())
}

fn chapter_lines(summary: &BookSummary) -> Vec<String> {
    summary
        .chapters
        .iter()
        .enumerate()
        .map(|(index, chapter)| {
            format!(
                "  [{}] {}  {}",
                summary.chapter_progress(index),
                chapter.short_motto,
                style(file_name(chapter.audio_path())).dim()
            )
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Write a default config file unless one exists
pub fn config_init(manager: &ConfigManager) -> Result<()> {
    let created = manager
        .initialize()
        .context("Failed to write default config")?;

    if created {
        println!(
            "{} Config written to {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!("Config already exists at {}", manager.config_path().display());
    }

    Ok(())
}

/// Print the effective configuration, overrides included
pub fn config_show(manager: &ConfigManager, config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;

    println!("# {}", manager.config_path().display());
    print!("{}", rendered);

    Ok(())
}

/// Report every invalid value in the config file
pub fn config_validate(manager: &ConfigManager, quiet: bool) -> Result<()> {
    let problems = manager
        .validate()
        .with_context(|| format!("Failed to load {}", manager.config_path().display()))?;

    if problems.is_empty() {
        if !quiet {
            println!("{} Config is valid", style("✓").green().bold());
        }
        return Ok(());
    }

    for problem in &problems {
        println!("  {} {}", style("✗").red().bold(), problem);
    }
    bail!("{} invalid config value(s)", problems.len())
}
