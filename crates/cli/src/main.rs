// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use chapterplay_config::{Config, ConfigManager};
use chapterplay_core::AppError;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

mod commands;
mod player;

fn build_cli() -> Command {
    Command::new("chapterplay")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Chapterplay Contributors")
        .about("Plays the chapters of a book summary in order")
        .arg(
            Arg::new("config-dir")
                .short('c')
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("play")
                .about("Play the summary interactively")
                .arg(
                    Arg::new("bundle")
                        .short('b')
                        .long("bundle")
                        .value_name("DIR")
                        .help("Summary bundle directory (defaults to app.bundle_path)")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("speed")
                        .short('s')
                        .long("speed")
                        .value_name("SPEED")
                        .help("Playback speed")
                        .value_parser(["0.5", "1", "1.0", "1.5", "2", "2.0"]),
                ),
        )
        .subcommand(
            Command::new("chapters")
                .about("List the chapters of a summary bundle")
                .arg(
                    Arg::new("bundle")
                        .short('b')
                        .long("bundle")
                        .value_name("DIR")
                        .help("Summary bundle directory (defaults to app.bundle_path)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(
                    Command::new("validate")
                        .about("Check the config file for invalid values")
                        .arg(
                            Arg::new("quiet")
                                .short('q')
                                .long("quiet")
                                .help("Only report problems")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
}

fn config_manager(config_dir: Option<&PathBuf>) -> Result<ConfigManager> {
    match config_dir {
        Some(dir) => Ok(ConfigManager::with_directory(dir)),
        None => ConfigManager::new().context("Failed to locate the config directory"),
    }
}

async fn run() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(matches.get_one::<PathBuf>("config-dir"))?;

    // The logger level comes from the config, so problems are reported once it is up
    let (config, load_error) = match manager.load_with_env_overrides() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();

    if let Some(e) = load_error {
        log::warn!("{}, using default configuration", e);
    }

    match matches.subcommand() {
        Some(("play", sub_matches)) => {
            let bundle = commands::resolve_bundle(sub_matches, &config);
            let speed = commands::resolve_speed(sub_matches, &config)?;
            player::start_playback(&config, bundle, speed).await
        }
        Some(("chapters", sub_matches)) => {
            let bundle = commands::resolve_bundle(sub_matches, &config);
            commands::list_chapters(&bundle)
        }
        Some(("config", sub_matches)) => match sub_matches.subcommand() {
            Some(("init", _)) => commands::config_init(&manager),
            Some(("show", _)) => commands::config_show(&manager, &config),
            Some(("validate", validate_matches)) => {
                commands::config_validate(&manager, validate_matches.get_flag("quiet"))
            }
            _ => Ok(()),
        },
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        match e.downcast_ref::<AppError>() {
            Some(app_error) => {
                log::error!("{} ({})", app_error, app_error.severity());
                eprintln!("Error: {}", app_error.user_message());
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}
