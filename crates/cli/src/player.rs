use anyhow::{Context, Result};
use chapterplay_config::Config;
use chapterplay_content_sources::LocalSummaryProvider;
use chapterplay_core::{AppError, PlaybackSpeed};
use chapterplay_player::{
    PlaybackController, PlaybackSnapshot, PlayerCommand, PlayerHandle, PlayerOptions, SummaryStatus,
};
use console::{style, Key, Term};
use media_engine::MediaEngine;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const PROGRESS_BAR_WIDTH: usize = 50;

/// What a key press asks the player to do
#[derive(Debug, Clone, PartialEq)]
enum KeyAction {
    Send(PlayerCommand),
    Quit,
}

pub async fn start_playback(config: &Config, bundle: PathBuf, speed: PlaybackSpeed) -> Result<()> {
    let engine = MediaEngine::new().map_err(|e| AppError::PlaybackDeviceError {
        message: e.to_string(),
    })?;

    let player_config = config.player.validated();
    let options = PlayerOptions {
        initial_speed: speed,
        poll_interval: player_config.poll_interval(),
        completion_threshold: player_config.completion_threshold_secs,
    };
    let handle = PlaybackController::spawn(Arc::new(engine), options);

    match LocalSummaryProvider::from_directory(&bundle) {
        Ok(provider) => {
            handle.load_summary(provider);
        }
        Err(e) => {
            log::warn!("Summary unavailable from {}: {}", bundle.display(), e);
            handle.set_summary(None)?;
        }
    }

    let term = Term::stdout();
    if term.hide_cursor().is_err() {
        eprintln!("Warning: Failed to hide cursor");
    }

    let result = player_loop(&term, &handle, f64::from(player_config.jump_secs)).await;

    let _ = handle.shutdown();
    let _ = term.show_cursor();

    result
}

/// Reads keys on a plain thread, `read_key` blocks until a key arrives
fn spawn_key_reader(term: Term) -> Result<mpsc::UnboundedReceiver<Key>> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("chapterplay-keys".to_string())
        .spawn(move || {
            while let Ok(key) = term.read_key() {
                if tx.send(key).is_err() {
                    break;
                }
            }
        })
        .context("Failed to start key reader")?;

    Ok(rx)
}

async fn player_loop(term: &Term, handle: &PlayerHandle, jump_secs: f64) -> Result<()> {
    let mut keys = spawn_key_reader(term.clone())?;
    let mut state = handle.subscribe();
    let mut redraw = tokio::time::interval(Duration::from_secs(1));

    loop {
        let snapshot = state.borrow_and_update().clone();
        draw_player_ui(term, &snapshot, jump_secs)?;

        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else { break };
                match key_action(&key, &snapshot, jump_secs) {
                    Some(KeyAction::Quit) => break,
                    Some(KeyAction::Send(command)) => handle.send(command)?,
                    None => {}
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = redraw.tick() => {}
        }
    }

    Ok(())
}

fn key_action(key: &Key, snapshot: &PlaybackSnapshot, jump_secs: f64) -> Option<KeyAction> {
    let command = match key {
        Key::Char('q') | Key::Escape => return Some(KeyAction::Quit),
        Key::Char(' ') => {
            if snapshot.is_playing {
                PlayerCommand::Pause
            } else {
                PlayerCommand::Resume
            }
        }
        Key::Char('n') => PlayerCommand::PlayNext,
        Key::Char('p') => PlayerCommand::PlayPrevious,
        Key::ArrowLeft => PlayerCommand::JumpBy(-jump_secs),
        Key::ArrowRight => PlayerCommand::JumpBy(jump_secs),
        Key::Char('s') => PlayerCommand::SetSpeed(snapshot.playback_speed.next()),
        Key::Char('d') => PlayerCommand::DismissError,
        Key::Char(c @ '1'..='9') => {
            let index = c.to_digit(10)? as usize - 1;
            PlayerCommand::PlayChapter(index)
        }
        _ => return None,
    };

    Some(KeyAction::Send(command))
}

fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction * PROGRESS_BAR_WIDTH as f64) as usize).min(PROGRESS_BAR_WIDTH);
    format!(
        "[{}{}] {}%",
        "=".repeat(filled),
        " ".repeat(PROGRESS_BAR_WIDTH - filled),
        (fraction * 100.0).round() as u32
    )
}

/// Status line shown instead of the player when there is nothing to play
fn idle_notice(snapshot: &PlaybackSnapshot) -> Option<String> {
    match snapshot.summary {
        SummaryStatus::Pending => Some(style("Loading summary...").dim().to_string()),
        SummaryStatus::Unavailable => Some(
            style("No chapters: the summary could not be loaded")
                .yellow()
                .to_string(),
        ),
        SummaryStatus::Loaded if snapshot.chapter_count == 0 => {
            Some(style("No chapters to play").yellow().to_string())
        }
        SummaryStatus::Loaded => None,
    }
}

fn draw_player_ui(term: &Term, snapshot: &PlaybackSnapshot, jump_secs: f64) -> Result<()> {
    term.clear_screen().context("Failed to clear screen")?;

    if let Some(notice) = idle_notice(snapshot) {
        term.write_line(&format!("\n  {}", notice))
            .context("Failed to write status")?;
        term.write_line("\n  Q/Esc   - Quit")
            .context("Failed to write control")?;
        return Ok(());
    }

    term.write_line(&format!("\n  {}", style(&snapshot.chapter_motto).bold().cyan()))
        .context("Failed to write motto")?;
    term.write_line(&format!("  Chapter {}", snapshot.chapter_label()))
        .context("Failed to write chapter")?;
    if let Some(cover) = &snapshot.cover_path {
        term.write_line(&format!("  {}", style(cover.display()).dim()))
            .context("Failed to write cover")?;
    }

    term.write_line("").context("Failed to write blank line")?;
    term.write_line(&format!("  {}", snapshot.time_label()))
        .context("Failed to write position")?;
    term.write_line(&format!("  {}", progress_bar(snapshot.fraction_played())))
        .context("Failed to write progress bar")?;
    term.write_line("").context("Failed to write blank line")?;

    let status = if snapshot.is_playing {
        style("Playing").green()
    } else {
        style("Paused").yellow()
    };
    term.write_line(&format!("  Status: {}", status))
        .context("Failed to write status")?;
    term.write_line(&format!("  Speed: {}", snapshot.playback_speed))
        .context("Failed to write speed")?;

    if let Some(alert) = &snapshot.pending_error {
        term.write_line("").context("Failed to write blank line")?;
        term.write_line(&format!("  {} {}", style(&alert.title).red().bold(), alert.message))
            .context("Failed to write alert")?;
        term.write_line(&format!("  Press D to {}", alert.dismiss_label))
            .context("Failed to write alert")?;
    }

    term.write_line("").context("Failed to write blank line")?;
    term.write_line("  Controls:")
        .context("Failed to write controls header")?;
    term.write_line("    Space   - Play/Pause")
        .context("Failed to write control")?;
    term.write_line("    N/P     - Next/Previous chapter")
        .context("Failed to write control")?;
    term.write_line(&format!("    ←/→     - Jump -{0}s/+{0}s", jump_secs))
        .context("Failed to write control")?;
    term.write_line("    S       - Cycle speed")
        .context("Failed to write control")?;
    term.write_line("    1-9     - Play chapter")
        .context("Failed to write control")?;
    term.write_line("    Q/Esc   - Quit")
        .context("Failed to write control")?;

    Ok(())
}
