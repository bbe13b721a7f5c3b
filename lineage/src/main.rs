//! lineage: terminal browser for document version chains.
//!
//! Opens the review database, optionally imports a JSON document list as the
//! site's snapshot, then shows every lineage of the site as a collapsible
//! chain with a revision compare panel and per-session review flags.
//!
//! # Startup sequence
//!
//! 1. Parse flags, read the config file (falling back to defaults), install
//!    file logging, pick the theme.
//! 2. Open the database, run the import if one was asked for, resume or
//!    create the site's review session. Failures here print to stderr
//!    because the terminal is still in cooked mode.
//! 3. Panic hook, SIGTERM flag, `init_tui()`, event task, first background load.
//!
//! After `init_tui()` the event loop exits only via `break`, so
//! `restore_tui()` always runs.

mod app;
mod compare;
mod config;
mod event;
mod loader;
mod logging;
mod theme;
mod tui;
mod ui;

use std::sync::atomic::Ordering;

use anyhow::Context;
use clap::Parser;
use lineage_core::db;

use crate::config::{Cli, Config};
use crate::event::AppEvent;
use crate::ui::keybindings::{self, KeyAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let (config, config_error) = match Config::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let (log_path, _log_guard) = logging::init(&config.log_dir)?;
    tracing::info!(site_id = %cli.site_id, log = %log_path.display(), "starting");
    if let Some(e) = config_error {
        tracing::warn!(path = %config_path.display(), error = %e, "config unreadable, using defaults");
    }

    let theme = theme::Theme::from_name(&config.theme);

    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }
    let conn = db::open_db(&db_path.to_string_lossy())
        .await
        .with_context(|| format!("opening database {}", db_path.display()))?;

    if let Some(path) = &cli.import {
        loader::import_snapshot(&conn, &cli.site_id, path).await?;
    }

    let session = db::detect_or_create_session(&conn, &cli.site_id)
        .await
        .context("opening review session")?;
    tracing::info!(session_id = %session.id, "review session");

    let mut state = app::AppState::new(cli.site_id.clone());

    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let tx = handler.tx;
    let mut rx = handler.rx;

    loader::spawn_load(conn.clone(), cli.site_id.clone(), session.id.clone(), tx.clone());

    let mut draw_result = Ok(());

    'event_loop: loop {
        tokio::select! {
            // Heartbeat so SIGTERM is noticed even when no events arrive.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                let action = match maybe_event {
                    Some(AppEvent::Render) => {
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            draw_result = Err(e);
                            break 'event_loop;
                        }
                        KeyAction::Continue
                    }
                    Some(AppEvent::Key(key)) => keybindings::handle_key(key, &mut state),
                    Some(AppEvent::Mouse(mouse)) => keybindings::handle_mouse(mouse, &mut state),
                    Some(AppEvent::Loaded(result)) => {
                        state.apply_load(*result);
                        KeyAction::Continue
                    }
                    Some(AppEvent::LoadFailed(message)) => {
                        state.apply_load_error(message);
                        KeyAction::Continue
                    }
                    Some(AppEvent::Quit) | None => break 'event_loop,
                    // Resize is picked up by the next draw; ticks carry no work.
                    Some(_) => KeyAction::Continue,
                };

                match action {
                    KeyAction::Continue => {}
                    KeyAction::Quit => break 'event_loop,
                    KeyAction::Reload => {
                        if !state.loading {
                            state.loading = true;
                            loader::spawn_load(
                                conn.clone(),
                                cli.site_id.clone(),
                                session.id.clone(),
                                tx.clone(),
                            );
                        }
                    }
                    KeyAction::ToggleReviewed(document_id) => {
                        match db::toggle_document_reviewed(&conn, &session.id, &document_id).await {
                            Ok(reviewed) => {
                                tracing::debug!(%document_id, reviewed, "review flag toggled");
                                state.set_reviewed(document_id, reviewed);
                                state.last_error = None;
                            }
                            Err(e) => {
                                tracing::error!(%document_id, error = %e, "review toggle failed");
                                state.last_error = Some(e.to_string());
                            }
                        }
                    }
                }

                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    tui::restore_tui()?;

    if let Err(e) = db::update_session_timestamp(&conn, &session.id).await {
        tracing::warn!(error = %e, "session timestamp not updated");
    }
    tracing::info!("shutting down");

    draw_result?;
    Ok(())
}
