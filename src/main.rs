use std::{io::stdout, path::PathBuf, sync::mpsc, time::Duration};

use anyhow::Result;
use clap::Parser;
use crossterm::{event::DisableMouseCapture, execute};
use ratatui::DefaultTerminal;
use tracing::{debug, info, warn};

use crate::{
    app::state::App,
    config::Config,
    events::types::AppEvent,
    player::commands::PlayerCommand,
    ui::cover::{CoverLoader, CoverMessage, ImageCache},
};

mod app;
mod config;
mod events;
mod input;
mod logging;
mod player;
mod playlist;
mod ui;

/// A terminal music player for local audio files
#[derive(Parser, Debug)]
#[command(name = "cassette", version, about)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Audio files to put on the playlist; the first one starts playing
    songs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = config::load_or_create_config(args.config.as_deref())?;
    let _log_guard = logging::init(&loaded.config.log_level)?;
    if loaded.created {
        info!(path = %loaded.path.display(), "wrote default config");
    } else {
        debug!(path = %loaded.path.display(), "config loaded");
    }

    ui::theme::init_theme(loaded.config.theme);

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &loaded.config, &args.songs);
    // The input thread is still blocked in a read and never gets to undo its capture
    if let Err(e) = execute!(stdout(), DisableMouseCapture) {
        warn!("failed to disable mouse capture: {}", e);
    }
    ratatui::restore();

    if let Err(ref e) = result {
        warn!("exiting with error: {:#}", e);
    }
    result
}

fn run(terminal: &mut DefaultTerminal, config: &Config, songs: &[PathBuf]) -> Result<()> {
    // Queries the terminal, so it has to happen before the input thread owns stdin
    let mut image_cache = ImageCache::new();
    let cover_loader = CoverLoader::new();

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let (player_cmd_tx, player_cmd_rx) = mpsc::channel::<PlayerCommand>();

    let _input_handle = input::thread::spawn(event_tx.clone());
    let _player_handle = player::thread::spawn(player_cmd_rx, event_tx.clone());

    let mut app = App::new(player_cmd_tx, config);
    app.load_song(0);
    app.add_songs_from_args(songs);

    let mut last_cover: Option<PathBuf> = None;

    loop {
        while let Ok(msg) = cover_loader.try_recv() {
            match msg {
                CoverMessage::Loaded { path, data } => {
                    if image_cache.is_waiting_for(&path) {
                        if let Err(e) = image_cache.load_cover(path.clone(), &data) {
                            warn!(path = %path.display(), "failed to decode cover: {}", e);
                            image_cache.mark_missing(path);
                        }
                    }
                }
                CoverMessage::Missing { path } => {
                    if image_cache.is_waiting_for(&path) {
                        image_cache.mark_missing(path);
                    }
                }
                CoverMessage::Error { path, error } => {
                    debug!(path = %path.display(), "cover lookup failed: {}", error);
                    if image_cache.is_waiting_for(&path) {
                        image_cache.mark_missing(path);
                    }
                }
            }
        }

        match app.cover_path() {
            Some(path) if last_cover.as_deref() != Some(path) => {
                let path = path.to_path_buf();
                image_cache.begin(path.clone());
                cover_loader.fetch(path.clone());
                last_cover = Some(path);
            }
            None if last_cover.is_some() => {
                last_cover = None;
                image_cache.clear();
            }
            _ => {}
        }

        app.notifications.tick();
        app.loading.tick();

        terminal.draw(|f| ui::render::render(f, &mut app, &mut image_cache))?;

        match event_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(event) => match event {
                AppEvent::Input(key_event) => app.handle_input(key_event),
                AppEvent::Mouse(mouse_event) => app.handle_mouse(mouse_event),
                AppEvent::Resize => {}
                AppEvent::PlayerStateChanged(state) => app.on_player_state_changed(state),
                AppEvent::PositionUpdate {
                    generation,
                    position,
                } => app.on_position_update(generation, position),
                AppEvent::DurationChanged {
                    generation,
                    duration,
                } => app.on_duration_changed(generation, duration),
                AppEvent::TrackEnded { generation } => app.on_track_ended(generation),
                AppEvent::PlayerError {
                    generation,
                    message,
                    fatal,
                } => app.on_player_error(generation, message, fatal),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                anyhow::bail!("Event channel disconnected");
            }
        }

        if app.should_quit {
            info!("quit requested");
            break;
        }
    }

    Ok(())
}
