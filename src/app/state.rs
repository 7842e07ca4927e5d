use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::app::{decrement, increment};
use crate::config::Config;
use crate::player::commands::{PlayerCommand, PlayerState};
use crate::playlist::{Playlist, Song, resolve_song_path};
use crate::ui::loading::LoadingAnimation;
use crate::ui::notifications::NotificationManager;
use crate::ui::progress_percent;

/// Screen areas from the last frame, used for mouse hit testing.
#[derive(Default, Clone)]
pub struct LayoutRegions {
    pub progress_bar: Option<Rect>,
    pub prev_button: Option<Rect>,
    pub play_button: Option<Rect>,
    pub next_button: Option<Rect>,
    pub playlist_button: Option<Rect>,
    pub add_button: Option<Rect>,
    pub playlist_items: Option<Rect>,
    pub playlist_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    AddSong,
}

pub struct App {
    // Data
    pub playlist: Playlist,
    pub now_playing: Option<Song>,

    // Playback state
    pub is_playing: bool,
    pub player_state: PlayerState,
    pub current_position: Duration,
    pub total_duration: Duration,
    /// The player has the current song open, so play resumes instead of reopening.
    source_loaded: bool,
    /// Tag of the last opened source. Player events carrying another tag are stale.
    generation: u64,

    // Playlist overlay
    pub playlist_open: bool,
    pub playlist_cursor: usize,

    // Add-song prompt
    pub input_mode: InputMode,
    pub input_buffer: String,

    seek_step: Duration,
    music_dir: Option<PathBuf>,

    // Communication
    pub player_tx: mpsc::Sender<PlayerCommand>,

    // Notifications
    pub notifications: NotificationManager,
    pub loading: LoadingAnimation,

    // Control
    pub should_quit: bool,
    pub layout_regions: LayoutRegions,
}

impl App {
    pub fn new(player_tx: mpsc::Sender<PlayerCommand>, config: &Config) -> Self {
        Self {
            playlist: Playlist::new(),
            now_playing: None,

            is_playing: false,
            player_state: PlayerState::Stopped,
            current_position: Duration::ZERO,
            total_duration: Duration::ZERO,
            source_loaded: false,
            generation: 0,

            playlist_open: false,
            playlist_cursor: 0,

            input_mode: InputMode::Normal,
            input_buffer: String::new(),

            seek_step: Duration::from_secs(config.seek_step_secs),
            music_dir: config.music_dir.clone(),

            player_tx,

            notifications: NotificationManager::new(),
            loading: LoadingAnimation::new(),

            should_quit: false,
            layout_regions: LayoutRegions::default(),
        }
    }

    fn send(&self, cmd: PlayerCommand) {
        if self.player_tx.send(cmd).is_err() {
            warn!("player thread is gone, command dropped");
        }
    }

    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.current_position, self.total_duration)
    }

    /// Points the player at the song at `index`, or resets the display when
    /// the playlist is empty. Does not start playback.
    pub fn load_song(&mut self, index: usize) {
        if self.playlist.is_empty() {
            self.now_playing = None;
            self.current_position = Duration::ZERO;
            self.total_duration = Duration::ZERO;
            self.pause_song();
            return;
        }

        if !self.playlist.select(index) {
            return;
        }

        if self.source_loaded {
            self.send(PlayerCommand::Stop);
            self.source_loaded = false;
            self.generation = self.generation.wrapping_add(1);
        }

        self.now_playing = self.playlist.current_song().cloned();
        self.current_position = Duration::ZERO;
        self.total_duration = Duration::ZERO;
        self.playlist_cursor = index;

        if let Some(ref song) = self.now_playing {
            debug!(index, title = %song.title, "song loaded");
        }
    }

    pub fn play_song(&mut self) {
        if self.playlist.is_empty() {
            info!("No songs to play.");
            self.notifications.warning("No songs to play");
            return;
        }

        self.is_playing = true;

        if self.source_loaded {
            self.send(PlayerCommand::Resume);
        } else if let Some(path) = self.now_playing.as_ref().map(|s| s.path.clone()) {
            self.generation = self.generation.wrapping_add(1);
            self.send(PlayerCommand::Play {
                path,
                position: self.current_position,
                generation: self.generation,
            });
            self.source_loaded = true;
        }
    }

    pub fn pause_song(&mut self) {
        self.is_playing = false;
        if self.source_loaded {
            self.send(PlayerCommand::Pause);
        }
    }

    pub fn toggle_playback(&mut self) {
        if self.is_playing {
            self.pause_song();
        } else {
            self.play_song();
        }
    }

    pub fn prev_song(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.playlist.prev();
        self.load_song(self.playlist.current_index());
        self.play_song();
    }

    pub fn next_song(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.playlist.next();
        self.load_song(self.playlist.current_index());
        self.play_song();
    }

    pub fn play_from_playlist(&mut self, index: usize) {
        if index >= self.playlist.len() {
            return;
        }
        self.load_song(index);
        self.play_song();
    }

    /// Seeks to the point of the progress bar that was clicked.
    pub fn set_progress(&mut self, click_x: u16, width: u16) {
        if self.playlist.is_empty() || width == 0 {
            return;
        }
        let ratio = (f64::from(click_x) / f64::from(width)).clamp(0.0, 1.0);
        let target = self.total_duration.mul_f64(ratio);
        self.seek_to(target);
    }

    pub fn seek_forward(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        let mut target = self.current_position.saturating_add(self.seek_step);
        if !self.total_duration.is_zero() {
            target = target.min(self.total_duration);
        }
        self.seek_to(target);
    }

    pub fn seek_backward(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        let target = self.current_position.saturating_sub(self.seek_step);
        self.seek_to(target);
    }

    fn seek_to(&mut self, target: Duration) {
        self.current_position = target;
        if self.source_loaded {
            self.send(PlayerCommand::Seek(target));
        }
    }

    pub fn add_song(&mut self, path: PathBuf) {
        let song = Song::from_path(path);
        info!(title = %song.title, path = %song.path.display(), "song added");
        self.notifications.info(format!("Added {}", song.title));

        if self.playlist.add(song) {
            self.load_song(0);
            self.play_song();
        }
    }

    /// Adds every path given on the command line, skipping ones that cannot be played.
    pub fn add_songs_from_args(&mut self, paths: &[PathBuf]) {
        for path in paths {
            self.add_song_from_input(&path.to_string_lossy());
        }
    }

    fn add_song_from_input(&mut self, input: &str) {
        match resolve_song_path(input, self.music_dir.as_deref()) {
            Ok(path) => self.add_song(path),
            Err(e) => {
                warn!(input, error = %e, "song not added");
                self.notifications.warning(e.to_string());
            }
        }
    }

    pub fn toggle_playlist(&mut self) {
        self.playlist_open = !self.playlist_open;
        if self.playlist_open {
            self.playlist_cursor = self.playlist.current_index();
        }
    }

    pub fn close_playlist(&mut self) {
        self.playlist_open = false;
    }

    pub fn open_add_prompt(&mut self) {
        self.input_mode = InputMode::AddSong;
        self.input_buffer.clear();
    }

    fn submit_add_prompt(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        self.input_mode = InputMode::Normal;
        self.add_song_from_input(&input);
    }

    // Player events

    pub fn on_player_state_changed(&mut self, state: PlayerState) {
        self.player_state = state;
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation || !self.source_loaded {
            debug!(generation, current = self.generation, "stale player event dropped");
            return false;
        }
        true
    }

    pub fn on_position_update(&mut self, generation: u64, position: Duration) {
        if self.is_current(generation) {
            self.current_position = position;
        }
    }

    pub fn on_duration_changed(&mut self, generation: u64, duration: Duration) {
        if self.is_current(generation) {
            self.total_duration = duration;
        }
    }

    pub fn on_track_ended(&mut self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        self.source_loaded = false;
        self.next_song();
    }

    pub fn on_player_error(&mut self, generation: u64, message: String, fatal: bool) {
        if !self.is_current(generation) {
            return;
        }
        if !fatal {
            warn!("player error, still playing: {}", message);
            self.notifications.warning(message);
            return;
        }
        warn!("player error: {}", message);
        self.notifications.error(format!("Player: {}", message));
        self.is_playing = false;
        self.source_loaded = false;
        self.player_state = PlayerState::Stopped;
    }

    // Input

    pub fn handle_input(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.input_mode {
            InputMode::AddSong => self.handle_prompt_input(key),
            InputMode::Normal => {
                if self.playlist_open && self.handle_playlist_input(key) {
                    return;
                }
                self.handle_player_input(key);
            }
        }
    }

    fn handle_prompt_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_add_prompt(),
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    /// Returns true when the overlay consumed the key.
    fn handle_playlist_input(&mut self, key: KeyEvent) -> bool {
        let len = self.playlist.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.playlist_cursor = increment(self.playlist_cursor, len, false);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.playlist_cursor = decrement(self.playlist_cursor, len, false);
            }
            KeyCode::Enter => self.play_from_playlist(self.playlist_cursor),
            KeyCode::Esc => self.close_playlist(),
            _ => return false,
        }
        true
    }

    fn handle_player_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(' ') => self.toggle_playback(),
            KeyCode::Char('n') => self.next_song(),
            KeyCode::Char('p') => self.prev_song(),
            KeyCode::Char('l') => self.toggle_playlist(),
            KeyCode::Char('a') => self.open_add_prompt(),
            KeyCode::Right => self.seek_forward(),
            KeyCode::Left => self.seek_backward(),
            KeyCode::Esc => self.close_playlist(),
            _ => {}
        }
    }

    fn point_in_rect(x: u16, y: u16, rect: Option<Rect>) -> bool {
        rect.is_some_and(|r| x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height)
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        let x = event.column;
        let y = event.row;
        let regions = self.layout_regions.clone();

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.playlist_open {
                    if let Some(region) = regions.playlist_items {
                        if Self::point_in_rect(x, y, Some(region)) {
                            if y > region.y && y < region.y + region.height - 1 {
                                let clicked =
                                    (y - region.y - 1) as usize + regions.playlist_offset;
                                self.play_from_playlist(clicked);
                            }
                            return;
                        }
                    }
                }

                if let Some(bar) = regions.progress_bar {
                    if Self::point_in_rect(x, y, Some(bar)) {
                        self.set_progress(x - bar.x, bar.width);
                        return;
                    }
                }

                if Self::point_in_rect(x, y, regions.prev_button) {
                    self.prev_song();
                } else if Self::point_in_rect(x, y, regions.play_button) {
                    self.toggle_playback();
                } else if Self::point_in_rect(x, y, regions.next_button) {
                    self.next_song();
                } else if Self::point_in_rect(x, y, regions.playlist_button) {
                    self.toggle_playlist();
                } else if Self::point_in_rect(x, y, regions.add_button) {
                    self.open_add_prompt();
                }
            }

            MouseEventKind::Down(MouseButton::Middle) => self.toggle_playback(),

            MouseEventKind::ScrollUp => {
                if self.playlist_open {
                    self.playlist_cursor =
                        decrement(self.playlist_cursor, self.playlist.len(), false);
                } else {
                    self.seek_forward();
                }
            }

            MouseEventKind::ScrollDown => {
                if self.playlist_open {
                    self.playlist_cursor =
                        increment(self.playlist_cursor, self.playlist.len(), false);
                } else {
                    self.seek_backward();
                }
            }

            _ => {}
        }
    }

    /// Path of the song whose cover should be on screen.
    pub fn cover_path(&self) -> Option<&Path> {
        self.now_playing.as_ref().map(|s| s.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Harness {
        app: App,
        rx: mpsc::Receiver<PlayerCommand>,
        _dir: tempfile::TempDir,
        dir: PathBuf,
    }

    impl Harness {
        fn new() -> Self {
            let (tx, rx) = mpsc::channel();
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().to_path_buf();
            let config = Config {
                music_dir: Some(path.clone()),
                ..Config::default()
            };
            Self {
                app: App::new(tx, &config),
                rx,
                _dir: dir,
                dir: path,
            }
        }

        fn touch(&self, name: &str) -> PathBuf {
            let path = self.dir.join(name);
            fs::write(&path, b"").unwrap();
            path
        }

        fn with_songs(names: &[&str]) -> Self {
            let mut h = Self::new();
            for name in names {
                let path = h.touch(name);
                h.app.add_song(path);
            }
            h.drain();
            h
        }

        fn drain(&self) -> Vec<PlayerCommand> {
            self.rx.try_iter().collect()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn initial_load_of_empty_playlist_shows_nothing() {
        let mut h = Harness::new();
        h.app.load_song(0);

        assert!(h.app.now_playing.is_none());
        assert!(!h.app.is_playing);
        assert_eq!(h.app.progress_percent(), 0.0);
        assert!(h.drain().is_empty());
    }

    #[test]
    fn play_on_empty_playlist_is_ignored() {
        let mut h = Harness::new();
        h.app.play_song();

        assert!(!h.app.is_playing);
        assert!(h.drain().is_empty());
        assert_eq!(h.app.notifications.active_notifications().len(), 1);
    }

    #[test]
    fn first_song_added_starts_playing() {
        let mut h = Harness::new();
        let path = h.touch("first.mp3");
        h.app.add_song(path.clone());

        assert!(h.app.is_playing);
        assert_eq!(h.app.now_playing.as_ref().unwrap().title, "first");
        assert_eq!(
            h.drain(),
            vec![PlayerCommand::Play {
                path,
                position: Duration::ZERO,
                generation: h.app.generation,
            }]
        );
    }

    #[test]
    fn later_songs_only_extend_the_playlist() {
        let mut h = Harness::with_songs(&["a.mp3"]);
        let b = h.touch("b.mp3");
        h.app.add_song(b);

        assert_eq!(h.app.playlist.len(), 2);
        assert_eq!(h.app.now_playing.as_ref().unwrap().title, "a");
        assert!(h.drain().is_empty());
    }

    #[test]
    fn toggle_pauses_then_resumes_same_source() {
        let mut h = Harness::with_songs(&["a.mp3"]);

        h.app.toggle_playback();
        assert!(!h.app.is_playing);
        h.app.toggle_playback();
        assert!(h.app.is_playing);

        assert_eq!(h.drain(), vec![PlayerCommand::Pause, PlayerCommand::Resume]);
    }

    #[test]
    fn next_wraps_and_reopens_source() {
        let mut h = Harness::with_songs(&["a.mp3", "b.mp3"]);

        h.app.next_song();
        assert_eq!(h.app.playlist.current_index(), 1);
        h.app.next_song();
        assert_eq!(h.app.playlist.current_index(), 0);

        let cmds = h.drain();
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[0], PlayerCommand::Stop);
        assert!(matches!(&cmds[1], PlayerCommand::Play { path, .. } if path.ends_with("b.mp3")));
        assert_eq!(cmds[2], PlayerCommand::Stop);
        assert!(matches!(&cmds[3], PlayerCommand::Play { path, .. } if path.ends_with("a.mp3")));
    }

    #[test]
    fn prev_from_first_goes_to_last() {
        let mut h = Harness::with_songs(&["a.mp3", "b.mp3", "c.mp3"]);
        h.app.prev_song();

        assert_eq!(h.app.playlist.current_index(), 2);
        assert_eq!(h.app.now_playing.as_ref().unwrap().title, "c");
        assert!(h.app.is_playing);
    }

    #[test]
    fn next_and_prev_on_empty_do_nothing() {
        let mut h = Harness::new();
        h.app.next_song();
        h.app.prev_song();
        assert!(h.drain().is_empty());
        assert!(!h.app.is_playing);
    }

    #[test]
    fn track_end_advances() {
        let mut h = Harness::with_songs(&["a.mp3", "b.mp3"]);
        let playing = h.app.generation;
        h.app.on_track_ended(playing);

        assert_eq!(h.app.playlist.current_index(), 1);
        let cmds = h.drain();
        assert!(matches!(
            cmds.as_slice(),
            [PlayerCommand::Play { path, .. }] if path.ends_with("b.mp3")
        ));
    }

    #[test]
    fn progress_click_seeks_proportionally() {
        let mut h = Harness::with_songs(&["a.mp3"]);
        h.app.on_duration_changed(h.app.generation, Duration::from_secs(200));

        h.app.set_progress(25, 100);

        assert_eq!(h.app.current_position, Duration::from_secs(50));
        assert_eq!(h.drain(), vec![PlayerCommand::Seek(Duration::from_secs(50))]);
        assert!((h.app.progress_percent() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn progress_click_on_empty_playlist_is_ignored() {
        let mut h = Harness::new();
        h.app.on_duration_changed(h.app.generation, Duration::from_secs(200));
        h.app.set_progress(50, 100);
        assert!(h.drain().is_empty());
        assert_eq!(h.app.current_position, Duration::ZERO);
    }

    #[test]
    fn keyboard_seek_is_clamped() {
        let mut h = Harness::with_songs(&["a.mp3"]);
        h.app.on_duration_changed(h.app.generation, Duration::from_secs(7));

        h.app.seek_forward();
        h.app.seek_forward();
        assert_eq!(h.app.current_position, Duration::from_secs(7));

        h.app.seek_backward();
        h.app.seek_backward();
        assert_eq!(h.app.current_position, Duration::ZERO);
    }

    #[test]
    fn position_updates_are_ignored_without_a_source() {
        let mut h = Harness::new();
        h.app.on_position_update(h.app.generation, Duration::from_secs(3));
        assert_eq!(h.app.current_position, Duration::ZERO);

        let mut h = Harness::with_songs(&["a.mp3"]);
        h.app.on_position_update(h.app.generation, Duration::from_secs(3));
        assert_eq!(h.app.current_position, Duration::from_secs(3));
    }

    #[test]
    fn player_error_resets_playing_and_reopens_on_next_play() {
        let mut h = Harness::with_songs(&["a.mp3"]);
        h.app.on_player_error(h.app.generation, "boom".to_string(), true);
        assert!(!h.app.is_playing);

        h.app.play_song();
        assert!(matches!(h.drain().as_slice(), [PlayerCommand::Play { .. }]));
    }

    #[test]
    fn recoverable_player_error_keeps_playing() {
        let mut h = Harness::with_songs(&["a.mp3"]);
        h.app.on_duration_changed(h.app.generation, Duration::from_secs(100));
        h.app.set_progress(100, 100);
        h.drain();

        h.app.on_player_error(h.app.generation, "Seek error".to_string(), false);
        assert!(h.app.is_playing);
        assert_eq!(h.app.notifications.active_notifications().len(), 2);

        h.app.on_position_update(h.app.generation, Duration::from_secs(42));
        assert_eq!(h.app.current_position, Duration::from_secs(42));

        h.app.toggle_playback();
        assert_eq!(h.drain(), vec![PlayerCommand::Pause]);
    }

    #[test]
    fn track_end_from_replaced_source_is_dropped() {
        let mut h = Harness::with_songs(&["a.mp3", "b.mp3", "c.mp3"]);
        let first = h.app.generation;

        h.app.next_song();
        h.app.on_track_ended(first);

        assert_eq!(h.app.playlist.current_index(), 1);
        assert!(h.app.is_playing);
        let cmds = h.drain();
        assert_eq!(cmds.len(), 2);
        assert!(matches!(&cmds[1], PlayerCommand::Play { path, .. } if path.ends_with("b.mp3")));
    }

    #[test]
    fn events_from_replaced_source_do_not_touch_progress() {
        let mut h = Harness::with_songs(&["a.mp3", "b.mp3"]);
        let first = h.app.generation;
        h.app.next_song();

        h.app.on_position_update(first, Duration::from_secs(90));
        h.app.on_duration_changed(first, Duration::from_secs(300));
        h.app.on_player_error(first, "Read error".to_string(), true);

        assert_eq!(h.app.current_position, Duration::ZERO);
        assert_eq!(h.app.total_duration, Duration::ZERO);
        assert!(h.app.is_playing);
    }

    #[test]
    fn huge_seek_step_saturates() {
        let (tx, _rx) = mpsc::channel();
        let config = Config {
            seek_step_secs: u64::MAX,
            ..Config::default()
        };
        let mut app = App::new(tx, &config);
        app.playlist.add(Song::from_path("/music/a.mp3"));

        app.seek_forward();
        assert_eq!(app.current_position, Duration::MAX);

        app.total_duration = Duration::from_secs(60);
        app.seek_forward();
        assert_eq!(app.current_position, Duration::from_secs(60));
    }

    #[test]
    fn playlist_overlay_selects_song() {
        let mut h = Harness::with_songs(&["a.mp3", "b.mp3", "c.mp3"]);

        h.app.handle_input(key(KeyCode::Char('l')));
        assert!(h.app.playlist_open);
        h.app.handle_input(key(KeyCode::Down));
        h.app.handle_input(key(KeyCode::Down));
        h.app.handle_input(key(KeyCode::Down));
        assert_eq!(h.app.playlist_cursor, 2);
        h.app.handle_input(key(KeyCode::Enter));

        assert_eq!(h.app.playlist.current_index(), 2);
        assert!(h.app.is_playing);
        h.app.handle_input(key(KeyCode::Esc));
        assert!(!h.app.playlist_open);
    }

    #[test]
    fn toggle_playlist_twice_closes_it() {
        let mut h = Harness::new();
        h.app.toggle_playlist();
        h.app.toggle_playlist();
        assert!(!h.app.playlist_open);
    }

    #[test]
    fn add_prompt_adds_typed_path() {
        let mut h = Harness::new();
        h.touch("typed.flac");

        h.app.handle_input(key(KeyCode::Char('a')));
        assert_eq!(h.app.input_mode, InputMode::AddSong);
        for c in "typed.flacx".chars() {
            h.app.handle_input(key(KeyCode::Char(c)));
        }
        h.app.handle_input(key(KeyCode::Backspace));
        h.app.handle_input(key(KeyCode::Enter));

        assert_eq!(h.app.input_mode, InputMode::Normal);
        assert_eq!(h.app.playlist.len(), 1);
        assert!(h.app.is_playing);
    }

    #[test]
    fn add_prompt_rejects_unknown_file() {
        let mut h = Harness::new();
        h.app.open_add_prompt();
        for c in "nope.mp3".chars() {
            h.app.handle_input(key(KeyCode::Char(c)));
        }
        h.app.handle_input(key(KeyCode::Enter));

        assert!(h.app.playlist.is_empty());
        assert!(h.drain().is_empty());
    }

    #[test]
    fn space_is_typed_into_prompt_not_toggling_playback() {
        let mut h = Harness::with_songs(&["a.mp3"]);
        h.app.open_add_prompt();
        h.app.handle_input(key(KeyCode::Char(' ')));

        assert_eq!(h.app.input_buffer, " ");
        assert!(h.app.is_playing);
        assert!(h.drain().is_empty());
    }

    #[test]
    fn mouse_click_on_progress_bar_seeks() {
        let mut h = Harness::with_songs(&["a.mp3"]);
        h.app.on_duration_changed(h.app.generation, Duration::from_secs(100));
        h.app.layout_regions.progress_bar = Some(Rect::new(10, 20, 50, 1));

        h.app.handle_mouse(click(35, 20));

        assert_eq!(h.app.current_position, Duration::from_secs(50));
    }

    #[test]
    fn mouse_click_on_playlist_item_plays_it() {
        let mut h = Harness::with_songs(&["a.mp3", "b.mp3", "c.mp3"]);
        h.app.toggle_playlist();
        h.app.layout_regions.playlist_items = Some(Rect::new(5, 5, 40, 10));

        h.app.handle_mouse(click(10, 7));

        assert_eq!(h.app.playlist.current_index(), 1);
    }

    #[test]
    fn mouse_click_on_play_button_toggles() {
        let mut h = Harness::with_songs(&["a.mp3"]);
        h.app.layout_regions.play_button = Some(Rect::new(0, 0, 8, 1));

        h.app.handle_mouse(click(3, 0));

        assert!(!h.app.is_playing);
        assert_eq!(h.drain(), vec![PlayerCommand::Pause]);
    }

    #[test]
    fn command_line_songs_skip_invalid_paths() {
        let mut h = Harness::new();
        let good = h.touch("good.wav");
        h.app
            .add_songs_from_args(&[h.dir.join("missing.mp3"), good.clone()]);

        assert_eq!(h.app.playlist.len(), 1);
        assert_eq!(h.app.now_playing.as_ref().unwrap().path, good);
    }
}
