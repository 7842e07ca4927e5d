use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::app::{decrement, increment};

pub const LOCAL_ARTIST: &str = "Local File";

pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "wav", "ogg", "oga", "m4a", "mp4", "aac", "mka", "webm",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub path: PathBuf,
}

impl Song {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            title: title_from_path(&path),
            artist: LOCAL_ARTIST.to_string(),
            path,
        }
    }
}

/// File name with the last extension removed. Names without a dot are kept whole.
fn title_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.rsplit_once('.') {
        Some((stem, _ext)) => stem.to_string(),
        None => name,
    }
}

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddSongError {
    #[error("nothing entered")]
    Empty,

    #[error("no such file: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("not an audio file: {}", .0.display())]
    Unsupported(PathBuf),
}

/// Turns text typed into the add-song prompt into a playable path.
///
/// Surrounding quotes are stripped, a leading `~` expands to the home
/// directory and relative paths are taken from `base` when one is given.
pub fn resolve_song_path(input: &str, base: Option<&Path>) -> Result<PathBuf, AddSongError> {
    let trimmed = input.trim().trim_matches(|c: char| c == '"' || c == '\'');
    if trimmed.is_empty() {
        return Err(AddSongError::Empty);
    }

    let expanded = match trimmed.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(trimmed),
        },
        _ => PathBuf::from(trimmed),
    };

    let path = match base {
        Some(base) if expanded.is_relative() => base.join(expanded),
        _ => expanded,
    };

    if !path.exists() {
        return Err(AddSongError::NotFound(path));
    }
    if !path.is_file() {
        return Err(AddSongError::NotAFile(path));
    }
    if !is_audio_file(&path) {
        return Err(AddSongError::Unsupported(path));
    }
    Ok(path)
}

#[derive(Debug, Default)]
pub struct Playlist {
    songs: Vec<Song>,
    current: usize,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a song. Returns true when it is the only song in the list.
    pub fn add(&mut self, song: Song) -> bool {
        self.songs.push(song);
        if self.songs.len() == 1 {
            self.current = 0;
            true
        } else {
            false
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.current)
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.songs.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) {
        if self.songs.is_empty() {
            return;
        }
        self.current = increment(self.current, self.songs.len(), true);
    }

    pub fn prev(&mut self) {
        if self.songs.is_empty() {
            return;
        }
        self.current = decrement(self.current, self.songs.len(), true);
    }
}
