use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardVisualKey};
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::player::error::PlayerError;

pub enum CoverMessage {
    Loaded { path: PathBuf, data: Vec<u8> },
    Missing { path: PathBuf },
    Error { path: PathBuf, error: String },
}

/// Reads embedded cover art off the UI thread.
pub struct CoverLoader {
    rx: Receiver<CoverMessage>,
    tx: Sender<CoverMessage>,
}

impl CoverLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { rx, tx }
    }

    pub fn fetch(&self, path: PathBuf) {
        let tx = self.tx.clone();

        thread::spawn(move || {
            let msg = match read_embedded_cover(&path) {
                Ok(Some(data)) => CoverMessage::Loaded { path, data },
                Ok(None) => CoverMessage::Missing { path },
                Err(e) => CoverMessage::Error {
                    path,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(msg);
        });
    }

    /// Non-blocking check for finished lookups
    pub fn try_recv(&self) -> Result<CoverMessage, TryRecvError> {
        self.rx.try_recv()
    }
}

impl Default for CoverLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn pick_visual(revision: Option<&MetadataRevision>) -> Option<Vec<u8>> {
    let visuals = revision?.visuals();
    visuals
        .iter()
        .find(|v| v.usage == Some(StandardVisualKey::FrontCover))
        .or_else(|| visuals.first())
        .map(|v| v.data.to_vec())
}

/// Returns the front cover (or first picture) embedded in the file's tags, if any.
pub fn read_embedded_cover(path: &Path) -> Result<Option<Vec<u8>>, PlayerError> {
    let file = File::open(path).map_err(|source| PlayerError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let mut probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    // ID3 tags live in front of the container, everything else inside it
    if let Some(metadata) = probed.metadata.get() {
        if let Some(data) = pick_visual(metadata.current()) {
            return Ok(Some(data));
        }
    }

    let metadata = probed.format.metadata();
    Ok(pick_visual(metadata.current()))
}

pub enum CoverState {
    Empty,
    Loading(PathBuf),
    Ready {
        path: PathBuf,
        protocol: StatefulProtocol,
    },
    Missing(PathBuf),
}

/// Holds the decoded cover for the current song
pub struct ImageCache {
    picker: Picker,
    pub state: CoverState,
}

impl ImageCache {
    /// Must run after the terminal enters raw mode and before the input thread starts reading.
    pub fn new() -> Self {
        let picker = Picker::from_query_stdio().unwrap_or_else(|e| {
            debug!("terminal graphics query failed, using font-size fallback: {:?}", e);
            Picker::from_fontsize((8, 16))
        });

        Self {
            picker,
            state: CoverState::Empty,
        }
    }

    pub fn begin(&mut self, path: PathBuf) {
        self.state = CoverState::Loading(path);
    }

    pub fn load_cover(
        &mut self,
        path: PathBuf,
        image_data: &[u8],
    ) -> Result<(), image::ImageError> {
        let img = image::load_from_memory(image_data)?;
        let protocol = self.picker.new_resize_protocol(img);
        self.state = CoverState::Ready { path, protocol };
        Ok(())
    }

    pub fn mark_missing(&mut self, path: PathBuf) {
        self.state = CoverState::Missing(path);
    }

    /// Whether a result for `path` is still wanted.
    pub fn is_waiting_for(&self, path: &Path) -> bool {
        matches!(&self.state, CoverState::Loading(p) if p == path)
    }

    pub fn clear(&mut self) {
        self.state = CoverState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_an_open_error() {
        let err = read_embedded_cover(Path::new("/definitely/not/here.mp3")).unwrap_err();
        assert!(matches!(err, PlayerError::Open { .. }));
    }

    #[test]
    fn non_audio_bytes_are_a_format_error() {
        let mut file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        file.write_all(b"this is not audio at all").unwrap();

        let err = read_embedded_cover(file.path()).unwrap_err();
        assert!(matches!(err, PlayerError::Format(_)));
    }

    #[test]
    fn no_revision_means_no_visual() {
        assert!(pick_visual(None).is_none());
    }
}
