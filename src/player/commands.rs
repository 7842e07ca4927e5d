use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Play {
        path: PathBuf,
        position: Duration,
        generation: u64,
    },
    Pause,
    Resume,
    Stop,
    Seek(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Stopped,
    Loading,
    Playing,
    Paused,
}
