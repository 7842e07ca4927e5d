use crate::player::commands::PlayerState;
use crossterm::event::{KeyEvent, MouseEvent};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum AppEvent {
    // From input thread
    Input(KeyEvent),
    Mouse(MouseEvent),
    Resize,

    // From player thread. `generation` echoes the `Play` command the source was opened with.
    PlayerStateChanged(PlayerState),
    PositionUpdate {
        generation: u64,
        position: Duration,
    },
    DurationChanged {
        generation: u64,
        duration: Duration,
    },
    TrackEnded {
        generation: u64,
    },
    /// `fatal` means the player dropped the source.
    PlayerError {
        generation: u64,
        message: String,
        fatal: bool,
    },
}
