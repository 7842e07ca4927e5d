use std::time::{Duration, Instant};

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Spinner shown in place of the play icon while the player opens a file.
#[derive(Debug)]
pub struct LoadingAnimation {
    current_frame: usize,
    last_update: Instant,
}

impl LoadingAnimation {
    pub fn new() -> Self {
        Self {
            current_frame: 0,
            last_update: Instant::now(),
        }
    }

    pub fn tick(&mut self) {
        if self.last_update.elapsed() >= FRAME_DURATION {
            self.advance();
            self.last_update = Instant::now();
        }
    }

    fn advance(&mut self) {
        self.current_frame = (self.current_frame + 1) % FRAMES.len();
    }

    pub fn current_frame(&self) -> &'static str {
        FRAMES[self.current_frame]
    }
}

impl Default for LoadingAnimation {
    fn default() -> Self {
        Self::new()
    }
}
