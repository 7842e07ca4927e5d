use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported or corrupt audio: {0}")]
    Format(#[from] symphonia::core::errors::Error),

    #[error("no playable audio track found")]
    NoTrack,

    #[error("no output device available")]
    NoOutputDevice,

    #[error("audio output error: {0}")]
    Output(String),
}

impl From<cpal::BuildStreamError> for PlayerError {
    fn from(e: cpal::BuildStreamError) -> Self {
        PlayerError::Output(e.to_string())
    }
}

impl From<cpal::PlayStreamError> for PlayerError {
    fn from(e: cpal::PlayStreamError) -> Self {
        PlayerError::Output(e.to_string())
    }
}
