use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to parse WAV data: {0}")]
    WavParse(#[from] hound::Error),

    #[error("audio contains no samples")]
    Empty,

    #[error("unsupported channel count: {channels}")]
    UnsupportedChannels { channels: u16 },
}
