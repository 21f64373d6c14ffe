use thiserror::Error;

#[derive(Error, Debug)]
pub enum LapseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Correspondence sets differ in length: {base} base vs {target} target points")]
    MismatchedCorrespondences { base: usize, target: usize },

    #[error("Frame {0} not found in sequence")]
    UnknownFrame(usize),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Alignment cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LapseError>;
