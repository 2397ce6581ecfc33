use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BloomError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("bit index {index} out of range for {capacity}-bit array")]
    OutOfRange { index: u64, capacity: u64 },
}

pub type Result<T> = std::result::Result<T, BloomError>;
