//! Error taxonomy for the extraction pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// A sample arrived while no frame was open. Recoverable: the sample is
    /// dropped and the stream continues.
    #[error("no open frame to ingest into")]
    NoOpenFrame,

    #[error("failed to encode batch as binary: {0}")]
    BinaryEncode(#[from] bincode::Error),

    #[error("failed to encode batch as json: {0}")]
    JsonEncode(#[from] serde_json::Error),

    #[error("batch file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Whether the stream may keep going after this error.
    ///
    /// Everything except a serialization/write failure at finalize is
    /// recoverable; the caller decides what finalize failures mean.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExtractError::NoOpenFrame)
    }
}
