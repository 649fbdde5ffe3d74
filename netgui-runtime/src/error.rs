use std::io;
use thiserror::Error;

/// A frame that did not make it onto the device whole. The pump keeps running after one of
/// these; retrying is up to the caller.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("short write: {written} of {expected} bytes")]
    Short { written: usize, expected: usize },
    #[error("device write failed: {0}")]
    Device(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PumpError {
    /// The device failed in a way polling again cannot fix.
    #[error("device failure: {0}")]
    Fatal(String),
}
