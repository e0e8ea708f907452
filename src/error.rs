use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors from reading records and writing tables.
///
/// Normalization itself never fails; only the I/O around it can.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("error in JSON serde: {0}")]
    Json(#[from] serde_json::Error),
    #[error("error in SIMD JSON parse: {0}")]
    SimdJson(#[from] simd_json::Error),
    #[error("invalid JSON on line {line}: {source}")]
    InvalidLine {
        line: usize,
        source: serde_json::Error,
    },
}
