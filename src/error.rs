#[derive(Debug, thiserror::Error)]
pub enum CapshotError {
    #[error("failed to fetch {bucket}/{key}: {message}")]
    Fetch {
        bucket: String,
        key: String,
        message: String,
    },
    #[error("failed to store {bucket}/{key}: {message}")]
    Store {
        bucket: String,
        key: String,
        message: String,
    },
    #[error("probe report has no {0} field")]
    MissingField(&'static str),
    #[error("invalid display aspect ratio: {0}")]
    InvalidAspectRatio(String),
    #[error("{command} failed with {status}")]
    Process { command: String, status: String },
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::ParseIntError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}
