use thiserror::Error;

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("invalid start offset {value:?}: {source}")]
    InvalidStart {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("failed to load config: {0}")]
    Config(#[from] twelf::Error),

    #[error("bulk_size must be at least 1, got {0}")]
    InvalidBulkSize(u64),

    #[error("unsupported config file {0:?}, expected .toml or .json")]
    ConfigFormat(std::path::PathBuf),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid server version: {0}")]
    Version(#[from] semver::Error),

    #[error("failed to load certificates from {path:?}: {source}")]
    Certificates {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
