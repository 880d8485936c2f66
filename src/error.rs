use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage file is not valid json: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("request to submission target failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("submission target answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("relay worker is not running")]
    WorkerGone,
}
