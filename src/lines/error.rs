use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Error(String),
    #[error("feed URL must be http(s): {0}")]
    InvalidUrlScheme(String),
    #[error("invalid feed URL")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to download feed")]
    Download(#[from] reqwest::Error),
    #[error("Cannot read file")]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    GtfsError(#[from] crate::gtfs::error::Error),
}
