use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read file")]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("no LineString geometry found in {0}")]
    NoLineGeometry(String),
    #[error("unexpected GeoJSON structure in {0}")]
    UnexpectedStructure(String),
}
