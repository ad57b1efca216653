use std::path::PathBuf;

use url::Url;

use crate::gtfs::raw_gtfs::GtfsDataSet;

use super::error::Error;

/// Where the feed archive comes from: an http(s) URL or a local path.
pub enum FeedSource {
    Url(Url),
    Path(PathBuf),
}

impl FeedSource {
    /// Parse and validate a feed URL. Only http(s) schemes are accepted.
    pub fn from_url(raw: &str) -> Result<FeedSource, Error> {
        let url = Url::parse(raw)?;
        match url.scheme() {
            "http" | "https" => Ok(FeedSource::Url(url)),
            _ => Err(Error::InvalidUrlScheme(raw.to_string())),
        }
    }

    /// Acquire and parse the feed. Any download or archive failure here is
    /// fatal for the whole run; there is no retry.
    pub fn load(&self) -> Result<GtfsDataSet, Error> {
        match self {
            FeedSource::Url(url) => {
                log::debug!("Downloading feed from {}", url);
                let response = reqwest::blocking::get(url.clone())?.error_for_status()?;
                let bytes = response.bytes()?;
                log::debug!("Downloaded {} bytes", bytes.len());
                Ok(GtfsDataSet::from_zip_bytes(&bytes)?)
            }
            FeedSource::Path(path) => Ok(GtfsDataSet::from_path(path)?),
        }
    }
}
