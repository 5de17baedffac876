use thiserror::Error;

/// Failures while retrieving or reading the status feed.
/// None of these reach the caller, the dispatcher turns them into an apology.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("status feed request failed: {0}")]
    Retrieval(#[from] reqwest::Error),

    #[error("status feed answered with HTTP {0}")]
    UpstreamStatus(reqwest::StatusCode),

    #[error("status feed could not be parsed: {0}")]
    Parse(#[from] quick_xml::DeError),

    #[error("status feed contains no subway lines")]
    Empty,
}

impl FeedError {
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::Retrieval(_) | Self::UpstreamStatus(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid bind address {address:?}: {source}")]
    BindAddress {
        address: String,
        source: std::net::AddrParseError,
    },
}
