use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{url} responded with status {status}")]
    Status { status: u16, url: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("failed to extract article content")]
    NoContent,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to extract article: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to extract article: {0}")]
    Extract(#[from] ExtractError),
    #[error("failed to extract article: extraction task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to build docx: {0}")]
    Docx(#[from] zip::result::ZipError),
    #[error("failed to create pdf: {0}")]
    Browser(String),
}

impl From<chromiumoxide::error::CdpError> for RenderError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        RenderError::Browser(err.to_string())
    }
}
