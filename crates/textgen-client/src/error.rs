use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextGenError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unparseable response body: {0}")]
    Unparseable(String),

    #[error("invalid backend configuration: {0}")]
    Config(String),
}
