use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request timeout after {0} ms")]
    Timeout(u64),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("transport error")]
    Transport(#[source] anyhow::Error),

    #[error("response decode error")]
    Decode(#[source] anyhow::Error),
}
