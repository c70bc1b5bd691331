use async_trait::async_trait;

use crate::error::RemoteError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

impl ProbeResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP GET transport used by the reachability checks.
///
/// Implementations should not apply their own retry; the caller bounds each
/// request with a timeout and treats any failure as "could not verify".
#[async_trait]
pub trait RemoteProbe: Send + Sync {
    fn name(&self) -> &str;

    async fn get(&self, url: &str) -> Result<ProbeResponse, RemoteError>;
}
