use std::time::Duration;

use async_trait::async_trait;
use opsgate_core::api::{ProbeResponse, RemoteError, RemoteProbe};

const USER_AGENT: &str = concat!("opsgate/", env!("CARGO_PKG_VERSION"));

/// `reqwest` transport for the reachability checks.
pub struct HttpRemoteProbe {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl HttpRemoteProbe {
    pub fn new(timeout_ms: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, timeout_ms })
    }
}

#[async_trait]
impl RemoteProbe for HttpRemoteProbe {
    fn name(&self) -> &str {
        "http"
    }

    async fn get(&self, url: &str) -> Result<ProbeResponse, RemoteError> {
        let parsed = reqwest::Url::parse(url).map_err(|_| RemoteError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidUrl(url.to_string()));
        }

        let resp = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::Timeout(self.timeout_ms)
            } else {
                RemoteError::Transport(e.into())
            }
        })?;

        let status = resp.status().as_u16();
        // Bodies are only inspected for chart indexes; skip reading error pages.
        if !resp.status().is_success() {
            return Ok(ProbeResponse::new(status, String::new()));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| RemoteError::Decode(e.into()))?;
        tracing::debug!(target: "opsgate.remote", url, status, bytes = body.len(), "probe response");
        Ok(ProbeResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn returns_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let index = server
            .mock("GET", "/charts/index.yaml")
            .with_status(200)
            .with_body("entries:\n  redis:\n    - version: 18.1.0\n")
            .create_async()
            .await;
        let missing = server
            .mock("GET", "/gone/index.yaml")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let probe = HttpRemoteProbe::new(2_000).unwrap();
        let ok = probe.get(&format!("{}/charts/index.yaml", server.url())).await.unwrap();
        assert_eq!(ok.status, 200);
        assert!(ok.body.contains("18.1.0"));

        let gone = probe.get(&format!("{}/gone/index.yaml", server.url())).await.unwrap();
        assert_eq!(gone, ProbeResponse::new(404, ""));

        index.assert_async().await;
        missing.assert_async().await;
    }

    #[tokio::test]
    async fn rejects_non_http_urls() {
        let probe = HttpRemoteProbe::new(2_000).unwrap();
        assert!(matches!(probe.get("file:///etc/passwd").await, Err(RemoteError::InvalidUrl(_))));
        assert!(matches!(probe.get("not a url").await, Err(RemoteError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let probe = HttpRemoteProbe::new(2_000).unwrap();
        let err = probe.get("http://127.0.0.1:9/index.yaml").await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
    }
}
