//! Remote error-ingestion sinks

use crate::error::SinkError;
use crate::report::ErrorReport;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Destination for forwarded reports
///
/// Delivery is best-effort; callers log and drop any error.
#[async_trait]
pub trait ErrorSink: Send + Sync {
    /// Deliver one report
    async fn send(&self, report: &ErrorReport) -> Result<(), SinkError>;
}

/// HTTP sink: `POST` of the JSON-encoded report
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSink {
    /// Sink posting to `endpoint`
    ///
    /// # Errors
    /// - `SinkError::InvalidEndpoint` if `endpoint` does not parse
    /// - `SinkError::Transport` if the HTTP client cannot be built
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SinkError> {
        let endpoint = Url::parse(endpoint).map_err(|e| SinkError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    /// Target URL
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ErrorSink for HttpSink {
    async fn send(&self, report: &ErrorReport) -> Result<(), SinkError> {
        let body = serde_json::to_vec(report)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SinkError::Status(status.as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_endpoint() {
        let err = HttpSink::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SinkError::InvalidEndpoint { .. }));
    }

    #[test]
    fn accepts_http_endpoint() {
        let sink = HttpSink::new(
            "http://localhost:8000/api/errors/dealwizard",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(sink.endpoint().path(), "/api/errors/dealwizard");
    }
}
