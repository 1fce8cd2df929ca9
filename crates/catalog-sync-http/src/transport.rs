use catalog_sync::{BatchRequest, BatchResponse, BatchTransport, TransportError};

use crate::wire::{RequestEnvelope, ResponseEnvelope};

/// Configuration for the HTTP batch endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub endpoint: String,
    pub auth_token: Option<String>,
}

impl HttpTransportConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: None,
        }
    }
}

/// Posts batch requests as JSON to a single endpoint.
pub struct HttpTransport {
    config: HttpTransportConfig,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent("catalog-sync")
            .build()
            .map_err(|e| TransportError::new(format!("could not build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait::async_trait]
impl BatchTransport for HttpTransport {
    async fn submit(&self, request: &BatchRequest) -> Result<BatchResponse, TransportError> {
        let envelope = RequestEnvelope::new(request, self.config.auth_token.as_deref());
        tracing::debug!(
            endpoint = %self.config.endpoint,
            action = %request.action,
            offset = ?request.offset,
            "posting batch request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown").to_owned()
            } else {
                body.trim().to_owned()
            };
            return Err(TransportError::with_status(status.as_u16(), message));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        let envelope: ResponseEnvelope = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(error = %e, "response body is not a valid envelope");
            TransportError::new(format!("invalid response: {e}"))
        })?;

        Ok(envelope.into())
    }
}
