use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::encoding::ObservationBundle;
use crate::config::PredictionEndpointConfig;

/// Response body as returned by the prediction service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPredictionResponse {
    #[serde(default)]
    pub success: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<PredictionEnvelope>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionEnvelope {
    #[serde(default)]
    pub prediction: Vec<PredictionEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionEntry {
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub outcome: Option<OutcomeConcept>,
    #[serde(default)]
    pub probability_decimal: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeConcept {
    #[serde(default)]
    pub coding: Vec<OutcomeCoding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeCoding {
    #[serde(default)]
    pub code: Option<String>,
}

/// Failure talking to a remote collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("no response from server: {0}")]
    Network(String),
    #[error("server answered with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("response body could not be decoded: {0}")]
    Decode(String),
    #[error("request body could not be encoded: {0}")]
    Encode(String),
}

/// Remote prediction service.
pub trait PredictionGateway: Send + Sync {
    fn submit(
        &self,
        bundle: ObservationBundle,
    ) -> BoxFuture<'_, Result<RawPredictionResponse, TransportError>>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Blocking `ureq` agent driven from tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct UreqPredictionClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl UreqPredictionClient {
    pub fn new(config: &PredictionEndpointConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.timeout())
            .timeout_read(config.timeout())
            .timeout_write(config.timeout())
            .build();
        Self {
            agent,
            endpoint: config.endpoint.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post_bundle(&self, payload: &str) -> Result<RawPredictionResponse, TransportError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .send_string(payload);

        match response {
            Ok(response) => {
                let body = response
                    .into_string()
                    .map_err(|err| TransportError::Decode(err.to_string()))?;
                serde_json::from_str(&body).map_err(|err| TransportError::Decode(err.to_string()))
            }
            Err(ureq::Error::Status(status, response)) => {
                let message = response
                    .into_string()
                    .ok()
                    .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
                    .and_then(|body| body.message)
                    .filter(|message| !message.trim().is_empty());
                warn!(
                    status,
                    endpoint = %self.endpoint,
                    "prediction service returned an error status"
                );
                Err(TransportError::Status { status, message })
            }
            Err(ureq::Error::Transport(transport)) => {
                warn!(endpoint = %self.endpoint, error = %transport, "prediction request failed");
                Err(TransportError::Network(transport.to_string()))
            }
        }
    }
}

impl PredictionGateway for UreqPredictionClient {
    fn submit(
        &self,
        bundle: ObservationBundle,
    ) -> BoxFuture<'_, Result<RawPredictionResponse, TransportError>> {
        let client = self.clone();
        async move {
            let payload = bundle
                .to_json()
                .map_err(|err| TransportError::Encode(err.to_string()))?;
            debug!(
                bytes = payload.len(),
                endpoint = %client.endpoint,
                "posting observation bundle"
            );
            tokio::task::spawn_blocking(move || client.post_bundle(&payload))
                .await
                .map_err(|err| TransportError::Network(format!("request task failed: {err}")))?
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_tolerates_missing_fields() {
        let raw: RawPredictionResponse = serde_json::from_str(
            r#"{"success":true,"data":[{"prediction":[{"rationale":"RF"},{"probabilityDecimal":0.4}]}]}"#,
        )
        .expect("response parses");
        let data = raw.data.expect("data present");
        let entries = &data[0].prediction;
        assert_eq!(entries[0].rationale.as_deref(), Some("RF"));
        assert_eq!(entries[0].probability_decimal, None);
        assert_eq!(entries[1].rationale, None);
        assert_eq!(entries[1].probability_decimal, Some(0.4));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let client = UreqPredictionClient::new(&PredictionEndpointConfig {
            endpoint: "http://127.0.0.1:1/predict".to_string(),
            timeout_ms: 2_000,
        });
        let bundle: ObservationBundle = serde_json::from_str("[]").expect("empty bundle");

        match client.submit(bundle).await {
            Err(TransportError::Network(_)) => {}
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
