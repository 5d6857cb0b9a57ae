//! HTTP client for the estimation service.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime. Every failure below the HTTP layer
//! (connect, timeout, body read) and every non-2xx status is folded into
//! the operation's single [`ClientError`] variant.

use async_trait::async_trait;
use homeval_interchange::{decode_history, decode_receipt, PredictionRecord, PredictionRequest};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, FailureReason};
use crate::order;
use crate::PredictionClient;

const PREDICT_PATH: &str = "predict";
const HISTORY_PATH: &str = "history";

/// Production [`PredictionClient`] talking JSON over HTTP.
///
/// - `POST {base_url}/predict` with `{squareFootage, bedrooms}`
/// - `GET {base_url}/history`
pub struct HttpPredictionClient {
    config: ClientConfig,
    agent: ureq::Agent,
}

impl HttpPredictionClient {
    pub fn new(config: ClientConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        HttpPredictionClient { config, agent }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Map a ureq error to a failure reason, keeping status codes structured.
fn classify(err: ureq::Error) -> FailureReason {
    match err {
        ureq::Error::StatusCode(status) => FailureReason::Status { status },
        other => FailureReason::Transport {
            message: other.to_string(),
        },
    }
}

fn read_body(response: ureq::http::Response<ureq::Body>) -> Result<String, FailureReason> {
    response
        .into_body()
        .read_to_string()
        .map_err(|e| FailureReason::Transport {
            message: format!("failed to read response body: {}", e),
        })
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn submit_prediction(
        &self,
        square_footage: f64,
        bedrooms: u32,
    ) -> Result<PredictionRecord, ClientError> {
        let request = PredictionRequest {
            square_footage,
            bedrooms,
        };
        let url = self.config.endpoint(PREDICT_PATH);
        let agent = self.agent.clone();

        debug!(%url, square_footage, bedrooms, "submitting prediction");

        let result = tokio::task::spawn_blocking(move || {
            let response = agent.post(&url).send_json(&request).map_err(classify)?;
            let body = read_body(response)?;
            let receipt = decode_receipt(&body).map_err(|e| FailureReason::Decode {
                message: e.to_string(),
            })?;
            Ok::<_, FailureReason>(receipt.into_record(&request))
        })
        .await
        .map_err(|e| FailureReason::Join {
            message: e.to_string(),
        })
        .and_then(|inner| inner);

        result.map_err(|reason| {
            warn!(%reason, "prediction request failed");
            ClientError::PredictionFailed { reason }
        })
    }

    async fn fetch_history(&self) -> Result<Vec<PredictionRecord>, ClientError> {
        let url = self.config.endpoint(HISTORY_PATH);
        let agent = self.agent.clone();
        let history_order = self.config.history_order;

        debug!(%url, "fetching prediction history");

        let result = tokio::task::spawn_blocking(move || {
            let response = agent.get(&url).call().map_err(classify)?;
            let body = read_body(response)?;
            let mut records = decode_history(&body).map_err(|e| FailureReason::Decode {
                message: e.to_string(),
            })?;
            order::apply(history_order, &mut records);
            Ok::<_, FailureReason>(records)
        })
        .await
        .map_err(|e| FailureReason::Join {
            message: e.to_string(),
        })
        .and_then(|inner| inner);

        result.map_err(|reason| {
            warn!(%reason, "history request failed");
            ClientError::HistoryFetchFailed { reason }
        })
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
