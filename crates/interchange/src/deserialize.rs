//! Decoding of estimation service response bodies into typed structs.
//!
//! Both entry points take the raw body text so that transport code never
//! has to know about the schema. Shape errors and domain errors (a
//! negative price, a repeated id) are reported through the same
//! [`InterchangeError`] so callers have a single failure boundary.

use std::collections::HashSet;

use crate::types::{PredictionReceipt, PredictionRecord, RecordId};

/// Errors while decoding a response body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterchangeError {
    /// The body is not JSON, or its shape does not match the schema.
    #[error("malformed JSON body: {0}")]
    Json(String),

    /// A field decoded but holds a value the service must never produce.
    #[error("invalid '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// Two history entries share the same server id.
    #[error("duplicate record id {id} in history")]
    DuplicateId { id: RecordId },
}

/// Decode the body of a successful `POST /predict`.
pub fn decode_receipt(body: &str) -> Result<PredictionReceipt, InterchangeError> {
    let receipt: PredictionReceipt =
        serde_json::from_str(body).map_err(|e| InterchangeError::Json(e.to_string()))?;
    check_price(receipt.predicted_price)?;
    Ok(receipt)
}

/// Decode the body of a successful `GET /history`.
///
/// The order of the returned records is exactly the order in the body.
pub fn decode_history(body: &str) -> Result<Vec<PredictionRecord>, InterchangeError> {
    let records: Vec<PredictionRecord> =
        serde_json::from_str(body).map_err(|e| InterchangeError::Json(e.to_string()))?;

    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        check_price(record.predicted_price)?;
        if !seen.insert(&record.id) {
            return Err(InterchangeError::DuplicateId {
                id: record.id.clone(),
            });
        }
    }

    Ok(records)
}

fn check_price(price: f64) -> Result<(), InterchangeError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(InterchangeError::InvalidField {
            field: "predictedPrice".to_string(),
            message: format!("expected a non-negative number, got {}", price),
        })
    }
}
