//! Typed structs representing the estimation service JSON schema.
//!
//! Field names follow the service's camelCase convention on the wire and
//! snake_case in Rust.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque record identifier assigned by the estimation service.
///
/// The service currently issues integer row ids, but nothing on the client
/// depends on that: ids are only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

/// One persisted prediction together with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: RecordId,
    pub square_footage: f64,
    pub bedrooms: u32,
    pub predicted_price: f64,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub square_footage: f64,
    pub bedrooms: u32,
}

/// Server-assigned fields of a successful `POST /predict` response.
///
/// The service may echo the inputs back as well; those fields are ignored
/// because the client's own copy of the request is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReceipt {
    pub id: RecordId,
    pub predicted_price: f64,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
}

impl PredictionReceipt {
    /// Combine the server-assigned fields with the request that produced them.
    pub fn into_record(self, request: &PredictionRequest) -> PredictionRecord {
        PredictionRecord {
            id: self.id,
            square_footage: request.square_footage,
            bedrooms: request.bedrooms,
            predicted_price: self.predicted_price,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_camel_case_on_the_wire() {
        let record = PredictionRecord {
            id: RecordId::Int(7),
            square_footage: 1500.0,
            bedrooms: 3,
            predicted_price: 350000.0,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["squareFootage"], 1500.0);
        assert_eq!(json["bedrooms"], 3);
        assert_eq!(json["predictedPrice"], 350000.0);
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn record_id_accepts_integers_and_strings() {
        let int: RecordId = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(int, RecordId::Int(42));
        let text: RecordId = serde_json::from_value(serde_json::json!("a1b2")).unwrap();
        assert_eq!(text, RecordId::Text("a1b2".to_string()));
        assert_eq!(int.to_string(), "42");
        assert_eq!(text.to_string(), "a1b2");
    }

    #[test]
    fn receipt_takes_inputs_from_the_request() {
        let receipt = PredictionReceipt {
            id: RecordId::Int(1),
            predicted_price: 350000.0,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let request = PredictionRequest {
            square_footage: 1500.0,
            bedrooms: 3,
        };
        let record = receipt.into_record(&request);
        assert_eq!(record.square_footage, 1500.0);
        assert_eq!(record.bedrooms, 3);
        assert_eq!(record.predicted_price, 350000.0);
    }

    #[test]
    fn request_serializes_both_inputs() {
        let request = PredictionRequest {
            square_footage: 2000.0,
            bedrooms: 4,
        };
        let json = serde_json::to_value(request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"squareFootage": 2000.0, "bedrooms": 4})
        );
    }
}
