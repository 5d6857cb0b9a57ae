use homeval_client::ClientError;
use homeval_core::{FieldErrors, PropertyInput};
use serde::Serialize;

/// Transient input and submission state for one form instance.
///
/// Created fresh per session and never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    #[serde(flatten)]
    pub input: PropertyInput,
    /// Messages from the most recent validation pass. Empty means valid
    /// (or not yet validated).
    pub errors: FieldErrors,
    /// True strictly between submit intent and the request's resolution.
    pub is_submitting: bool,
    /// Most recently confirmed estimate for the current inputs.
    pub last_price: Option<f64>,
    /// Failure of the most recent submission, shown until the next one.
    pub last_error: Option<ClientError>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homeval_client::FailureReason;

    #[test]
    fn fresh_state_is_unset_and_idle() {
        let state = FormState::new();
        assert_eq!(state.input, PropertyInput::new(0.0, 0));
        assert!(state.errors.is_empty());
        assert!(!state.is_submitting);
        assert_eq!(state.last_price, None);
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn serializes_flat_with_camel_case_keys() {
        let state = FormState {
            input: PropertyInput::new(1500.0, 3),
            last_price: Some(350000.0),
            last_error: Some(ClientError::PredictionFailed {
                reason: FailureReason::Status { status: 500 },
            }),
            ..FormState::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["squareFootage"], 1500.0);
        assert_eq!(json["bedrooms"], 3);
        assert_eq!(json["isSubmitting"], false);
        assert_eq!(json["lastPrice"], 350000.0);
        assert_eq!(json["errors"], serde_json::json!({}));
        assert_eq!(json["lastError"]["kind"], "predictionFailed");
    }
}
