//! Chat submission DTOs.

use utoipa::IntoParams;

/// Query string of `GET /chat`.
#[derive(Debug, Clone, Default, PartialEq, Eq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChatQuery {
    /// Message text to broadcast. Missing means the empty string; when the
    /// key is repeated, the last value is used.
    pub message: String,
}

impl ChatQuery {
    /// Builds the query from decoded `key=value` pairs.
    ///
    /// Unknown keys are ignored. Never fails: any text is a valid message.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let message = pairs
            .into_iter()
            .rev()
            .find(|(key, _)| key == "message")
            .map(|(_, value)| value)
            .unwrap_or_default();
        Self { message }
    }
}
