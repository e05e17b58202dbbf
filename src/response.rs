use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a synchronous send, as acknowledged by the delivery queue.
///
/// Built once from the wire response and never mutated. The wire field
/// `deliveries` (queue identifiers) maps to [`data`](Self::data).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(from = "WireResponse")]
pub struct SendResponse {
    /// Whether the service accepted the send.
    pub success: bool,

    /// Opaque delivery data, e.g. queue identifiers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,

    /// Machine-oriented error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SendResponse {
    /// Whether the service accepted the send.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Whether the response carries an error description.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Serializes the response, dropping unset fields.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Response shape as the API sends it.
#[derive(Deserialize)]
struct WireResponse {
    success: bool,
    #[serde(default)]
    deliveries: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<WireResponse> for SendResponse {
    fn from(wire: WireResponse) -> Self {
        Self {
            success: wire.success,
            data: wire.deliveries,
            error: wire.error,
            message: wire.message,
        }
    }
}
