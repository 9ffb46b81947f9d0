use serde::Serialize;

use super::error::MappingError;
use super::types::NormalizedInvoice;

/// Wire envelope handed to the transport layer.
///
/// Serializes as `{"ok": true, "header": …, "items": […]}` on success and
/// `{"ok": false, "error": "…"}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingResponse {
    /// Whether mapping succeeded.
    pub ok: bool,
    /// The mapped invoice, flattened into the envelope on success.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<NormalizedInvoice>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MappingResponse {
    /// Successful envelope around `invoice`.
    pub fn success(invoice: NormalizedInvoice) -> Self {
        Self {
            ok: true,
            invoice: Some(invoice),
            error: None,
        }
    }

    /// Failed envelope carrying the error's display text.
    pub fn failure(error: &MappingError) -> Self {
        Self {
            ok: false,
            invoice: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<Result<NormalizedInvoice, MappingError>> for MappingResponse {
    fn from(result: Result<NormalizedInvoice, MappingError>) -> Self {
        match result {
            Ok(invoice) => Self::success(invoice),
            Err(e) => Self::failure(&e),
        }
    }
}
