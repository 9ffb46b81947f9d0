use thiserror::Error;

/// Errors that can occur while turning an XML document into a normalized invoice.
///
/// Missing or unparsable fields are never errors: they degrade to `None`
/// (or a placeholder item name). Only structural failures surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MappingError {
    /// No recognizable invoice root was found in the parsed tree.
    #[error("No Invoice root found")]
    NoInvoiceRoot,

    /// The XML-to-tree step rejected the document.
    #[error("XML parse error: {0}")]
    MalformedInput(String),

    /// The document is not valid UTF-8 or contains an undecodable escape.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl MappingError {
    /// Whether the failure came from the parsing collaborator rather than the mapper.
    ///
    /// Transport layers map these to "bad request", everything else to
    /// "unprocessable entity".
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::MalformedInput(_) | Self::Encoding(_))
    }
}
