use thiserror::Error;

/// Failure of a single prediction round trip.
///
/// The pages treat both variants as "request failed"; the split only matters
/// for the console log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictError {
    /// Network error or non-success HTTP status.
    #[error("request failed: {0}")]
    Request(String),
    /// Body arrived but does not match the prediction schema.
    #[error("invalid prediction response: {0}")]
    Decode(String),
}

impl PredictError {
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
