use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no bar data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("insufficient history for {symbol}: no completed prior day in {sampled} bars")]
    InsufficientHistory { symbol: String, sampled: usize },
}

impl RangeError {
    pub(crate) fn unavailable(symbol: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    /// Fold a feed failure into `DataUnavailable`, keeping the whole error chain.
    pub(crate) fn from_feed(symbol: &str, err: anyhow::Error) -> Self {
        Self::unavailable(symbol, format!("{:#}", err))
    }
}

/// Reject empty or blank instrument identifiers before any feed lookup.
pub fn validate_symbol(symbol: &str) -> Result<&str, RangeError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(RangeError::InvalidArgument(
            "symbol must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}
