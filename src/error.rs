use thiserror::Error;

/// Result alias used across the crate.
pub type CryptoConditionResult<T> = Result<T, CryptoConditionError>;

/// Error variants surfaced by the crypto-conditions implementation.
///
/// The variant names are stable: `MalformedEncoding`, `NonCanonical`,
/// `UnknownType` and `InvalidArgument` report structurally bad input,
/// while the remaining variants report a well-formed proof that does
/// not hold.
#[derive(Debug, Error)]
pub enum CryptoConditionError {
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),
    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),
    #[error("unknown condition type: {0}")]
    UnknownType(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("fulfillment does not match condition (expected fingerprint {expected}, derived {derived})")]
    FulfillmentDoesNotMatchCondition { expected: String, derived: String },
    #[error("signature invalid")]
    SignatureInvalid,
    #[error("message length {length} exceeds maximum {max}")]
    MessageTooLong { length: usize, max: u32 },
    #[error("threshold {threshold} not met by {available} subfulfillments")]
    ThresholdNotMet { threshold: u16, available: usize },
    #[error("subfulfillments[{index}]: {source}")]
    AtSubFulfillment {
        index: usize,
        #[source]
        source: Box<CryptoConditionError>,
    },
}

impl CryptoConditionError {
    /// Wrap a validation error with the index of the subfulfillment it
    /// originated from, preserving the full path through the tree.
    pub(crate) fn at_subfulfillment(self, index: usize) -> Self {
        CryptoConditionError::AtSubFulfillment {
            index,
            source: Box::new(self),
        }
    }
}
