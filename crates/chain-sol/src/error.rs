use thiserror::Error;

/// Failures while deriving addresses or assembling messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// More than 16 seeds, a seed over 32 bytes, or no off-curve bump.
    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_detail() {
        let cases = [
            (SolError::InvalidAddress("bad base58".into()), "invalid address: bad base58"),
            (SolError::InvalidSeeds("seed 2 is 33 bytes".into()), "invalid seeds: seed 2 is 33 bytes"),
            (
                SolError::TransactionBuildError("more than 256 accounts".into()),
                "transaction build error: more than 256 accounts",
            ),
        ];
        for (err, text) in cases {
            assert_eq!(err.to_string(), text);
        }
    }

    #[test]
    fn boxes_as_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(SolError::SerializationError("too long".into()));
        assert!(err.to_string().starts_with("serialization error"));
    }
}
