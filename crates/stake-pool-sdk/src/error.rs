use chain_sol::{Address, SolError};
use thiserror::Error;

/// Errors surfaced while composing stake pool transactions.
#[derive(Debug, Error)]
pub enum StakeSdkError {
    /// Seeds could not produce a program-derived address. Always a caller bug.
    #[error("address derivation failed: {0}")]
    Derivation(SolError),

    /// Account bytes did not match the expected schema or discriminator.
    #[error("failed to decode {account} at {address}: {reason}")]
    Decode {
        account: &'static str,
        address: Address,
        reason: String,
    },

    /// On-chain state does not allow the requested operation.
    #[error("{0}")]
    Precondition(String),

    /// The injected account reader or transaction sender failed.
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("transaction error: {0}")]
    Transaction(SolError),

    #[error("invalid config: {0}")]
    Config(String),
}

impl StakeSdkError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        StakeSdkError::Precondition(message.into())
    }

    pub(crate) fn decode(account: &'static str, address: Address, reason: impl ToString) -> Self {
        StakeSdkError::Decode {
            account,
            address,
            reason: reason.to_string(),
        }
    }
}

impl From<SolError> for StakeSdkError {
    fn from(e: SolError) -> Self {
        match e {
            SolError::InvalidSeeds(_) | SolError::InvalidAddress(_) => {
                StakeSdkError::Derivation(e)
            }
            other => StakeSdkError::Transaction(other),
        }
    }
}

pub type Result<T, E = StakeSdkError> = std::result::Result<T, E>;
