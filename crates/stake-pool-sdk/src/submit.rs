//! Hand-off to whatever signs and sends transactions.
//!
//! Workflows only compose. A [`TransactionSender`] owns the wallet and the
//! RPC connection; [`send_each`] pushes a batch through it without letting
//! one failure stop the rest.

use async_trait::async_trait;
use log::{info, warn};

use crate::error::Result;
use crate::workflow::UnsignedTransaction;

#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// Sign, submit and confirm one transaction, returning its signature.
    async fn send(&self, tx: &UnsignedTransaction) -> Result<String>;
}

/// Send every transaction in order. Each slot holds that transaction's
/// signature or its error.
pub async fn send_each<S: TransactionSender + ?Sized>(
    sender: &S,
    transactions: &[UnsignedTransaction],
) -> Vec<Result<String>> {
    let mut results = Vec::with_capacity(transactions.len());
    for (index, tx) in transactions.iter().enumerate() {
        let result = sender.send(tx).await;
        if let Err(e) = &result {
            warn!("send_each: transaction {index} failed: {e}");
        }
        results.push(result);
    }
    let sent = results.iter().filter(|r| r.is_ok()).count();
    info!("send_each: {sent} of {} transactions confirmed", results.len());
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StakeSdkError;
    use parking_lot::Mutex;

    struct FailsOn {
        bad: usize,
        seen: Mutex<usize>,
    }

    #[async_trait]
    impl TransactionSender for FailsOn {
        async fn send(&self, _tx: &UnsignedTransaction) -> Result<String> {
            let mut seen = self.seen.lock();
            let index = *seen;
            *seen += 1;
            if index == self.bad {
                Err(StakeSdkError::Rpc("blockhash expired".into()))
            } else {
                Ok(format!("sig{index}"))
            }
        }
    }

    #[tokio::test]
    async fn failure_does_not_stop_the_batch() {
        let sender = FailsOn { bad: 1, seen: Mutex::new(0) };
        let txs = vec![UnsignedTransaction::new(); 3];
        let results = send_each(&sender, &txs).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), "sig0");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap(), "sig2");
    }
}
