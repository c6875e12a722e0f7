//! In-process ledger for tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chain_sol::Address;
use parking_lot::RwLock;

use super::{AccountData, AccountReader};
use crate::error::Result;

/// An [`AccountReader`] over a map of accounts.
///
/// Counts read round trips so callers can assert on batching.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: RwLock<HashMap<Address, AccountData>>,
    reads: AtomicUsize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, address: Address, account: AccountData) {
        self.accounts.write().insert(address, account);
    }

    pub fn remove(&self, address: &Address) -> Option<AccountData> {
        self.accounts.write().remove(address)
    }

    pub fn get(&self, address: &Address) -> Option<AccountData> {
        self.accounts.read().get(address).cloned()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Number of `get_multiple_accounts` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AccountReader for MemoryLedger {
    async fn get_multiple_accounts(&self, addresses: &[Address]) -> Result<Vec<Option<AccountData>>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let accounts = self.accounts.read();
        Ok(addresses.iter().map(|a| accounts.get(a).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: u8) -> AccountData {
        AccountData {
            owner: Address::new([9; 32]),
            lamports: 890_880,
            data: vec![byte],
        }
    }

    #[tokio::test]
    async fn missing_accounts_read_as_none() {
        let ledger = MemoryLedger::new();
        let present = Address::new([1; 32]);
        ledger.insert(present, account(1));

        let slots = ledger
            .get_multiple_accounts(&[Address::new([2; 32]), present])
            .await
            .unwrap();

        assert_eq!(slots, vec![None, Some(account(1))]);
        assert_eq!(ledger.reads(), 1);
    }

    #[test]
    fn insert_replace_remove() {
        let ledger = MemoryLedger::new();
        let key = Address::new([1; 32]);
        assert!(ledger.is_empty());

        ledger.insert(key, account(1));
        ledger.insert(key, account(2));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(&key), Some(account(2)));

        assert_eq!(ledger.remove(&key), Some(account(2)));
        assert!(ledger.get(&key).is_none());
    }
}
