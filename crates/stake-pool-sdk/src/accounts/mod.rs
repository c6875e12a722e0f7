//! Account reading and decoding.
//!
//! The ledger itself is external: callers plug in an [`AccountReader`] backed
//! by their RPC client. Everything here works on raw `(owner, data)` pairs
//! and turns them into typed records, or `None` when the account does not
//! exist. Absence is data; only bytes that fail to decode are errors.

pub mod memory;
pub mod metadata;
pub mod state;
pub mod token;

use async_trait::async_trait;
use borsh::BorshDeserialize;
use chain_sol::Address;
use futures::future::join_all;
use sha2::{Digest, Sha256};

use crate::error::{Result, StakeSdkError};

pub use memory::MemoryLedger;
pub use metadata::{Metadata, ProgrammableConfig, TokenStandard};
pub use state::*;
pub use token::{Mint, TokenManager, TokenManagerKind, TokenManagerState};

/// Raw account as returned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    pub owner: Address,
    pub lamports: u64,
    pub data: Vec<u8>,
}

/// Read access to the ledger.
///
/// Implementations return one slot per requested address, in request order,
/// with `None` for accounts that do not exist.
#[async_trait]
pub trait AccountReader: Send + Sync {
    async fn get_multiple_accounts(&self, addresses: &[Address]) -> Result<Vec<Option<AccountData>>>;
}

/// Read any number of accounts, `chunk_size` per round trip.
///
/// Chunks are requested concurrently and the results stitched back together
/// in input order.
pub async fn fetch_batched<R: AccountReader + ?Sized>(
    reader: &R,
    addresses: &[Address],
    chunk_size: usize,
) -> Result<Vec<Option<AccountData>>> {
    if addresses.is_empty() {
        return Ok(Vec::new());
    }

    let chunks = addresses.chunks(chunk_size.max(1));
    let responses = join_all(chunks.map(|chunk| reader.get_multiple_accounts(chunk))).await;

    let mut accounts = Vec::with_capacity(addresses.len());
    for (chunk, response) in addresses.chunks(chunk_size.max(1)).zip(responses) {
        let response = response?;
        if response.len() != chunk.len() {
            return Err(StakeSdkError::Rpc(format!(
                "requested {} accounts, reader returned {}",
                chunk.len(),
                response.len()
            )));
        }
        accounts.extend(response);
    }
    Ok(accounts)
}

/// The 8-byte Anchor account discriminator: `sha256("account:<Name>")[..8]`.
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let hash = Sha256::digest(format!("account:{name}").as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash[..8]);
    discriminator
}

/// An account owned by one of the staking programs, stored as an Anchor
/// discriminator followed by the Borsh-encoded record.
pub trait ProgramAccount: BorshDeserialize + Sized {
    /// Anchor type name, which seeds the discriminator.
    const NAME: &'static str;

    fn decode(address: &Address, data: &[u8]) -> Result<Self> {
        let expected = account_discriminator(Self::NAME);
        if data.len() < 8 || data[..8] != expected {
            return Err(StakeSdkError::decode(
                Self::NAME,
                *address,
                "account discriminator mismatch",
            ));
        }
        let mut body = &data[8..];
        Self::deserialize(&mut body).map_err(|e| StakeSdkError::decode(Self::NAME, *address, e))
    }
}

/// Decode a slot from a batched read, keeping absence as `None`.
pub fn decode_optional<T: ProgramAccount>(
    address: &Address,
    account: Option<&AccountData>,
) -> Result<Option<T>> {
    account.map(|a| T::decode(address, &a.data)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingReader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AccountReader for CountingReader {
        async fn get_multiple_accounts(
            &self,
            addresses: &[Address],
        ) -> Result<Vec<Option<AccountData>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(addresses
                .iter()
                .map(|a| {
                    // Even first bytes exist, odd ones do not.
                    (a.as_bytes()[0] % 2 == 0).then(|| AccountData {
                        owner: Address::ZERO,
                        lamports: 1,
                        data: vec![a.as_bytes()[0]],
                    })
                })
                .collect())
        }
    }

    #[test]
    fn discriminator_is_sha256_prefix() {
        let expected = Sha256::digest(b"account:StakeEntry");
        assert_eq!(account_discriminator("StakeEntry"), expected[..8]);
        assert_ne!(account_discriminator("StakeEntry"), account_discriminator("StakePool"));
    }

    #[tokio::test]
    async fn batched_read_chunks_and_keeps_order() {
        let reader = CountingReader {
            calls: AtomicUsize::new(0),
        };
        let addresses: Vec<Address> = (0..7u8)
            .map(|i| {
                let mut bytes = [0u8; 32];
                bytes[0] = i;
                Address::new(bytes)
            })
            .collect();

        let accounts = fetch_batched(&reader, &addresses, 3).await.unwrap();

        assert_eq!(reader.calls.load(Ordering::SeqCst), 3);
        assert_eq!(accounts.len(), 7);
        for (i, slot) in accounts.iter().enumerate() {
            match slot {
                Some(account) => assert_eq!(account.data, vec![i as u8]),
                None => assert_eq!(i % 2, 1),
            }
        }
    }

    #[tokio::test]
    async fn empty_read_skips_the_reader() {
        let reader = CountingReader {
            calls: AtomicUsize::new(0),
        };
        let accounts = fetch_batched(&reader, &[], 100).await.unwrap();
        assert!(accounts.is_empty());
        assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
    }
}
