//! How an asset moves in and out of custody.

use chain_sol::Address;

use crate::accounts::{Metadata, TokenStandard};

/// Resolved once per workflow from the asset's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetTransferMode {
    /// Plain SPL transfer into the stake entry's token account.
    Standard,
    /// Delegate-and-lock in place, validated against `rule_set`.
    Programmable { rule_set: Address },
}

impl AssetTransferMode {
    /// Programmable only when the asset is a programmable NFT *and* carries
    /// a rule set; a programmable NFT without rules transfers normally.
    pub fn resolve(metadata: Option<&Metadata>) -> Self {
        let Some(metadata) = metadata else {
            return AssetTransferMode::Standard;
        };
        match (metadata.token_standard, metadata.rule_set()) {
            (Some(TokenStandard::ProgrammableNonFungible), Some(rule_set)) => {
                AssetTransferMode::Programmable { rule_set }
            }
            _ => AssetTransferMode::Standard,
        }
    }

    pub fn is_programmable(&self) -> bool {
        matches!(self, AssetTransferMode::Programmable { .. })
    }
}
