//! Account schemas of the stake pool, reward distributor, and group reward
//! distributor programs.
//!
//! Field order is the on-chain Borsh layout; do not reorder.

use borsh::{BorshDeserialize, BorshSerialize};
use chain_sol::Address;

use super::ProgramAccount;

/// Global counter handing out stake pool identifiers.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Identifier {
    pub bump: u8,
    pub count: u64,
}

impl ProgramAccount for Identifier {
    const NAME: &'static str = "Identifier";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StakePool {
    pub bump: u8,
    pub identifier: u64,
    pub authority: Address,
    pub requires_creators: Vec<Address>,
    pub requires_collections: Vec<Address>,
    pub requires_authorization: bool,
    pub overlay_text: String,
    pub image_uri: String,
    pub reset_on_stake: bool,
    pub total_staked: u32,
    pub cooldown_seconds: Option<u32>,
    pub min_stake_seconds: Option<u32>,
    pub end_date: Option<i64>,
    pub double_or_reset_enabled: Option<bool>,
}

impl ProgramAccount for StakePool {
    const NAME: &'static str = "StakePool";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StakeEntry {
    pub bump: u8,
    pub pool: Address,
    pub amount: u64,
    pub original_mint: Address,
    pub original_mint_claimed: bool,
    pub last_staker: Address,
    pub last_staked_at: i64,
    pub total_stake_seconds: u128,
    pub stake_mint_claimed: bool,
    pub kind: u8,
    pub stake_mint: Option<Address>,
    pub cooldown_start_seconds: Option<i64>,
    pub last_updated_at: Option<i64>,
    pub grouping: Option<Address>,
}

impl StakeEntry {
    /// Whether a receipt (stake mint or original) is out of custody.
    pub fn receipt_claimed(&self) -> bool {
        self.stake_mint_claimed || self.original_mint_claimed
    }

    /// The mint currently held as a receipt, if any.
    pub fn claimed_receipt_mint(&self) -> Option<Address> {
        match self.stake_mint {
            Some(stake_mint) if self.stake_mint_claimed => Some(stake_mint),
            _ if self.original_mint_claimed => Some(self.original_mint),
            _ => None,
        }
    }
}

impl ProgramAccount for StakeEntry {
    const NAME: &'static str = "StakeEntry";
}

/// Aggregates several stake entries under one identity for pooled rewards.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GroupStakeEntry {
    pub bump: u8,
    pub authority: Address,
    pub stake_entries: Vec<Address>,
    pub changed_at: i64,
    pub group_cooldown_seconds: u32,
    pub group_stake_seconds: u32,
    pub group_cooldown_start_seconds: Option<i64>,
}

impl ProgramAccount for GroupStakeEntry {
    const NAME: &'static str = "GroupStakeEntry";
}

/// How a distributor funds rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RewardDistributorKind {
    /// Mints new reward tokens; the distributor holds mint authority.
    #[default]
    Mint = 1,
    /// Transfers from a pre-funded treasury account.
    Treasury = 2,
}

impl RewardDistributorKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(RewardDistributorKind::Mint),
            2 => Some(RewardDistributorKind::Treasury),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RewardDistributor {
    pub bump: u8,
    pub stake_pool: Address,
    pub kind: u8,
    pub authority: Address,
    pub reward_mint: Address,
    pub reward_amount: u64,
    pub reward_duration_seconds: u128,
    pub rewards_issued: u128,
    pub max_supply: Option<u64>,
    pub default_multiplier: u64,
    pub multiplier_decimals: u8,
    pub max_reward_seconds_received: Option<u128>,
}

impl ProgramAccount for RewardDistributor {
    const NAME: &'static str = "RewardDistributor";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RewardEntry {
    pub bump: u8,
    pub stake_entry: Address,
    pub reward_distributor: Address,
    pub reward_seconds_received: u128,
    pub multiplier: u64,
}

impl ProgramAccount for RewardEntry {
    const NAME: &'static str = "RewardEntry";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize)]
pub enum GroupRewardDistributorKind {
    #[default]
    Mint,
    Treasury,
}

/// Which pools a group's members may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize)]
pub enum GroupRewardDistributorPoolKind {
    #[default]
    NoRestriction,
    AllFromSinglePool,
    EachFromSeparatePool,
}

/// Uniqueness rule on members' metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize)]
pub enum GroupRewardDistributorMetadataKind {
    #[default]
    NoRestriction,
    UniqueNames,
    UniqueSymbols,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GroupRewardDistributor {
    pub bump: u8,
    pub id: Address,
    pub authorized_pools: Vec<Address>,
    pub reward_amount: u64,
    pub reward_duration_seconds: u128,
    pub reward_kind: GroupRewardDistributorKind,
    pub metadata_kind: GroupRewardDistributorMetadataKind,
    pub pool_kind: GroupRewardDistributorPoolKind,
    pub authority: Address,
    pub reward_mint: Address,
    pub max_supply: Option<u64>,
    pub supply: Option<u64>,
    pub base_adder: u64,
    pub base_adder_decimals: u8,
    pub base_multiplier: u64,
    pub base_multiplier_decimals: u8,
    pub multiplier_decimals: u8,
    pub rewards_issued: u128,
    pub min_cooldown_seconds: u32,
    pub min_stake_seconds: u32,
    pub group_count_multiplier: Option<u64>,
    pub group_count_multiplier_decimals: Option<u8>,
    pub min_group_size: Option<u8>,
    pub max_reward_seconds_received: Option<u128>,
}

impl ProgramAccount for GroupRewardDistributor {
    const NAME: &'static str = "GroupRewardDistributor";
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GroupRewardEntry {
    pub bump: u8,
    pub group_entry: Address,
    pub group_reward_distributor: Address,
    pub reward_seconds_received: u128,
    pub multiplier: u64,
}

impl ProgramAccount for GroupRewardEntry {
    const NAME: &'static str = "GroupRewardEntry";
}

/// Number of group reward entries one authority holds in a distributor.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct GroupRewardCounter {
    pub bump: u8,
    pub group_reward_distributor: Address,
    pub authority: Address,
    pub count: u64,
}

impl ProgramAccount for GroupRewardCounter {
    const NAME: &'static str = "GroupRewardCounter";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::account_discriminator;
    use crate::error::StakeSdkError;

    fn entry() -> StakeEntry {
        StakeEntry {
            bump: 255,
            pool: Address::new([1; 32]),
            amount: 1,
            original_mint: Address::new([2; 32]),
            original_mint_claimed: false,
            last_staker: Address::new([3; 32]),
            last_staked_at: 1_700_000_000,
            total_stake_seconds: 42,
            stake_mint_claimed: false,
            kind: 0,
            stake_mint: None,
            cooldown_start_seconds: None,
            last_updated_at: Some(1_700_000_100),
            grouping: None,
        }
    }

    fn encode<T: BorshSerialize + ProgramAccount>(value: &T) -> Vec<u8> {
        let mut data = account_discriminator(T::NAME).to_vec();
        data.extend(borsh::to_vec(value).unwrap());
        data
    }

    #[test]
    fn decode_stake_entry() {
        let data = encode(&entry());
        let decoded = StakeEntry::decode(&Address::ZERO, &data).unwrap();
        assert_eq!(decoded, entry());
    }

    #[test]
    fn wrong_discriminator_is_a_decode_error() {
        let mut data = encode(&entry());
        data[..8].copy_from_slice(&account_discriminator("StakePool"));
        let err = StakeEntry::decode(&Address::ZERO, &data).unwrap_err();
        assert!(matches!(err, StakeSdkError::Decode { account: "StakeEntry", .. }));
    }

    #[test]
    fn truncated_body_is_a_decode_error() {
        let data = encode(&entry());
        let err = StakeEntry::decode(&Address::ZERO, &data[..40]).unwrap_err();
        assert!(matches!(err, StakeSdkError::Decode { .. }));
    }

    #[test]
    fn short_data_is_a_decode_error() {
        assert!(StakeEntry::decode(&Address::ZERO, &[1, 2, 3]).is_err());
    }

    #[test]
    fn claimed_receipt_prefers_stake_mint() {
        let mut e = entry();
        assert_eq!(e.claimed_receipt_mint(), None);
        assert!(!e.receipt_claimed());

        e.original_mint_claimed = true;
        assert_eq!(e.claimed_receipt_mint(), Some(e.original_mint));

        e.original_mint_claimed = false;
        e.stake_mint = Some(Address::new([9; 32]));
        e.stake_mint_claimed = true;
        assert_eq!(e.claimed_receipt_mint(), Some(Address::new([9; 32])));
        assert!(e.receipt_claimed());
    }

    #[test]
    fn reward_distributor_kind_from_u8() {
        assert_eq!(RewardDistributorKind::from_u8(1), Some(RewardDistributorKind::Mint));
        assert_eq!(RewardDistributorKind::from_u8(2), Some(RewardDistributorKind::Treasury));
        assert_eq!(RewardDistributorKind::from_u8(0), None);
    }

    #[test]
    fn group_kinds_encode_as_variant_index() {
        assert_eq!(
            borsh::to_vec(&GroupRewardDistributorPoolKind::EachFromSeparatePool).unwrap(),
            vec![2]
        );
        assert_eq!(
            borsh::to_vec(&GroupRewardDistributorMetadataKind::UniqueNames).unwrap(),
            vec![1]
        );
    }
}
