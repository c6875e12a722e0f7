//! Group reward distributor program instructions.

use borsh::BorshSerialize;
use chain_sol::{derive_associated_token_address, Address, SolAccountMeta, SolInstruction};

use super::{encode_data, instruction, InstructionKind};
use crate::accounts::{
    GroupRewardDistributorKind, GroupRewardDistributorMetadataKind, GroupRewardDistributorPoolKind,
};
use crate::config::ProgramIds;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct InitGroupRewardDistributorArgs {
    pub reward_amount: u64,
    pub reward_duration_seconds: u128,
    pub reward_kind: GroupRewardDistributorKind,
    pub metadata_kind: GroupRewardDistributorMetadataKind,
    pub pool_kind: GroupRewardDistributorPoolKind,
    pub authorized_pools: Vec<Address>,
    pub supply: Option<u64>,
    pub base_adder: Option<u64>,
    pub base_adder_decimals: Option<u8>,
    pub base_multiplier: Option<u64>,
    pub base_multiplier_decimals: Option<u8>,
    pub multiplier_decimals: Option<u8>,
    pub max_supply: Option<u64>,
    pub min_cooldown_seconds: Option<u32>,
    pub min_stake_seconds: Option<u32>,
    pub group_count_multiplier: Option<u64>,
    pub group_count_multiplier_decimals: Option<u8>,
    pub min_group_size: Option<u8>,
    pub max_reward_seconds_received: Option<u128>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct UpdateGroupRewardDistributorArgs {
    pub reward_amount: u64,
    pub reward_duration_seconds: u128,
    pub metadata_kind: GroupRewardDistributorMetadataKind,
    pub pool_kind: GroupRewardDistributorPoolKind,
    pub authorized_pools: Vec<Address>,
    pub base_adder: u64,
    pub base_adder_decimals: u8,
    pub base_multiplier: u64,
    pub base_multiplier_decimals: u8,
    pub multiplier_decimals: u8,
    pub max_supply: Option<u64>,
    pub min_cooldown_seconds: u32,
    pub min_stake_seconds: u32,
    pub group_count_multiplier: Option<u64>,
    pub group_count_multiplier_decimals: Option<u8>,
    pub min_group_size: Option<u8>,
    pub max_reward_seconds_received: Option<u128>,
}

/// Token accounts a treasury-funded group distributor pays from.
pub fn group_treasury_accounts(
    kind: GroupRewardDistributorKind,
    group_reward_distributor: &Address,
    reward_mint: &Address,
    authority: &Address,
) -> Result<Vec<SolAccountMeta>> {
    Ok(match kind {
        GroupRewardDistributorKind::Mint => Vec::new(),
        GroupRewardDistributorKind::Treasury => vec![
            SolAccountMeta::new(
                derive_associated_token_address(group_reward_distributor, reward_mint)?,
                false,
            ),
            SolAccountMeta::new(derive_associated_token_address(authority, reward_mint)?, false),
        ],
    })
}

/// `id` is a fresh key that signs and seeds the distributor address.
pub fn build_init_group_reward_distributor(
    ids: &ProgramIds,
    group_reward_distributor: &Address,
    id: &Address,
    reward_mint: &Address,
    authority: &Address,
    args: &InitGroupRewardDistributorArgs,
    remaining: Vec<SolAccountMeta>,
) -> Result<SolInstruction> {
    let mut metas = vec![
        SolAccountMeta::new(*group_reward_distributor, false),
        SolAccountMeta::new_readonly(*id, true),
        SolAccountMeta::new(*reward_mint, false),
        SolAccountMeta::new(*authority, true),
        SolAccountMeta::new_readonly(ids.token_program, false),
        SolAccountMeta::new_readonly(ids.system_program, false),
    ];
    metas.extend(remaining);
    Ok(instruction(
        ids,
        InstructionKind::InitGroupRewardDistributor,
        metas,
        encode_data(InstructionKind::InitGroupRewardDistributor, args)?,
    ))
}

pub fn build_update_group_reward_distributor(
    ids: &ProgramIds,
    group_reward_distributor: &Address,
    authority: &Address,
    args: &UpdateGroupRewardDistributorArgs,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::UpdateGroupRewardDistributor,
        vec![
            SolAccountMeta::new(*group_reward_distributor, false),
            SolAccountMeta::new_readonly(*authority, true),
        ],
        encode_data(InstructionKind::UpdateGroupRewardDistributor, args)?,
    ))
}

pub fn build_init_group_reward_counter(
    ids: &ProgramIds,
    group_reward_counter: &Address,
    group_reward_distributor: &Address,
    authority: &Address,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::InitGroupRewardCounter,
        vec![
            SolAccountMeta::new(*group_reward_counter, false),
            SolAccountMeta::new_readonly(*group_reward_distributor, false),
            SolAccountMeta::new(*authority, true),
            SolAccountMeta::new_readonly(ids.system_program, false),
        ],
        InstructionKind::InitGroupRewardCounter.discriminator().to_vec(),
    ))
}

/// One group member as the entry initializer validates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMemberAccounts {
    pub stake_entry: Address,
    pub original_mint: Address,
    pub original_mint_metadata: Address,
    pub reward_entry: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRewardEntryAccounts {
    pub group_reward_entry: Address,
    pub group_reward_counter: Address,
    pub group_entry: Address,
    pub group_reward_distributor: Address,
    pub authority: Address,
}

/// Members are passed four accounts each, in group order.
pub fn build_init_group_reward_entry(
    ids: &ProgramIds,
    accounts: &GroupRewardEntryAccounts,
    members: &[GroupMemberAccounts],
) -> Result<SolInstruction> {
    let mut metas = vec![
        SolAccountMeta::new(accounts.group_reward_entry, false),
        SolAccountMeta::new(accounts.group_reward_counter, false),
        SolAccountMeta::new(accounts.group_entry, false),
        SolAccountMeta::new(accounts.group_reward_distributor, false),
        SolAccountMeta::new(accounts.authority, true),
        SolAccountMeta::new_readonly(ids.system_program, false),
    ];
    for member in members {
        metas.extend([
            SolAccountMeta::new_readonly(member.stake_entry, false),
            SolAccountMeta::new_readonly(member.original_mint, false),
            SolAccountMeta::new_readonly(member.original_mint_metadata, false),
            SolAccountMeta::new_readonly(member.reward_entry, false),
        ]);
    }
    Ok(instruction(
        ids,
        InstructionKind::InitGroupRewardEntry,
        metas,
        InstructionKind::InitGroupRewardEntry.discriminator().to_vec(),
    ))
}

pub fn build_claim_group_rewards(
    ids: &ProgramIds,
    accounts: &GroupRewardEntryAccounts,
    reward_mint: &Address,
    user_reward_mint_token_account: &Address,
    remaining: Vec<SolAccountMeta>,
) -> Result<SolInstruction> {
    let mut metas = vec![
        SolAccountMeta::new(accounts.group_reward_entry, false),
        SolAccountMeta::new(accounts.group_reward_distributor, false),
        SolAccountMeta::new(accounts.group_entry, false),
        SolAccountMeta::new(accounts.group_reward_counter, false),
        SolAccountMeta::new(*reward_mint, false),
        SolAccountMeta::new(*user_reward_mint_token_account, false),
        SolAccountMeta::new(ids.reward_manager, false),
        SolAccountMeta::new(accounts.authority, true),
        SolAccountMeta::new_readonly(ids.token_program, false),
        SolAccountMeta::new_readonly(ids.system_program, false),
    ];
    metas.extend(remaining);
    Ok(instruction(
        ids,
        InstructionKind::ClaimGroupRewards,
        metas,
        InstructionKind::ClaimGroupRewards.discriminator().to_vec(),
    ))
}

pub fn build_close_group_reward_entry(
    ids: &ProgramIds,
    accounts: &GroupRewardEntryAccounts,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::CloseGroupRewardEntry,
        vec![
            SolAccountMeta::new(accounts.group_reward_entry, false),
            SolAccountMeta::new(accounts.group_reward_distributor, false),
            SolAccountMeta::new(accounts.group_entry, false),
            SolAccountMeta::new(accounts.group_reward_counter, false),
            SolAccountMeta::new(accounts.authority, true),
        ],
        InstructionKind::CloseGroupRewardEntry.discriminator().to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 32])
    }

    fn entry_accounts() -> GroupRewardEntryAccounts {
        GroupRewardEntryAccounts {
            group_reward_entry: addr(1),
            group_reward_counter: addr(2),
            group_entry: addr(3),
            group_reward_distributor: addr(4),
            authority: addr(5),
        }
    }

    #[test]
    fn init_entry_lists_members_in_order() {
        let ids = ProgramIds::default();
        let members = [
            GroupMemberAccounts {
                stake_entry: addr(10),
                original_mint: addr(11),
                original_mint_metadata: addr(12),
                reward_entry: addr(13),
            },
            GroupMemberAccounts {
                stake_entry: addr(20),
                original_mint: addr(21),
                original_mint_metadata: addr(22),
                reward_entry: addr(23),
            },
        ];
        let ix = build_init_group_reward_entry(&ids, &entry_accounts(), &members).unwrap();
        assert_eq!(ix.program_id, ids.group_reward_distributor);
        let tail: Vec<Address> = ix.accounts[6..].iter().map(|m| m.pubkey).collect();
        assert_eq!(tail, vec![addr(10), addr(11), addr(12), addr(13), addr(20), addr(21), addr(22), addr(23)]);
        assert!(ix.accounts[6..].iter().all(|m| !m.is_writable && !m.is_signer));
    }

    #[test]
    fn claim_attaches_remaining_accounts() {
        let ids = ProgramIds::default();
        let remaining =
            group_treasury_accounts(GroupRewardDistributorKind::Treasury, &addr(4), &addr(6), &addr(5)).unwrap();
        let ix = build_claim_group_rewards(&ids, &entry_accounts(), &addr(6), &addr(7), remaining).unwrap();
        assert_eq!(ix.accounts.len(), 12);
        assert_eq!(
            ix.accounts[10].pubkey,
            derive_associated_token_address(&addr(4), &addr(6)).unwrap()
        );
    }

    #[test]
    fn update_args_encode_kinds_as_tags() {
        let ids = ProgramIds::default();
        let args = UpdateGroupRewardDistributorArgs {
            reward_amount: 1,
            reward_duration_seconds: 1,
            metadata_kind: GroupRewardDistributorMetadataKind::UniqueSymbols,
            pool_kind: GroupRewardDistributorPoolKind::AllFromSinglePool,
            authorized_pools: vec![],
            base_adder: 0,
            base_adder_decimals: 0,
            base_multiplier: 1,
            base_multiplier_decimals: 0,
            multiplier_decimals: 0,
            max_supply: None,
            min_cooldown_seconds: 0,
            min_stake_seconds: 0,
            group_count_multiplier: None,
            group_count_multiplier_decimals: None,
            min_group_size: None,
            max_reward_seconds_received: None,
        };
        let ix = build_update_group_reward_distributor(&ids, &addr(1), &addr(2), &args).unwrap();
        assert_eq!(ix.data[8 + 8 + 16], 2);
        assert_eq!(ix.data[8 + 8 + 16 + 1], 1);
    }

    #[test]
    fn close_requires_authority_signature() {
        let ids = ProgramIds::default();
        let ix = build_close_group_reward_entry(&ids, &entry_accounts()).unwrap();
        let signers: Vec<_> = ix.accounts.iter().filter(|m| m.is_signer).map(|m| m.pubkey).collect();
        assert_eq!(signers, vec![addr(5)]);
    }
}
