//! Reward distributor program instructions.

use borsh::BorshSerialize;
use chain_sol::{derive_associated_token_address, Address, SolAccountMeta, SolInstruction};

use super::{encode_data, instruction, InstructionKind};
use crate::accounts::RewardDistributorKind;
use crate::config::ProgramIds;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct InitRewardDistributorArgs {
    pub reward_amount: u64,
    pub reward_duration_seconds: u128,
    pub kind: u8,
    pub supply: Option<u64>,
    pub max_supply: Option<u64>,
    pub default_multiplier: Option<u64>,
    pub multiplier_decimals: Option<u8>,
    pub max_reward_seconds_received: Option<u128>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitRewardDistributorAccounts {
    pub reward_distributor: Address,
    pub stake_pool: Address,
    pub reward_mint: Address,
    pub authority: Address,
    pub payer: Address,
}

/// Treasury distributors are funded from the authority's reward token
/// account into the distributor's own; mint distributors take over mint
/// authority and need nothing extra.
pub fn treasury_accounts(
    kind: RewardDistributorKind,
    reward_distributor: &Address,
    reward_mint: &Address,
    authority: &Address,
) -> Result<Vec<SolAccountMeta>> {
    Ok(match kind {
        RewardDistributorKind::Mint => Vec::new(),
        RewardDistributorKind::Treasury => vec![
            SolAccountMeta::new(derive_associated_token_address(reward_distributor, reward_mint)?, false),
            SolAccountMeta::new(derive_associated_token_address(authority, reward_mint)?, false),
        ],
    })
}

pub fn build_init_reward_distributor(
    ids: &ProgramIds,
    accounts: &InitRewardDistributorAccounts,
    args: &InitRewardDistributorArgs,
    remaining: Vec<SolAccountMeta>,
) -> Result<SolInstruction> {
    let mut metas = vec![
        SolAccountMeta::new(accounts.reward_distributor, false),
        SolAccountMeta::new_readonly(accounts.stake_pool, false),
        SolAccountMeta::new(accounts.reward_mint, false),
        SolAccountMeta::new(accounts.authority, true),
        SolAccountMeta::new(accounts.payer, true),
        SolAccountMeta::new_readonly(ids.token_program, false),
        SolAccountMeta::new_readonly(ids.system_program, false),
    ];
    metas.extend(remaining);
    Ok(instruction(
        ids,
        InstructionKind::InitRewardDistributor,
        metas,
        encode_data(InstructionKind::InitRewardDistributor, args)?,
    ))
}

pub fn build_init_reward_entry(
    ids: &ProgramIds,
    reward_entry: &Address,
    stake_entry: &Address,
    reward_distributor: &Address,
    payer: &Address,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::InitRewardEntry,
        vec![
            SolAccountMeta::new(*reward_entry, false),
            SolAccountMeta::new_readonly(*stake_entry, false),
            SolAccountMeta::new(*reward_distributor, false),
            SolAccountMeta::new(*payer, true),
            SolAccountMeta::new_readonly(ids.system_program, false),
        ],
        InstructionKind::InitRewardEntry.discriminator().to_vec(),
    ))
}

pub fn build_update_reward_entry(
    ids: &ProgramIds,
    reward_entry: &Address,
    reward_distributor: &Address,
    authority: &Address,
    multiplier: u64,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::UpdateRewardEntry,
        vec![
            SolAccountMeta::new(*reward_entry, false),
            SolAccountMeta::new_readonly(*reward_distributor, false),
            SolAccountMeta::new_readonly(*authority, true),
        ],
        encode_data(InstructionKind::UpdateRewardEntry, &multiplier)?,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRewardsAccounts {
    pub reward_entry: Address,
    pub reward_distributor: Address,
    pub stake_entry: Address,
    pub stake_pool: Address,
    pub reward_mint: Address,
    pub user_reward_mint_token_account: Address,
    pub user: Address,
}

/// Claim accrued rewards. The distributor's own reward token account is
/// always attached; treasury distributors pay out of it.
pub fn build_claim_rewards(ids: &ProgramIds, accounts: &ClaimRewardsAccounts) -> Result<SolInstruction> {
    let distributor_token_account =
        derive_associated_token_address(&accounts.reward_distributor, &accounts.reward_mint)?;
    Ok(instruction(
        ids,
        InstructionKind::ClaimRewards,
        vec![
            SolAccountMeta::new(accounts.reward_entry, false),
            SolAccountMeta::new(accounts.reward_distributor, false),
            SolAccountMeta::new_readonly(accounts.stake_entry, false),
            SolAccountMeta::new_readonly(accounts.stake_pool, false),
            SolAccountMeta::new(accounts.reward_mint, false),
            SolAccountMeta::new(accounts.user_reward_mint_token_account, false),
            SolAccountMeta::new(ids.reward_manager, false),
            SolAccountMeta::new(accounts.user, true),
            SolAccountMeta::new_readonly(ids.token_program, false),
            SolAccountMeta::new_readonly(ids.system_program, false),
            SolAccountMeta::new(distributor_token_account, false),
        ],
        InstructionKind::ClaimRewards.discriminator().to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 32])
    }

    #[test]
    fn claim_rewards_pays_from_distributor_ata() {
        let ids = ProgramIds::default();
        let accounts = ClaimRewardsAccounts {
            reward_entry: addr(1),
            reward_distributor: addr(2),
            stake_entry: addr(3),
            stake_pool: addr(4),
            reward_mint: addr(5),
            user_reward_mint_token_account: addr(6),
            user: addr(7),
        };
        let ix = build_claim_rewards(&ids, &accounts).unwrap();
        assert_eq!(ix.program_id, ids.reward_distributor);
        assert_eq!(ix.data, InstructionKind::ClaimRewards.discriminator().to_vec());

        let last = ix.accounts.last().unwrap();
        assert_eq!(last.pubkey, derive_associated_token_address(&addr(2), &addr(5)).unwrap());
        assert!(last.is_writable && !last.is_signer);
        assert!(ix.accounts.iter().any(|m| m.pubkey == ids.reward_manager));
    }

    #[test]
    fn update_reward_entry_encodes_multiplier() {
        let ids = ProgramIds::default();
        let ix = build_update_reward_entry(&ids, &addr(1), &addr(2), &addr(3), 150).unwrap();
        assert_eq!(&ix.data[8..], &150u64.to_le_bytes());
        assert!(ix.accounts[2].is_signer);
    }

    #[test]
    fn treasury_kind_needs_both_token_accounts() {
        assert!(treasury_accounts(RewardDistributorKind::Mint, &addr(1), &addr(2), &addr(3))
            .unwrap()
            .is_empty());
        let treasury = treasury_accounts(RewardDistributorKind::Treasury, &addr(1), &addr(2), &addr(3)).unwrap();
        assert_eq!(treasury.len(), 2);
        assert_eq!(treasury[0].pubkey, derive_associated_token_address(&addr(1), &addr(2)).unwrap());
        assert_eq!(treasury[1].pubkey, derive_associated_token_address(&addr(3), &addr(2)).unwrap());
    }

    #[test]
    fn init_distributor_args_layout() {
        let ids = ProgramIds::default();
        let accounts = InitRewardDistributorAccounts {
            reward_distributor: addr(1),
            stake_pool: addr(2),
            reward_mint: addr(3),
            authority: addr(4),
            payer: addr(4),
        };
        let args = InitRewardDistributorArgs {
            reward_amount: 1,
            reward_duration_seconds: 1,
            kind: RewardDistributorKind::Mint as u8,
            supply: None,
            max_supply: None,
            default_multiplier: None,
            multiplier_decimals: None,
            max_reward_seconds_received: None,
        };
        let ix = build_init_reward_distributor(&ids, &accounts, &args, Vec::new()).unwrap();
        // 8 + u64 + u128 + u8 + five None tags
        assert_eq!(ix.data.len(), 8 + 8 + 16 + 1 + 5);
        assert_eq!(ix.data[8 + 8 + 16], 1);
    }
}
