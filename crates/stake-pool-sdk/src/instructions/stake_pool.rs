//! Stake pool program instructions.

use borsh::BorshSerialize;
use chain_sol::{Address, SolAccountMeta, SolInstruction};

use super::{encode_data, instruction, InstructionKind};
use crate::config::ProgramIds;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Pool administration
// ---------------------------------------------------------------------------

pub fn build_init_identifier(
    ids: &ProgramIds,
    identifier: &Address,
    payer: &Address,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::InitIdentifier,
        vec![
            SolAccountMeta::new(*identifier, false),
            SolAccountMeta::new(*payer, true),
            SolAccountMeta::new_readonly(ids.system_program, false),
        ],
        InstructionKind::InitIdentifier.discriminator().to_vec(),
    ))
}

/// Arguments of `init_pool`, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct InitPoolArgs {
    pub overlay_text: String,
    pub image_uri: String,
    pub requires_collections: Vec<Address>,
    pub requires_creators: Vec<Address>,
    pub requires_authorization: bool,
    pub authority: Address,
    pub reset_on_stake: bool,
    pub cooldown_seconds: Option<u32>,
    pub min_stake_seconds: Option<u32>,
    pub end_date: Option<i64>,
    pub double_or_reset_enabled: Option<bool>,
}

pub fn build_init_pool(
    ids: &ProgramIds,
    stake_pool: &Address,
    identifier: &Address,
    payer: &Address,
    args: &InitPoolArgs,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::InitPool,
        vec![
            SolAccountMeta::new(*stake_pool, false),
            SolAccountMeta::new(*identifier, false),
            SolAccountMeta::new(*payer, true),
            SolAccountMeta::new_readonly(ids.system_program, false),
        ],
        encode_data(InstructionKind::InitPool, args)?,
    ))
}

/// Allow `mint` into a pool that requires authorization.
pub fn build_authorize_mint(
    ids: &ProgramIds,
    stake_pool: &Address,
    stake_authorization: &Address,
    mint: &Address,
    payer: &Address,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::AuthorizeMint,
        vec![
            SolAccountMeta::new(*stake_pool, false),
            SolAccountMeta::new(*stake_authorization, false),
            SolAccountMeta::new(*payer, true),
            SolAccountMeta::new_readonly(ids.system_program, false),
        ],
        encode_data(InstructionKind::AuthorizeMint, mint)?,
    ))
}

// ---------------------------------------------------------------------------
// Stake entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitEntryAccounts {
    pub stake_entry: Address,
    pub stake_pool: Address,
    pub original_mint: Address,
    pub original_mint_metadata: Address,
    pub payer: Address,
    /// Checked by pools that require authorization; passed unconditionally.
    pub stake_authorization: Address,
}

pub fn build_init_entry(
    ids: &ProgramIds,
    accounts: &InitEntryAccounts,
    user: &Address,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::InitEntry,
        vec![
            SolAccountMeta::new(accounts.stake_entry, false),
            SolAccountMeta::new(accounts.stake_pool, false),
            SolAccountMeta::new_readonly(accounts.original_mint, false),
            SolAccountMeta::new_readonly(accounts.original_mint_metadata, false),
            SolAccountMeta::new(accounts.payer, true),
            SolAccountMeta::new_readonly(ids.system_program, false),
            SolAccountMeta::new_readonly(accounts.stake_authorization, false),
        ],
        encode_data(InstructionKind::InitEntry, user)?,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct InitStakeMintArgs {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitStakeMintAccounts {
    pub stake_entry: Address,
    pub stake_pool: Address,
    pub original_mint: Address,
    pub original_mint_metadata: Address,
    /// Fresh mint account; signs its own creation.
    pub stake_mint: Address,
    pub stake_mint_metadata: Address,
    pub stake_entry_stake_mint_token_account: Address,
    pub mint_manager: Address,
    pub payer: Address,
}

pub fn build_init_stake_mint(
    ids: &ProgramIds,
    accounts: &InitStakeMintAccounts,
    args: &InitStakeMintArgs,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::InitStakeMint,
        vec![
            SolAccountMeta::new(accounts.stake_entry, false),
            SolAccountMeta::new(accounts.stake_pool, false),
            SolAccountMeta::new_readonly(accounts.original_mint, false),
            SolAccountMeta::new_readonly(accounts.original_mint_metadata, false),
            SolAccountMeta::new(accounts.stake_mint, true),
            SolAccountMeta::new(accounts.stake_mint_metadata, false),
            SolAccountMeta::new(accounts.stake_entry_stake_mint_token_account, false),
            SolAccountMeta::new(accounts.mint_manager, false),
            SolAccountMeta::new(accounts.payer, true),
            SolAccountMeta::new_readonly(ids.sysvar_rent, false),
            SolAccountMeta::new_readonly(ids.token_program, false),
            SolAccountMeta::new_readonly(ids.token_metadata, false),
            SolAccountMeta::new_readonly(ids.associated_token_program, false),
            SolAccountMeta::new_readonly(ids.system_program, false),
        ],
        encode_data(InstructionKind::InitStakeMint, args)?,
    ))
}

pub fn build_update_total_stake_seconds(
    ids: &ProgramIds,
    stake_entry: &Address,
    last_staker: &Address,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::UpdateTotalStakeSeconds,
        vec![
            SolAccountMeta::new(*stake_entry, false),
            SolAccountMeta::new(*last_staker, true),
        ],
        InstructionKind::UpdateTotalStakeSeconds.discriminator().to_vec(),
    ))
}

// ---------------------------------------------------------------------------
// Stake / unstake
// ---------------------------------------------------------------------------

/// Accounts shared by the standard `stake` and `unstake` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferAccounts {
    pub stake_entry: Address,
    pub stake_pool: Address,
    pub stake_entry_original_mint_token_account: Address,
    pub original_mint: Address,
    pub user: Address,
    pub user_original_mint_token_account: Address,
}

pub fn build_stake(ids: &ProgramIds, accounts: &TransferAccounts, amount: u64) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::Stake,
        vec![
            SolAccountMeta::new(accounts.stake_entry, false),
            SolAccountMeta::new(accounts.stake_pool, false),
            SolAccountMeta::new(accounts.stake_entry_original_mint_token_account, false),
            SolAccountMeta::new_readonly(accounts.original_mint, false),
            SolAccountMeta::new(accounts.user, true),
            SolAccountMeta::new(accounts.user_original_mint_token_account, false),
            SolAccountMeta::new_readonly(ids.token_program, false),
        ],
        encode_data(InstructionKind::Stake, &amount)?,
    ))
}

/// `stake_mint_token_account` is the entry's stake-mint ATA, attached
/// when the entry has a stake mint.
pub fn build_unstake(
    ids: &ProgramIds,
    accounts: &TransferAccounts,
    stake_mint_token_account: Option<&Address>,
) -> Result<SolInstruction> {
    let mut metas = vec![
        SolAccountMeta::new(accounts.stake_pool, false),
        SolAccountMeta::new(accounts.stake_entry, false),
        SolAccountMeta::new_readonly(accounts.original_mint, false),
        SolAccountMeta::new(accounts.stake_entry_original_mint_token_account, false),
        SolAccountMeta::new(accounts.user, true),
        SolAccountMeta::new(accounts.user_original_mint_token_account, false),
        SolAccountMeta::new_readonly(ids.token_program, false),
    ];
    if let Some(token_account) = stake_mint_token_account {
        metas.push(SolAccountMeta::new_readonly(*token_account, false));
    }
    Ok(instruction(
        ids,
        InstructionKind::Unstake,
        metas,
        InstructionKind::Unstake.discriminator().to_vec(),
    ))
}

/// Accounts of the rule-set-gated stake and unstake, which delegate and
/// lock the asset in place instead of moving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgrammableAccounts {
    pub stake_entry: Address,
    pub stake_pool: Address,
    pub original_mint: Address,
    pub user: Address,
    pub user_original_mint_token_account: Address,
    pub user_original_mint_token_record: Address,
    pub mint_metadata: Address,
    pub mint_edition: Address,
    pub authorization_rules: Address,
}

fn programmable_metas(ids: &ProgramIds, accounts: &ProgrammableAccounts) -> Vec<SolAccountMeta> {
    vec![
        SolAccountMeta::new(accounts.stake_entry, false),
        SolAccountMeta::new(accounts.stake_pool, false),
        SolAccountMeta::new_readonly(accounts.original_mint, false),
        SolAccountMeta::new(accounts.user, true),
        SolAccountMeta::new(accounts.user_original_mint_token_account, false),
        SolAccountMeta::new(accounts.user_original_mint_token_record, false),
        SolAccountMeta::new(accounts.mint_metadata, false),
        SolAccountMeta::new_readonly(accounts.mint_edition, false),
        SolAccountMeta::new_readonly(accounts.authorization_rules, false),
        SolAccountMeta::new_readonly(ids.sysvar_instructions, false),
        SolAccountMeta::new_readonly(ids.token_program, false),
        SolAccountMeta::new_readonly(ids.token_metadata, false),
        SolAccountMeta::new_readonly(ids.token_auth_rules, false),
        SolAccountMeta::new_readonly(ids.system_program, false),
    ]
}

pub fn build_stake_programmable(
    ids: &ProgramIds,
    accounts: &ProgrammableAccounts,
    amount: u64,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::StakeProgrammable,
        programmable_metas(ids, accounts),
        encode_data(InstructionKind::StakeProgrammable, &amount)?,
    ))
}

pub fn build_unstake_programmable(
    ids: &ProgramIds,
    accounts: &ProgrammableAccounts,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::UnstakeProgrammable,
        programmable_metas(ids, accounts),
        InstructionKind::UnstakeProgrammable.discriminator().to_vec(),
    ))
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceiptMintAccounts {
    pub stake_entry: Address,
    pub original_mint: Address,
    pub receipt_mint: Address,
    pub stake_entry_receipt_mint_token_account: Address,
    pub user: Address,
    pub user_receipt_mint_token_account: Address,
    pub token_manager_receipt_mint_token_account: Address,
    pub token_manager: Address,
    pub mint_counter: Address,
}

/// Issue the receipt through the token manager. `kind_accounts` come from
/// [`super::receipt_kind_accounts`].
pub fn build_claim_receipt_mint(
    ids: &ProgramIds,
    accounts: &ClaimReceiptMintAccounts,
    kind_accounts: Vec<SolAccountMeta>,
) -> Result<SolInstruction> {
    let mut metas = vec![
        SolAccountMeta::new(accounts.stake_entry, false),
        SolAccountMeta::new_readonly(accounts.original_mint, false),
        SolAccountMeta::new(accounts.receipt_mint, false),
        SolAccountMeta::new(accounts.stake_entry_receipt_mint_token_account, false),
        SolAccountMeta::new(accounts.user, true),
        SolAccountMeta::new(accounts.user_receipt_mint_token_account, false),
        SolAccountMeta::new(accounts.token_manager_receipt_mint_token_account, false),
        SolAccountMeta::new(accounts.token_manager, false),
        SolAccountMeta::new(accounts.mint_counter, false),
        SolAccountMeta::new_readonly(ids.token_program, false),
        SolAccountMeta::new_readonly(ids.token_manager, false),
        SolAccountMeta::new_readonly(ids.associated_token_program, false),
        SolAccountMeta::new_readonly(ids.system_program, false),
        SolAccountMeta::new_readonly(ids.sysvar_rent, false),
    ];
    metas.extend(kind_accounts);
    Ok(instruction(
        ids,
        InstructionKind::ClaimReceiptMint,
        metas,
        InstructionKind::ClaimReceiptMint.discriminator().to_vec(),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnReceiptMintAccounts {
    pub stake_entry: Address,
    pub receipt_mint: Address,
    pub token_manager: Address,
    pub token_manager_token_account: Address,
    pub user_receipt_mint_token_account: Address,
    pub user: Address,
    /// The stake entry's receipt ATA, which gets the receipt back.
    pub stake_entry_receipt_mint_token_account: Address,
}

/// Move the receipt back into custody. `kind_accounts` are empty unless
/// the token manager is in the claimed state.
pub fn build_return_receipt_mint(
    ids: &ProgramIds,
    accounts: &ReturnReceiptMintAccounts,
    kind_accounts: Vec<SolAccountMeta>,
) -> Result<SolInstruction> {
    let mut metas = vec![
        SolAccountMeta::new(accounts.stake_entry, false),
        SolAccountMeta::new(accounts.receipt_mint, false),
        SolAccountMeta::new(accounts.token_manager, false),
        SolAccountMeta::new(accounts.token_manager_token_account, false),
        SolAccountMeta::new(accounts.user_receipt_mint_token_account, false),
        SolAccountMeta::new(accounts.user, true),
        SolAccountMeta::new(ids.receipt_collector, false),
        SolAccountMeta::new_readonly(ids.token_program, false),
        SolAccountMeta::new_readonly(ids.token_manager, false),
        SolAccountMeta::new_readonly(ids.sysvar_rent, false),
    ];
    metas.extend(kind_accounts);
    metas.push(SolAccountMeta::new(accounts.stake_entry_receipt_mint_token_account, false));
    Ok(instruction(
        ids,
        InstructionKind::ReturnReceiptMint,
        metas,
        InstructionKind::ReturnReceiptMint.discriminator().to_vec(),
    ))
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BorshSerialize)]
pub struct InitGroupEntryArgs {
    pub group_cooldown_seconds: Option<u32>,
    pub group_stake_seconds: Option<u32>,
}

/// `group_id` is a fresh key that signs and seeds the group address.
pub fn build_init_group_entry(
    ids: &ProgramIds,
    group_entry: &Address,
    group_id: &Address,
    authority: &Address,
    args: &InitGroupEntryArgs,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::InitGroupEntry,
        vec![
            SolAccountMeta::new(*group_entry, false),
            SolAccountMeta::new_readonly(*group_id, true),
            SolAccountMeta::new(*authority, true),
            SolAccountMeta::new_readonly(ids.system_program, false),
        ],
        encode_data(InstructionKind::InitGroupEntry, args)?,
    ))
}

pub fn build_add_to_group_entry(
    ids: &ProgramIds,
    group_entry: &Address,
    stake_entry: &Address,
    authority: &Address,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::AddToGroupEntry,
        vec![
            SolAccountMeta::new(*group_entry, false),
            SolAccountMeta::new(*stake_entry, false),
            SolAccountMeta::new(*authority, true),
            SolAccountMeta::new_readonly(ids.system_program, false),
        ],
        InstructionKind::AddToGroupEntry.discriminator().to_vec(),
    ))
}

pub fn build_remove_from_group_entry(
    ids: &ProgramIds,
    group_entry: &Address,
    stake_entry: &Address,
    authority: &Address,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::RemoveFromGroupEntry,
        vec![
            SolAccountMeta::new(*group_entry, false),
            SolAccountMeta::new(*stake_entry, false),
            SolAccountMeta::new(*authority, true),
            SolAccountMeta::new_readonly(ids.system_program, false),
        ],
        InstructionKind::RemoveFromGroupEntry.discriminator().to_vec(),
    ))
}

pub fn build_init_ungrouping(
    ids: &ProgramIds,
    group_entry: &Address,
    authority: &Address,
) -> Result<SolInstruction> {
    Ok(instruction(
        ids,
        InstructionKind::InitUngrouping,
        vec![
            SolAccountMeta::new(*group_entry, false),
            SolAccountMeta::new_readonly(*authority, true),
        ],
        InstructionKind::InitUngrouping.discriminator().to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 32])
    }

    fn transfer_accounts() -> TransferAccounts {
        TransferAccounts {
            stake_entry: addr(1),
            stake_pool: addr(2),
            stake_entry_original_mint_token_account: addr(3),
            original_mint: addr(4),
            user: addr(5),
            user_original_mint_token_account: addr(6),
        }
    }

    #[test]
    fn stake_encodes_amount() {
        let ids = ProgramIds::default();
        let ix = build_stake(&ids, &transfer_accounts(), 3).unwrap();
        assert_eq!(ix.program_id, ids.stake_pool);
        assert_eq!(&ix.data[..8], &InstructionKind::Stake.discriminator());
        assert_eq!(&ix.data[8..], &3u64.to_le_bytes());

        let signers: Vec<_> = ix.accounts.iter().filter(|m| m.is_signer).map(|m| m.pubkey).collect();
        assert_eq!(signers, vec![addr(5)]);
    }

    #[test]
    fn unstake_attaches_stake_mint_account_read_only() {
        let ids = ProgramIds::default();
        let plain = build_unstake(&ids, &transfer_accounts(), None).unwrap();
        assert_eq!(plain.accounts.len(), 7);
        assert_eq!(plain.accounts[0].pubkey, addr(2));

        let with_mint = build_unstake(&ids, &transfer_accounts(), Some(&addr(9))).unwrap();
        assert_eq!(with_mint.accounts.len(), 8);
        let last = with_mint.accounts.last().unwrap();
        assert_eq!(last.pubkey, addr(9));
        assert!(!last.is_writable);
        assert_eq!(with_mint.data, InstructionKind::Unstake.discriminator().to_vec());
    }

    #[test]
    fn init_entry_passes_user_and_authorization() {
        let ids = ProgramIds::default();
        let accounts = InitEntryAccounts {
            stake_entry: addr(1),
            stake_pool: addr(2),
            original_mint: addr(3),
            original_mint_metadata: addr(4),
            payer: addr(5),
            stake_authorization: addr(6),
        };
        let ix = build_init_entry(&ids, &accounts, &addr(5)).unwrap();
        assert_eq!(&ix.data[8..], addr(5).as_bytes());
        let last = ix.accounts.last().unwrap();
        assert_eq!(last.pubkey, addr(6));
        assert!(!last.is_writable && !last.is_signer);
    }

    #[test]
    fn programmable_accounts_use_configured_programs() {
        let ids = ProgramIds::default();
        let accounts = ProgrammableAccounts {
            stake_entry: addr(1),
            stake_pool: addr(2),
            original_mint: addr(3),
            user: addr(4),
            user_original_mint_token_account: addr(5),
            user_original_mint_token_record: addr(6),
            mint_metadata: addr(7),
            mint_edition: addr(8),
            authorization_rules: addr(9),
        };
        let stake = build_stake_programmable(&ids, &accounts, 1).unwrap();
        let unstake = build_unstake_programmable(&ids, &accounts).unwrap();
        assert_eq!(stake.accounts, unstake.accounts);
        assert_eq!(stake.accounts.len(), 14);
        assert!(stake.accounts.iter().any(|m| m.pubkey == ids.token_auth_rules));
        assert!(stake.accounts.iter().any(|m| m.pubkey == ids.sysvar_instructions));
        assert_eq!(unstake.data.len(), 8);
    }

    #[test]
    fn return_receipt_ends_with_entry_token_account() {
        let ids = ProgramIds::default();
        let accounts = ReturnReceiptMintAccounts {
            stake_entry: addr(1),
            receipt_mint: addr(2),
            token_manager: addr(3),
            token_manager_token_account: addr(4),
            user_receipt_mint_token_account: addr(5),
            user: addr(6),
            stake_entry_receipt_mint_token_account: addr(7),
        };
        let kind = vec![SolAccountMeta::new(addr(8), false)];
        let ix = build_return_receipt_mint(&ids, &accounts, kind).unwrap();
        let n = ix.accounts.len();
        assert_eq!(ix.accounts[n - 2].pubkey, addr(8));
        assert_eq!(ix.accounts[n - 1].pubkey, addr(7));
        assert!(ix.accounts[n - 1].is_writable);
        assert!(ix.accounts.iter().any(|m| m.pubkey == ids.receipt_collector && m.is_writable));
    }

    #[test]
    fn init_pool_args_follow_wire_order() {
        let ids = ProgramIds::default();
        let args = InitPoolArgs {
            overlay_text: "STAKED".into(),
            image_uri: String::new(),
            requires_collections: vec![],
            requires_creators: vec![addr(3)],
            requires_authorization: false,
            authority: addr(1),
            reset_on_stake: false,
            cooldown_seconds: None,
            min_stake_seconds: Some(60),
            end_date: None,
            double_or_reset_enabled: None,
        };
        let ix = build_init_pool(&ids, &addr(7), &addr(8), &addr(1), &args).unwrap();
        let mut body = &ix.data[8..];
        assert_eq!(u32::from_le_bytes(body[..4].try_into().unwrap()), 6);
        body = &body[4..];
        assert_eq!(&body[..6], b"STAKED");
    }

    #[test]
    fn group_id_must_sign() {
        let ids = ProgramIds::default();
        let ix = build_init_group_entry(&ids, &addr(1), &addr(2), &addr(3), &InitGroupEntryArgs::default()).unwrap();
        assert!(ix.accounts[1].is_signer && !ix.accounts[1].is_writable);
        assert_eq!(&ix.data[8..], &[0, 0]);
    }
}
