//! SPL Token helpers for Solana.
//!
//! Associated token account (ATA) address derivation and the idempotent
//! ATA creation instruction, without pulling in the `spl-token` or
//! `spl-associated-token-account` crates.

use crate::address::Address;
use crate::error::SolError;
use crate::pda::find_program_address;
use crate::program_ids::{ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID};
use crate::transaction::{SolAccountMeta, SolInstruction};

/// Associated Token Account program `CreateIdempotent` instruction index.
const CREATE_IDEMPOTENT_IX_INDEX: u8 = 1;

/// Derive the associated token account address for a wallet + mint pair.
///
/// The ATA is a Program Derived Address (PDA) with seeds:
///   `[wallet_address, token_program_id, mint_address]`
/// derived from the Associated Token Account program. The owner may itself
/// be a PDA (a stake entry, a token manager); the seeds do not care.
pub fn derive_associated_token_address(
    wallet: &Address,
    mint: &Address,
) -> Result<Address, SolError> {
    find_program_address(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Build an Associated Token Account `CreateIdempotent` instruction.
///
/// Creates the ATA for `owner` + `mint` if it does not exist and succeeds
/// without changes if it does, so it is safe to include unconditionally.
///
/// # Wire format
///
/// Single data byte `1`. Accounts: payer, ata, owner, mint, system program,
/// token program.
pub fn build_create_associated_token_account_idempotent(
    payer: &Address,
    associated_account: &Address,
    owner: &Address,
    mint: &Address,
) -> SolInstruction {
    SolInstruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::new(*payer, true),
            SolAccountMeta::new(*associated_account, false),
            SolAccountMeta::new_readonly(*owner, false),
            SolAccountMeta::new_readonly(*mint, false),
            SolAccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: vec![CREATE_IDEMPOTENT_IX_INDEX],
    }
}
