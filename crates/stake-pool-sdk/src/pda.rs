//! Program-derived addresses of every account the SDK touches.
//!
//! Seeds must match the external programs byte for byte; a wrong seed shows
//! up later as an account that is never found or fails to decode.

use chain_sol::{find_program_address, Address};

use crate::config::ProgramIds;
use crate::error::Result;

pub const IDENTIFIER_SEED: &[u8] = b"identifier";
pub const STAKE_POOL_SEED: &[u8] = b"stake-pool";
pub const STAKE_ENTRY_SEED: &[u8] = b"stake-entry";
pub const STAKE_AUTHORIZATION_SEED: &[u8] = b"stake-authorization";
pub const GROUP_ENTRY_SEED: &[u8] = b"group-entry";
pub const REWARD_DISTRIBUTOR_SEED: &[u8] = b"reward-distributor";
pub const REWARD_ENTRY_SEED: &[u8] = b"reward-entry";
pub const GROUP_REWARD_DISTRIBUTOR_SEED: &[u8] = b"group-reward-distributor";
pub const GROUP_REWARD_ENTRY_SEED: &[u8] = b"group-reward-entry";
pub const GROUP_REWARD_COUNTER_SEED: &[u8] = b"group-reward-counter";
pub const METADATA_SEED: &[u8] = b"metadata";
pub const EDITION_SEED: &[u8] = b"edition";
pub const TOKEN_RECORD_SEED: &[u8] = b"token_record";
pub const TOKEN_MANAGER_SEED: &[u8] = b"token-manager";
pub const MINT_COUNTER_SEED: &[u8] = b"mint-counter";
pub const MINT_MANAGER_SEED: &[u8] = b"mint-manager";

fn derive(seeds: &[&[u8]], program_id: &Address) -> Result<Address> {
    Ok(find_program_address(seeds, program_id)?.0)
}

/// The staker-specific seed of a stake entry.
///
/// Multi-supply (fungible) mints get one entry per staker; single-supply
/// mints share one entry keyed by the zero address, whoever stakes them.
pub fn stake_seed(mint_supply: u64, user: &Address) -> Address {
    if mint_supply > 1 {
        *user
    } else {
        Address::ZERO
    }
}

pub fn find_identifier_id(ids: &ProgramIds) -> Result<Address> {
    derive(&[IDENTIFIER_SEED], &ids.stake_pool)
}

pub fn find_stake_pool_id(ids: &ProgramIds, identifier: u64) -> Result<Address> {
    derive(&[STAKE_POOL_SEED, &identifier.to_le_bytes()], &ids.stake_pool)
}

/// Stake entry for `(pool, mint)`; `fungible` selects the per-staker variant.
pub fn find_stake_entry_id(
    ids: &ProgramIds,
    user: &Address,
    stake_pool: &Address,
    original_mint: &Address,
    fungible: bool,
) -> Result<Address> {
    let seed = if fungible { *user } else { Address::ZERO };
    derive(
        &[
            STAKE_ENTRY_SEED,
            stake_pool.as_ref(),
            original_mint.as_ref(),
            seed.as_ref(),
        ],
        &ids.stake_pool,
    )
}

pub fn find_stake_authorization_id(
    ids: &ProgramIds,
    stake_pool: &Address,
    mint: &Address,
) -> Result<Address> {
    derive(
        &[STAKE_AUTHORIZATION_SEED, stake_pool.as_ref(), mint.as_ref()],
        &ids.stake_pool,
    )
}

pub fn find_group_entry_id(ids: &ProgramIds, group_id: &Address) -> Result<Address> {
    derive(&[GROUP_ENTRY_SEED, group_id.as_ref()], &ids.stake_pool)
}

pub fn find_reward_distributor_id(ids: &ProgramIds, stake_pool: &Address) -> Result<Address> {
    derive(
        &[REWARD_DISTRIBUTOR_SEED, stake_pool.as_ref()],
        &ids.reward_distributor,
    )
}

pub fn find_reward_entry_id(
    ids: &ProgramIds,
    reward_distributor: &Address,
    stake_entry: &Address,
) -> Result<Address> {
    derive(
        &[
            REWARD_ENTRY_SEED,
            reward_distributor.as_ref(),
            stake_entry.as_ref(),
        ],
        &ids.reward_distributor,
    )
}

pub fn find_group_reward_distributor_id(ids: &ProgramIds, id: &Address) -> Result<Address> {
    derive(
        &[GROUP_REWARD_DISTRIBUTOR_SEED, id.as_ref()],
        &ids.group_reward_distributor,
    )
}

pub fn find_group_reward_entry_id(
    ids: &ProgramIds,
    group_reward_distributor: &Address,
    group_entry: &Address,
) -> Result<Address> {
    derive(
        &[
            GROUP_REWARD_ENTRY_SEED,
            group_reward_distributor.as_ref(),
            group_entry.as_ref(),
        ],
        &ids.group_reward_distributor,
    )
}

pub fn find_group_reward_counter_id(
    ids: &ProgramIds,
    group_reward_distributor: &Address,
    authority: &Address,
) -> Result<Address> {
    derive(
        &[
            GROUP_REWARD_COUNTER_SEED,
            group_reward_distributor.as_ref(),
            authority.as_ref(),
        ],
        &ids.group_reward_distributor,
    )
}

pub fn find_mint_metadata_id(ids: &ProgramIds, mint: &Address) -> Result<Address> {
    derive(
        &[METADATA_SEED, ids.token_metadata.as_ref(), mint.as_ref()],
        &ids.token_metadata,
    )
}

pub fn find_mint_edition_id(ids: &ProgramIds, mint: &Address) -> Result<Address> {
    derive(
        &[
            METADATA_SEED,
            ids.token_metadata.as_ref(),
            mint.as_ref(),
            EDITION_SEED,
        ],
        &ids.token_metadata,
    )
}

pub fn find_token_record_id(
    ids: &ProgramIds,
    mint: &Address,
    token_account: &Address,
) -> Result<Address> {
    derive(
        &[
            METADATA_SEED,
            ids.token_metadata.as_ref(),
            mint.as_ref(),
            TOKEN_RECORD_SEED,
            token_account.as_ref(),
        ],
        &ids.token_metadata,
    )
}

pub fn find_token_manager_id(ids: &ProgramIds, mint: &Address) -> Result<Address> {
    derive(&[TOKEN_MANAGER_SEED, mint.as_ref()], &ids.token_manager)
}

pub fn find_mint_counter_id(ids: &ProgramIds, mint: &Address) -> Result<Address> {
    derive(&[MINT_COUNTER_SEED, mint.as_ref()], &ids.token_manager)
}

pub fn find_mint_manager_id(ids: &ProgramIds, mint: &Address) -> Result<Address> {
    derive(&[MINT_MANAGER_SEED, mint.as_ref()], &ids.token_manager)
}
