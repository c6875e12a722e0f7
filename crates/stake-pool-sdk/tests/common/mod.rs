//! Shared ledger fixtures for workflow tests.

#![allow(dead_code)]

use borsh::BorshSerialize;
use chain_sol::Address;
use stake_pool_sdk::accounts::metadata::METADATA_V1_KEY;
use stake_pool_sdk::accounts::{
    account_discriminator, AccountData, MemoryLedger, ProgramAccount, RewardDistributor, StakeEntry, StakePool,
};
use stake_pool_sdk::workflow::{FixedClock, StakeClient};
use stake_pool_sdk::SdkConfig;

pub const NOW: i64 = 1_700_000_000;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn addr(byte: u8) -> Address {
    Address::new([byte; 32])
}

pub fn wallet() -> Address {
    addr(0xAA)
}

pub fn client() -> StakeClient<MemoryLedger> {
    init_logger();
    StakeClient::new(MemoryLedger::new(), SdkConfig::default(), wallet()).with_clock(FixedClock(NOW))
}

/// Anchor layout: discriminator then the Borsh body.
pub fn program_account<T: ProgramAccount + BorshSerialize>(owner: Address, record: &T) -> AccountData {
    let mut data = account_discriminator(T::NAME).to_vec();
    data.extend(borsh::to_vec(record).expect("borsh encode"));
    AccountData {
        owner,
        lamports: 1_000_000,
        data,
    }
}

pub fn mint_account(token_program: Address, supply: u64) -> AccountData {
    let mut data = vec![0u8; 82];
    data[36..44].copy_from_slice(&supply.to_le_bytes());
    data[45] = 1;
    AccountData {
        owner: token_program,
        lamports: 1_461_600,
        data,
    }
}

pub fn pool(identifier: u64, cooldown_seconds: Option<u32>) -> StakePool {
    StakePool {
        bump: 255,
        identifier,
        authority: addr(1),
        requires_creators: vec![],
        requires_collections: vec![],
        requires_authorization: false,
        overlay_text: String::new(),
        image_uri: String::new(),
        reset_on_stake: false,
        total_staked: 0,
        cooldown_seconds,
        min_stake_seconds: None,
        end_date: None,
        double_or_reset_enabled: None,
    }
}

pub fn stake_entry(pool: Address, original_mint: Address) -> StakeEntry {
    StakeEntry {
        bump: 254,
        pool,
        amount: 0,
        original_mint,
        original_mint_claimed: false,
        last_staker: Address::ZERO,
        last_staked_at: 0,
        total_stake_seconds: 0,
        stake_mint_claimed: false,
        kind: 0,
        stake_mint: None,
        cooldown_start_seconds: None,
        last_updated_at: None,
        grouping: None,
    }
}

pub fn reward_distributor(stake_pool: Address, reward_mint: Address) -> RewardDistributor {
    RewardDistributor {
        bump: 253,
        stake_pool,
        kind: 1,
        authority: addr(1),
        reward_mint,
        reward_amount: 1,
        reward_duration_seconds: 1,
        rewards_issued: 0,
        max_supply: None,
        default_multiplier: 1,
        multiplier_decimals: 0,
        max_reward_seconds_received: None,
    }
}

fn borsh_string(out: &mut Vec<u8>, s: &str) {
    out.extend((s.len() as u32).to_le_bytes());
    out.extend(s.as_bytes());
}

/// A programmable non-fungible's metadata gated by `rule_set`.
pub fn programmable_metadata(token_metadata: Address, mint: &Address, rule_set: &Address) -> AccountData {
    let mut data = vec![METADATA_V1_KEY];
    data.extend([5u8; 32]);
    data.extend(mint.to_bytes());
    borsh_string(&mut data, "Locked #7");
    borsh_string(&mut data, "LCK");
    borsh_string(&mut data, "https://example.com/7.json");
    data.extend(0u16.to_le_bytes());
    data.push(0); // creators
    data.push(0); // primary_sale_happened
    data.push(1); // is_mutable
    data.extend([1, 255]); // edition_nonce
    data.extend([1, 4]); // token_standard: ProgrammableNonFungible
    data.extend([0, 0, 0]); // collection, uses, collection_details
    data.extend([1, 0, 1]);
    data.extend(rule_set.to_bytes());
    AccountData {
        owner: token_metadata,
        lamports: 5_616_720,
        data,
    }
}
