use chain_sol::{
    build_create_associated_token_account_idempotent, derive_associated_token_address, Address,
};
use log::{debug, info};

use super::{StakeClient, UnsignedTransaction};
use crate::accounts::{AccountReader, Identifier, RewardDistributorKind};
use crate::error::Result;
use crate::instructions::{
    build_authorize_mint, build_init_identifier, build_init_pool, build_init_reward_distributor,
    treasury_accounts, InitPoolArgs, InitRewardDistributorAccounts, InitRewardDistributorArgs,
};
use crate::pda::{find_identifier_id, find_reward_distributor_id, find_stake_authorization_id, find_stake_pool_id};

/// Reward distributor settings. Unset fields take the program defaults
/// except amount and duration, which default to one unit per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardDistributorParams {
    pub reward_mint: Address,
    pub reward_amount: Option<u64>,
    pub reward_duration_seconds: Option<u128>,
    pub kind: Option<RewardDistributorKind>,
    pub max_supply: Option<u64>,
    pub supply: Option<u64>,
    pub default_multiplier: Option<u64>,
    pub multiplier_decimals: Option<u8>,
    pub max_reward_seconds_received: Option<u128>,
}

impl RewardDistributorParams {
    pub fn new(reward_mint: Address) -> Self {
        RewardDistributorParams {
            reward_mint,
            reward_amount: None,
            reward_duration_seconds: None,
            kind: None,
            max_supply: None,
            supply: None,
            default_multiplier: None,
            multiplier_decimals: None,
            max_reward_seconds_received: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateStakePoolParams {
    pub requires_collections: Vec<Address>,
    pub requires_creators: Vec<Address>,
    pub requires_authorization: bool,
    pub overlay_text: String,
    pub image_uri: String,
    pub reset_on_stake: bool,
    pub cooldown_seconds: Option<u32>,
    pub min_stake_seconds: Option<u32>,
    pub end_date: Option<i64>,
    pub double_or_reset_enabled: Option<bool>,
    /// Also create the pool's reward distributor in the same transaction.
    pub reward_distributor: Option<RewardDistributorParams>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRewardDistributorParams {
    pub stake_pool: Address,
    pub distributor: RewardDistributorParams,
}

impl<R: AccountReader> StakeClient<R> {
    /// Create a new stake pool under the next free identifier.
    ///
    /// Returns the transaction, the pool address, and the reward
    /// distributor address when one was requested.
    pub async fn create_stake_pool(
        &self,
        params: CreateStakePoolParams,
    ) -> Result<(UnsignedTransaction, Address, Option<Address>)> {
        let ids = self.ids();
        let identifier_id = find_identifier_id(ids)?;
        let identifier = self.fetch::<Identifier>(&identifier_id).await?;

        let mut tx = UnsignedTransaction::new();
        let pool_index = match identifier {
            Some(identifier) => identifier.count,
            None => {
                debug!("identifier counter absent, initializing");
                tx.push(build_init_identifier(ids, &identifier_id, &self.wallet)?);
                1
            }
        };
        let stake_pool = find_stake_pool_id(ids, pool_index)?;

        let args = InitPoolArgs {
            overlay_text: params.overlay_text,
            image_uri: params.image_uri,
            requires_collections: params.requires_collections,
            requires_creators: params.requires_creators,
            requires_authorization: params.requires_authorization,
            authority: self.wallet,
            reset_on_stake: params.reset_on_stake,
            cooldown_seconds: params.cooldown_seconds,
            min_stake_seconds: params.min_stake_seconds,
            end_date: params.end_date,
            double_or_reset_enabled: params.double_or_reset_enabled,
        };
        tx.push(build_init_pool(ids, &stake_pool, &identifier_id, &self.wallet, &args)?);

        let reward_distributor = match params.reward_distributor {
            Some(distributor) => Some(self.push_init_reward_distributor(&mut tx, &stake_pool, &distributor)?),
            None => None,
        };

        info!(
            "create_stake_pool: pool {stake_pool} (index {pool_index}), {} instructions",
            tx.len()
        );
        Ok((tx, stake_pool, reward_distributor))
    }

    pub async fn create_reward_distributor(
        &self,
        params: CreateRewardDistributorParams,
    ) -> Result<(UnsignedTransaction, Address)> {
        let mut tx = UnsignedTransaction::new();
        let distributor = self.push_init_reward_distributor(&mut tx, &params.stake_pool, &params.distributor)?;
        info!("create_reward_distributor: {distributor} for pool {}", params.stake_pool);
        Ok((tx, distributor))
    }

    /// Allow `original_mint` into a pool that requires authorization.
    pub async fn authorize_stake_entry(
        &self,
        stake_pool: &Address,
        original_mint: &Address,
    ) -> Result<UnsignedTransaction> {
        let ids = self.ids();
        let authorization = find_stake_authorization_id(ids, stake_pool, original_mint)?;
        let mut tx = UnsignedTransaction::new();
        tx.push(build_authorize_mint(ids, stake_pool, &authorization, original_mint, &self.wallet)?);
        info!("authorize_stake_entry: mint {original_mint} in pool {stake_pool}");
        Ok(tx)
    }

    fn push_init_reward_distributor(
        &self,
        tx: &mut UnsignedTransaction,
        stake_pool: &Address,
        params: &RewardDistributorParams,
    ) -> Result<Address> {
        let ids = self.ids();
        let distributor = find_reward_distributor_id(ids, stake_pool)?;
        let kind = params.kind.unwrap_or_default();

        if kind == RewardDistributorKind::Treasury {
            let treasury = derive_associated_token_address(&distributor, &params.reward_mint)?;
            tx.push(build_create_associated_token_account_idempotent(
                &self.wallet,
                &treasury,
                &distributor,
                &params.reward_mint,
            ));
        }

        let accounts = InitRewardDistributorAccounts {
            reward_distributor: distributor,
            stake_pool: *stake_pool,
            reward_mint: params.reward_mint,
            authority: self.wallet,
            payer: self.wallet,
        };
        let args = InitRewardDistributorArgs {
            reward_amount: params.reward_amount.unwrap_or(1),
            reward_duration_seconds: params.reward_duration_seconds.unwrap_or(1),
            kind: kind as u8,
            supply: params.supply,
            max_supply: params.max_supply,
            default_multiplier: params.default_multiplier,
            multiplier_decimals: params.multiplier_decimals,
            max_reward_seconds_received: params.max_reward_seconds_received,
        };
        let remaining = treasury_accounts(kind, &distributor, &params.reward_mint, &self.wallet)?;
        tx.push(build_init_reward_distributor(ids, &accounts, &args, remaining)?);
        Ok(distributor)
    }
}
