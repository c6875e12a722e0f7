use std::collections::BTreeMap;

use chain_sol::{
    build_create_associated_token_account_idempotent, derive_associated_token_address, Address,
};
use log::{debug, info, warn};

use super::{Ensured, StakeClient, UnsignedTransaction};
use crate::accounts::{decode_optional, AccountData, AccountReader, RewardDistributor, RewardEntry};
use crate::error::{Result, StakeSdkError};
use crate::instructions::{
    build_claim_rewards, build_init_reward_entry, build_update_total_stake_seconds,
    ClaimRewardsAccounts,
};
use crate::pda::{find_reward_distributor_id, find_reward_entry_id};

/// One stake entry to claim for, with the pool it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRewardsRequest {
    pub stake_pool: Address,
    pub stake_entry: Address,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimRewardsOptions {
    /// Owner of the reward token account; defaults to the wallet.
    pub last_staker: Option<Address>,
    /// Pays for account creation and signs the claim; defaults to the wallet.
    pub payer: Option<Address>,
}

impl<R: AccountReader> StakeClient<R> {
    /// Claim rewards for each request in its own transaction.
    ///
    /// Distributors and reward entries for the whole batch are read
    /// together. The outer `Err` is a failed read; after that each request
    /// succeeds or fails on its own, in request order.
    pub async fn claim_rewards(
        &self,
        requests: &[ClaimRewardsRequest],
        options: ClaimRewardsOptions,
    ) -> Result<Vec<Result<UnsignedTransaction>>> {
        let ids = self.ids();

        let mut distributor_ids: BTreeMap<Address, Address> = BTreeMap::new();
        for request in requests {
            if !distributor_ids.contains_key(&request.stake_pool) {
                distributor_ids.insert(request.stake_pool, find_reward_distributor_id(ids, &request.stake_pool)?);
            }
        }
        let reward_entry_ids = requests
            .iter()
            .map(|r| find_reward_entry_id(ids, &distributor_ids[&r.stake_pool], &r.stake_entry))
            .collect::<Result<Vec<_>>>()?;

        let mut addresses: Vec<Address> = distributor_ids.values().copied().collect();
        addresses.extend_from_slice(&reward_entry_ids);
        let mut slots = self.read(&addresses).await?;
        let reward_entry_slots = slots.split_off(distributor_ids.len());
        let distributor_slots: BTreeMap<Address, Option<AccountData>> =
            distributor_ids.values().copied().zip(slots).collect();

        let results: Vec<Result<UnsignedTransaction>> = requests
            .iter()
            .zip(reward_entry_ids.iter().zip(&reward_entry_slots))
            .map(|(request, (reward_entry_id, reward_entry_slot))| {
                let distributor_id = distributor_ids[&request.stake_pool];
                let result = self.claim_one(
                    request,
                    &options,
                    &distributor_id,
                    distributor_slots.get(&distributor_id).and_then(Option::as_ref),
                    reward_entry_id,
                    reward_entry_slot.as_ref(),
                );
                if let Err(e) = &result {
                    warn!("claim_rewards: stake entry {} skipped: {e}", request.stake_entry);
                }
                result
            })
            .collect();

        let ok = results.iter().filter(|r| r.is_ok()).count();
        info!("claim_rewards: {ok} of {} transactions composed", results.len());
        Ok(results)
    }

    fn claim_one(
        &self,
        request: &ClaimRewardsRequest,
        options: &ClaimRewardsOptions,
        distributor_id: &Address,
        distributor_account: Option<&AccountData>,
        reward_entry_id: &Address,
        reward_entry_account: Option<&AccountData>,
    ) -> Result<UnsignedTransaction> {
        let ids = self.ids();
        let distributor = decode_optional::<RewardDistributor>(distributor_id, distributor_account)?
            .ok_or_else(|| StakeSdkError::precondition("No reward distributor found"))?;
        let reward_entry = decode_optional::<RewardEntry>(reward_entry_id, reward_entry_account)?;

        let payer = options.payer.unwrap_or(self.wallet);
        let owner = options.last_staker.unwrap_or(self.wallet);
        let reward_mint = distributor.reward_mint;
        let user_reward_account = derive_associated_token_address(&owner, &reward_mint)?;

        let mut tx = UnsignedTransaction::new();
        tx.push(build_update_total_stake_seconds(ids, &request.stake_entry, &self.wallet)?);
        tx.push(build_create_associated_token_account_idempotent(
            &payer,
            &user_reward_account,
            &owner,
            &reward_mint,
        ));
        Ensured::new(*reward_entry_id, reward_entry.as_ref(), || {
            debug!("reward entry {reward_entry_id} absent, adding init");
            build_init_reward_entry(ids, reward_entry_id, &request.stake_entry, distributor_id, &payer)
        })?
        .apply(&mut tx);

        let accounts = ClaimRewardsAccounts {
            reward_entry: *reward_entry_id,
            reward_distributor: *distributor_id,
            stake_entry: request.stake_entry,
            stake_pool: request.stake_pool,
            reward_mint,
            user_reward_mint_token_account: user_reward_account,
            user: payer,
        };
        tx.push(build_claim_rewards(ids, &accounts)?);
        Ok(tx)
    }
}
