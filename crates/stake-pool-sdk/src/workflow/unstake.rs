use chain_sol::{
    build_create_associated_token_account_idempotent, derive_associated_token_address, Address,
    SolAccountMeta,
};
use log::{debug, info};

use super::{Ensured, StakeClient, UnsignedTransaction};
use crate::accounts::{
    decode_optional, AccountReader, Metadata, RewardDistributor, RewardEntry, StakeEntry, StakePool,
    TokenManager, TokenManagerState,
};
use crate::error::{Result, StakeSdkError};
use crate::instructions::{
    build_claim_rewards, build_init_reward_entry, build_return_receipt_mint, build_unstake,
    build_unstake_programmable, build_update_total_stake_seconds, receipt_kind_accounts,
    ClaimRewardsAccounts, ProgrammableAccounts, ReturnReceiptMintAccounts, TransferAccounts,
};
use crate::pda::{
    find_mint_edition_id, find_mint_metadata_id, find_reward_distributor_id, find_reward_entry_id,
    find_stake_entry_id, find_token_manager_id, find_token_record_id,
};
use crate::transfer_mode::AssetTransferMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnstakeParams {
    pub stake_pool: Address,
    pub original_mint: Address,
}

/// A claimed receipt goes back into custody only once the pool's cooldown,
/// if any, has run out.
pub fn should_return_receipt(pool: &StakePool, entry: &StakeEntry, now: i64) -> bool {
    match pool.cooldown_seconds {
        None | Some(0) => true,
        Some(cooldown) => entry
            .cooldown_start_seconds
            .is_some_and(|start| now.saturating_sub(start) >= i64::from(cooldown)),
    }
}

impl<R: AccountReader> StakeClient<R> {
    /// Release the asset, settling rewards first.
    ///
    /// When the pool has a reward distributor, stake seconds are updated
    /// and rewards claimed before the terminal unstake, because the entry
    /// stops accruing once the asset leaves.
    pub async fn unstake(&self, params: UnstakeParams) -> Result<UnsignedTransaction> {
        let ids = self.ids();
        let wallet = self.wallet;
        let pool_id = params.stake_pool;
        let original_mint = params.original_mint;

        let metadata_id = find_mint_metadata_id(ids, &original_mint)?;
        let distributor_id = find_reward_distributor_id(ids, &pool_id)?;
        // Reward entries of both stake entry candidates ride along in the
        // same read.
        let reward_entry_single = find_reward_entry_id(
            ids,
            &distributor_id,
            &find_stake_entry_id(ids, &wallet, &pool_id, &original_mint, false)?,
        )?;
        let reward_entry_multi = find_reward_entry_id(
            ids,
            &distributor_id,
            &find_stake_entry_id(ids, &wallet, &pool_id, &original_mint, true)?,
        )?;

        let resolved = self
            .resolve_entry(
                &pool_id,
                &original_mint,
                &[metadata_id, distributor_id, pool_id, reward_entry_single, reward_entry_multi],
            )
            .await?;
        let slots = &resolved.extra;

        let metadata = slots[0]
            .as_ref()
            .map(|account| Metadata::decode(&metadata_id, &account.data))
            .transpose()?;
        let distributor = decode_optional::<RewardDistributor>(&distributor_id, slots[1].as_ref())?;
        let pool = decode_optional::<StakePool>(&pool_id, slots[2].as_ref())?
            .ok_or_else(|| StakeSdkError::precondition("Stake pool not found"))?;
        let (reward_entry_id, reward_entry_slot) = if resolved.fungible {
            (reward_entry_multi, &slots[4])
        } else {
            (reward_entry_single, &slots[3])
        };
        let reward_entry = decode_optional::<RewardEntry>(&reward_entry_id, reward_entry_slot.as_ref())?;

        let stake_entry = resolved.stake_entry;
        let user_token_account = derive_associated_token_address(&wallet, &original_mint)?;

        let mut tx = UnsignedTransaction::new();
        tx.push(build_create_associated_token_account_idempotent(
            &wallet,
            &user_token_account,
            &wallet,
            &original_mint,
        ));

        if let Some(distributor) = &distributor {
            debug!("pool {pool_id} has reward distributor {distributor_id}, claiming before unstake");
            tx.push(build_update_total_stake_seconds(ids, &stake_entry, &wallet)?);
            Ensured::new(reward_entry_id, reward_entry.as_ref(), || {
                debug!("reward entry {reward_entry_id} absent, adding init");
                build_init_reward_entry(ids, &reward_entry_id, &stake_entry, &distributor_id, &wallet)
            })?
            .apply(&mut tx);
            let accounts = ClaimRewardsAccounts {
                reward_entry: reward_entry_id,
                reward_distributor: distributor_id,
                stake_entry,
                stake_pool: pool_id,
                reward_mint: distributor.reward_mint,
                user_reward_mint_token_account: derive_associated_token_address(&wallet, &distributor.reward_mint)?,
                user: wallet,
            };
            tx.push(build_claim_rewards(ids, &accounts)?);
        }

        match AssetTransferMode::resolve(metadata.as_ref()) {
            AssetTransferMode::Programmable { rule_set } => {
                debug!("mint {original_mint} is programmable, unlocking in place");
                let accounts = ProgrammableAccounts {
                    stake_entry,
                    stake_pool: pool_id,
                    original_mint,
                    user: wallet,
                    user_original_mint_token_account: user_token_account,
                    user_original_mint_token_record: find_token_record_id(ids, &original_mint, &user_token_account)?,
                    mint_metadata: metadata_id,
                    mint_edition: find_mint_edition_id(ids, &original_mint)?,
                    authorization_rules: rule_set,
                };
                tx.push(build_unstake_programmable(ids, &accounts)?);
            }
            AssetTransferMode::Standard => {
                let entry = resolved
                    .entry
                    .as_ref()
                    .ok_or_else(|| StakeSdkError::precondition("Stake entry not found"))?;

                if let Some(receipt_mint) = entry.claimed_receipt_mint() {
                    self.push_return_receipt(&mut tx, &pool, &stake_entry, entry, &receipt_mint)
                        .await?;
                }

                let stake_mint_token_account = entry
                    .stake_mint
                    .map(|stake_mint| derive_associated_token_address(&stake_entry, &stake_mint))
                    .transpose()?;
                let accounts = TransferAccounts {
                    stake_entry,
                    stake_pool: pool_id,
                    stake_entry_original_mint_token_account: derive_associated_token_address(
                        &stake_entry,
                        &original_mint,
                    )?,
                    original_mint,
                    user: wallet,
                    user_original_mint_token_account: user_token_account,
                };
                tx.push(build_unstake(ids, &accounts, stake_mint_token_account.as_ref())?);
            }
        }

        info!("unstake: mint {original_mint} from pool {pool_id}, {} instructions", tx.len());
        Ok(tx)
    }

    async fn push_return_receipt(
        &self,
        tx: &mut UnsignedTransaction,
        pool: &StakePool,
        stake_entry: &Address,
        entry: &StakeEntry,
        receipt_mint: &Address,
    ) -> Result<()> {
        let ids = self.ids();
        let wallet = self.wallet;
        let token_manager_id = find_token_manager_id(ids, receipt_mint)?;
        let Some(token_manager) = self.fetch::<TokenManager>(&token_manager_id).await? else {
            debug!("no token manager for receipt {receipt_mint}, nothing to return");
            return Ok(());
        };
        if !should_return_receipt(pool, entry, self.now()) {
            debug!("receipt {receipt_mint} still cooling down");
            return Ok(());
        }

        let kind_accounts: Vec<SolAccountMeta> = match (token_manager.state(), token_manager.kind()) {
            (Some(TokenManagerState::Claimed), Some(kind)) => receipt_kind_accounts(ids, receipt_mint, kind)?,
            _ => Vec::new(),
        };
        let accounts = ReturnReceiptMintAccounts {
            stake_entry: *stake_entry,
            receipt_mint: *receipt_mint,
            token_manager: token_manager_id,
            token_manager_token_account: derive_associated_token_address(&token_manager_id, receipt_mint)?,
            user_receipt_mint_token_account: derive_associated_token_address(&wallet, receipt_mint)?,
            user: wallet,
            stake_entry_receipt_mint_token_account: derive_associated_token_address(stake_entry, receipt_mint)?,
        };
        tx.push(build_return_receipt_mint(ids, &accounts, kind_accounts)?);
        debug!("returning receipt {receipt_mint} to custody");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(cooldown: Option<u32>) -> StakePool {
        StakePool {
            bump: 254,
            identifier: 1,
            authority: Address::new([1; 32]),
            requires_creators: vec![],
            requires_collections: vec![],
            requires_authorization: false,
            overlay_text: String::new(),
            image_uri: String::new(),
            reset_on_stake: false,
            total_staked: 1,
            cooldown_seconds: cooldown,
            min_stake_seconds: None,
            end_date: None,
            double_or_reset_enabled: None,
        }
    }

    fn entry(cooldown_start: Option<i64>) -> StakeEntry {
        StakeEntry {
            bump: 255,
            pool: Address::new([2; 32]),
            amount: 1,
            original_mint: Address::new([3; 32]),
            original_mint_claimed: true,
            last_staker: Address::new([4; 32]),
            last_staked_at: 0,
            total_stake_seconds: 0,
            stake_mint_claimed: false,
            kind: 0,
            stake_mint: None,
            cooldown_start_seconds: cooldown_start,
            last_updated_at: None,
            grouping: None,
        }
    }

    #[test]
    fn no_cooldown_returns_immediately() {
        assert!(should_return_receipt(&pool(None), &entry(None), 0));
        assert!(should_return_receipt(&pool(Some(0)), &entry(None), 0));
    }

    #[test]
    fn cooldown_must_elapse() {
        let p = pool(Some(100));
        assert!(!should_return_receipt(&p, &entry(None), 1_000));
        assert!(!should_return_receipt(&p, &entry(Some(950)), 1_000));
        assert!(should_return_receipt(&p, &entry(Some(900)), 1_000));
    }

    #[test]
    fn corrupt_cooldown_start_does_not_overflow() {
        let p = pool(Some(100));
        assert!(should_return_receipt(&p, &entry(Some(i64::MIN)), 1_000));
        assert!(!should_return_receipt(&p, &entry(Some(i64::MAX)), -1_000));
    }
}
