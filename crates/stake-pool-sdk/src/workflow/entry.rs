use chain_sol::{derive_associated_token_address, Address};
use log::{debug, info};

use super::{Ensured, StakeClient, UnsignedTransaction};
use crate::accounts::{decode_optional, AccountReader, RewardDistributor, RewardEntry, StakePool};
use crate::error::{Result, StakeSdkError};
use crate::instructions::{
    build_init_entry, build_init_reward_entry, build_init_stake_mint, build_update_reward_entry,
    InitEntryAccounts, InitStakeMintAccounts, InitStakeMintArgs,
};
use crate::pda::{
    find_mint_manager_id, find_mint_metadata_id, find_reward_distributor_id, find_reward_entry_id,
    find_stake_authorization_id,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStakeEntryAndStakeMintParams {
    pub stake_pool: Address,
    pub original_mint: Address,
    /// Fresh address for the receipt mint. The caller holds its key and
    /// signs with it; it is only used when the entry has no stake mint yet.
    pub stake_mint: Address,
    /// Defaults to `POOL<identifier> RECEIPT`.
    pub receipt_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeRewardEntryParams {
    pub stake_pool: Address,
    pub original_mint: Address,
    /// Defaults to 1.
    pub multiplier: Option<u64>,
}

impl<R: AccountReader> StakeClient<R> {
    /// Create the stake entry for `original_mint` in `stake_pool`.
    pub async fn create_stake_entry(
        &self,
        stake_pool: &Address,
        original_mint: &Address,
    ) -> Result<(UnsignedTransaction, Address)> {
        let resolved = self.resolve_entry(stake_pool, original_mint, &[]).await?;
        let mut tx = UnsignedTransaction::new();
        tx.push(build_init_entry(
            self.ids(),
            &self.init_entry_accounts(stake_pool, original_mint, &resolved.stake_entry)?,
            &self.wallet,
        )?);
        info!("create_stake_entry: {} for mint {original_mint}", resolved.stake_entry);
        Ok((tx, resolved.stake_entry))
    }

    /// Create the stake entry if needed, then its receipt mint if it has
    /// none. Returns the stake mint address when one is created; the caller
    /// must sign with it.
    pub async fn create_stake_entry_and_stake_mint(
        &self,
        params: CreateStakeEntryAndStakeMintParams,
    ) -> Result<(UnsignedTransaction, Address, Option<Address>)> {
        let ids = self.ids();
        let resolved = self
            .resolve_entry(&params.stake_pool, &params.original_mint, &[params.stake_pool])
            .await?;
        let stake_entry = resolved.stake_entry;

        let mut tx = UnsignedTransaction::new();
        if resolved.entry.is_none() {
            debug!("stake entry {stake_entry} absent, adding init");
            tx.push(build_init_entry(
                ids,
                &self.init_entry_accounts(&params.stake_pool, &params.original_mint, &stake_entry)?,
                &self.wallet,
            )?);
        }

        let has_stake_mint = resolved.entry.as_ref().and_then(|e| e.stake_mint).is_some();
        if has_stake_mint {
            debug!("stake entry {stake_entry} already has a stake mint");
            info!("create_stake_entry_and_stake_mint: {} instructions", tx.len());
            return Ok((tx, stake_entry, None));
        }

        let pool = decode_optional::<StakePool>(&params.stake_pool, resolved.extra[0].as_ref())?
            .ok_or_else(|| StakeSdkError::precondition("Stake pool not found"))?;
        let stake_mint = params.stake_mint;
        let args = InitStakeMintArgs {
            name: params
                .receipt_name
                .unwrap_or_else(|| format!("POOL{} RECEIPT", pool.identifier)),
            symbol: format!("POOL{}", pool.identifier),
        };
        let accounts = InitStakeMintAccounts {
            stake_entry,
            stake_pool: params.stake_pool,
            original_mint: params.original_mint,
            original_mint_metadata: find_mint_metadata_id(ids, &params.original_mint)?,
            stake_mint,
            stake_mint_metadata: find_mint_metadata_id(ids, &stake_mint)?,
            stake_entry_stake_mint_token_account: derive_associated_token_address(&stake_entry, &stake_mint)?,
            mint_manager: find_mint_manager_id(ids, &stake_mint)?,
            payer: self.wallet,
        };
        tx.push(build_init_stake_mint(ids, &accounts, &args)?);
        tx.add_signer(stake_mint);

        info!(
            "create_stake_entry_and_stake_mint: stake mint {stake_mint}, {} instructions",
            tx.len()
        );
        Ok((tx, stake_entry, Some(stake_mint)))
    }

    /// Make sure the entry and its reward entry exist, then set the reward
    /// multiplier.
    pub async fn initialize_reward_entry(&self, params: InitializeRewardEntryParams) -> Result<UnsignedTransaction> {
        let ids = self.ids();
        let distributor_id = find_reward_distributor_id(ids, &params.stake_pool)?;
        let resolved = self
            .resolve_entry(&params.stake_pool, &params.original_mint, &[distributor_id])
            .await?;
        let stake_entry = resolved.stake_entry;
        decode_optional::<RewardDistributor>(&distributor_id, resolved.extra[0].as_ref())?
            .ok_or_else(|| StakeSdkError::precondition("No reward distributor found"))?;

        let mut tx = UnsignedTransaction::new();
        if resolved.entry.is_none() {
            debug!("stake entry {stake_entry} absent, adding init");
            tx.push(build_init_entry(
                ids,
                &self.init_entry_accounts(&params.stake_pool, &params.original_mint, &stake_entry)?,
                &self.wallet,
            )?);
        }

        let reward_entry_id = find_reward_entry_id(ids, &distributor_id, &stake_entry)?;
        let existing = match resolved.entry {
            Some(_) => self.fetch::<RewardEntry>(&reward_entry_id).await?,
            None => None,
        };
        let reward_entry = Ensured::new(reward_entry_id, existing.as_ref(), || {
            debug!("reward entry {reward_entry_id} absent, adding init");
            build_init_reward_entry(ids, &reward_entry_id, &stake_entry, &distributor_id, &self.wallet)
        })?
        .apply(&mut tx);

        tx.push(build_update_reward_entry(
            ids,
            &reward_entry,
            &distributor_id,
            &self.wallet,
            params.multiplier.unwrap_or(1),
        )?);
        info!("initialize_reward_entry: {reward_entry}, {} instructions", tx.len());
        Ok(tx)
    }

    pub(crate) fn init_entry_accounts(
        &self,
        stake_pool: &Address,
        original_mint: &Address,
        stake_entry: &Address,
    ) -> Result<InitEntryAccounts> {
        let ids = self.ids();
        Ok(InitEntryAccounts {
            stake_entry: *stake_entry,
            stake_pool: *stake_pool,
            original_mint: *original_mint,
            original_mint_metadata: find_mint_metadata_id(ids, original_mint)?,
            payer: self.wallet,
            stake_authorization: find_stake_authorization_id(ids, stake_pool, original_mint)?,
        })
    }
}
