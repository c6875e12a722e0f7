use chain_sol::{
    build_create_associated_token_account_idempotent, derive_associated_token_address, Address,
    SolAccountMeta,
};
use log::{debug, info};

use super::{StakeClient, UnsignedTransaction};
use crate::accounts::{
    decode_optional, AccountReader, GroupRewardCounter, GroupRewardDistributor,
    GroupRewardDistributorKind, GroupRewardDistributorMetadataKind, GroupRewardDistributorPoolKind,
    GroupRewardEntry, StakeEntry,
};
use crate::error::{Result, StakeSdkError};
use crate::instructions::{
    build_add_to_group_entry, build_claim_group_rewards, build_close_group_reward_entry,
    build_init_group_entry, build_init_group_reward_counter, build_init_group_reward_distributor,
    build_init_group_reward_entry, build_init_ungrouping, build_remove_from_group_entry,
    build_update_group_reward_distributor, group_treasury_accounts, GroupMemberAccounts,
    GroupRewardEntryAccounts, InitGroupEntryArgs, InitGroupRewardDistributorArgs,
    UpdateGroupRewardDistributorArgs,
};
use crate::pda::{
    find_group_entry_id, find_group_reward_counter_id, find_group_reward_distributor_id,
    find_group_reward_entry_id, find_mint_metadata_id, find_reward_distributor_id,
    find_reward_entry_id,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupEntryParams {
    /// Fresh key seeding the group address; the caller signs with it.
    pub group_id: Address,
    pub stake_entries: Vec<Address>,
    pub group_cooldown_seconds: Option<u32>,
    pub group_stake_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupRewardDistributorParams {
    /// Fresh key seeding the distributor address; the caller signs with it.
    pub id: Address,
    pub reward_mint: Address,
    pub authorized_pools: Vec<Address>,
    /// Defaults to 1.
    pub reward_amount: Option<u64>,
    /// Defaults to 1.
    pub reward_duration_seconds: Option<u128>,
    pub reward_kind: GroupRewardDistributorKind,
    pub pool_kind: GroupRewardDistributorPoolKind,
    pub metadata_kind: GroupRewardDistributorMetadataKind,
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

impl CreateGroupRewardDistributorParams {
    pub fn new(id: Address, reward_mint: Address, authorized_pools: Vec<Address>) -> Self {
        CreateGroupRewardDistributorParams {
            id,
            reward_mint,
            authorized_pools,
            reward_amount: None,
            reward_duration_seconds: None,
            reward_kind: GroupRewardDistributorKind::default(),
            pool_kind: GroupRewardDistributorPoolKind::default(),
            metadata_kind: GroupRewardDistributorMetadataKind::default(),
            supply: None,
            base_adder: None,
            base_adder_decimals: None,
            base_multiplier: None,
            base_multiplier_decimals: None,
            multiplier_decimals: None,
            max_supply: None,
            min_cooldown_seconds: None,
            min_stake_seconds: None,
            group_count_multiplier: None,
            group_count_multiplier_decimals: None,
            min_group_size: None,
            max_reward_seconds_received: None,
        }
    }
}

/// Fields left `None` keep the distributor's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateGroupRewardDistributorParams {
    pub group_reward_distributor: Address,
    pub authorized_pools: Option<Vec<Address>>,
    pub reward_amount: Option<u64>,
    pub reward_duration_seconds: Option<u128>,
    pub pool_kind: Option<GroupRewardDistributorPoolKind>,
    pub metadata_kind: Option<GroupRewardDistributorMetadataKind>,
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimGroupRewardsParams {
    pub group_reward_distributor: Address,
    pub group_entry: Address,
    pub stake_entries: Vec<Address>,
}

impl<R: AccountReader> StakeClient<R> {
    /// Create a group and add every listed stake entry to it.
    pub async fn create_group_entry(
        &self,
        params: CreateGroupEntryParams,
    ) -> Result<(UnsignedTransaction, Address)> {
        if params.stake_entries.is_empty() {
            return Err(StakeSdkError::precondition("No stake entry found"));
        }
        let ids = self.ids();
        let group_entry = find_group_entry_id(ids, &params.group_id)?;

        let mut tx = UnsignedTransaction::new();
        let args = InitGroupEntryArgs {
            group_cooldown_seconds: params.group_cooldown_seconds,
            group_stake_seconds: params.group_stake_seconds,
        };
        tx.push(build_init_group_entry(ids, &group_entry, &params.group_id, &self.wallet, &args)?);
        tx.add_signer(params.group_id);
        for stake_entry in &params.stake_entries {
            tx.push(build_add_to_group_entry(ids, &group_entry, stake_entry, &self.wallet)?);
        }

        info!(
            "create_group_entry: {group_entry} with {} members",
            params.stake_entries.len()
        );
        Ok((tx, group_entry))
    }

    pub async fn create_group_reward_distributor(
        &self,
        params: CreateGroupRewardDistributorParams,
    ) -> Result<(UnsignedTransaction, Address)> {
        let ids = self.ids();
        let distributor = find_group_reward_distributor_id(ids, &params.id)?;

        let mut tx = UnsignedTransaction::new();
        if params.reward_kind == GroupRewardDistributorKind::Treasury {
            let treasury = derive_associated_token_address(&distributor, &params.reward_mint)?;
            tx.push(build_create_associated_token_account_idempotent(
                &self.wallet,
                &treasury,
                &distributor,
                &params.reward_mint,
            ));
        }
        let remaining = group_treasury_accounts(params.reward_kind, &distributor, &params.reward_mint, &self.wallet)?;
        let args = InitGroupRewardDistributorArgs {
            reward_amount: params.reward_amount.unwrap_or(1),
            reward_duration_seconds: params.reward_duration_seconds.unwrap_or(1),
            reward_kind: params.reward_kind,
            metadata_kind: params.metadata_kind,
            pool_kind: params.pool_kind,
            authorized_pools: params.authorized_pools,
            supply: params.supply,
            base_adder: params.base_adder,
            base_adder_decimals: params.base_adder_decimals,
            base_multiplier: params.base_multiplier,
            base_multiplier_decimals: params.base_multiplier_decimals,
            multiplier_decimals: params.multiplier_decimals,
            max_supply: params.max_supply,
            min_cooldown_seconds: params.min_cooldown_seconds,
            min_stake_seconds: params.min_stake_seconds,
            group_count_multiplier: params.group_count_multiplier,
            group_count_multiplier_decimals: params.group_count_multiplier_decimals,
            min_group_size: params.min_group_size,
            max_reward_seconds_received: params.max_reward_seconds_received,
        };
        tx.push(build_init_group_reward_distributor(
            ids,
            &distributor,
            &params.id,
            &params.reward_mint,
            &self.wallet,
            &args,
            remaining,
        )?);
        tx.add_signer(params.id);

        info!("create_group_reward_distributor: {distributor}");
        Ok((tx, distributor))
    }

    /// Rewrite a group distributor's settings, keeping unspecified ones.
    pub async fn update_group_reward_distributor(
        &self,
        params: UpdateGroupRewardDistributorParams,
    ) -> Result<UnsignedTransaction> {
        let ids = self.ids();
        let id = params.group_reward_distributor;
        let current = self
            .fetch::<GroupRewardDistributor>(&id)
            .await?
            .ok_or_else(|| StakeSdkError::precondition("Group reward distributor not found"))?;

        let args = UpdateGroupRewardDistributorArgs {
            reward_amount: params.reward_amount.unwrap_or(current.reward_amount),
            reward_duration_seconds: params.reward_duration_seconds.unwrap_or(current.reward_duration_seconds),
            metadata_kind: params.metadata_kind.unwrap_or(current.metadata_kind),
            pool_kind: params.pool_kind.unwrap_or(current.pool_kind),
            authorized_pools: params.authorized_pools.unwrap_or(current.authorized_pools),
            base_adder: params.base_adder.unwrap_or(current.base_adder),
            base_adder_decimals: params.base_adder_decimals.unwrap_or(current.base_adder_decimals),
            base_multiplier: params.base_multiplier.unwrap_or(current.base_multiplier),
            base_multiplier_decimals: params
                .base_multiplier_decimals
                .unwrap_or(current.base_multiplier_decimals),
            multiplier_decimals: params.multiplier_decimals.unwrap_or(current.multiplier_decimals),
            max_supply: params.max_supply.or(current.max_supply),
            min_cooldown_seconds: params.min_cooldown_seconds.unwrap_or(current.min_cooldown_seconds),
            min_stake_seconds: params.min_stake_seconds.unwrap_or(current.min_stake_seconds),
            group_count_multiplier: params.group_count_multiplier.or(current.group_count_multiplier),
            group_count_multiplier_decimals: params
                .group_count_multiplier_decimals
                .or(current.group_count_multiplier_decimals),
            min_group_size: params.min_group_size.or(current.min_group_size),
            max_reward_seconds_received: params
                .max_reward_seconds_received
                .or(current.max_reward_seconds_received),
        };

        let mut tx = UnsignedTransaction::new();
        tx.push(build_update_group_reward_distributor(ids, &id, &self.wallet, &args)?);
        info!("update_group_reward_distributor: {id}");
        Ok(tx)
    }

    /// Claim a group's pooled rewards, creating its reward counter and
    /// reward entry on first claim.
    pub async fn claim_group_rewards(&self, params: ClaimGroupRewardsParams) -> Result<UnsignedTransaction> {
        let mut tx = UnsignedTransaction::new();
        self.push_claim_group_rewards(&mut tx, &params).await?;
        info!("claim_group_rewards: group {}, {} instructions", params.group_entry, tx.len());
        Ok(tx)
    }

    /// Claim, close the group's reward entry, then release every member.
    pub async fn close_group_entry(&self, params: ClaimGroupRewardsParams) -> Result<UnsignedTransaction> {
        let ids = self.ids();
        let mut tx = UnsignedTransaction::new();
        let accounts = self.push_claim_group_rewards(&mut tx, &params).await?;

        tx.push(build_close_group_reward_entry(ids, &accounts)?);
        for stake_entry in &params.stake_entries {
            tx.push(build_remove_from_group_entry(ids, &params.group_entry, stake_entry, &self.wallet)?);
        }

        info!("close_group_entry: group {}, {} instructions", params.group_entry, tx.len());
        Ok(tx)
    }

    /// Start the group's cooldown before members can be removed.
    pub async fn init_ungrouping(&self, group_entry: &Address) -> Result<UnsignedTransaction> {
        let mut tx = UnsignedTransaction::new();
        tx.push(build_init_ungrouping(self.ids(), group_entry, &self.wallet)?);
        info!("init_ungrouping: group {group_entry}");
        Ok(tx)
    }

    async fn push_claim_group_rewards(
        &self,
        tx: &mut UnsignedTransaction,
        params: &ClaimGroupRewardsParams,
    ) -> Result<GroupRewardEntryAccounts> {
        let ids = self.ids();
        let wallet = self.wallet;
        let distributor_id = params.group_reward_distributor;
        let accounts = GroupRewardEntryAccounts {
            group_reward_entry: find_group_reward_entry_id(ids, &distributor_id, &params.group_entry)?,
            group_reward_counter: find_group_reward_counter_id(ids, &distributor_id, &wallet)?,
            group_entry: params.group_entry,
            group_reward_distributor: distributor_id,
            authority: wallet,
        };

        let mut addresses = vec![accounts.group_reward_entry, distributor_id, accounts.group_reward_counter];
        addresses.extend_from_slice(&params.stake_entries);
        let slots = self.read(&addresses).await?;

        let group_reward_entry = decode_optional::<GroupRewardEntry>(&accounts.group_reward_entry, slots[0].as_ref())?;
        let distributor = decode_optional::<GroupRewardDistributor>(&distributor_id, slots[1].as_ref())?
            .ok_or_else(|| StakeSdkError::precondition("Group reward distributor not found"))?;

        if group_reward_entry.is_none() {
            let counter = decode_optional::<GroupRewardCounter>(&accounts.group_reward_counter, slots[2].as_ref())?;
            if counter.is_none() {
                debug!("group reward counter {} absent, adding init", accounts.group_reward_counter);
                tx.push(build_init_group_reward_counter(
                    ids,
                    &accounts.group_reward_counter,
                    &distributor_id,
                    &wallet,
                )?);
            }

            let members = params
                .stake_entries
                .iter()
                .zip(&slots[3..])
                .map(|(stake_entry_id, slot)| -> Result<GroupMemberAccounts> {
                    let entry = decode_optional::<StakeEntry>(stake_entry_id, slot.as_ref())?.ok_or_else(|| {
                        StakeSdkError::precondition(format!("Stake entry {stake_entry_id} not found"))
                    })?;
                    let reward_distributor = find_reward_distributor_id(ids, &entry.pool)?;
                    Ok(GroupMemberAccounts {
                        stake_entry: *stake_entry_id,
                        original_mint: entry.original_mint,
                        original_mint_metadata: find_mint_metadata_id(ids, &entry.original_mint)?,
                        reward_entry: find_reward_entry_id(ids, &reward_distributor, stake_entry_id)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            debug!("group reward entry {} absent, adding init", accounts.group_reward_entry);
            tx.push(build_init_group_reward_entry(ids, &accounts, &members)?);
        }

        let reward_mint = distributor.reward_mint;
        let user_reward_account = derive_associated_token_address(&wallet, &reward_mint)?;
        tx.push(build_create_associated_token_account_idempotent(
            &wallet,
            &user_reward_account,
            &wallet,
            &reward_mint,
        ));
        let remaining = match distributor.reward_kind {
            GroupRewardDistributorKind::Treasury => vec![SolAccountMeta::new(
                derive_associated_token_address(&distributor_id, &reward_mint)?,
                false,
            )],
            GroupRewardDistributorKind::Mint => Vec::new(),
        };
        tx.push(build_claim_group_rewards(ids, &accounts, &reward_mint, &user_reward_account, remaining)?);
        Ok(accounts)
    }
}
