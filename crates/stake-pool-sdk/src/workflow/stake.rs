use chain_sol::{
    build_create_associated_token_account_idempotent, derive_associated_token_address, Address,
};
use log::{debug, info};

use super::{StakeClient, UnsignedTransaction};
use crate::accounts::{AccountReader, Metadata, StakeEntry, TokenManagerKind};
use crate::error::{Result, StakeSdkError};
use crate::instructions::{
    build_claim_receipt_mint, build_init_entry, build_stake, build_stake_programmable,
    receipt_kind_accounts, ClaimReceiptMintAccounts, ProgrammableAccounts, TransferAccounts,
};
use crate::pda::{
    find_mint_counter_id, find_mint_edition_id, find_mint_metadata_id, find_token_manager_id,
    find_token_record_id,
};
use crate::transfer_mode::AssetTransferMode;

/// What the staker gets back while the asset is staked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ReceiptType {
    /// The original asset, frozen in the staker's wallet.
    Original = 1,
    /// The entry's stake mint.
    Receipt = 2,
    #[default]
    None = 3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeParams {
    pub stake_pool: Address,
    pub original_mint: Address,
    /// Defaults to the wallet's associated token account.
    pub user_original_mint_token_account: Option<Address>,
    pub receipt_type: ReceiptType,
    /// Defaults to 1.
    pub amount: Option<u64>,
}

impl StakeParams {
    pub fn new(stake_pool: Address, original_mint: Address) -> Self {
        StakeParams {
            stake_pool,
            original_mint,
            user_original_mint_token_account: None,
            receipt_type: ReceiptType::None,
            amount: None,
        }
    }
}

impl<R: AccountReader> StakeClient<R> {
    /// Stake `amount` of `original_mint` into a pool, creating the stake
    /// entry on first use and claiming a receipt when asked.
    pub async fn stake(&self, params: StakeParams) -> Result<UnsignedTransaction> {
        let ids = self.ids();
        let wallet = self.wallet;
        let pool = params.stake_pool;
        let original_mint = params.original_mint;
        let metadata_id = find_mint_metadata_id(ids, &original_mint)?;

        let resolved = self.resolve_entry(&pool, &original_mint, &[metadata_id]).await?;
        let metadata = resolved.extra[0]
            .as_ref()
            .map(|account| Metadata::decode(&metadata_id, &account.data))
            .transpose()?;
        let mode = AssetTransferMode::resolve(metadata.as_ref());
        let stake_entry = resolved.stake_entry;
        let entry = resolved.entry.as_ref();
        let amount = params.amount.unwrap_or(1);
        let user_token_account = match params.user_original_mint_token_account {
            Some(account) => account,
            None => derive_associated_token_address(&wallet, &original_mint)?,
        };

        let mut tx = UnsignedTransaction::new();
        if entry.is_none() {
            debug!("stake entry {stake_entry} absent, adding init");
            tx.push(build_init_entry(
                ids,
                &self.init_entry_accounts(&pool, &original_mint, &stake_entry)?,
                &wallet,
            )?);
        }

        match mode {
            AssetTransferMode::Programmable { rule_set } => {
                debug!("mint {original_mint} is programmable, staking in place");
                let accounts = ProgrammableAccounts {
                    stake_entry,
                    stake_pool: pool,
                    original_mint,
                    user: wallet,
                    user_original_mint_token_account: user_token_account,
                    user_original_mint_token_record: find_token_record_id(ids, &original_mint, &user_token_account)?,
                    mint_metadata: metadata_id,
                    mint_edition: find_mint_edition_id(ids, &original_mint)?,
                    authorization_rules: rule_set,
                };
                tx.push(build_stake_programmable(ids, &accounts, amount)?);
            }
            AssetTransferMode::Standard => {
                let entry_token_account = derive_associated_token_address(&stake_entry, &original_mint)?;
                tx.push(build_create_associated_token_account_idempotent(
                    &wallet,
                    &entry_token_account,
                    &stake_entry,
                    &original_mint,
                ));
                let accounts = TransferAccounts {
                    stake_entry,
                    stake_pool: pool,
                    stake_entry_original_mint_token_account: entry_token_account,
                    original_mint,
                    user: wallet,
                    user_original_mint_token_account: user_token_account,
                };
                tx.push(build_stake(ids, &accounts, amount)?);

                if params.receipt_type != ReceiptType::None {
                    self.push_claim_receipt(&mut tx, &stake_entry, entry, &original_mint, params.receipt_type)?;
                }
            }
        }

        info!("stake: mint {original_mint} into pool {pool}, {} instructions", tx.len());
        Ok(tx)
    }

    fn push_claim_receipt(
        &self,
        tx: &mut UnsignedTransaction,
        stake_entry: &Address,
        entry: Option<&StakeEntry>,
        original_mint: &Address,
        receipt_type: ReceiptType,
    ) -> Result<()> {
        let ids = self.ids();
        let wallet = self.wallet;
        let receipt_mint = match receipt_type {
            ReceiptType::Receipt => entry.and_then(|e| e.stake_mint),
            _ => Some(*original_mint),
        }
        .ok_or_else(|| StakeSdkError::precondition("Stake entry has no stake mint. Initialize stake mint first."))?;

        if entry.is_some_and(|e| e.receipt_claimed()) {
            return Err(StakeSdkError::precondition("Receipt has already been claimed."));
        }
        if entry.is_some_and(|e| e.amount > 0) {
            debug!("stake entry {stake_entry} already holds stake, receipt stays with it");
            return Ok(());
        }

        let token_manager = find_token_manager_id(ids, &receipt_mint)?;
        let token_manager_account = derive_associated_token_address(&token_manager, &receipt_mint)?;
        tx.push(build_create_associated_token_account_idempotent(
            &wallet,
            &token_manager_account,
            &token_manager,
            &receipt_mint,
        ));

        let kind = match receipt_type {
            ReceiptType::Original => TokenManagerKind::Edition,
            _ => TokenManagerKind::Managed,
        };
        let accounts = ClaimReceiptMintAccounts {
            stake_entry: *stake_entry,
            original_mint: *original_mint,
            receipt_mint,
            stake_entry_receipt_mint_token_account: derive_associated_token_address(stake_entry, &receipt_mint)?,
            user: wallet,
            user_receipt_mint_token_account: derive_associated_token_address(&wallet, &receipt_mint)?,
            token_manager_receipt_mint_token_account: token_manager_account,
            token_manager,
            mint_counter: find_mint_counter_id(ids, &receipt_mint)?,
        };
        tx.push(build_claim_receipt_mint(
            ids,
            &accounts,
            receipt_kind_accounts(ids, &receipt_mint, kind)?,
        )?);
        debug!("claiming receipt mint {receipt_mint}");
        Ok(())
    }
}
