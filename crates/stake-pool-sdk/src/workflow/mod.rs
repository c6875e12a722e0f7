//! Business operations composed from reads and instruction builders.
//!
//! Every operation re-reads the state it branches on, decides which
//! instructions are needed, and returns unsigned transactions in a fixed,
//! dependency-respecting order. Nothing is submitted here.

mod entry;
mod group;
mod pool;
mod rewards;
mod stake;
mod unstake;

use chain_sol::{
    compile_message, serialize_unsigned_transaction, Address, CompiledMessage, SolInstruction,
};

use crate::accounts::{
    decode_optional, fetch_batched, AccountData, AccountReader, Mint, ProgramAccount, StakeEntry,
};
use crate::config::{ProgramIds, SdkConfig};
use crate::error::{Result, StakeSdkError};
use crate::instructions::InstructionKind;
use crate::pda::find_stake_entry_id;

pub use entry::{CreateStakeEntryAndStakeMintParams, InitializeRewardEntryParams};
pub use group::{
    ClaimGroupRewardsParams, CreateGroupEntryParams, CreateGroupRewardDistributorParams,
    UpdateGroupRewardDistributorParams,
};
pub use pool::{CreateRewardDistributorParams, CreateStakePoolParams, RewardDistributorParams};
pub use rewards::{ClaimRewardsOptions, ClaimRewardsRequest};
pub use stake::{ReceiptType, StakeParams};
pub use unstake::{should_return_receipt, UnstakeParams};

// ---------------------------------------------------------------------------
// Transaction buffer
// ---------------------------------------------------------------------------

/// Ordered instructions plus any signers beyond the fee payer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub instructions: Vec<SolInstruction>,
    /// Fresh keys (new mints, group ids) the caller must also sign with.
    pub signers: Vec<Address>,
}

impl UnsignedTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ix: SolInstruction) {
        self.instructions.push(ix);
    }

    pub fn add_signer(&mut self, signer: Address) {
        if !self.signers.contains(&signer) {
            self.signers.push(signer);
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Classify each instruction; unknown instructions map to `None`.
    pub fn kinds(&self, ids: &ProgramIds) -> Vec<Option<InstructionKind>> {
        self.instructions.iter().map(|ix| InstructionKind::of(ix, ids)).collect()
    }

    pub fn compile(&self, fee_payer: &Address, recent_blockhash: &[u8; 32]) -> Result<CompiledMessage> {
        Ok(compile_message(&self.instructions, fee_payer, recent_blockhash)?)
    }

    /// Wire bytes with zeroed signature slots, ready for the wallet.
    pub fn serialize(&self, fee_payer: &Address, recent_blockhash: &[u8; 32]) -> Result<Vec<u8>> {
        let message = self.compile(fee_payer, recent_blockhash)?;
        Ok(serialize_unsigned_transaction(&message)?)
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current unix time, for cooldown checks.
pub trait Clock: Send + Sync {
    fn unix_timestamp(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> i64 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Composes staking transactions for one wallet.
pub struct StakeClient<R> {
    reader: R,
    config: SdkConfig,
    wallet: Address,
    clock: Box<dyn Clock>,
}

impl<R: AccountReader> StakeClient<R> {
    pub fn new(reader: R, config: SdkConfig, wallet: Address) -> Self {
        StakeClient {
            reader,
            config,
            wallet,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn ids(&self) -> &ProgramIds {
        &self.config.program_ids
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.unix_timestamp()
    }

    pub(crate) async fn read(&self, addresses: &[Address]) -> Result<Vec<Option<AccountData>>> {
        fetch_batched(&self.reader, addresses, self.config.max_accounts_per_request).await
    }

    pub(crate) async fn fetch<T: ProgramAccount>(&self, address: &Address) -> Result<Option<T>> {
        let mut slots = self.read(std::slice::from_ref(address)).await?;
        decode_optional(address, slots.pop().flatten().as_ref())
    }

    pub(crate) fn unpack_mint(&self, address: &Address, account: Option<&AccountData>) -> Result<Mint> {
        let account = account.ok_or_else(|| StakeSdkError::precondition(format!("Mint {address} not found")))?;
        Mint::unpack(address, account, &self.ids().token_program)
    }

    /// Read a mint, both candidate stake entries, and `extra`, in one round
    /// trip. Which entry applies depends on the mint's supply.
    pub(crate) async fn resolve_entry(
        &self,
        stake_pool: &Address,
        original_mint: &Address,
        extra: &[Address],
    ) -> Result<ResolvedEntry> {
        let ids = self.ids();
        let single = find_stake_entry_id(ids, &self.wallet, stake_pool, original_mint, false)?;
        let multi = find_stake_entry_id(ids, &self.wallet, stake_pool, original_mint, true)?;

        let mut addresses = vec![*original_mint, single, multi];
        addresses.extend_from_slice(extra);
        let mut slots = self.read(&addresses).await?;
        let extra = slots.split_off(3);

        let mint = self.unpack_mint(original_mint, slots[0].as_ref())?;
        let fungible = mint.is_fungible();
        let (stake_entry, slot) = if fungible { (multi, &slots[2]) } else { (single, &slots[1]) };
        let entry = decode_optional::<StakeEntry>(&stake_entry, slot.as_ref())?;

        Ok(ResolvedEntry {
            fungible,
            stake_entry,
            entry,
            extra,
        })
    }
}

/// Outcome of [`StakeClient::resolve_entry`].
#[derive(Debug)]
pub(crate) struct ResolvedEntry {
    pub fungible: bool,
    pub stake_entry: Address,
    pub entry: Option<StakeEntry>,
    /// Slots for the extra addresses, in request order.
    pub extra: Vec<Option<AccountData>>,
}

/// A lazily created record: its address, and the instruction that creates
/// it when it does not exist yet.
#[derive(Debug)]
pub(crate) struct Ensured {
    pub address: Address,
    pub init: Option<SolInstruction>,
}

impl Ensured {
    pub fn new<T>(
        address: Address,
        existing: Option<&T>,
        init: impl FnOnce() -> Result<SolInstruction>,
    ) -> Result<Self> {
        let init = match existing {
            Some(_) => None,
            None => Some(init()?),
        };
        Ok(Ensured { address, init })
    }

    /// Append the init instruction, if any, and hand back the address.
    pub fn apply(self, tx: &mut UnsignedTransaction) -> Address {
        if let Some(ix) = self.init {
            tx.push(ix);
        }
        self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_sol::SolAccountMeta;

    fn ix(program: u8) -> SolInstruction {
        SolInstruction {
            program_id: Address::new([program; 32]),
            accounts: vec![SolAccountMeta::new(Address::new([7; 32]), true)],
            data: vec![],
        }
    }

    #[test]
    fn ensure_skips_existing_records() {
        let existing = Ensured::new(Address::new([1; 32]), Some(&()), || Ok(ix(1))).unwrap();
        let mut tx = UnsignedTransaction::new();
        assert_eq!(existing.apply(&mut tx), Address::new([1; 32]));
        assert!(tx.is_empty());

        let absent = Ensured::new::<()>(Address::new([2; 32]), None, || Ok(ix(1))).unwrap();
        absent.apply(&mut tx);
        assert_eq!(tx.len(), 1);
    }

    #[test]
    fn signers_are_deduplicated() {
        let mut tx = UnsignedTransaction::new();
        tx.add_signer(Address::new([3; 32]));
        tx.add_signer(Address::new([3; 32]));
        assert_eq!(tx.signers.len(), 1);
    }

    #[test]
    fn compile_puts_extra_signer_after_fee_payer() {
        let mut tx = UnsignedTransaction::new();
        tx.push(ix(9));
        let payer = Address::new([1; 32]);
        let message = tx.compile(&payer, &[0; 32]).unwrap();
        assert_eq!(message.signers(), &[payer, Address::new([7; 32])]);

        let bytes = tx.serialize(&payer, &[0; 32]).unwrap();
        assert_eq!(bytes[0], 2);
    }

    #[test]
    fn fixed_clock_is_fixed() {
        assert_eq!(FixedClock(42).unix_timestamp(), 42);
        assert!(SystemClock.unix_timestamp() > 1_600_000_000);
    }
}
