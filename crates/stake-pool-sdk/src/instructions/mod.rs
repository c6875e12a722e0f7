//! Instruction builders for the staking programs.
//!
//! Each builder is pure: it takes already-resolved addresses and arguments
//! and returns one [`SolInstruction`]. Instruction data follows the Anchor
//! convention:
//!
//! ```text
//! sha256("global:<snake_case_name>")[..8] || borsh(args)
//! ```

pub mod group_reward_distributor;
pub mod reward_distributor;
pub mod stake_pool;

use borsh::BorshSerialize;
use chain_sol::{Address, SolAccountMeta, SolError, SolInstruction};
use sha2::{Digest, Sha256};

use crate::accounts::TokenManagerKind;
use crate::config::ProgramIds;
use crate::error::Result;
use crate::pda::{find_mint_edition_id, find_mint_manager_id};

pub use group_reward_distributor::*;
pub use reward_distributor::*;
pub use stake_pool::*;

/// Program an instruction is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetProgram {
    StakePool,
    RewardDistributor,
    GroupRewardDistributor,
    AssociatedToken,
}

impl TargetProgram {
    pub fn id(self, ids: &ProgramIds) -> Address {
        match self {
            TargetProgram::StakePool => ids.stake_pool,
            TargetProgram::RewardDistributor => ids.reward_distributor,
            TargetProgram::GroupRewardDistributor => ids.group_reward_distributor,
            TargetProgram::AssociatedToken => ids.associated_token_program,
        }
    }
}

/// Every instruction the SDK emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    // stake pool
    InitIdentifier,
    InitPool,
    InitEntry,
    AuthorizeMint,
    InitStakeMint,
    Stake,
    StakeProgrammable,
    ClaimReceiptMint,
    ReturnReceiptMint,
    Unstake,
    UnstakeProgrammable,
    UpdateTotalStakeSeconds,
    InitGroupEntry,
    AddToGroupEntry,
    RemoveFromGroupEntry,
    InitUngrouping,
    // reward distributor
    InitRewardDistributor,
    InitRewardEntry,
    UpdateRewardEntry,
    ClaimRewards,
    // group reward distributor
    InitGroupRewardDistributor,
    UpdateGroupRewardDistributor,
    InitGroupRewardCounter,
    InitGroupRewardEntry,
    ClaimGroupRewards,
    CloseGroupRewardEntry,
    // associated token account
    CreateAssociatedTokenAccount,
}

impl InstructionKind {
    pub const ALL: [InstructionKind; 27] = [
        InstructionKind::InitIdentifier,
        InstructionKind::InitPool,
        InstructionKind::InitEntry,
        InstructionKind::AuthorizeMint,
        InstructionKind::InitStakeMint,
        InstructionKind::Stake,
        InstructionKind::StakeProgrammable,
        InstructionKind::ClaimReceiptMint,
        InstructionKind::ReturnReceiptMint,
        InstructionKind::Unstake,
        InstructionKind::UnstakeProgrammable,
        InstructionKind::UpdateTotalStakeSeconds,
        InstructionKind::InitGroupEntry,
        InstructionKind::AddToGroupEntry,
        InstructionKind::RemoveFromGroupEntry,
        InstructionKind::InitUngrouping,
        InstructionKind::InitRewardDistributor,
        InstructionKind::InitRewardEntry,
        InstructionKind::UpdateRewardEntry,
        InstructionKind::ClaimRewards,
        InstructionKind::InitGroupRewardDistributor,
        InstructionKind::UpdateGroupRewardDistributor,
        InstructionKind::InitGroupRewardCounter,
        InstructionKind::InitGroupRewardEntry,
        InstructionKind::ClaimGroupRewards,
        InstructionKind::CloseGroupRewardEntry,
        InstructionKind::CreateAssociatedTokenAccount,
    ];

    /// The on-chain handler name, which seeds the discriminator.
    pub fn name(self) -> &'static str {
        use InstructionKind::*;
        match self {
            InitIdentifier => "init_identifier",
            InitPool => "init_pool",
            InitEntry => "init_entry",
            AuthorizeMint => "authorize_mint",
            InitStakeMint => "init_stake_mint",
            Stake => "stake",
            StakeProgrammable => "stake_programmable",
            ClaimReceiptMint => "claim_receipt_mint",
            ReturnReceiptMint => "return_receipt_mint",
            Unstake => "unstake",
            UnstakeProgrammable => "unstake_programmable",
            UpdateTotalStakeSeconds => "update_total_stake_seconds",
            InitGroupEntry => "init_group_entry",
            AddToGroupEntry => "add_to_group_entry",
            RemoveFromGroupEntry => "remove_from_group_entry",
            InitUngrouping => "init_ungrouping",
            InitRewardDistributor => "init_reward_distributor",
            InitRewardEntry => "init_reward_entry",
            UpdateRewardEntry => "update_reward_entry",
            ClaimRewards => "claim_rewards",
            InitGroupRewardDistributor => "init_group_reward_distributor",
            UpdateGroupRewardDistributor => "update_group_reward_distributor",
            InitGroupRewardCounter => "init_group_reward_counter",
            InitGroupRewardEntry => "init_group_reward_entry",
            ClaimGroupRewards => "claim_group_rewards",
            CloseGroupRewardEntry => "close_group_reward_entry",
            CreateAssociatedTokenAccount => "create_associated_token_account_idempotent",
        }
    }

    pub fn program(self) -> TargetProgram {
        use InstructionKind::*;
        match self {
            InitRewardDistributor | InitRewardEntry | UpdateRewardEntry | ClaimRewards => {
                TargetProgram::RewardDistributor
            }
            InitGroupRewardDistributor
            | UpdateGroupRewardDistributor
            | InitGroupRewardCounter
            | InitGroupRewardEntry
            | ClaimGroupRewards
            | CloseGroupRewardEntry => TargetProgram::GroupRewardDistributor,
            CreateAssociatedTokenAccount => TargetProgram::AssociatedToken,
            _ => TargetProgram::StakePool,
        }
    }

    /// `sha256("global:<name>")[..8]`. Not meaningful for the associated
    /// token program, which uses a one-byte tag.
    pub fn discriminator(self) -> [u8; 8] {
        let hash = Sha256::digest(format!("global:{}", self.name()).as_bytes());
        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(&hash[..8]);
        discriminator
    }

    /// Classify an instruction built by this crate.
    pub fn of(ix: &SolInstruction, ids: &ProgramIds) -> Option<InstructionKind> {
        if ix.program_id == ids.associated_token_program {
            return (ix.data.as_slice() == [1]).then_some(InstructionKind::CreateAssociatedTokenAccount);
        }
        let tag = ix.data.get(..8)?;
        Self::ALL.into_iter().find(|kind| {
            kind.program() != TargetProgram::AssociatedToken
                && kind.program().id(ids) == ix.program_id
                && kind.discriminator() == tag
        })
    }
}

/// Discriminator followed by Borsh-encoded arguments.
pub(crate) fn encode_data<A: BorshSerialize>(kind: InstructionKind, args: &A) -> Result<Vec<u8>> {
    let mut data = kind.discriminator().to_vec();
    args.serialize(&mut data)
        .map_err(|e| SolError::SerializationError(format!("{}: {e}", kind.name())))?;
    Ok(data)
}

pub(crate) fn instruction(
    ids: &ProgramIds,
    kind: InstructionKind,
    accounts: Vec<SolAccountMeta>,
    data: Vec<u8>,
) -> SolInstruction {
    SolInstruction {
        program_id: kind.program().id(ids),
        accounts,
        data,
    }
}

/// Extra accounts a receipt claim or return needs, by token manager kind.
pub fn receipt_kind_accounts(
    ids: &ProgramIds,
    receipt_mint: &Address,
    kind: TokenManagerKind,
) -> Result<Vec<SolAccountMeta>> {
    Ok(match kind {
        TokenManagerKind::Managed | TokenManagerKind::Permissioned => {
            vec![SolAccountMeta::new(find_mint_manager_id(ids, receipt_mint)?, false)]
        }
        TokenManagerKind::Edition => vec![
            SolAccountMeta::new_readonly(find_mint_edition_id(ids, receipt_mint)?, false),
            SolAccountMeta::new_readonly(ids.token_metadata, false),
        ],
        TokenManagerKind::Unmanaged | TokenManagerKind::Programmable => Vec::new(),
    })
}
