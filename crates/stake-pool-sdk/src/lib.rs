//! Client SDK for Cardinal-style stake pool programs on Solana.
//!
//! Layers, bottom up:
//!
//! - [`pda`] derives every program address from seeds.
//! - [`accounts`] reads and decodes on-chain records through a pluggable
//!   [`accounts::AccountReader`].
//! - [`instructions`] builds single program instructions with exact account
//!   ordering and Anchor-encoded data.
//! - [`workflow`] composes the above into unsigned transactions for a
//!   wallet, deciding from live state which setup steps are still needed.
//!
//! Nothing here holds keys or talks to the network directly; signing and
//! submission go through [`submit::TransactionSender`].

pub mod accounts;
pub mod config;
pub mod error;
pub mod instructions;
pub mod pda;
pub mod submit;
pub mod transfer_mode;
pub mod workflow;

pub use accounts::{AccountData, AccountReader, MemoryLedger};
pub use config::{ProgramIds, SdkConfig};
pub use error::{Result, StakeSdkError};
pub use instructions::InstructionKind;
pub use submit::{send_each, TransactionSender};
pub use transfer_mode::AssetTransferMode;
pub use workflow::*;
