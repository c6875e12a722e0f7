//! Solana chain primitives for the stake pool SDK.
//!
//! This crate handles addresses, program-derived address search, manual
//! legacy message compilation, and SPL associated token accounts, all
//! without pulling in `solana-sdk` (which drags in tokio and 200+
//! transitive dependencies).
//!
//! Instead we implement Solana's compact binary wire format by hand, using
//! `sha2` + `curve25519-dalek` for PDA search and `bs58` for Base58 encoding.

pub mod address;
pub mod error;
pub mod pda;
pub mod program_ids;
pub mod spl_token;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use address::{address_to_bytes, bytes_to_address, validate_address, Address};
pub use error::SolError;
pub use pda::{create_program_address, find_program_address, is_on_curve};
pub use program_ids::*;
pub use spl_token::{
    build_create_associated_token_account_idempotent, derive_associated_token_address,
};
pub use transaction::{
    compile_message, encode_compact_u16, serialize_message, serialize_unsigned_transaction,
    CompiledInstruction, CompiledMessage, SolAccountMeta, SolInstruction, PACKET_DATA_SIZE,
};
