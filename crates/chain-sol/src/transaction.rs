//! Solana legacy message compilation and unsigned wire format.
//!
//! Messages are compiled entirely by hand, no `solana-sdk` dependency.
//! Signing is left to the caller's wallet; this module produces the bytes
//! that get signed and an unsigned transaction with empty signature slots.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use crate::address::Address;
use crate::error::SolError;

/// Maximum size of a serialized transaction accepted by the network.
pub const PACKET_DATA_SIZE: usize = 1232;

const SIGNATURE_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

fn compact_len(len: usize, what: &str) -> Result<Vec<u8>, SolError> {
    u16::try_from(len)
        .map(encode_compact_u16)
        .map_err(|_| SolError::SerializationError(format!("{what} count {len} overflows compact-u16")))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolAccountMeta {
    pub pubkey: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl SolAccountMeta {
    /// A writable account.
    pub fn new(pubkey: Address, is_signer: bool) -> Self {
        SolAccountMeta {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account.
    pub fn new_readonly(pubkey: Address, is_signer: bool) -> Self {
        SolAccountMeta {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A Solana instruction (before it is compiled into a message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolInstruction {
    pub program_id: Address,
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled legacy message, ready to be serialized and signed.
#[derive(Debug, Clone)]
pub struct CompiledMessage {
    /// All account keys referenced by this message, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Address>,

    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,

    pub recent_blockhash: [u8; 32],

    pub compiled_instructions: Vec<CompiledInstruction>,
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the message's `account_keys` array.
#[derive(Debug, Clone)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

impl CompiledMessage {
    /// The accounts that must sign, in signature-slot order.
    pub fn signers(&self) -> &[Address] {
        &self.account_keys[..self.num_required_signatures as usize]
    }
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Compile a set of instructions into a legacy message with a single fee payer.
///
/// The fee payer is always the first signer and is placed at index 0 in the
/// account keys. Permissions for an account referenced more than once are
/// the union of every reference.
pub fn compile_message(
    instructions: &[SolInstruction],
    fee_payer: &Address,
    recent_blockhash: &[u8; 32],
) -> Result<CompiledMessage, SolError> {
    // Instruction account lists are small, so a Vec scan beats hashing.
    struct AccountEntry {
        pubkey: Address,
        is_signer: bool,
        is_writable: bool,
    }

    let mut entries: Vec<AccountEntry> = Vec::new();

    let mut upsert = |pubkey: Address, signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    upsert(*fee_payer, true, true);

    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        upsert(ix.program_id, false, false);
    }

    // Stable sort: insertion order is kept within a category, so the fee
    // payer stays at index 0.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    if entries.len() > u8::MAX as usize + 1 {
        return Err(SolError::TransactionBuildError(format!(
            "{} accounts exceeds the 256 account limit of a legacy message",
            entries.len()
        )));
    }

    let count = |pred: fn(&AccountEntry) -> bool| entries.iter().filter(|e| pred(e)).count() as u8;
    let num_required_signatures = count(|e| e.is_signer);
    let num_readonly_signed = count(|e| e.is_signer && !e.is_writable);
    let num_readonly_unsigned = count(|e| !e.is_signer && !e.is_writable);

    let account_keys: Vec<Address> = entries.iter().map(|e| e.pubkey).collect();

    let index_of = |key: &Address, what: &str| {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| SolError::TransactionBuildError(format!("{what} not in account keys")))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let program_id_index = index_of(&ix.program_id, "program_id")?;
        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(&meta.pubkey, "account"))
            .collect::<Result<Vec<u8>, SolError>>()?;

        compiled.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(CompiledMessage {
        account_keys,
        num_required_signatures,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        compiled_instructions: compiled,
    })
}

/// Serialize the message (the bytes that get signed).
pub fn serialize_message(message: &CompiledMessage) -> Result<Vec<u8>, SolError> {
    let mut buf = Vec::with_capacity(256);

    buf.push(message.num_required_signatures);
    buf.push(message.num_readonly_signed);
    buf.push(message.num_readonly_unsigned);

    buf.extend_from_slice(&compact_len(message.account_keys.len(), "account")?);
    for key in &message.account_keys {
        buf.extend_from_slice(key.as_ref());
    }

    buf.extend_from_slice(&message.recent_blockhash);

    buf.extend_from_slice(&compact_len(message.compiled_instructions.len(), "instruction")?);
    for ix in &message.compiled_instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&compact_len(ix.account_indices.len(), "instruction account")?);
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&compact_len(ix.data.len(), "instruction data")?);
        buf.extend_from_slice(&ix.data);
    }

    Ok(buf)
}

/// Serialize the message as a transaction with zeroed signature slots.
///
/// Wallets fill the slots in place. Fails if the result is larger than
/// [`PACKET_DATA_SIZE`], since the network would reject it anyway.
pub fn serialize_unsigned_transaction(message: &CompiledMessage) -> Result<Vec<u8>, SolError> {
    let message_bytes = serialize_message(message)?;
    let num_signatures = message.num_required_signatures as usize;

    let mut wire = Vec::with_capacity(3 + num_signatures * SIGNATURE_LEN + message_bytes.len());
    wire.extend_from_slice(&compact_len(num_signatures, "signature")?);
    wire.resize(wire.len() + num_signatures * SIGNATURE_LEN, 0);
    wire.extend_from_slice(&message_bytes);

    if wire.len() > PACKET_DATA_SIZE {
        return Err(SolError::TransactionBuildError(format!(
            "transaction is {} bytes, max is {PACKET_DATA_SIZE}",
            wire.len()
        )));
    }

    Ok(wire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program_ids::SYSTEM_PROGRAM_ID;

    const BLOCKHASH: [u8; 32] = [0xBB; 32];

    fn addr(byte: u8) -> Address {
        Address::new([byte; 32])
    }

    fn transfer_like(from: Address, to: Address) -> SolInstruction {
        SolInstruction {
            program_id: SYSTEM_PROGRAM_ID,
            accounts: vec![SolAccountMeta::new(from, true), SolAccountMeta::new(to, false)],
            data: vec![2, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
        }
    }

    #[test]
    fn compact_u16_single_byte() {
        assert_eq!(encode_compact_u16(0), vec![0x00]);
        assert_eq!(encode_compact_u16(0x7f), vec![0x7f]);
    }

    #[test]
    fn compact_u16_two_and_three_bytes() {
        assert_eq!(encode_compact_u16(0x80), vec![0x80, 0x01]);
        assert_eq!(encode_compact_u16(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(encode_compact_u16(0x4000), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn fee_payer_is_first_account() {
        let payer = addr(0x11);
        let other_signer = addr(0x22);
        let ix = transfer_like(other_signer, addr(0x33));

        let message = compile_message(&[ix], &payer, &BLOCKHASH).unwrap();
        assert_eq!(message.account_keys[0], payer);
        assert_eq!(message.num_required_signatures, 2);
        assert_eq!(message.signers(), &[payer, other_signer]);
    }

    #[test]
    fn accounts_are_in_canonical_order() {
        let payer = addr(0x01);
        let readonly_signer = addr(0x02);
        let writable = addr(0x03);
        let readonly = addr(0x04);
        let ix = SolInstruction {
            program_id: addr(0x09),
            accounts: vec![
                SolAccountMeta::new_readonly(readonly, false),
                SolAccountMeta::new(writable, false),
                SolAccountMeta::new_readonly(readonly_signer, true),
            ],
            data: vec![],
        };

        let message = compile_message(&[ix], &payer, &BLOCKHASH).unwrap();
        assert_eq!(
            message.account_keys,
            vec![payer, readonly_signer, writable, readonly, addr(0x09)]
        );
        assert_eq!(message.num_readonly_signed, 1);
        assert_eq!(message.num_readonly_unsigned, 2);
        assert_eq!(message.compiled_instructions[0].account_indices, vec![3, 2, 1]);
        assert_eq!(message.compiled_instructions[0].program_id_index, 4);
    }

    #[test]
    fn duplicate_accounts_merge_permissions() {
        let payer = addr(0x01);
        let shared = addr(0x05);
        let read = SolInstruction {
            program_id: addr(0x09),
            accounts: vec![SolAccountMeta::new_readonly(shared, false)],
            data: vec![],
        };
        let write = SolInstruction {
            program_id: addr(0x09),
            accounts: vec![SolAccountMeta::new(shared, false)],
            data: vec![],
        };

        let message = compile_message(&[read, write], &payer, &BLOCKHASH).unwrap();
        assert_eq!(message.account_keys.len(), 3);
        // The shared account ended up writable.
        assert_eq!(message.account_keys[1], shared);
        assert_eq!(message.num_readonly_unsigned, 1);
    }

    #[test]
    fn serialized_message_layout() {
        let payer = addr(0x01);
        let ix = transfer_like(payer, addr(0x02));

        let message = compile_message(&[ix], &payer, &BLOCKHASH).unwrap();
        let bytes = serialize_message(&message).unwrap();

        // Header.
        assert_eq!(&bytes[..3], &[1, 0, 1]);
        // 3 account keys.
        assert_eq!(bytes[3], 3);
        assert_eq!(&bytes[4..36], payer.as_ref());
        // Blockhash after the keys.
        assert_eq!(&bytes[4 + 96..4 + 96 + 32], &BLOCKHASH);
        // 1 instruction.
        assert_eq!(bytes[132], 1);
        // 3 + 1 + 96 + 32 + 1 + (1 + 1 + 2 + 1 + 12)
        assert_eq!(bytes.len(), 150);
    }

    #[test]
    fn unsigned_transaction_has_empty_signature_slots() {
        let payer = addr(0x01);
        let ix = transfer_like(addr(0x07), addr(0x02));

        let message = compile_message(&[ix], &payer, &BLOCKHASH).unwrap();
        let wire = serialize_unsigned_transaction(&message).unwrap();
        let message_bytes = serialize_message(&message).unwrap();

        assert_eq!(wire[0], 2);
        assert!(wire[1..129].iter().all(|b| *b == 0));
        assert_eq!(&wire[129..], message_bytes.as_slice());
    }

    #[test]
    fn oversized_transaction_is_rejected() {
        let payer = addr(0x01);
        let ix = SolInstruction {
            program_id: addr(0x09),
            accounts: vec![],
            data: vec![0u8; PACKET_DATA_SIZE],
        };

        let message = compile_message(&[ix], &payer, &BLOCKHASH).unwrap();
        assert!(serialize_unsigned_transaction(&message).is_err());
    }

    #[test]
    fn too_many_accounts_is_rejected() {
        let payer = addr(0x00);
        let accounts = (0..=255u8)
            .map(|i| {
                let mut bytes = [0xFFu8; 32];
                bytes[0] = i;
                SolAccountMeta::new_readonly(Address::new(bytes), false)
            })
            .collect();
        let ix = SolInstruction {
            program_id: addr(0x09),
            accounts,
            data: vec![],
        };

        let err = compile_message(&[ix], &payer, &BLOCKHASH).unwrap_err();
        assert!(matches!(err, SolError::TransactionBuildError(_)));
    }
}
