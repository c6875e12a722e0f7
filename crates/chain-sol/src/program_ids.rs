//! Well-known Solana program and sysvar ids.
//!
//! Decoding Base58 at compile time is not possible, so each id is kept as
//! its raw bytes with the text form alongside.

use crate::address::Address;

/// System Program: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Address = Address::ZERO;

/// SPL Token Program: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Address = Address::new([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb,
    0x79, 0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85,
    0x7e, 0xff, 0x00, 0xa9,
]);

/// Associated Token Account Program: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Address = Address::new([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e,
    0x0d, 0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8,
    0xdb, 0xe9, 0xf8, 0x59,
]);

/// Token Metadata Program: `metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s`
pub const TOKEN_METADATA_PROGRAM_ID: Address = Address::new([
    0x0b, 0x70, 0x65, 0xb1, 0xe3, 0xd1, 0x7c, 0x45, 0x38, 0x9d, 0x52, 0x7f, 0x6b, 0x04,
    0xc3, 0xcd, 0x58, 0xb8, 0x6c, 0x73, 0x1a, 0xa0, 0xfd, 0xb5, 0x49, 0xb6, 0xd1, 0xbc,
    0x03, 0xf8, 0x29, 0x46,
]);

/// Token Auth Rules Program: `auth9SigNpDKz4sJJ1DfCTuZrZNSAgh9sFD3rboVmgg`
pub const TOKEN_AUTH_RULES_PROGRAM_ID: Address = Address::new([
    0x08, 0xaf, 0xf8, 0x94, 0xc3, 0xfa, 0x67, 0xc0, 0x16, 0x3a, 0x30, 0xf2, 0x34, 0xa3,
    0x3d, 0x34, 0x67, 0xf0, 0x3a, 0xa1, 0x64, 0x17, 0x31, 0x5e, 0xb4, 0xb8, 0x14, 0x27,
    0xbd, 0x9b, 0xa6, 0xed,
]);

/// Instructions sysvar: `Sysvar1nstructions1111111111111111111111111`
pub const SYSVAR_INSTRUCTIONS_ID: Address = Address::new([
    0x06, 0xa7, 0xd5, 0x17, 0x18, 0x7b, 0xd1, 0x66, 0x35, 0xda, 0xd4, 0x04, 0x55, 0xfd,
    0xc2, 0xc0, 0xc1, 0x24, 0xc6, 0x8f, 0x21, 0x56, 0x75, 0xa5, 0xdb, 0xba, 0xcb, 0x5f,
    0x08, 0x00, 0x00, 0x00,
]);

/// Rent sysvar: `SysvarRent111111111111111111111111111111111`
pub const SYSVAR_RENT_ID: Address = Address::new([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a,
    0xf1, 0x7f, 0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a,
    0x00, 0x00, 0x00, 0x00,
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_match_their_base58_names() {
        let cases = [
            (SYSTEM_PROGRAM_ID, "11111111111111111111111111111111"),
            (TOKEN_PROGRAM_ID, "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"),
            (ASSOCIATED_TOKEN_PROGRAM_ID, "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"),
            (TOKEN_METADATA_PROGRAM_ID, "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s"),
            (TOKEN_AUTH_RULES_PROGRAM_ID, "auth9SigNpDKz4sJJ1DfCTuZrZNSAgh9sFD3rboVmgg"),
            (SYSVAR_INSTRUCTIONS_ID, "Sysvar1nstructions1111111111111111111111111"),
            (SYSVAR_RENT_ID, "SysvarRent111111111111111111111111111111111"),
        ];
        for (id, text) in cases {
            assert_eq!(id.to_string(), text);
        }
    }
}
