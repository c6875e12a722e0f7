//! Foreign account layouts: SPL mints and receipt token managers.

use borsh::{BorshDeserialize, BorshSerialize};
use chain_sol::Address;

use super::{AccountData, ProgramAccount};
use crate::error::{Result, StakeSdkError};

/// SPL Token mint, decoded from its 82-byte packed layout.
///
/// ```text
/// mint_authority    COption<Pubkey>  (u32 tag + 32)
/// supply            u64
/// decimals          u8
/// is_initialized    bool
/// freeze_authority  COption<Pubkey>  (u32 tag + 32)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mint {
    pub mint_authority: Option<Address>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<Address>,
}

impl Mint {
    pub const LEN: usize = 82;

    pub fn unpack(address: &Address, account: &AccountData, token_program: &Address) -> Result<Self> {
        if account.owner != *token_program {
            return Err(StakeSdkError::decode(
                "Mint",
                *address,
                format!("owned by {}, not the token program", account.owner),
            ));
        }
        let data = &account.data;
        // Token-2022 mints carry extensions after the base layout.
        if data.len() < Self::LEN {
            return Err(StakeSdkError::decode(
                "Mint",
                *address,
                format!("expected {} bytes, got {}", Self::LEN, data.len()),
            ));
        }

        let coption = |offset: usize| -> Result<Option<Address>> {
            let tag = u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]);
            let mut key = [0u8; 32];
            key.copy_from_slice(&data[offset + 4..offset + 36]);
            match tag {
                0 => Ok(None),
                1 => Ok(Some(Address::new(key))),
                other => Err(StakeSdkError::decode("Mint", *address, format!("bad COption tag {other}"))),
            }
        };

        let mut supply = [0u8; 8];
        supply.copy_from_slice(&data[36..44]);

        let mint = Mint {
            mint_authority: coption(0)?,
            supply: u64::from_le_bytes(supply),
            decimals: data[44],
            is_initialized: data[45] != 0,
            freeze_authority: coption(46)?,
        };
        if !mint.is_initialized {
            return Err(StakeSdkError::decode("Mint", *address, "mint is not initialized"));
        }
        Ok(mint)
    }

    /// Multi-supply mints get a stake entry per staker.
    pub fn is_fungible(&self) -> bool {
        self.supply > 1
    }
}

/// Kind of a token manager, which decides the extra accounts its
/// instructions need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenManagerKind {
    Managed = 1,
    Unmanaged = 2,
    Edition = 3,
    Permissioned = 4,
    Programmable = 5,
}

impl TokenManagerKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(TokenManagerKind::Managed),
            2 => Some(TokenManagerKind::Unmanaged),
            3 => Some(TokenManagerKind::Edition),
            4 => Some(TokenManagerKind::Permissioned),
            5 => Some(TokenManagerKind::Programmable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenManagerState {
    Initialized = 0,
    Issued = 1,
    Claimed = 2,
    Invalidated = 3,
}

impl TokenManagerState {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TokenManagerState::Initialized),
            1 => Some(TokenManagerState::Issued),
            2 => Some(TokenManagerState::Claimed),
            3 => Some(TokenManagerState::Invalidated),
            _ => None,
        }
    }
}

/// Custodian record of a receipt mint.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TokenManager {
    pub version: u8,
    pub bump: u8,
    pub count: u64,
    pub num_invalidators: u8,
    pub issuer: Address,
    pub mint: Address,
    pub amount: u64,
    pub kind: u8,
    pub state: u8,
    pub state_changed_at: i64,
    pub invalidation_type: u8,
    pub recipient_token_account: Address,
    pub receipt_mint: Option<Address>,
    pub claim_approver: Option<Address>,
    pub transfer_authority: Option<Address>,
    pub invalidators: Vec<Address>,
}

impl TokenManager {
    pub fn kind(&self) -> Option<TokenManagerKind> {
        TokenManagerKind::from_u8(self.kind)
    }

    pub fn state(&self) -> Option<TokenManagerState> {
        TokenManagerState::from_u8(self.state)
    }
}

impl ProgramAccount for TokenManager {
    const NAME: &'static str = "TokenManager";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_sol::TOKEN_PROGRAM_ID;

    fn packed_mint(supply: u64, initialized: bool) -> Vec<u8> {
        let mut data = vec![0u8; Mint::LEN];
        data[0] = 1;
        data[4..36].copy_from_slice(&[7u8; 32]);
        data[36..44].copy_from_slice(&supply.to_le_bytes());
        data[44] = 6;
        data[45] = initialized as u8;
        data
    }

    fn account(data: Vec<u8>) -> AccountData {
        AccountData {
            owner: TOKEN_PROGRAM_ID,
            lamports: 1_461_600,
            data,
        }
    }

    #[test]
    fn unpack_mint_fields() {
        let mint = Mint::unpack(&Address::ZERO, &account(packed_mint(1_000, true)), &TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(mint.mint_authority, Some(Address::new([7; 32])));
        assert_eq!(mint.supply, 1_000);
        assert_eq!(mint.decimals, 6);
        assert_eq!(mint.freeze_authority, None);
        assert!(mint.is_fungible());
    }

    #[test]
    fn single_supply_is_not_fungible() {
        let mint = Mint::unpack(&Address::ZERO, &account(packed_mint(1, true)), &TOKEN_PROGRAM_ID).unwrap();
        assert!(!mint.is_fungible());
    }

    #[test]
    fn wrong_owner_is_rejected() {
        let mut acc = account(packed_mint(1, true));
        acc.owner = Address::new([3; 32]);
        let err = Mint::unpack(&Address::ZERO, &acc, &TOKEN_PROGRAM_ID).unwrap_err();
        assert!(err.to_string().contains("not the token program"));
    }

    #[test]
    fn short_or_uninitialized_mint_is_rejected() {
        assert!(Mint::unpack(&Address::ZERO, &account(vec![0; 10]), &TOKEN_PROGRAM_ID).is_err());
        assert!(Mint::unpack(&Address::ZERO, &account(packed_mint(1, false)), &TOKEN_PROGRAM_ID).is_err());
    }

    #[test]
    fn bad_coption_tag_is_rejected() {
        let mut data = packed_mint(1, true);
        data[0] = 9;
        assert!(Mint::unpack(&Address::ZERO, &account(data), &TOKEN_PROGRAM_ID).is_err());
    }

    #[test]
    fn token_manager_enums() {
        assert_eq!(TokenManagerKind::from_u8(3), Some(TokenManagerKind::Edition));
        assert_eq!(TokenManagerKind::from_u8(0), None);
        assert_eq!(TokenManagerState::from_u8(2), Some(TokenManagerState::Claimed));
        assert_eq!(TokenManagerState::from_u8(4), None);
    }
}
