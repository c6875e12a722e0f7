//! Deployment configuration: program ids and read batching.
//!
//! Everything defaults to the production deployment. Alternate clusters
//! override only the ids that differ, from JSON:
//!
//! ```json
//! { "program_ids": { "stake_pool": "..." }, "max_accounts_per_request": 50 }
//! ```

use std::path::Path;

use chain_sol::{
    Address, ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, SYSVAR_INSTRUCTIONS_ID,
    SYSVAR_RENT_ID, TOKEN_AUTH_RULES_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StakeSdkError};

/// Stake Pool program: `stkBL96RZkjY5ine4TvPihGqW8UHJfch2cokjAPzV8i`
pub const STAKE_POOL_PROGRAM_ID: Address = Address::new([
    0x0d, 0x09, 0x8c, 0x4f, 0x9f, 0x98, 0xac, 0xa0, 0x58, 0xe6, 0x74, 0x7e, 0x73, 0x8d,
    0x3a, 0x68, 0xd4, 0x58, 0x9a, 0xba, 0x7f, 0xb1, 0x7a, 0x37, 0xe3, 0x73, 0xe6, 0x56,
    0x1d, 0xa5, 0x80, 0x97,
]);

/// Reward Distributor program: `rwdNPNPS6zEgu9KwdKHGbf5GC2Bfen8b9rmpGcHZ6Uf`
pub const REWARD_DISTRIBUTOR_PROGRAM_ID: Address = Address::new([
    0x0c, 0xcb, 0x3a, 0x05, 0x4e, 0xc2, 0x7f, 0x2e, 0x28, 0x60, 0xb3, 0xfb, 0x20, 0x0a,
    0xe1, 0x23, 0x86, 0x0f, 0xab, 0x1a, 0x66, 0xb8, 0x06, 0x40, 0x11, 0x7f, 0x1e, 0x2a,
    0x50, 0x5e, 0x84, 0x18,
]);

/// Group Reward Distributor program: `grwdsgBXwVGVcM4UFZbiPPv5zdqxVDmJFMmLBiTPGXq`
pub const GROUP_REWARD_DISTRIBUTOR_PROGRAM_ID: Address = Address::new([
    0x0a, 0x36, 0x1f, 0x03, 0x97, 0x73, 0xb0, 0x9a, 0xcd, 0x0a, 0x9a, 0xcd, 0xc4, 0xd1,
    0x1d, 0x5b, 0x17, 0xb7, 0x0c, 0x86, 0x75, 0xa9, 0x70, 0xe1, 0xf8, 0x73, 0x88, 0x6d,
    0xed, 0x7e, 0x2f, 0xc8,
]);

/// Token Manager program (receipt custody): `mgr99QFMYByTqGPWmNqunV7vBLmWWXdSrHUfV8Jf3JM`
pub const TOKEN_MANAGER_PROGRAM_ID: Address = Address::new([
    0x0b, 0x72, 0x9c, 0x6c, 0x45, 0xf1, 0x8c, 0x9d, 0x2b, 0xf8, 0x96, 0xf8, 0x97, 0xf6,
    0x44, 0xe3, 0xbb, 0x6f, 0xd1, 0xd5, 0xc8, 0x95, 0x18, 0xe7, 0x7a, 0xaa, 0xe5, 0x71,
    0x80, 0x63, 0x5a, 0x96,
]);

/// Fee collector and reward manager: `crkdpVWjHWdggGgBuSyAqSmZUmAjYLzD435tcLDRLXr`
pub const CRANK_KEY: Address = Address::new([
    0x09, 0x2f, 0x95, 0x5c, 0xfa, 0xec, 0xb5, 0x2a, 0x1c, 0x58, 0x42, 0xe3, 0xc3, 0xaa,
    0xe2, 0xad, 0x87, 0xa1, 0xba, 0xb7, 0x62, 0xb1, 0xe9, 0x5f, 0xc4, 0x88, 0x99, 0x58,
    0x62, 0xe0, 0x32, 0x49,
]);

/// Upper bound the public RPC puts on `getMultipleAccounts`.
pub const DEFAULT_MAX_ACCOUNTS_PER_REQUEST: usize = 100;

/// Every fixed address the SDK references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramIds {
    pub stake_pool: Address,
    pub reward_distributor: Address,
    pub group_reward_distributor: Address,
    pub token_manager: Address,
    /// Receives the receipt when it is returned to custody.
    pub receipt_collector: Address,
    pub reward_manager: Address,
    pub token_metadata: Address,
    pub token_auth_rules: Address,
    pub token_program: Address,
    pub associated_token_program: Address,
    pub system_program: Address,
    pub sysvar_rent: Address,
    pub sysvar_instructions: Address,
}

impl Default for ProgramIds {
    fn default() -> Self {
        ProgramIds {
            stake_pool: STAKE_POOL_PROGRAM_ID,
            reward_distributor: REWARD_DISTRIBUTOR_PROGRAM_ID,
            group_reward_distributor: GROUP_REWARD_DISTRIBUTOR_PROGRAM_ID,
            token_manager: TOKEN_MANAGER_PROGRAM_ID,
            receipt_collector: CRANK_KEY,
            reward_manager: CRANK_KEY,
            token_metadata: TOKEN_METADATA_PROGRAM_ID,
            token_auth_rules: TOKEN_AUTH_RULES_PROGRAM_ID,
            token_program: TOKEN_PROGRAM_ID,
            associated_token_program: ASSOCIATED_TOKEN_PROGRAM_ID,
            system_program: SYSTEM_PROGRAM_ID,
            sysvar_rent: SYSVAR_RENT_ID,
            sysvar_instructions: SYSVAR_INSTRUCTIONS_ID,
        }
    }
}

/// SDK configuration, injected once when the client is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub program_ids: ProgramIds,
    /// Accounts requested per `getMultipleAccounts` round trip.
    pub max_accounts_per_request: usize,
}

impl Default for SdkConfig {
    fn default() -> Self {
        SdkConfig {
            program_ids: ProgramIds::default(),
            max_accounts_per_request: DEFAULT_MAX_ACCOUNTS_PER_REQUEST,
        }
    }
}

impl SdkConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SdkConfig =
            serde_json::from_str(json).map_err(|e| StakeSdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| StakeSdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.max_accounts_per_request == 0 {
            return Err(StakeSdkError::Config(
                "max_accounts_per_request must be > 0".into(),
            ));
        }
        Ok(())
    }
}
