//! Token metadata records, decoded just far enough to pick the transfer path.
//!
//! Metadata accounts grew optional fields over several program versions.
//! Older accounts end early, newer ones are zero padded, so every field
//! after `is_mutable` is read leniently: missing bytes decode as `None`.

use borsh::BorshDeserialize;
use chain_sol::Address;

use crate::error::{Result, StakeSdkError};

/// Account key tag of a `MetadataV1` record.
pub const METADATA_V1_KEY: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenStandard {
    NonFungible = 0,
    FungibleAsset = 1,
    Fungible = 2,
    NonFungibleEdition = 3,
    ProgrammableNonFungible = 4,
    ProgrammableNonFungibleEdition = 5,
}

impl TokenStandard {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TokenStandard::NonFungible),
            1 => Some(TokenStandard::FungibleAsset),
            2 => Some(TokenStandard::Fungible),
            3 => Some(TokenStandard::NonFungibleEdition),
            4 => Some(TokenStandard::ProgrammableNonFungible),
            5 => Some(TokenStandard::ProgrammableNonFungibleEdition),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct Creator {
    pub address: Address,
    pub verified: bool,
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct Collection {
    pub verified: bool,
    pub key: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub struct Uses {
    pub use_method: u8,
    pub remaining: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub enum CollectionDetails {
    V1 { size: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
pub enum ProgrammableConfig {
    V1 { rule_set: Option<Address> },
}

impl ProgrammableConfig {
    pub fn rule_set(&self) -> Option<Address> {
        match self {
            ProgrammableConfig::V1 { rule_set } => *rule_set,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub update_authority: Address,
    pub mint: Address,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
    pub edition_nonce: Option<u8>,
    pub token_standard: Option<TokenStandard>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
    pub collection_details: Option<CollectionDetails>,
    pub programmable_config: Option<ProgrammableConfig>,
}

impl Metadata {
    pub fn decode(address: &Address, data: &[u8]) -> Result<Self> {
        let (&key, mut buf) = data
            .split_first()
            .ok_or_else(|| StakeSdkError::decode("Metadata", *address, "empty account"))?;
        if key != METADATA_V1_KEY {
            return Err(StakeSdkError::decode(
                "Metadata",
                *address,
                format!("unexpected key {key}"),
            ));
        }

        let buf = &mut buf;
        let err = |e: std::io::Error| StakeSdkError::decode("Metadata", *address, e);

        let update_authority = Address::deserialize(buf).map_err(err)?;
        let mint = Address::deserialize(buf).map_err(err)?;
        let name = padded_string(buf).map_err(err)?;
        let symbol = padded_string(buf).map_err(err)?;
        let uri = padded_string(buf).map_err(err)?;
        let seller_fee_basis_points = u16::deserialize(buf).map_err(err)?;
        let creators = Option::<Vec<Creator>>::deserialize(buf).map_err(err)?;
        let primary_sale_happened = bool::deserialize(buf).map_err(err)?;
        let is_mutable = bool::deserialize(buf).map_err(err)?;

        let edition_nonce = lenient::<u8>(buf);
        let token_standard = lenient::<u8>(buf).and_then(TokenStandard::from_u8);
        let collection = lenient::<Collection>(buf);
        let uses = lenient::<Uses>(buf);
        let collection_details = lenient::<CollectionDetails>(buf);
        let programmable_config = lenient::<ProgrammableConfig>(buf);

        Ok(Metadata {
            update_authority,
            mint,
            name,
            symbol,
            uri,
            seller_fee_basis_points,
            creators,
            primary_sale_happened,
            is_mutable,
            edition_nonce,
            token_standard,
            collection,
            uses,
            collection_details,
            programmable_config,
        })
    }

    /// Rule set gating transfers, if the asset is programmable.
    pub fn rule_set(&self) -> Option<Address> {
        self.programmable_config.as_ref().and_then(ProgrammableConfig::rule_set)
    }
}

/// Names and symbols are stored null padded to a fixed width.
fn padded_string(buf: &mut &[u8]) -> std::io::Result<String> {
    let s = String::deserialize(buf)?;
    Ok(s.trim_end_matches('\0').to_string())
}

/// Read an `Option<T>` that may be cut off by the end of the account.
/// A failed read consumes the rest of the buffer so later fields are `None`.
fn lenient<T: BorshDeserialize>(buf: &mut &[u8]) -> Option<T> {
    if buf.is_empty() {
        return None;
    }
    match Option::<T>::deserialize(buf) {
        Ok(value) => value,
        Err(_) => {
            *buf = &[];
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn borsh_string(out: &mut Vec<u8>, s: &str, width: usize) {
        let mut bytes = s.as_bytes().to_vec();
        bytes.resize(width, 0);
        out.extend((bytes.len() as u32).to_le_bytes());
        out.extend(bytes);
    }

    /// Metadata bytes up to and including `is_mutable`.
    pub(crate) fn metadata_head(mint: &Address) -> Vec<u8> {
        let mut data = vec![METADATA_V1_KEY];
        data.extend([5u8; 32]);
        data.extend(mint.to_bytes());
        borsh_string(&mut data, "Degen #1", 32);
        borsh_string(&mut data, "DGN", 10);
        borsh_string(&mut data, "https://example.com/1.json", 200);
        data.extend(500u16.to_le_bytes());
        data.push(1); // creators: Some
        data.extend(1u32.to_le_bytes());
        data.extend([6u8; 32]);
        data.push(1);
        data.push(100);
        data.push(0); // primary_sale_happened
        data.push(1); // is_mutable
        data
    }

    pub(crate) fn programmable_metadata(mint: &Address, rule_set: &Address) -> Vec<u8> {
        let mut data = metadata_head(mint);
        data.extend([1, 254]); // edition_nonce
        data.extend([1, TokenStandard::ProgrammableNonFungible as u8]);
        data.push(0); // collection
        data.push(0); // uses
        data.push(0); // collection_details
        data.extend([1, 0, 1]); // programmable_config: Some(V1 { rule_set: Some })
        data.extend(rule_set.to_bytes());
        data
    }

    #[test]
    fn decode_legacy_metadata_without_optional_tail() {
        let mint = Address::new([2; 32]);
        let metadata = Metadata::decode(&Address::ZERO, &metadata_head(&mint)).unwrap();
        assert_eq!(metadata.mint, mint);
        assert_eq!(metadata.name, "Degen #1");
        assert_eq!(metadata.symbol, "DGN");
        assert_eq!(metadata.creators.as_ref().map(Vec::len), Some(1));
        assert_eq!(metadata.token_standard, None);
        assert_eq!(metadata.rule_set(), None);
    }

    #[test]
    fn decode_programmable_metadata() {
        let mint = Address::new([2; 32]);
        let rules = Address::new([8; 32]);
        let metadata = Metadata::decode(&Address::ZERO, &programmable_metadata(&mint, &rules)).unwrap();
        assert_eq!(metadata.edition_nonce, Some(254));
        assert_eq!(metadata.token_standard, Some(TokenStandard::ProgrammableNonFungible));
        assert_eq!(metadata.rule_set(), Some(rules));
    }

    #[test]
    fn zero_padding_reads_as_absent() {
        let mut data = metadata_head(&Address::new([2; 32]));
        data.extend([0u8; 64]);
        let metadata = Metadata::decode(&Address::ZERO, &data).unwrap();
        assert_eq!(metadata.token_standard, None);
        assert_eq!(metadata.programmable_config, None);
    }

    #[test]
    fn truncated_tail_is_tolerated() {
        let mut data = programmable_metadata(&Address::new([2; 32]), &Address::new([8; 32]));
        data.truncate(data.len() - 10);
        let metadata = Metadata::decode(&Address::ZERO, &data).unwrap();
        assert_eq!(metadata.token_standard, Some(TokenStandard::ProgrammableNonFungible));
        assert_eq!(metadata.programmable_config, None);
    }

    #[test]
    fn wrong_key_is_a_decode_error() {
        let mut data = metadata_head(&Address::new([2; 32]));
        data[0] = 6;
        let err = Metadata::decode(&Address::ZERO, &data).unwrap_err();
        assert!(err.to_string().contains("unexpected key 6"));
    }

    #[test]
    fn truncated_head_is_a_decode_error() {
        let data = metadata_head(&Address::new([2; 32]));
        assert!(Metadata::decode(&Address::ZERO, &data[..50]).is_err());
        assert!(Metadata::decode(&Address::ZERO, &[]).is_err());
    }
}
