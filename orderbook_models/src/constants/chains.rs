use error_stack::{Report, report};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::error::Error;

/// Asset identifier used by the order book for native bitcoin.
pub const BITCOIN_PRIMARY_ASSET: &str = "primary";

pub const BITCOIN_ASSET_DECIMALS: u8 = 8;

pub fn is_native_bitcoin_asset(asset: &str) -> bool {
    let asset = asset.to_lowercase();
    asset == BITCOIN_PRIMARY_ASSET || asset == "btc"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Bitcoin,
    BitcoinTestnet,
    BitcoinRegtest,
    Ethereum,
    EthereumSepolia,
    Arbitrum,
    ArbitrumSepolia,
    Base,
    BaseSepolia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Hash)]
pub enum ChainType {
    Bitcoin,
    EVM,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Localnet,
}

impl Chain {
    pub fn to_chain_type(&self) -> ChainType {
        match self {
            Self::Bitcoin | Self::BitcoinTestnet | Self::BitcoinRegtest => ChainType::Bitcoin,
            _ => ChainType::EVM,
        }
    }

    /// Wire name, as used in order payloads and block number snapshots.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bitcoin => "bitcoin",
            Self::BitcoinTestnet => "bitcoin_testnet",
            Self::BitcoinRegtest => "bitcoin_regtest",
            Self::Ethereum => "ethereum",
            Self::EthereumSepolia => "ethereum_sepolia",
            Self::Arbitrum => "arbitrum",
            Self::ArbitrumSepolia => "arbitrum_sepolia",
            Self::Base => "base",
            Self::BaseSepolia => "base_sepolia",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Localnet => write!(f, "localnet"),
        }
    }
}

impl TryFrom<&str> for Chain {
    type Error = Report<Error>;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Chain::iter()
            .find(|chain| chain.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| report!(Error::ChainError(format!("Invalid chain name: {value}"))))
    }
}

impl TryFrom<&str> for Network {
    type Error = Report<Error>;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "localnet" => Ok(Self::Localnet),
            _ => Err(report!(Error::ChainError(format!(
                "Invalid network name: {value}"
            )))),
        }
    }
}
