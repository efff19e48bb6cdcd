use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::constants::chains::{
    BITCOIN_ASSET_DECIMALS, BITCOIN_PRIMARY_ASSET, Chain, ChainType, Network,
    is_native_bitcoin_asset,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Asset {
    pub chain: Chain,
    /// Token contract address, or `primary` for native bitcoin
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Asset {
    pub fn new(chain: Chain, address: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            chain,
            address: address.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AssetKey {
    chain: Chain,
    address: String,
}

impl AssetKey {
    /// Native bitcoin may be spelled `btc` or `primary`; both map to one key.
    fn new(chain: Chain, address: &str) -> Self {
        let address = if chain.to_chain_type() == ChainType::Bitcoin && is_native_bitcoin_asset(address) {
            BITCOIN_PRIMARY_ASSET.to_string()
        } else {
            address.to_lowercase()
        };
        Self { chain, address }
    }
}

#[derive(Debug, Clone, Default)]
/// Assets the front-end knows how to display, keyed by chain and address
pub struct AssetRegistry {
    assets: HashMap<AssetKey, Asset>,
}

impl AssetRegistry {
    pub fn new(assets: Vec<Asset>) -> Self {
        let mut registry = Self::default();
        for asset in assets {
            registry.insert(asset);
        }
        registry
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => MAINNET_ASSETS.clone(),
            Network::Testnet | Network::Localnet => TESTNET_ASSETS.clone(),
        }
    }

    pub fn insert(&mut self, asset: Asset) {
        self.assets
            .insert(AssetKey::new(asset.chain, &asset.address), asset);
    }

    pub fn get(&self, chain: Chain, address: &str) -> Option<&Asset> {
        self.assets.get(&AssetKey::new(chain, address))
    }

    /// Decimal precision of an asset. Unknown assets are assumed to carry
    /// bitcoin precision.
    pub fn decimals(&self, chain: Chain, address: &str) -> u8 {
        self.get(chain, address)
            .map(|asset| asset.decimals)
            .unwrap_or(BITCOIN_ASSET_DECIMALS)
    }
}

lazy_static! {
    static ref TESTNET_ASSETS: AssetRegistry = AssetRegistry::new(vec![
        Asset::new(
            Chain::EthereumSepolia,
            "0x3c6a17b8cd92976d1d91e491c93c98cd81998265",
            "WBTC",
            8
        ),
        Asset::new(Chain::BitcoinTestnet, BITCOIN_PRIMARY_ASSET, "BTC", 8),
    ]);
    static ref MAINNET_ASSETS: AssetRegistry = AssetRegistry::new(vec![
        Asset::new(
            Chain::Ethereum,
            "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599",
            "WBTC",
            8
        ),
        Asset::new(
            Chain::Arbitrum,
            "0x2f2a2543b76a4166549f7aab2e75bef0aefc5b0f",
            "WBTC",
            8
        ),
        Asset::new(Chain::Bitcoin, BITCOIN_PRIMARY_ASSET, "BTC", 8),
    ]);
}

/// Bitcoin legs are native BTC, EVM legs on these networks are wrapped BTC.
pub fn default_symbol(chain: Chain) -> &'static str {
    match chain.to_chain_type() {
        ChainType::Bitcoin => "BTC",
        ChainType::EVM => "WBTC",
    }
}
