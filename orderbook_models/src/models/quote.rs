use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

use crate::constants::chains::Chain;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// Chain and asset address of one side of a quote
pub struct AssetRef {
    pub chain: Chain,
    pub asset: String,
}

impl AssetRef {
    pub fn new(chain: Chain, asset: &str) -> Self {
        Self {
            chain,
            asset: asset.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub from: AssetRef,
    pub to: AssetRef,
    /// Send amount in base units of `from`, or receive amount when `exact_out`
    pub amount: u128,
    pub exact_out: bool,
}

impl QuoteRequest {
    /// `<chain>:<asset>::<chain>:<asset>`, the pair format the quote server expects
    pub fn order_pair(&self) -> String {
        format!(
            "{}:{}::{}:{}",
            self.from.chain,
            self.from.asset.to_lowercase(),
            self.to.chain,
            self.to.asset.to_lowercase()
        )
    }
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QuoteResult {
    /// Receive amount in base units, keyed by strategy id
    #[serde_as(as = "HashMap<_, PickFirst<(DisplayFromStr, _)>>")]
    pub quotes: HashMap<String, u128>,
    #[serde(default)]
    pub input_token_price: f64,
    #[serde(default)]
    pub output_token_price: f64,
}
