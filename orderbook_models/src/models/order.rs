use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{DisplayFromStr, NoneAsEmptyString, PickFirst, serde_as};

use crate::constants::chains::Chain;

#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// One side of a matched swap.
pub struct SwapLeg {
    pub swap_id: String,
    pub chain: Chain,
    pub asset: String,
    pub initiator: String,
    pub redeemer: String,
    /// Amount in the asset's base units
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub amount: u128,

    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub initiate_tx_hash: Option<String>,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub redeem_tx_hash: Option<String>,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub refund_tx_hash: Option<String>,

    /// Block the transaction was included in. `0` or absent means only detected.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub initiate_block_number: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub redeem_block_number: Option<u64>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub refund_block_number: Option<u64>,
}

impl SwapLeg {
    pub fn has_initiate(&self) -> bool {
        self.initiate_tx_hash.is_some()
    }

    pub fn has_redeem(&self) -> bool {
        self.redeem_tx_hash.is_some()
    }

    pub fn has_refund(&self) -> bool {
        self.refund_tx_hash.is_some()
    }

    pub fn initiate_confirmed(&self) -> bool {
        is_confirmed(self.initiate_block_number)
    }

    pub fn redeem_confirmed(&self) -> bool {
        is_confirmed(self.redeem_block_number)
    }
}

fn is_confirmed(block_number: Option<u64>) -> bool {
    matches!(block_number, Some(n) if n > 0)
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// A matched cross-chain swap as returned by the order book.
pub struct Order {
    pub order_id: String,
    pub created_at: DateTime<Utc>,
    pub source_swap: SwapLeg,
    pub destination_swap: SwapLeg,
    /// Source chain block height after which the user can no longer initiate
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub initiate_deadline: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
/// A newest-first page of orders
pub struct OrderPage {
    pub data: Vec<Order>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub per_page: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// Query sent to the order book when listing orders
pub struct OrdersQuery {
    pub matched: bool,
    pub pending: bool,
    pub page: u32,
    pub per_page: u32,
}

impl OrdersQuery {
    pub fn latest(per_page: u32, include_pending: bool) -> Self {
        Self {
            matched: true,
            pending: include_pending,
            page: 1,
            per_page,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
/// Latest confirmed block height per chain
pub struct BlockNumbers(HashMap<Chain, u64>);

impl BlockNumbers {
    pub fn height(&self, chain: Chain) -> Option<u64> {
        self.0.get(&chain).copied()
    }

    /// Number of chains with a known height
    pub fn chain_count(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(Chain, u64)> for BlockNumbers {
    fn from_iter<I: IntoIterator<Item = (Chain, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// Chains this build doesn't know about are skipped instead of failing the snapshot.
impl<'de> Deserialize<'de> for BlockNumbers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, u64>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(chain, height)| match Chain::try_from(chain.as_str()) {
                Ok(chain) => Some((chain, height)),
                Err(_) => {
                    tracing::debug!("Skipping block number for unknown chain {chain}");
                    None
                }
            })
            .collect())
    }
}
