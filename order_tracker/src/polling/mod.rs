use std::sync::Arc;

use orderbook_models::models::order::{BlockNumbers, Order};

pub mod client;
pub mod manager;
pub mod messages;

/// Latest orders and block heights as one consistent pair. Every refresh
/// builds a new value and swaps it in whole; nothing is mutated in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerSnapshot {
    /// Newest first
    pub orders: Arc<Vec<Order>>,
    pub block_numbers: Option<Arc<BlockNumbers>>,
    /// Bumped on every install
    pub version: u64,
}

impl TrackerSnapshot {
    pub fn with_orders(&self, orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(orders),
            block_numbers: self.block_numbers.clone(),
            version: self.version + 1,
        }
    }

    pub fn with_block_numbers(&self, block_numbers: BlockNumbers) -> Self {
        Self {
            orders: self.orders.clone(),
            block_numbers: Some(Arc::new(block_numbers)),
            version: self.version + 1,
        }
    }

    pub fn block_numbers(&self) -> Option<&BlockNumbers> {
        self.block_numbers.as_deref()
    }
}
