//! Collaborators the tracker talks to: the order book (orders and block
//! heights), the settlement endpoint that initiates orders, and the quote
//! server. The traits are the seams the poller and presenter depend on.

use orderbook_models::constants::chains::Network;
use orderbook_models::models::order::{BlockNumbers, Order, OrderPage, OrdersQuery};

use crate::error::TrackerResult;

pub mod client;
pub mod initiator;
pub mod quote;

#[async_trait::async_trait]
pub trait OrderSource: Send + Sync {
    /// Newest-first page of orders
    async fn fetch_orders(&self, query: &OrdersQuery) -> TrackerResult<OrderPage>;

    /// Latest block height per chain on `network`
    async fn fetch_block_numbers(&self, network: Network) -> TrackerResult<BlockNumbers>;
}

#[async_trait::async_trait]
pub trait Initiator: Send + Sync {
    /// Triggers the on-chain initiate of the order's source leg. Success only
    /// means the transaction was submitted; it shows up on a later poll.
    async fn initiate(&self, order: &Order) -> TrackerResult<()>;
}
