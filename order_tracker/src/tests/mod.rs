use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use error_stack::report;
use orderbook_models::constants::chains::{Chain, Network};
use orderbook_models::models::order::{BlockNumbers, Order, OrderPage, OrdersQuery, SwapLeg};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{Error, TrackerResult};
use crate::orderbook::{Initiator, OrderSource};

pub const WBTC_SEPOLIA: &str = "0x3c6a17b8cd92976d1d91e491c93c98cd81998265";

pub fn init_tracing_in_tests() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json().pretty().with_ansi(true))
        .try_init()
        .ok();
}

fn leg(swap_id: &str, chain: Chain, asset: &str, amount: u128) -> SwapLeg {
    SwapLeg {
        swap_id: swap_id.to_string(),
        chain,
        asset: asset.to_string(),
        initiator: "0x1111111111111111111111111111111111111111".to_string(),
        redeemer: "tb1q9s2uk8gfz4rxhwx0fzkj0c7h3nnnrjzjw4flc6".to_string(),
        amount,
        initiate_tx_hash: None,
        redeem_tx_hash: None,
        refund_tx_hash: None,
        initiate_block_number: None,
        redeem_block_number: None,
        refund_block_number: None,
    }
}

/// WBTC on Sepolia -> BTC on testnet, matched and not yet initiated.
pub fn matched_order(order_id: &str, initiate_deadline: u64) -> Order {
    Order {
        order_id: order_id.to_string(),
        created_at: Utc
            .with_ymd_and_hms(2026, 10, 19, 14, 5, 9)
            .single()
            .expect("valid date"),
        source_swap: leg(
            &format!("{order_id}_src"),
            Chain::EthereumSepolia,
            WBTC_SEPOLIA,
            10_000_000,
        ),
        destination_swap: leg(
            &format!("{order_id}_dst"),
            Chain::BitcoinTestnet,
            "primary",
            9_970_000,
        ),
        initiate_deadline: Some(initiate_deadline),
    }
}

pub fn initiated(mut order: Order) -> Order {
    order.source_swap.initiate_tx_hash = Some(format!("0x{}_init", order.order_id));
    order
}

pub fn block_numbers(heights: &[(Chain, u64)]) -> BlockNumbers {
    heights.iter().copied().collect()
}

pub fn page(orders: Vec<Order>) -> OrderPage {
    OrderPage {
        per_page: orders.len() as u32,
        data: orders,
        page: 1,
        total_pages: 1,
        total_items: 0,
    }
}

/// Order source that replays queued results, then repeats the fallback.
pub struct MockOrderSource {
    orders: Mutex<VecDeque<Result<OrderPage, Error>>>,
    orders_fallback: Mutex<Result<OrderPage, Error>>,
    blocks: Mutex<VecDeque<Result<BlockNumbers, Error>>>,
    blocks_fallback: Mutex<Result<BlockNumbers, Error>>,
    blocks_delay: Mutex<Option<Duration>>,
    orders_calls: AtomicUsize,
    blocks_calls: AtomicUsize,
    last_query: Mutex<Option<OrdersQuery>>,
}

impl MockOrderSource {
    pub fn new(orders: OrderPage, blocks: BlockNumbers) -> Self {
        Self {
            orders: Mutex::new(VecDeque::new()),
            orders_fallback: Mutex::new(Ok(orders)),
            blocks: Mutex::new(VecDeque::new()),
            blocks_fallback: Mutex::new(Ok(blocks)),
            blocks_delay: Mutex::new(None),
            orders_calls: AtomicUsize::new(0),
            blocks_calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn push_orders(&self, result: Result<OrderPage, Error>) {
        self.orders.lock().expect("poisoned").push_back(result);
    }

    pub fn push_blocks(&self, result: Result<BlockNumbers, Error>) {
        self.blocks.lock().expect("poisoned").push_back(result);
    }

    /// Makes every block numbers fetch wait `delay` before answering.
    pub fn stall_blocks(&self, delay: Duration) {
        *self.blocks_delay.lock().expect("poisoned") = Some(delay);
    }

    pub fn set_orders(&self, result: Result<OrderPage, Error>) {
        *self.orders_fallback.lock().expect("poisoned") = result;
    }

    pub fn orders_calls(&self) -> usize {
        self.orders_calls.load(Ordering::SeqCst)
    }

    pub fn blocks_calls(&self) -> usize {
        self.blocks_calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<OrdersQuery> {
        self.last_query.lock().expect("poisoned").clone()
    }
}

#[async_trait::async_trait]
impl OrderSource for MockOrderSource {
    async fn fetch_orders(&self, query: &OrdersQuery) -> TrackerResult<OrderPage> {
        self.orders_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().expect("poisoned") = Some(query.clone());
        let next = self.orders.lock().expect("poisoned").pop_front();
        let result = next.unwrap_or_else(|| self.orders_fallback.lock().expect("poisoned").clone());
        result.map_err(|e| report!(e))
    }

    async fn fetch_block_numbers(&self, _network: Network) -> TrackerResult<BlockNumbers> {
        self.blocks_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.blocks_delay.lock().expect("poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.blocks.lock().expect("poisoned").pop_front();
        let result = next.unwrap_or_else(|| self.blocks_fallback.lock().expect("poisoned").clone());
        result.map_err(|e| report!(e))
    }
}

pub struct MockInitiator {
    result: Result<(), Error>,
    calls: AtomicUsize,
}

impl MockInitiator {
    pub fn succeeding() -> Self {
        Self {
            result: Ok(()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(Error::InitiateError("wallet rejected".to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Initiator for MockInitiator {
    async fn initiate(&self, _order: &Order) -> TrackerResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(|e| report!(e))
    }
}
