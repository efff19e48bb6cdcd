use std::sync::Arc;

use error_stack::report;
use orderbook_models::models::order::{BlockNumbers, OrdersQuery};
use tokio::sync::{
    mpsc::{self, Receiver},
    watch,
};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, interval_at};

use crate::{
    config::PollerConfig,
    error::{Error, TrackerResult},
    orderbook::OrderSource,
    polling::{TrackerSnapshot, client::PollerClient, messages::PollerRequest},
};

/// Keeps the latest page of orders and the latest block heights.
///
/// Orders are fetched immediately and then on every `poll_interval` tick.
/// Block heights are fetched in a background task: once at start-up, again on
/// order ticks until the first success, and on their own interval if one is
/// configured. A failed fetch is logged and leaves the previous snapshot in
/// place; the next tick is the retry.
pub struct OrderPoller {
    source: Arc<dyn OrderSource>,
    config: PollerConfig,
    receiver: Receiver<PollerRequest>,
    snapshot: watch::Sender<Arc<TrackerSnapshot>>,
}

impl OrderPoller {
    pub fn new(
        source: Arc<dyn OrderSource>,
        config: PollerConfig,
        receiver: Receiver<PollerRequest>,
    ) -> (Self, watch::Receiver<Arc<TrackerSnapshot>>) {
        let (snapshot, snapshot_rx) = watch::channel(Arc::new(TrackerSnapshot::default()));
        (
            Self {
                source,
                config,
                receiver,
                snapshot,
            },
            snapshot_rx,
        )
    }

    /// Spawns the poller on the current runtime and returns its handle.
    pub fn spawn(
        source: Arc<dyn OrderSource>,
        config: PollerConfig,
    ) -> (PollerClient, JoinHandle<TrackerResult<()>>) {
        let (request_tx, request_rx) = mpsc::channel(100);
        let (poller, snapshot_rx) = Self::new(source, config, request_rx);
        let handle = tokio::spawn(poller.run());
        (PollerClient::new(request_tx, snapshot_rx), handle)
    }

    pub async fn run(mut self) -> TrackerResult<()> {
        tracing::info!(
            "Order poller started: every {:?}, {} orders per page, network {}",
            self.config.poll_interval,
            self.config.page_size,
            self.config.network
        );

        let mut orders_tick = interval(self.config.poll_interval);
        orders_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut blocks_tick = self.config.block_numbers_refresh.map(|period| {
            let mut tick = interval_at(Instant::now() + period, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tick
        });

        // Block heights load off the actor loop so a slow data service never
        // delays order polling or requests.
        let mut blocks_fetch = Some(self.spawn_block_fetch());

        let result = loop {
            tokio::select! {
                _ = orders_tick.tick() => {
                    tracing::debug!("Order poll tick");
                    if let Err(error) = self.refresh_orders().await {
                        tracing::warn!("Failed to fetch orders, keeping previous list: {:?}", error);
                    }
                    let blocks_missing = self.snapshot.borrow().block_numbers.is_none();
                    if blocks_missing && blocks_fetch.is_none() {
                        tracing::debug!("Retrying block numbers fetch");
                        blocks_fetch = Some(self.spawn_block_fetch());
                    }
                }
                _ = next_tick(&mut blocks_tick) => {
                    tracing::debug!("Block numbers refresh tick");
                    if blocks_fetch.is_none() {
                        blocks_fetch = Some(self.spawn_block_fetch());
                    }
                }
                joined = join_fetch(&mut blocks_fetch) => {
                    blocks_fetch = None;
                    match joined {
                        Ok(Ok(block_numbers)) => {
                            tracing::debug!("Fetched block numbers for {} chains", block_numbers.chain_count());
                            let next = self.current().with_block_numbers(block_numbers);
                            self.install(next);
                        }
                        Ok(Err(error)) => {
                            tracing::warn!("Failed to fetch block numbers, keeping previous snapshot: {:?}", error);
                        }
                        Err(error) => {
                            tracing::error!("Block numbers task failed: {error}");
                        }
                    }
                }
                request = self.receiver.recv() => {
                    match request {
                        Some(PollerRequest::GetSnapshot { resp }) => {
                            if resp.send(Ok(self.current())).is_err() {
                                tracing::error!("Failed to send snapshot response");
                            }
                        }
                        Some(PollerRequest::Refresh { resp }) => {
                            let response = self
                                .refresh_orders()
                                .await
                                .map_err(|e| e.current_context().clone());
                            if resp.send(response).is_err() {
                                tracing::error!("Failed to send refresh response");
                            }
                        }
                        Some(PollerRequest::Shutdown { resp }) => {
                            tracing::info!("Order poller shutting down");
                            if resp.send(Ok(())).is_err() {
                                tracing::debug!("Shutdown requester went away");
                            }
                            break Ok(());
                        }
                        None => {
                            tracing::warn!("Poller request channel closed, exiting...");
                            break Err(report!(Error::ModuleStopped("OrderPoller".to_string()))
                                .attach_printable("Poller request channel closed"));
                        }
                    }
                }
            }
        };

        if let Some(fetch) = blocks_fetch {
            fetch.abort();
        }
        result
    }

    fn current(&self) -> Arc<TrackerSnapshot> {
        self.snapshot.borrow().clone()
    }

    fn install(&self, snapshot: TrackerSnapshot) -> Arc<TrackerSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshot.send_replace(snapshot.clone());
        snapshot
    }

    async fn refresh_orders(&self) -> TrackerResult<Arc<TrackerSnapshot>> {
        let query = OrdersQuery::latest(self.config.page_size, self.config.include_pending);
        let page = self.source.fetch_orders(&query).await?;
        tracing::debug!("Fetched {} orders", page.data.len());

        let next = self.current().with_orders(page.data);
        Ok(self.install(next))
    }

    fn spawn_block_fetch(&self) -> BlockFetch {
        let source = self.source.clone();
        let network = self.config.network;
        tokio::spawn(async move { source.fetch_block_numbers(network).await })
    }
}

type BlockFetch = JoinHandle<TrackerResult<BlockNumbers>>;

/// Pending forever when no interval is configured.
async fn next_tick(tick: &mut Option<Interval>) {
    match tick {
        Some(tick) => {
            tick.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Pending forever when no fetch is in flight.
async fn join_fetch(
    fetch: &mut Option<BlockFetch>,
) -> Result<TrackerResult<BlockNumbers>, JoinError> {
    match fetch {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{MockOrderSource, block_numbers, init_tracing_in_tests, matched_order, page};
    use orderbook_models::constants::chains::Chain;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn config() -> PollerConfig {
        PollerConfig::default()
    }

    fn source() -> Arc<MockOrderSource> {
        Arc::new(MockOrderSource::new(
            page(vec![matched_order("order_1", 7_001_200)]),
            block_numbers(&[(Chain::EthereumSepolia, 7_001_000)]),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_every_interval() {
        init_tracing_in_tests();
        let source = source();
        let (client, _handle) = OrderPoller::spawn(source.clone(), config());

        sleep(Duration::from_millis(1)).await;
        assert_eq!(source.orders_calls(), 1);
        assert_eq!(source.blocks_calls(), 1);

        let snapshot = client.latest();
        assert_eq!(snapshot.orders.len(), 1);
        assert_eq!(
            snapshot.block_numbers().and_then(|b| b.height(Chain::EthereumSepolia)),
            Some(7_001_000)
        );

        sleep(Duration::from_secs(25)).await;
        assert_eq!(source.orders_calls(), 3);
        // Block numbers are a one-shot fetch by default
        assert_eq!(source.blocks_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_uses_configured_page() {
        let source = source();
        let (_client, _handle) = OrderPoller::spawn(source.clone(), config());

        sleep(Duration::from_millis(1)).await;
        let query = source.last_query().expect("orders fetched");
        assert_eq!(query, OrdersQuery::latest(4, false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_keeps_previous_orders() {
        let source = source();
        let (client, _handle) = OrderPoller::spawn(source.clone(), config());

        sleep(Duration::from_millis(1)).await;
        let before = client.latest();
        assert_eq!(before.orders.len(), 1);

        source.set_orders(Err(Error::OrderbookError));
        sleep(Duration::from_secs(10)).await;
        assert_eq!(source.orders_calls(), 2);

        let after = client.latest();
        assert_eq!(after.orders, before.orders);
        assert_eq!(after.version, before.version);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_is_not_retried_before_next_tick() {
        let source = source();
        source.push_orders(Err(Error::OrderbookError));
        let (client, _handle) = OrderPoller::spawn(source.clone(), config());

        sleep(Duration::from_secs(9)).await;
        assert_eq!(source.orders_calls(), 1);
        assert!(client.latest().orders.is_empty());

        sleep(Duration::from_secs(2)).await;
        assert_eq!(source.orders_calls(), 2);
        assert_eq!(client.latest().orders.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_numbers_retried_until_first_success() {
        let source = source();
        source.push_blocks(Err(Error::OrderbookError));
        let (client, _handle) = OrderPoller::spawn(source.clone(), config());

        // Start-up fetch fails; the first order tick finds it still in flight
        sleep(Duration::from_millis(1)).await;
        assert_eq!(source.blocks_calls(), 1);
        assert_eq!(client.latest().orders.len(), 1);
        assert!(client.latest().block_numbers.is_none());

        sleep(Duration::from_secs(10)).await;
        assert_eq!(source.blocks_calls(), 2);
        assert!(client.latest().block_numbers.is_some());

        sleep(Duration::from_secs(30)).await;
        assert_eq!(source.blocks_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_block_service_does_not_hold_up_orders() {
        let source = source();
        source.stall_blocks(Duration::from_secs(3600));
        let (client, handle) = OrderPoller::spawn(source.clone(), config());

        sleep(Duration::from_secs(35)).await;
        assert_eq!(source.orders_calls(), 4);
        assert_eq!(client.latest().orders.len(), 1);
        assert!(client.latest().block_numbers.is_none());
        // The stalled fetch is still in flight, so no new one is started
        assert_eq!(source.blocks_calls(), 1);

        timeout(Duration::from_secs(5), client.shutdown())
            .await
            .expect("shutdown is not blocked by the block fetch")
            .expect("poller running");
        assert!(handle.await.expect("task joined").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_numbers_refresh_interval() {
        let source = source();
        let config = PollerConfig {
            block_numbers_refresh: Some(Duration::from_secs(60)),
            ..config()
        };
        let (_client, _handle) = OrderPoller::spawn(source.clone(), config);

        sleep(Duration::from_secs(59)).await;
        assert_eq!(source.blocks_calls(), 1);
        sleep(Duration::from_secs(2)).await;
        assert_eq!(source.blocks_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_fetching() {
        let source = source();
        let (client, handle) = OrderPoller::spawn(source.clone(), config());

        sleep(Duration::from_secs(15)).await;
        assert_eq!(source.orders_calls(), 2);

        client.shutdown().await.expect("poller running");
        assert!(handle.await.expect("task joined").is_ok());

        sleep(Duration::from_secs(60)).await;
        assert_eq!(source.orders_calls(), 2);
        assert!(client.snapshot().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_clients_stops_poller() {
        let source = source();
        let (client, handle) = OrderPoller::spawn(source.clone(), config());
        sleep(Duration::from_millis(1)).await;

        drop(client);
        let result = handle.await.expect("task joined");
        assert_eq!(
            result.unwrap_err().current_context(),
            &Error::ModuleStopped("OrderPoller".to_string())
        );

        sleep(Duration::from_secs(60)).await;
        assert_eq!(source.orders_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_on_demand() {
        let source = source();
        let (client, _handle) = OrderPoller::spawn(source.clone(), config());
        sleep(Duration::from_millis(1)).await;

        source.set_orders(Ok(page(vec![
            matched_order("order_2", 7_001_200),
            matched_order("order_1", 7_001_200),
        ])));
        let snapshot = client.refresh().await.expect("refresh succeeds");
        assert_eq!(snapshot.orders.len(), 2);
        assert_eq!(snapshot.orders[0].order_id, "order_2");
        assert_eq!(client.snapshot().await.expect("running"), snapshot);

        source.set_orders(Err(Error::OrderbookError));
        let err = client.refresh().await.unwrap_err();
        assert_eq!(err.current_context(), &Error::OrderbookError);
        assert_eq!(client.latest().orders.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_consistent_pairs() {
        let source = source();
        let (client, _handle) = OrderPoller::spawn(source.clone(), config());
        let mut updates = client.subscribe();

        updates.changed().await.expect("poller running");
        let first = updates.borrow_and_update().clone();
        assert!(first.version >= 1);

        sleep(Duration::from_millis(1)).await;
        let latest = client.latest();
        assert_eq!(latest.orders.len(), 1);
        assert!(latest.block_numbers.is_some());
    }
}
