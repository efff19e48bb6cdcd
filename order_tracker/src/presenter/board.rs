use std::collections::HashMap;
use std::sync::Arc;

use error_stack::report;
use orderbook_models::models::asset::AssetRegistry;
use orderbook_models::models::order::Order;

use crate::error::{Error, TrackerResult};
use crate::orderbook::Initiator;
use crate::polling::TrackerSnapshot;
use crate::presenter::order::OrderPresenter;
use crate::presenter::view::{OrderDetails, OrderRow};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Result of an initiate started with `OrderBoard::spawn_initiate`
#[derive(Debug)]
pub struct InitiateOutcome {
    pub order_id: String,
    pub result: TrackerResult<()>,
}

/// Presenters for every order in the latest snapshot, kept in snapshot order.
#[derive(Debug, Clone)]
pub struct OrderBoard {
    registry: AssetRegistry,
    order_ids: Vec<String>,
    presenters: HashMap<String, OrderPresenter>,
    version: Option<u64>,
}

impl OrderBoard {
    pub fn new(registry: AssetRegistry) -> Self {
        Self {
            registry,
            order_ids: Vec::new(),
            presenters: HashMap::new(),
            version: None,
        }
    }

    /// Refreshes presenters of known orders, adds new ones and drops the
    /// ones that left the snapshot. Snapshots already applied are skipped.
    pub fn apply_snapshot(&mut self, snapshot: &TrackerSnapshot) {
        if self.version == Some(snapshot.version) {
            return;
        }
        self.version = Some(snapshot.version);

        let block_numbers = snapshot.block_numbers();
        let mut presenters = HashMap::with_capacity(snapshot.orders.len());
        let mut order_ids = Vec::with_capacity(snapshot.orders.len());

        for order in snapshot.orders.iter() {
            let presenter = match self.presenters.remove(&order.order_id) {
                Some(mut presenter) => {
                    presenter.refresh(order.clone(), block_numbers);
                    presenter
                }
                None => OrderPresenter::new(order.clone(), block_numbers),
            };
            if presenters.insert(order.order_id.clone(), presenter).is_none() {
                order_ids.push(order.order_id.clone());
            }
        }

        for (order_id, presenter) in self.presenters.drain() {
            if presenter.is_busy() {
                tracing::warn!("Order {order_id} left the snapshot while initiating");
            }
        }

        self.presenters = presenters;
        self.order_ids = order_ids;
        tracing::debug!(
            "Applied snapshot v{} with {} orders",
            snapshot.version,
            self.order_ids.len()
        );
    }

    pub fn len(&self) -> usize {
        self.order_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order_ids.is_empty()
    }

    pub fn get(&self, order_id: &str) -> Option<&OrderPresenter> {
        self.presenters.get(order_id)
    }

    pub fn presenters(&self) -> impl Iterator<Item = &OrderPresenter> {
        self.order_ids
            .iter()
            .filter_map(|order_id| self.presenters.get(order_id))
    }

    pub fn rows(&self) -> Vec<OrderRow> {
        self.presenters()
            .map(|presenter| OrderRow::new(presenter, &self.registry))
            .collect()
    }

    pub fn details(&self, order_id: &str) -> TrackerResult<OrderDetails> {
        let presenter = self.find(order_id)?;
        Ok(OrderDetails::from_order(presenter.order(), &self.registry))
    }

    /// Plain-text table of the current rows.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return "No orders".to_string();
        }
        self.rows()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Marks the row busy and runs the initiate in the background, so the
    /// board keeps taking snapshots meanwhile. The outcome arrives on
    /// `outcomes` and must be handed to `finish_initiate`.
    pub fn spawn_initiate(
        &mut self,
        order_id: &str,
        initiator: Arc<dyn Initiator>,
        outcomes: mpsc::Sender<InitiateOutcome>,
    ) -> TrackerResult<JoinHandle<()>> {
        let order = self.begin_initiate(order_id)?;
        Ok(tokio::spawn(async move {
            let result = initiator.initiate(&order).await;
            if let Err(error) = &result {
                tracing::warn!("Failed to initiate order {}: {:?}", order.order_id, error);
            }
            let outcome = InitiateOutcome {
                order_id: order.order_id,
                result,
            };
            if outcomes.send(outcome).await.is_err() {
                tracing::warn!("Initiate outcome dropped, board receiver is gone");
            }
        }))
    }

    /// Applies an initiate outcome. Ignored if the order has since left the
    /// board.
    pub fn finish_initiate(&mut self, outcome: &InitiateOutcome) {
        match self.presenters.get_mut(&outcome.order_id) {
            Some(presenter) => presenter.finish_initiate(outcome.result.is_ok()),
            None => tracing::debug!(
                "Dropping initiate result for vanished order {}",
                outcome.order_id
            ),
        }
    }

    fn begin_initiate(&mut self, order_id: &str) -> TrackerResult<Order> {
        self.find_mut(order_id)?.begin_initiate()
    }

    fn find(&self, order_id: &str) -> TrackerResult<&OrderPresenter> {
        self.presenters
            .get(order_id)
            .ok_or_else(|| report!(Error::OrderNotFound(order_id.to_string())))
    }

    fn find_mut(&mut self, order_id: &str) -> TrackerResult<&mut OrderPresenter> {
        self.presenters
            .get_mut(order_id)
            .ok_or_else(|| report!(Error::OrderNotFound(order_id.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::order::PresentedState;
    use crate::status::DisplayLabel;
    use crate::tests::{MockInitiator, block_numbers, initiated, matched_order};
    use orderbook_models::constants::chains::{Chain, Network};
    use orderbook_models::models::order::BlockNumbers;
    use orderbook_models::models::status::OrderStatus;

    const DEADLINE: u64 = 7_001_200;

    fn blocks() -> BlockNumbers {
        block_numbers(&[(Chain::EthereumSepolia, DEADLINE - 100)])
    }

    fn snapshot(
        orders: Vec<Order>,
        block_numbers: Option<BlockNumbers>,
        version: u64,
    ) -> TrackerSnapshot {
        TrackerSnapshot {
            orders: Arc::new(orders),
            block_numbers: block_numbers.map(Arc::new),
            version,
        }
    }

    fn board() -> OrderBoard {
        OrderBoard::new(AssetRegistry::for_network(Network::Testnet))
    }

    fn labels(board: &OrderBoard) -> Vec<(String, DisplayLabel)> {
        board
            .presenters()
            .map(|presenter| (presenter.order().order_id.clone(), presenter.label()))
            .collect()
    }

    fn succeeded(order_id: &str) -> InitiateOutcome {
        InitiateOutcome {
            order_id: order_id.to_string(),
            result: Ok(()),
        }
    }

    #[test]
    fn test_apply_snapshot_keeps_snapshot_order() {
        let mut board = board();
        board.apply_snapshot(&snapshot(
            vec![matched_order("b", DEADLINE), matched_order("a", DEADLINE)],
            Some(blocks()),
            1,
        ));

        assert_eq!(board.len(), 2);
        assert_eq!(
            labels(&board),
            vec![
                ("b".to_string(), DisplayLabel::AwaitingInitiate),
                ("a".to_string(), DisplayLabel::AwaitingInitiate),
            ]
        );
    }

    #[test]
    fn test_vanished_orders_are_dropped() {
        let mut board = board();
        board.apply_snapshot(&snapshot(
            vec![matched_order("a", DEADLINE), matched_order("b", DEADLINE)],
            Some(blocks()),
            1,
        ));
        board.apply_snapshot(&snapshot(
            vec![matched_order("c", DEADLINE), matched_order("a", DEADLINE)],
            Some(blocks()),
            2,
        ));

        let ids: Vec<_> = board
            .presenters()
            .map(|p| p.order().order_id.clone())
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert!(board.get("b").is_none());
    }

    #[test]
    fn test_in_flight_initiate_survives_snapshot() {
        let mut board = board();
        board.apply_snapshot(&snapshot(vec![matched_order("a", DEADLINE)], Some(blocks()), 1));
        board.begin_initiate("a").expect("initiate");

        board.apply_snapshot(&snapshot(vec![matched_order("a", DEADLINE)], Some(blocks()), 2));
        assert!(board.get("a").expect("present").is_busy());

        board.finish_initiate(&succeeded("a"));
        assert_eq!(
            board.get("a").expect("present").state(),
            PresentedState::Optimistic(OrderStatus::InitiateDetected)
        );
    }

    #[test]
    fn test_outcome_for_vanished_order_is_ignored() {
        let mut board = board();
        board.apply_snapshot(&snapshot(vec![matched_order("a", DEADLINE)], Some(blocks()), 1));
        board.begin_initiate("a").expect("initiate");
        board.apply_snapshot(&snapshot(vec![], Some(blocks()), 2));

        board.finish_initiate(&succeeded("a"));
        assert!(board.is_empty());
    }

    #[tokio::test]
    async fn test_spawned_initiate_shows_busy_row_then_poll_wins() {
        let mut board = board();
        let initiator = Arc::new(MockInitiator::succeeding());
        let (outcomes_tx, mut outcomes_rx) = mpsc::channel(4);
        board.apply_snapshot(&snapshot(vec![matched_order("a", DEADLINE)], Some(blocks()), 1));

        board
            .spawn_initiate("a", initiator.clone(), outcomes_tx)
            .expect("initiate started");
        let row = &board.rows()[0];
        assert_eq!(row.action.as_ref().map(|a| (a.text, a.enabled)), Some(("Initiating...", false)));

        // Snapshots keep landing while the initiate is in flight
        board.apply_snapshot(&snapshot(vec![matched_order("a", DEADLINE)], Some(blocks()), 2));
        assert!(board.get("a").expect("present").is_busy());

        let outcome = outcomes_rx.recv().await.expect("outcome sent");
        assert!(outcome.result.is_ok());
        board.finish_initiate(&outcome);
        assert_eq!(initiator.calls(), 1);
        assert_eq!(board.get("a").expect("present").label(), DisplayLabel::InProgress);
        assert_eq!(board.rows()[0].action, None);

        // Order book has not seen the initiate yet
        board.apply_snapshot(&snapshot(vec![matched_order("a", DEADLINE)], Some(blocks()), 3));
        assert_eq!(
            board.get("a").expect("present").label(),
            DisplayLabel::AwaitingInitiate
        );

        board.apply_snapshot(&snapshot(
            vec![initiated(matched_order("a", DEADLINE))],
            Some(blocks()),
            4,
        ));
        assert_eq!(
            board.get("a").expect("present").status(),
            Some(OrderStatus::InitiateDetected)
        );
    }

    #[tokio::test]
    async fn test_failed_initiate_reenables_button() {
        let mut board = board();
        let (outcomes_tx, mut outcomes_rx) = mpsc::channel(4);
        board.apply_snapshot(&snapshot(vec![matched_order("a", DEADLINE)], Some(blocks()), 1));

        board
            .spawn_initiate("a", Arc::new(MockInitiator::failing()), outcomes_tx)
            .expect("initiate started");
        let outcome = outcomes_rx.recv().await.expect("outcome sent");
        assert_eq!(
            outcome.result.as_ref().unwrap_err().current_context(),
            &Error::InitiateError("wallet rejected".to_string())
        );
        board.finish_initiate(&outcome);

        let row = &board.rows()[0];
        assert_eq!(row.label, DisplayLabel::AwaitingInitiate);
        assert_eq!(row.action.as_ref().map(|a| a.enabled), Some(true));
    }

    #[tokio::test]
    async fn test_second_initiate_rejected_while_busy() {
        let mut board = board();
        let initiator = Arc::new(MockInitiator::succeeding());
        let (outcomes_tx, _outcomes_rx) = mpsc::channel(4);
        board.apply_snapshot(&snapshot(vec![matched_order("a", DEADLINE)], Some(blocks()), 1));

        board
            .spawn_initiate("a", initiator.clone(), outcomes_tx.clone())
            .expect("initiate started");
        let err = board
            .spawn_initiate("a", initiator.clone(), outcomes_tx)
            .unwrap_err();
        assert!(matches!(err.current_context(), Error::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_initiate_unknown_order() {
        let mut board = board();
        let initiator = Arc::new(MockInitiator::succeeding());
        let (outcomes_tx, _outcomes_rx) = mpsc::channel(4);

        let err = board
            .spawn_initiate("missing", initiator.clone(), outcomes_tx)
            .unwrap_err();
        assert_eq!(
            err.current_context(),
            &Error::OrderNotFound("missing".to_string())
        );
        assert_eq!(initiator.calls(), 0);
        assert!(board.details("missing").is_err());
    }

    #[test]
    fn test_same_version_is_skipped() {
        let mut board = board();
        board.apply_snapshot(&snapshot(vec![matched_order("a", DEADLINE)], Some(blocks()), 1));
        board.apply_snapshot(&snapshot(vec![], Some(blocks()), 1));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_render() {
        let mut board = board();
        assert_eq!(board.render(), "No orders");

        board.apply_snapshot(&snapshot(vec![matched_order("f3a1c9d2", DEADLINE)], None, 1));
        let rendered = board.render();
        assert!(rendered.starts_with("f3a1..."));
        assert!(rendered.contains("In progress..."));
        assert!(!rendered.contains("[Initiate]"));
    }
}
