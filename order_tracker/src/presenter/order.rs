use error_stack::report;
use orderbook_models::models::order::{BlockNumbers, Order};
use orderbook_models::models::status::OrderStatus;

use crate::error::{Error, TrackerResult};
use crate::status::{DisplayLabel, display_label, resolve_status};

/// Client-side view of one order's status.
///
/// ```text
/// Unresolved --refresh with snapshot--> Resolved
/// Resolved(Matched) --begin_initiate--> Initiating
/// Initiating --success--> Optimistic(InitiateDetected)
/// Initiating --failure--> Resolved(previous)
/// Resolved | Optimistic --refresh--> Resolved(recomputed)
/// ```
///
/// A refresh always replaces an optimistic status. A refresh during an
/// in-flight initiate only updates the status to fall back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentedState {
    /// No block snapshot seen yet
    Unresolved,
    Resolved(OrderStatus),
    /// Local, non-authoritative status set after a successful initiate
    Optimistic(OrderStatus),
    /// Initiate in flight; holds the authoritative status to revert to
    Initiating(OrderStatus),
}

#[derive(Debug, Clone)]
pub struct OrderPresenter {
    order: Order,
    state: PresentedState,
}

impl OrderPresenter {
    pub fn new(order: Order, block_numbers: Option<&BlockNumbers>) -> Self {
        let state = match block_numbers {
            Some(_) => PresentedState::Resolved(resolve_status(&order, block_numbers)),
            None => PresentedState::Unresolved,
        };
        Self { order, state }
    }

    /// Applies authoritative data from a poll.
    pub fn refresh(&mut self, order: Order, block_numbers: Option<&BlockNumbers>) {
        self.order = order;
        let status = resolve_status(&self.order, block_numbers);
        self.state = match self.state {
            PresentedState::Initiating(_) => PresentedState::Initiating(status),
            PresentedState::Unresolved if block_numbers.is_none() => PresentedState::Unresolved,
            _ => PresentedState::Resolved(status),
        };
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn state(&self) -> PresentedState {
        self.state
    }

    pub fn status(&self) -> Option<OrderStatus> {
        match self.state {
            PresentedState::Unresolved => None,
            PresentedState::Resolved(status)
            | PresentedState::Optimistic(status)
            | PresentedState::Initiating(status) => Some(status),
        }
    }

    pub fn label(&self) -> DisplayLabel {
        display_label(self.status())
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, PresentedState::Initiating(_))
    }

    pub fn can_initiate(&self) -> bool {
        !self.is_busy() && self.label() == DisplayLabel::AwaitingInitiate
    }

    /// Marks the row busy and hands back the order to initiate. Rejected while
    /// another initiate is in flight or the order isn't awaiting one.
    pub fn begin_initiate(&mut self) -> TrackerResult<Order> {
        match self.state {
            PresentedState::Initiating(_) => Err(report!(Error::InvalidState(format!(
                "Order {} is already initiating",
                self.order.order_id
            )))),
            PresentedState::Resolved(status) if self.can_initiate() => {
                self.state = PresentedState::Initiating(status);
                Ok(self.order.clone())
            }
            _ => Err(report!(Error::InvalidState(format!(
                "Order {} is not awaiting initiate ({})",
                self.order.order_id,
                self.label()
            )))),
        }
    }

    pub fn finish_initiate(&mut self, succeeded: bool) {
        let PresentedState::Initiating(fallback) = self.state else {
            tracing::warn!(
                "Initiate result for order {} arrived while not initiating",
                self.order.order_id
            );
            return;
        };
        self.state = if succeeded {
            PresentedState::Optimistic(OrderStatus::InitiateDetected)
        } else {
            PresentedState::Resolved(fallback)
        };
    }
}
