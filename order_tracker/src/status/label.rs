use std::fmt;

use orderbook_models::models::status::OrderStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayLabel {
    Completed,
    InProgress,
    Expired,
    AwaitingInitiate,
}

impl DisplayLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayLabel::Completed => "Completed",
            DisplayLabel::InProgress => "In progress...",
            DisplayLabel::Expired => "Expired",
            DisplayLabel::AwaitingInitiate => "Awaiting initiate",
        }
    }
}

impl fmt::Display for DisplayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<OrderStatus> for DisplayLabel {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Redeemed
            | OrderStatus::Refunded
            | OrderStatus::CounterPartyRedeemed
            | OrderStatus::CounterPartyRedeemDetected => DisplayLabel::Completed,
            OrderStatus::Matched => DisplayLabel::AwaitingInitiate,
            OrderStatus::DeadLineExceeded => DisplayLabel::Expired,
            _ => DisplayLabel::InProgress,
        }
    }
}

/// Label for a possibly unresolved status; unresolved reads as in progress.
pub fn display_label(status: Option<OrderStatus>) -> DisplayLabel {
    status.map(DisplayLabel::from).unwrap_or(DisplayLabel::InProgress)
}
