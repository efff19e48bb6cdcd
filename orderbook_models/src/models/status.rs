use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::EnumIter;

use crate::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash, EnumIter)]
/// Lifecycle state of a matched order, derived from its legs and the
/// latest block heights. Never stored by the order book itself.
pub enum OrderStatus {
    /// Order created but not yet matched with a counterparty.
    Created,

    /// Matched, waiting for the user to initiate the source leg.
    Matched,

    /// Source initiate transaction seen but not yet confirmed.
    InitiateDetected,

    /// Source initiate transaction confirmed.
    Initiated,

    CounterPartyInitiateDetected,
    CounterPartyInitiated,

    /// User redeem on the destination leg seen but not yet confirmed.
    RedeemDetected,

    /// User redeemed the destination leg.
    Redeemed,

    CounterPartyRedeemDetected,
    CounterPartyRedeemed,

    RefundDetected,
    Refunded,

    /// The source leg was never initiated and its deadline block has passed.
    DeadLineExceeded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Matched => "Matched",
            OrderStatus::InitiateDetected => "InitiateDetected",
            OrderStatus::Initiated => "Initiated",
            OrderStatus::CounterPartyInitiateDetected => "CounterPartyInitiateDetected",
            OrderStatus::CounterPartyInitiated => "CounterPartyInitiated",
            OrderStatus::RedeemDetected => "RedeemDetected",
            OrderStatus::Redeemed => "Redeemed",
            OrderStatus::CounterPartyRedeemDetected => "CounterPartyRedeemDetected",
            OrderStatus::CounterPartyRedeemed => "CounterPartyRedeemed",
            OrderStatus::RefundDetected => "RefundDetected",
            OrderStatus::Refunded => "Refunded",
            OrderStatus::DeadLineExceeded => "DeadLineExceeded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(OrderStatus::Created),
            "Matched" => Ok(OrderStatus::Matched),
            "InitiateDetected" => Ok(OrderStatus::InitiateDetected),
            "Initiated" => Ok(OrderStatus::Initiated),
            "CounterPartyInitiateDetected" => Ok(OrderStatus::CounterPartyInitiateDetected),
            "CounterPartyInitiated" => Ok(OrderStatus::CounterPartyInitiated),
            "RedeemDetected" => Ok(OrderStatus::RedeemDetected),
            "Redeemed" => Ok(OrderStatus::Redeemed),
            "CounterPartyRedeemDetected" => Ok(OrderStatus::CounterPartyRedeemDetected),
            "CounterPartyRedeemed" => Ok(OrderStatus::CounterPartyRedeemed),
            "RefundDetected" => Ok(OrderStatus::RefundDetected),
            "Refunded" => Ok(OrderStatus::Refunded),
            "DeadLineExceeded" => Ok(OrderStatus::DeadLineExceeded),
            _ => Err(Error::ParseError),
        }
    }
}
