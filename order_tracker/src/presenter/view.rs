use orderbook_models::models::asset::{AssetRegistry, default_symbol};
use orderbook_models::models::order::{Order, SwapLeg};
use serde::Serialize;

use crate::presenter::order::OrderPresenter;
use crate::status::DisplayLabel;
use crate::utils::date::format_created_at;
use crate::utils::number_conversion::format_units;

const SHORT_ID_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionButton {
    pub text: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegView {
    pub asset: String,
    pub amount: String,
}

impl LegView {
    fn new(leg: &SwapLeg, registry: &AssetRegistry) -> Self {
        let asset = registry.get(leg.chain, &leg.asset);
        let symbol = asset
            .map(|asset| asset.symbol.clone())
            .unwrap_or_else(|| default_symbol(leg.chain).to_string());
        let decimals = registry.decimals(leg.chain, &leg.asset);
        let amount = format_units(leg.amount, decimals).unwrap_or_else(|error| {
            tracing::debug!("Showing raw amount for swap {}: {:?}", leg.swap_id, error);
            leg.amount.to_string()
        });
        Self {
            asset: symbol,
            amount,
        }
    }
}

/// One line of the orders table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRow {
    pub order_id: String,
    pub short_id: String,
    pub from: LegView,
    pub to: LegView,
    pub label: DisplayLabel,
    pub action: Option<ActionButton>,
}

impl OrderRow {
    pub fn new(presenter: &OrderPresenter, registry: &AssetRegistry) -> Self {
        let order = presenter.order();
        let label = presenter.label();
        let action = if presenter.is_busy() {
            Some(ActionButton {
                text: "Initiating...",
                enabled: false,
            })
        } else if label == DisplayLabel::AwaitingInitiate {
            Some(ActionButton {
                text: "Initiate",
                enabled: true,
            })
        } else {
            None
        };

        Self {
            order_id: order.order_id.clone(),
            short_id: short_id(&order.order_id),
            from: LegView::new(&order.source_swap, registry),
            to: LegView::new(&order.destination_swap, registry),
            label,
            action,
        }
    }
}

impl std::fmt::Display for OrderRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<8} {:>14} {:<5} -> {:>14} {:<5} {:<18}",
            self.short_id,
            self.from.amount,
            self.from.asset,
            self.to.amount,
            self.to.asset,
            self.label,
        )?;
        if let Some(action) = &self.action {
            write!(f, " [{}]", action.text)?;
        }
        Ok(())
    }
}

/// Full view of one order, as shown in the details pop-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    pub created_at: String,
    pub order_id: String,
    pub from_address: String,
    pub to_address: String,
    pub from: LegView,
    pub to: LegView,
    pub initiate_tx_hash: Option<String>,
    pub redeem_tx_hash: Option<String>,
    pub refund_tx_hash: Option<String>,
}

impl OrderDetails {
    pub fn from_order(order: &Order, registry: &AssetRegistry) -> Self {
        let source = &order.source_swap;
        Self {
            created_at: format_created_at(&order.created_at),
            order_id: order.order_id.clone(),
            from_address: source.initiator.clone(),
            to_address: order.destination_swap.redeemer.clone(),
            from: LegView::new(source, registry),
            to: LegView::new(&order.destination_swap, registry),
            initiate_tx_hash: non_empty(&source.initiate_tx_hash),
            redeem_tx_hash: non_empty(&order.destination_swap.redeem_tx_hash),
            refund_tx_hash: non_empty(&source.refund_tx_hash),
        }
    }
}

impl std::fmt::Display for OrderDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Created at: {}", self.created_at)?;
        writeln!(f, "Order ID:   {}", self.order_id)?;
        writeln!(f, "From:       {}", self.from_address)?;
        writeln!(f, "To:         {}", self.to_address)?;
        writeln!(f, "Send:       {} {}", self.from.amount, self.from.asset)?;
        write!(f, "Receive:    {} {}", self.to.amount, self.to.asset)?;
        for (name, hash) in [
            ("Initiate tx", &self.initiate_tx_hash),
            ("Redeem tx", &self.redeem_tx_hash),
            ("Refund tx", &self.refund_tx_hash),
        ] {
            if let Some(hash) = hash {
                write!(f, "\n{name}: {hash}")?;
            }
        }
        Ok(())
    }
}

fn short_id(order_id: &str) -> String {
    let prefix: String = order_id.chars().take(SHORT_ID_LEN).collect();
    format!("{prefix}...")
}

fn non_empty(hash: &Option<String>) -> Option<String> {
    hash.as_ref().filter(|hash| !hash.is_empty()).cloned()
}
