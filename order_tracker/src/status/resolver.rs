use orderbook_models::models::order::{BlockNumbers, Order};
use orderbook_models::models::status::OrderStatus;

/// Derives the lifecycle status of `order` from its legs and the latest
/// block heights.
///
/// Checks run in priority order:
/// 1. redeem or refund on either leg (terminal),
/// 2. deadline expiry of a never-initiated source leg,
/// 3. never initiated: `Matched`,
/// 4. otherwise one of the initiate-detected/confirmed states.
///
/// A missing snapshot, or one without the source chain, means expiry cannot
/// be determined and rule 2 is skipped.
///
/// Confirmation depth only splits the counterparty's redeem of the source
/// leg. The user's own redeem and a refund are reported as soon as their
/// transaction is seen, so the order reads Completed or Refunded without
/// waiting for a block. `RedeemDetected` and `RefundDetected` are part of
/// the order book's vocabulary but are never produced here.
pub fn resolve_status(order: &Order, block_numbers: Option<&BlockNumbers>) -> OrderStatus {
    let source = &order.source_swap;
    let destination = &order.destination_swap;

    if destination.has_redeem() {
        return OrderStatus::Redeemed;
    }
    if source.has_redeem() {
        return if source.redeem_confirmed() {
            OrderStatus::CounterPartyRedeemed
        } else {
            OrderStatus::CounterPartyRedeemDetected
        };
    }
    if source.has_refund() {
        return OrderStatus::Refunded;
    }

    if !source.has_initiate() {
        if deadline_exceeded(order, block_numbers) {
            return OrderStatus::DeadLineExceeded;
        }
        return OrderStatus::Matched;
    }

    match (destination.has_initiate(), destination.initiate_confirmed()) {
        (true, true) => OrderStatus::CounterPartyInitiated,
        (true, false) => OrderStatus::CounterPartyInitiateDetected,
        _ if source.initiate_confirmed() => OrderStatus::Initiated,
        _ => OrderStatus::InitiateDetected,
    }
}

/// True once the source chain height reaches the order's initiate deadline.
/// Unknown deadline or height counts as not exceeded.
pub fn deadline_exceeded(order: &Order, block_numbers: Option<&BlockNumbers>) -> bool {
    let height = block_numbers.and_then(|blocks| blocks.height(order.source_swap.chain));
    match (order.initiate_deadline, height) {
        (Some(deadline), Some(height)) => height >= deadline,
        _ => false,
    }
}
