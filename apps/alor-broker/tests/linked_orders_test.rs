//! OCO pairs and bracket chains driven through push events.

#![allow(clippy::unwrap_used)]

mod common;

use alor_broker::application::ports::ExchangeError;
use alor_broker::infrastructure::{PaperCall, PaperOrderKind};
use alor_broker::{BracketError, BracketRequest, OrderRef, OrderRequest, OrderStatus};
use common::{Harness, sber};
use rust_decimal_macros::dec;

/// Sell limit at 280 and a sell stop at 240 paired as OCO.
async fn oco_pair(harness: &mut Harness) -> (OrderRef, OrderRef) {
    let take = harness
        .broker
        .sell(OrderRequest::limit(sber(), dec!(10), dec!(280)))
        .await;
    let stop = harness
        .broker
        .sell(OrderRequest::stop(sber(), dec!(10), dec!(240)).with_oco(take))
        .await;
    harness.tick().await;
    (take, stop)
}

fn bracket() -> BracketRequest {
    BracketRequest::limit(sber(), dec!(10), dec!(250), dec!(240), dec!(270))
}

fn create_calls(harness: &Harness) -> usize {
    harness
        .paper
        .calls()
        .iter()
        .filter(|call| matches!(call, PaperCall::Create { .. }))
        .count()
}

// =============================================================================
// OCO
// =============================================================================

#[tokio::test]
async fn completing_registered_side_cancels_partner() {
    let mut harness = Harness::started().await;
    let (take, stop) = oco_pair(&mut harness).await;

    harness.fill_all(stop, dec!(240)).await;

    assert_eq!(harness.order(stop).status(), OrderStatus::Completed);
    assert_eq!(harness.order(take).status(), OrderStatus::Canceled);
    assert_eq!(harness.paper.cancel_requests(), vec![harness.number(take)]);
    assert!(harness.broker.linked().is_empty());
}

#[tokio::test]
async fn completing_partner_side_cancels_registered_side() {
    let mut harness = Harness::started().await;
    let (take, stop) = oco_pair(&mut harness).await;

    harness.fill_all(take, dec!(280)).await;

    assert_eq!(harness.order(take).status(), OrderStatus::Completed);
    assert_eq!(harness.order(stop).status(), OrderStatus::Canceled);
    assert_eq!(harness.paper.cancel_requests(), vec![harness.number(stop)]);
    assert!(harness.broker.linked().is_empty());
}

#[tokio::test]
async fn rejected_oco_side_leaves_partner_working() {
    let mut harness = Harness::started().await;
    let take = harness
        .broker
        .sell(OrderRequest::limit(sber(), dec!(10), dec!(280)))
        .await;

    let orphan = harness
        .broker
        .sell(OrderRequest::new(sber(), dec!(10), alor_broker::ExecType::Stop).with_oco(take))
        .await;
    harness.tick().await;

    assert_eq!(harness.order(orphan).status(), OrderStatus::Rejected);
    assert_eq!(harness.order(take).status(), OrderStatus::Accepted);
    assert!(harness.paper.cancel_requests().is_empty());
}

#[tokio::test]
async fn unknown_parent_rejection_leaves_oco_partner_working() {
    let mut harness = Harness::started().await;
    let take = harness
        .broker
        .sell(OrderRequest::limit(sber(), dec!(10), dec!(280)))
        .await;

    let child = harness
        .broker
        .sell(
            OrderRequest::stop(sber(), dec!(10), dec!(240))
                .with_parent(alor_broker::OrderRef::new(999))
                .with_oco(take),
        )
        .await;
    harness.tick().await;

    assert_eq!(harness.order(child).status(), OrderStatus::Rejected);
    assert_eq!(harness.order(take).status(), OrderStatus::Accepted);
    assert!(harness.paper.cancel_requests().is_empty());
}

#[tokio::test]
async fn partial_fill_keeps_partner_alive() {
    let mut harness = Harness::started().await;
    let take = harness
        .broker
        .sell(OrderRequest::limit(sber(), dec!(20), dec!(280)))
        .await;
    let stop = harness
        .broker
        .sell(OrderRequest::stop(sber(), dec!(20), dec!(240)).with_oco(take))
        .await;

    harness
        .paper
        .fill(&harness.number(take), dec!(1), dec!(280))
        .unwrap();
    harness.tick().await;

    assert_eq!(harness.order(take).status(), OrderStatus::Partial);
    assert_eq!(harness.order(stop).status(), OrderStatus::Accepted);
    assert_eq!(harness.broker.linked().oco_len(), 1);
}

// =============================================================================
// Brackets
// =============================================================================

#[tokio::test]
async fn only_entry_routes_until_it_completes() {
    let mut harness = Harness::started().await;
    let [entry, stop_loss, take_profit] = harness.broker.buy_bracket(bracket()).await.unwrap();

    assert_eq!(harness.order(entry).status(), OrderStatus::Accepted);
    assert_eq!(harness.order(stop_loss).status(), OrderStatus::Created);
    assert_eq!(harness.order(take_profit).status(), OrderStatus::Created);
    assert_eq!(create_calls(&harness), 1);

    let created: Vec<_> = harness
        .tick()
        .await
        .iter()
        .map(|order| (order.reference(), order.status()))
        .collect();
    assert_eq!(
        created,
        vec![
            (entry, OrderStatus::Created),
            (stop_loss, OrderStatus::Created),
            (take_profit, OrderStatus::Created),
            (entry, OrderStatus::Submitted),
            (entry, OrderStatus::Accepted),
        ]
    );

    harness.fill_all(entry, dec!(250)).await;

    assert_eq!(harness.order(entry).status(), OrderStatus::Completed);
    assert_eq!(harness.order(stop_loss).status(), OrderStatus::Accepted);
    assert_eq!(harness.order(take_profit).status(), OrderStatus::Accepted);
    assert_eq!(create_calls(&harness), 3);

    let kinds: Vec<_> = harness.paper.orders().into_iter().map(|order| order.kind).collect();
    assert!(matches!(kinds[1], PaperOrderKind::Stop { .. }));
    assert_eq!(kinds[2], PaperOrderKind::Limit { price: dec!(270) });
}

#[tokio::test]
async fn canceled_entry_never_places_children() {
    let mut harness = Harness::started().await;
    let [entry, stop_loss, take_profit] = harness.broker.buy_bracket(bracket()).await.unwrap();

    harness.broker.cancel(entry).await;
    harness.tick().await;

    assert_eq!(harness.order(entry).status(), OrderStatus::Canceled);
    assert_eq!(harness.order(stop_loss).status(), OrderStatus::Canceled);
    assert_eq!(harness.order(take_profit).status(), OrderStatus::Canceled);
    assert_eq!(create_calls(&harness), 1);
    assert!(harness.broker.linked().is_empty());
}

#[tokio::test]
async fn rejected_entry_never_places_children() {
    let mut harness = Harness::started().await;
    harness
        .paper
        .fail_orders(Some(ExchangeError::service("market closed")));

    let [entry, stop_loss, take_profit] = harness.broker.sell_bracket(
        BracketRequest::market(sber(), dec!(10), dec!(260), dec!(230)),
    )
    .await
    .unwrap();

    assert_eq!(harness.order(entry).status(), OrderStatus::Rejected);
    assert_eq!(harness.order(stop_loss).status(), OrderStatus::Canceled);
    assert_eq!(harness.order(take_profit).status(), OrderStatus::Canceled);
    assert!(harness.paper.orders().is_empty());
    assert!(harness.broker.linked().is_empty());
}

#[tokio::test]
async fn filled_exit_cancels_sibling_only() {
    let mut harness = Harness::started().await;
    let [entry, stop_loss, take_profit] = harness.broker.buy_bracket(bracket()).await.unwrap();
    harness.fill_all(entry, dec!(250)).await;

    harness.fill_all(take_profit, dec!(270)).await;

    assert_eq!(harness.paper.cancel_requests(), vec![harness.number(stop_loss)]);
    assert!(harness.paper.calls().contains(&PaperCall::Cancel {
        number: harness.number(stop_loss),
        stop: true,
    }));
    assert_eq!(harness.order(take_profit).status(), OrderStatus::Completed);
    assert_eq!(harness.order(stop_loss).status(), OrderStatus::Canceled);
    assert!(harness.broker.getposition(&sber()).is_flat());
    assert!(harness.broker.linked().is_empty());
}

#[tokio::test]
async fn price_move_triggers_stop_and_cancels_take_profit() {
    let mut harness = Harness::started().await;
    let [entry, stop_loss, take_profit] = harness.broker.buy_bracket(bracket()).await.unwrap();
    harness.paper.set_price(&common::moex(), &alor_broker::Symbol::new("SBER"), dec!(250));
    harness.tick().await;
    assert_eq!(harness.order(entry).status(), OrderStatus::Completed);

    harness.paper.set_price(&common::moex(), &alor_broker::Symbol::new("SBER"), dec!(239));
    harness.tick().await;

    assert_eq!(harness.order(stop_loss).status(), OrderStatus::Completed);
    assert_eq!(harness.order(take_profit).status(), OrderStatus::Canceled);
    assert_eq!(harness.paper.cancel_requests(), vec![harness.number(take_profit)]);
}

#[tokio::test]
async fn inverted_bracket_creates_nothing() {
    let mut harness = Harness::started().await;

    let result = harness
        .broker
        .buy_bracket(BracketRequest::market(sber(), dec!(10), dec!(270), dec!(240)))
        .await;

    assert!(matches!(result, Err(BracketError::InvertedExits { .. })));
    assert_eq!(harness.broker.orders().count(), 0);
}

// =============================================================================
// Registry growth
// =============================================================================

#[tokio::test]
async fn registries_stay_empty_over_long_session() {
    let mut harness = Harness::started().await;

    for round in 0..200 {
        let (take, stop) = oco_pair(&mut harness).await;
        if round % 2 == 0 {
            harness.fill_all(take, dec!(280)).await;
        } else {
            harness.broker.cancel(stop).await;
            harness.tick().await;
        }

        let [entry, stop_loss, take_profit] =
            harness.broker.buy_bracket(bracket()).await.unwrap();
        match round % 3 {
            0 => {
                harness.fill_all(entry, dec!(250)).await;
                harness.fill_all(take_profit, dec!(270)).await;
            }
            1 => {
                harness.fill_all(entry, dec!(250)).await;
                harness.fill_all(stop_loss, dec!(240)).await;
            }
            _ => {
                harness.broker.cancel(entry).await;
                harness.tick().await;
            }
        }

        assert!(
            harness.broker.linked().is_empty(),
            "registries not pruned after round {round}"
        );
    }

    assert_eq!(harness.broker.live_orders(), 0);
    let tracked = harness.broker.orders().count();
    assert_eq!(harness.broker.purge_terminal(), tracked);
    assert_eq!(harness.broker.orders().count(), 0);
}
