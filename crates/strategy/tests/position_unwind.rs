//! Integration test: PositionUnwinder against the paper venue

use chrono::{TimeZone, Utc};
use hermes_clock::WorldClock;
use hermes_core::{BestPrice, InstrumentId, Order, Side};
use hermes_gateway::{OrderGateway, PaperVenue};
use hermes_strategy::{PositionUnwinder, UnwindConfig};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

fn venue() -> Arc<PaperVenue> {
    let clock = WorldClock::new(Some(Utc.with_ymd_and_hms(2024, 3, 1, 20, 55, 0).unwrap()));
    let ibm = vec![BestPrice::new(dec!(165.00), dec!(165.02), 50, 50)];
    let aapl = vec![BestPrice::new(dec!(185.00), dec!(185.02), 50, 50)];
    Arc::new(PaperVenue::replay(
        vec![("IBM", ibm), ("AAPL", aapl)],
        dec!(1_000_000),
        clock,
    ))
}

fn unwinder(venue: &Arc<PaperVenue>, batch_shares: Option<u64>) -> PositionUnwinder {
    PositionUnwinder::new(
        venue.clone(),
        UnwindConfig {
            settle_delay: Duration::from_secs(1),
            batch_shares,
        },
    )
}

fn ibm() -> InstrumentId {
    InstrumentId::new("IBM")
}

#[tokio::test(start_paused = true)]
async fn test_long_position_closed_in_batches() {
    let _ = env_logger::try_init();

    let venue = venue();
    venue.seed_position("IBM", 500, 0, dec!(160.00));

    let report = unwinder(&venue, Some(200))
        .close_positions(&ibm())
        .await
        .unwrap();

    let lots: Vec<u64> = report.orders.iter().map(|o| o.order.lots).collect();
    assert_eq!(lots, vec![2, 2, 1]);
    assert_eq!(report.shares(Side::Sell), 500);
    assert!(report.orders.iter().all(|o| o.order.side == Side::Sell));

    let item = venue.portfolio_item(&ibm()).await.unwrap();
    assert_eq!(item.long_shares, 0);
    assert_eq!(item.short_shares, 0);
}

#[tokio::test(start_paused = true)]
async fn test_odd_lot_tail_never_reverses_position() {
    let venue = venue();
    venue.seed_position("IBM", 450, 0, dec!(160.00));

    let report = unwinder(&venue, Some(100))
        .close_positions(&ibm())
        .await
        .unwrap();

    assert_eq!(report.submitted(), 4);
    assert!(report.orders.iter().all(|o| o.order.lots == 1));
    assert_eq!(report.shares(Side::Sell), 400);

    let item = venue.portfolio_item(&ibm()).await.unwrap();
    assert_eq!(item.long_shares, 50);
    assert_eq!(item.short_shares, 0);
}

#[tokio::test(start_paused = true)]
async fn test_sub_lot_batches_close_exactly() {
    let venue = venue();
    venue.seed_position("IBM", 500, 0, dec!(160.00));

    let report = unwinder(&venue, Some(40))
        .close_positions(&ibm())
        .await
        .unwrap();

    assert_eq!(report.shares(Side::Sell), 500);
    let item = venue.portfolio_item(&ibm()).await.unwrap();
    assert_eq!(item.long_shares, 0);
    assert_eq!(item.short_shares, 0);

    // Nothing left, so a second pass stays put
    let again = unwinder(&venue, Some(40))
        .close_positions(&ibm())
        .await
        .unwrap();
    assert_eq!(again.submitted(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_short_position_closed_with_buys() {
    let venue = venue();
    venue.seed_position("IBM", 0, 300, dec!(170.00));

    let report = unwinder(&venue, Some(200))
        .close_positions(&ibm())
        .await
        .unwrap();

    let lots: Vec<u64> = report.orders.iter().map(|o| o.order.lots).collect();
    assert_eq!(lots, vec![2, 1]);
    assert_eq!(report.shares(Side::Buy), 300);

    let item = venue.portfolio_item(&ibm()).await.unwrap();
    assert!(item.is_flat());
    // Covered at 165.02 against a 170.00 entry
    assert_eq!(item.realized_pl, dec!(1494.00));
}

#[tokio::test(start_paused = true)]
async fn test_second_close_is_a_no_op() {
    let venue = venue();
    venue.seed_position("IBM", 500, 0, dec!(160.00));
    let unwinder = unwinder(&venue, None);

    let first = unwinder.close_positions(&ibm()).await.unwrap();
    assert_eq!(first.submitted(), 1);
    assert_eq!(first.orders[0].order.lots, 5);

    let second = unwinder.close_positions(&ibm()).await.unwrap();
    assert_eq!(second.submitted(), 0);
    assert_eq!(venue.executions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_orders_only_touches_the_instrument() {
    let venue = venue();
    venue.set_fill_delay(chrono::Duration::seconds(60));

    venue.submit_order(Order::market_buy("IBM", 1)).await.unwrap();
    venue.submit_order(Order::market_sell("IBM", 2)).await.unwrap();
    let aapl = Order::market_buy("AAPL", 1);
    venue.submit_order(aapl.clone()).await.unwrap();

    let started = tokio::time::Instant::now();
    let report = unwinder(&venue, None).cancel_orders(&ibm()).await.unwrap();

    assert_eq!(report.cancelled, 2);
    assert_eq!(report.submitted(), 0);
    assert_eq!(venue.waiting_list().await.unwrap(), vec![aapl]);
    // One settle delay per cancellation
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_with_nothing_waiting() {
    let venue = venue();
    let report = unwinder(&venue, None).cancel_orders(&ibm()).await.unwrap();
    assert_eq!(report.cancelled, 0);
}
