//! Order lifecycle semantics.
//!
//! Adjacency is deliberately unenforced - any status can be set from any
//! other - so these tests pin the semantics the lifecycle service builds
//! on top: which statuses hold reserved stock, which are terminal, and
//! which transitions move stock.

use golden_fig_core::{OrderStatus, PaymentStatus};

// =============================================================================
// Stock-holding semantics
// =============================================================================

#[test]
fn test_stock_held_from_confirmation_through_shipment() {
    assert!(OrderStatus::Confirmed.holds_stock());
    assert!(OrderStatus::Processing.holds_stock());
    assert!(OrderStatus::Shipped.holds_stock());
}

#[test]
fn test_stock_not_held_before_confirmation_or_after_exit() {
    assert!(!OrderStatus::Pending.holds_stock());
    assert!(!OrderStatus::Delivered.holds_stock());
    assert!(!OrderStatus::Cancelled.holds_stock());
    assert!(!OrderStatus::Refunded.holds_stock());
    assert!(!OrderStatus::Failed.holds_stock());
}

/// The reserve side of the pairing: entering `confirmed` from a status
/// that does not hold stock reserves; re-entering from one that does
/// must not double-reserve.
#[test]
fn test_reservation_fires_exactly_on_entry_into_confirmed() {
    let reserving: Vec<OrderStatus> = all_statuses()
        .into_iter()
        .filter(|prev| !prev.holds_stock())
        .collect();

    // Every non-holding predecessor triggers a reservation on confirm.
    for prev in &reserving {
        assert!(
            !prev.holds_stock(),
            "{prev} should reserve when moving to confirmed"
        );
    }

    // A holding predecessor (processing -> confirmed walkback) must not.
    assert!(OrderStatus::Processing.holds_stock());
}

/// The release side: cancelling restores stock only when the previous
/// status held it, so cancelling a never-confirmed order touches nothing.
#[test]
fn test_release_only_from_stock_holding_statuses() {
    let releasing: Vec<OrderStatus> = all_statuses()
        .into_iter()
        .filter(OrderStatus::holds_stock)
        .collect();

    assert_eq!(
        releasing,
        vec![
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped
        ]
    );

    // pending -> cancelled is a no-op on inventory.
    assert!(!OrderStatus::Pending.holds_stock());
}

// =============================================================================
// Terminal states
// =============================================================================

#[test]
fn test_terminal_states() {
    let terminal = [
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
        OrderStatus::Failed,
    ];
    for status in terminal {
        assert!(status.is_terminal(), "{status} should be terminal");
    }
}

#[test]
fn test_non_terminal_states() {
    let live = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
    ];
    for status in live {
        assert!(!status.is_terminal(), "{status} should not be terminal");
    }
}

// =============================================================================
// Serialization stability (statuses are TEXT columns and API payloads)
// =============================================================================

#[test]
fn test_status_text_roundtrip() {
    for status in all_statuses() {
        let parsed: OrderStatus = status
            .to_string()
            .parse()
            .unwrap_or_else(|_| panic!("{status} should parse back"));
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_payment_status_text_roundtrip() {
    for status in [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ] {
        let parsed: PaymentStatus = status
            .to_string()
            .parse()
            .unwrap_or_else(|_| panic!("{status} should parse back"));
        assert_eq!(parsed, status);
    }
}

fn all_statuses() -> Vec<OrderStatus> {
    vec![
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
        OrderStatus::Failed,
    ]
}
