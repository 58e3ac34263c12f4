//! Checkout construction: provider line items and totals arithmetic.

use chrono::Utc;
use rust_decimal::Decimal;

use golden_fig_commerce::checkout::{CheckoutError, build_line_items, totals};
use golden_fig_core::CouponKind;
use golden_fig_integration_tests::{cart_with, coupon};

#[test]
fn test_line_items_translate_to_minor_units() {
    let cart = cart_with(vec![
        (1, Decimal::new(1999, 2), 2),
        (2, Decimal::new(450, 2), 3),
    ]);

    let items = build_line_items(&cart).expect("non-empty cart");
    assert_eq!(items.len(), 2);

    let first = items.first().expect("first line");
    assert_eq!(first.unit_amount, 1999);
    assert_eq!(first.quantity, 2);
    assert_eq!(first.currency, "usd");
    assert_eq!(first.name, "Product 1");

    let second = items.get(1).expect("second line");
    assert_eq!(second.unit_amount, 450);
    assert_eq!(second.quantity, 3);
}

#[test]
fn test_empty_cart_cannot_check_out() {
    let cart = cart_with(vec![]);
    assert_eq!(build_line_items(&cart), Err(CheckoutError::EmptyCart));
}

#[test]
fn test_totals_apply_coupon_and_floor_at_zero() {
    let cart = cart_with(vec![(1, Decimal::new(1000, 2), 1)]);

    // Fixed coupon larger than the cart: discount capped, total zero.
    let big = coupon(CouponKind::Fixed, Decimal::new(9900, 2));
    let t = totals(&cart, Some(&big), Utc::now());
    assert_eq!(t.subtotal, Decimal::new(1000, 2));
    assert_eq!(t.discount, Decimal::new(1000, 2));
    assert_eq!(t.total, Decimal::ZERO);
}

#[test]
fn test_totals_ignore_unredeemable_coupon() {
    let cart = cart_with(vec![(1, Decimal::new(2000, 2), 2)]);

    let mut expired = coupon(CouponKind::Percentage, Decimal::new(10, 0));
    expired.ends_at = Some(Utc::now() - chrono::Duration::hours(1));

    let t = totals(&cart, Some(&expired), Utc::now());
    assert_eq!(t.discount, Decimal::ZERO);
    assert_eq!(t.total, t.subtotal);
    assert_eq!(t.item_count, 2);
}

#[test]
fn test_totals_without_coupon() {
    let cart = cart_with(vec![(1, Decimal::new(750, 2), 4)]);
    let t = totals(&cart, None, Utc::now());
    assert_eq!(t.subtotal, Decimal::new(3000, 2));
    assert_eq!(t.discount, Decimal::ZERO);
    assert_eq!(t.total, Decimal::new(3000, 2));
    assert_eq!(t.item_count, 4);
}
