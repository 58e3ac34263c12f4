//! Coupon redemption rules and discount arithmetic.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use golden_fig_commerce::coupon::{
    CouponError, discount_for, validate, validate_and_discount,
};
use golden_fig_core::CouponKind;
use golden_fig_integration_tests::coupon;

#[test]
fn test_discount_never_exceeds_subtotal() {
    // Fixed coupon bigger than the cart.
    let big_fixed = coupon(CouponKind::Fixed, Decimal::new(100_00, 2));
    for subtotal_cents in [1, 999, 5000, 9999] {
        let subtotal = Decimal::new(subtotal_cents, 2);
        assert!(
            discount_for(&big_fixed, subtotal) <= subtotal,
            "discount exceeded subtotal {subtotal}"
        );
    }

    // 100% coupon exactly consumes the cart.
    let full = coupon(CouponKind::Percentage, Decimal::ONE_HUNDRED);
    let subtotal = Decimal::new(4321, 2);
    assert_eq!(discount_for(&full, subtotal), subtotal);
}

#[test]
fn test_max_discount_caps_percentage() {
    let mut c = coupon(CouponKind::Percentage, Decimal::new(50, 0));
    c.max_discount = Some(Decimal::new(500, 2));

    // 50% of $100 is $50, capped at $5.
    assert_eq!(
        discount_for(&c, Decimal::new(10000, 2)),
        Decimal::new(500, 2)
    );
    // Under the cap the percentage applies unclamped.
    assert_eq!(discount_for(&c, Decimal::new(800, 2)), Decimal::new(400, 2));
}

#[test]
fn test_validation_order_checks_window_before_minimum() {
    let now = Utc::now();
    let mut c = coupon(CouponKind::Fixed, Decimal::ONE);
    c.ends_at = Some(now - Duration::days(1));
    c.min_order_amount = Some(Decimal::new(100_00, 2));

    // Both rules fail; the window rejection wins.
    assert!(matches!(
        validate(&c, Decimal::ONE, now),
        Err(CouponError::Expired { .. })
    ));
}

#[test]
fn test_usage_limit_boundary() {
    let mut c = coupon(CouponKind::Fixed, Decimal::ONE);
    c.usage_limit = Some(1);

    c.usage_count = 0;
    assert!(validate(&c, Decimal::ONE_HUNDRED, Utc::now()).is_ok());

    c.usage_count = 1;
    assert_eq!(
        validate(&c, Decimal::ONE_HUNDRED, Utc::now()),
        Err(CouponError::UsageLimitReached)
    );
}

#[test]
fn test_minimum_order_inclusive() {
    let mut c = coupon(CouponKind::Fixed, Decimal::ONE);
    c.min_order_amount = Some(Decimal::new(2500, 2));

    assert!(validate(&c, Decimal::new(2500, 2), Utc::now()).is_ok());
    assert!(matches!(
        validate(&c, Decimal::new(2499, 2), Utc::now()),
        Err(CouponError::MinimumNotMet { .. })
    ));
}

#[test]
fn test_validate_and_discount_combines() {
    let c = coupon(CouponKind::Percentage, Decimal::new(20, 0));
    let discount =
        validate_and_discount(&c, Decimal::new(5000, 2), Utc::now()).expect("redeemable");
    assert_eq!(discount, Decimal::new(1000, 2));

    let mut inactive = c;
    inactive.is_active = false;
    assert_eq!(
        validate_and_discount(&inactive, Decimal::new(5000, 2), Utc::now()),
        Err(CouponError::Inactive)
    );
}

#[test]
fn test_percentage_discount_rounds_to_cents() {
    let c = coupon(CouponKind::Percentage, Decimal::new(15, 0));
    // 15% of $33.33 = $4.9995 -> $5.00 at 2dp.
    let discount = discount_for(&c, Decimal::new(3333, 2));
    assert_eq!(discount, Decimal::new(500, 2));
}
