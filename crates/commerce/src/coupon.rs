//! Coupon validation and discount arithmetic.
//!
//! Pure functions over [`Coupon`]: callers load the coupon, pass the cart
//! subtotal and the current time, and get back either a typed rejection or
//! a discount amount. The discount never exceeds the subtotal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use golden_fig_core::CouponKind;

use crate::models::{Coupon, NewCoupon};

/// Reasons a coupon cannot be redeemed against a cart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponError {
    #[error("coupon is not active")]
    Inactive,

    #[error("coupon is not valid until {starts_at}")]
    NotStarted { starts_at: DateTime<Utc> },

    #[error("coupon expired at {ended_at}")]
    Expired { ended_at: DateTime<Utc> },

    #[error("coupon usage limit reached")]
    UsageLimitReached,

    #[error("order subtotal below coupon minimum of {minimum}")]
    MinimumNotMet { minimum: Decimal },
}

/// Reasons a coupon cannot be created (studio creation-time validation).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidCoupon {
    #[error("coupon code cannot be empty")]
    EmptyCode,

    #[error("percentage must be greater than 0 and at most 100")]
    PercentageOutOfRange,

    #[error("fixed discount must be greater than 0")]
    NonPositiveValue,

    #[error("validity window ends before it starts")]
    WindowOutOfOrder,

    #[error("usage limit must be greater than 0")]
    NonPositiveUsageLimit,
}

/// Validate coupon creation input.
///
/// A percentage above 100 is rejected here, at creation, so redemption
/// never has to defend against discounts larger than the subtotal from
/// that direction.
///
/// # Errors
///
/// Returns the first [`InvalidCoupon`] rule the input violates.
pub fn validate_new(input: &NewCoupon) -> Result<(), InvalidCoupon> {
    if input.code.trim().is_empty() {
        return Err(InvalidCoupon::EmptyCode);
    }

    match input.kind {
        CouponKind::Percentage => {
            if input.value <= Decimal::ZERO || input.value > Decimal::ONE_HUNDRED {
                return Err(InvalidCoupon::PercentageOutOfRange);
            }
        }
        CouponKind::Fixed => {
            if input.value <= Decimal::ZERO {
                return Err(InvalidCoupon::NonPositiveValue);
            }
        }
    }

    if let (Some(starts_at), Some(ends_at)) = (input.starts_at, input.ends_at)
        && ends_at <= starts_at
    {
        return Err(InvalidCoupon::WindowOutOfOrder);
    }

    if let Some(limit) = input.usage_limit
        && limit <= 0
    {
        return Err(InvalidCoupon::NonPositiveUsageLimit);
    }

    Ok(())
}

/// Check whether a coupon can be redeemed against a cart subtotal at `now`.
///
/// # Errors
///
/// Returns the first [`CouponError`] rule the redemption violates: active
/// flag, date window, usage count against the limit, then the minimum
/// order amount.
pub fn validate(coupon: &Coupon, subtotal: Decimal, now: DateTime<Utc>) -> Result<(), CouponError> {
    if !coupon.is_active {
        return Err(CouponError::Inactive);
    }

    if let Some(starts_at) = coupon.starts_at
        && now < starts_at
    {
        return Err(CouponError::NotStarted { starts_at });
    }

    if let Some(ends_at) = coupon.ends_at
        && now > ends_at
    {
        return Err(CouponError::Expired { ended_at: ends_at });
    }

    if let Some(limit) = coupon.usage_limit
        && coupon.usage_count >= limit
    {
        return Err(CouponError::UsageLimitReached);
    }

    if let Some(minimum) = coupon.min_order_amount
        && subtotal < minimum
    {
        return Err(CouponError::MinimumNotMet { minimum });
    }

    Ok(())
}

/// Discount amount for a coupon against a subtotal.
///
/// Percentage coupons take that share of the subtotal; fixed coupons take
/// their face value. Either way the result is capped by `max_discount`
/// (when configured) and by the subtotal itself.
#[must_use]
pub fn discount_for(coupon: &Coupon, subtotal: Decimal) -> Decimal {
    if subtotal <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let raw = match coupon.kind {
        CouponKind::Percentage => {
            (subtotal * coupon.value / Decimal::ONE_HUNDRED).round_dp(2)
        }
        CouponKind::Fixed => coupon.value,
    };

    let capped = match coupon.max_discount {
        Some(max) => raw.min(max),
        None => raw,
    };

    capped.min(subtotal).max(Decimal::ZERO)
}

/// Validate and compute in one step.
///
/// # Errors
///
/// Returns the [`CouponError`] from [`validate`].
pub fn validate_and_discount(
    coupon: &Coupon,
    subtotal: Decimal,
    now: DateTime<Utc>,
) -> Result<Decimal, CouponError> {
    validate(coupon, subtotal, now)?;
    Ok(discount_for(coupon, subtotal))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use golden_fig_core::CouponId;

    fn coupon(kind: CouponKind, value: Decimal) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "WELCOME".to_owned(),
            kind,
            value,
            min_order_amount: None,
            max_discount: None,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
            usage_count: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn new_coupon(kind: CouponKind, value: Decimal) -> NewCoupon {
        NewCoupon {
            code: "WELCOME".to_owned(),
            kind,
            value,
            min_order_amount: None,
            max_discount: None,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let coupon = coupon(CouponKind::Percentage, Decimal::new(10, 0));
        let discount = discount_for(&coupon, Decimal::new(20000, 2));
        assert_eq!(discount, Decimal::new(2000, 2));
    }

    #[test]
    fn test_fixed_discount() {
        let coupon = coupon(CouponKind::Fixed, Decimal::new(1500, 2));
        let discount = discount_for(&coupon, Decimal::new(20000, 2));
        assert_eq!(discount, Decimal::new(1500, 2));
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let coupon = coupon(CouponKind::Fixed, Decimal::new(5000, 2));
        let discount = discount_for(&coupon, Decimal::new(1999, 2));
        assert_eq!(discount, Decimal::new(1999, 2));

        let full = coupon_with_max(Decimal::ONE_HUNDRED, None);
        let discount = discount_for(&full, Decimal::new(4200, 2));
        assert_eq!(discount, Decimal::new(4200, 2));
    }

    fn coupon_with_max(percentage: Decimal, max: Option<Decimal>) -> Coupon {
        let mut c = coupon(CouponKind::Percentage, percentage);
        c.max_discount = max;
        c
    }

    #[test]
    fn test_max_discount_caps() {
        let coupon = coupon_with_max(Decimal::new(50, 0), Some(Decimal::new(1000, 2)));
        let discount = discount_for(&coupon, Decimal::new(10000, 2));
        assert_eq!(discount, Decimal::new(1000, 2));
    }

    #[test]
    fn test_zero_subtotal_gets_no_discount() {
        let coupon = coupon(CouponKind::Fixed, Decimal::new(500, 2));
        assert_eq!(discount_for(&coupon, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_validate_inactive() {
        let mut c = coupon(CouponKind::Fixed, Decimal::ONE);
        c.is_active = false;
        assert_eq!(
            validate(&c, Decimal::ONE_HUNDRED, Utc::now()),
            Err(CouponError::Inactive)
        );
    }

    #[test]
    fn test_validate_window() {
        let now = Utc::now();
        let mut c = coupon(CouponKind::Fixed, Decimal::ONE);
        c.starts_at = Some(now + Duration::days(1));
        assert!(matches!(
            validate(&c, Decimal::ONE_HUNDRED, now),
            Err(CouponError::NotStarted { .. })
        ));

        c.starts_at = None;
        c.ends_at = Some(now - Duration::days(1));
        assert!(matches!(
            validate(&c, Decimal::ONE_HUNDRED, now),
            Err(CouponError::Expired { .. })
        ));
    }

    #[test]
    fn test_validate_usage_limit() {
        let mut c = coupon(CouponKind::Fixed, Decimal::ONE);
        c.usage_limit = Some(5);
        c.usage_count = 5;
        assert_eq!(
            validate(&c, Decimal::ONE_HUNDRED, Utc::now()),
            Err(CouponError::UsageLimitReached)
        );

        c.usage_count = 4;
        assert!(validate(&c, Decimal::ONE_HUNDRED, Utc::now()).is_ok());
    }

    #[test]
    fn test_validate_minimum_order() {
        let mut c = coupon(CouponKind::Fixed, Decimal::ONE);
        c.min_order_amount = Some(Decimal::new(5000, 2));
        assert_eq!(
            validate(&c, Decimal::new(4999, 2), Utc::now()),
            Err(CouponError::MinimumNotMet {
                minimum: Decimal::new(5000, 2)
            })
        );
        assert!(validate(&c, Decimal::new(5000, 2), Utc::now()).is_ok());
    }

    #[test]
    fn test_create_rejects_percentage_above_100() {
        let input = new_coupon(CouponKind::Percentage, Decimal::new(101, 0));
        assert_eq!(validate_new(&input), Err(InvalidCoupon::PercentageOutOfRange));
    }

    #[test]
    fn test_create_accepts_full_percentage() {
        let input = new_coupon(CouponKind::Percentage, Decimal::ONE_HUNDRED);
        assert!(validate_new(&input).is_ok());
    }

    #[test]
    fn test_create_rejects_bad_window() {
        let now = Utc::now();
        let mut input = new_coupon(CouponKind::Fixed, Decimal::ONE);
        input.starts_at = Some(now);
        input.ends_at = Some(now - Duration::hours(1));
        assert_eq!(validate_new(&input), Err(InvalidCoupon::WindowOutOfOrder));
    }

    #[test]
    fn test_create_rejects_empty_code() {
        let mut input = new_coupon(CouponKind::Fixed, Decimal::ONE);
        input.code = "  ".to_owned();
        assert_eq!(validate_new(&input), Err(InvalidCoupon::EmptyCode));
    }

    #[test]
    fn test_create_rejects_zero_usage_limit() {
        let mut input = new_coupon(CouponKind::Fixed, Decimal::ONE);
        input.usage_limit = Some(0);
        assert_eq!(validate_new(&input), Err(InvalidCoupon::NonPositiveUsageLimit));
    }
}
