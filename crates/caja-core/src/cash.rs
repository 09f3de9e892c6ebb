//! # Cash Arithmetic
//!
//! Pure arithmetic for shift reconciliation, change due, and loyalty
//! points. All functions operate on integer cents; no floating point
//! anywhere in the cash path.
//!
//! ## Shift Reconciliation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLOSE SHIFT                                                            │
//! │                                                                         │
//! │  expected = start amount                                                │
//! │           + Σ cash-method sales totals                                  │
//! │           + Σ cash-in movements                                         │
//! │           - Σ cash-out movements                                        │
//! │                                                                         │
//! │  difference = counted - expected   (negative = drawer short)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::LOYALTY_EARN_DIVISOR_CENTS;

/// Expected drawer amount at shift close, in cents.
///
/// ## Example
/// ```rust
/// use caja_core::cash::expected_cash_cents;
///
/// // start=500.00, cash sales=237.50, in=50.00, out=20.00 -> 767.50
/// assert_eq!(expected_cash_cents(50_000, 23_750, 5_000, 2_000), 76_750);
/// ```
#[inline]
pub const fn expected_cash_cents(
    start_cents: i64,
    cash_sales_cents: i64,
    cash_in_cents: i64,
    cash_out_cents: i64,
) -> i64 {
    start_cents + cash_sales_cents + cash_in_cents - cash_out_cents
}

/// Signed shift difference: counted minus expected.
#[inline]
pub const fn close_difference_cents(counted_cents: i64, expected_cents: i64) -> i64 {
    counted_cents - expected_cents
}

/// Change due to the customer: tendered minus total.
///
/// Callers must validate `tendered >= total` first; this is plain
/// subtraction, not a guard.
#[inline]
pub const fn change_due_cents(tendered_cents: i64, total_cents: i64) -> i64 {
    tendered_cents - total_cents
}

/// Loyalty points earned by a sale: floor(total / 10) in currency units.
#[inline]
pub const fn points_earned(total_cents: i64) -> i64 {
    total_cents / LOYALTY_EARN_DIVISOR_CENTS
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// P6: start=500, cash sales=237.50, in=50, out=20 -> exactly 767.50.
    #[test]
    fn test_expected_cash_exact() {
        assert_eq!(expected_cash_cents(50_000, 23_750, 5_000, 2_000), 76_750);
    }

    #[test]
    fn test_close_difference_short_drawer() {
        // expected 767.50, counted 760.00 -> -7.50
        assert_eq!(close_difference_cents(76_000, 76_750), -750);
    }

    #[test]
    fn test_close_difference_over() {
        assert_eq!(close_difference_cents(77_000, 76_750), 250);
    }

    #[test]
    fn test_change_due() {
        // Scenario A: total 39.99, tendered 50.00 -> change 10.01
        assert_eq!(change_due_cents(5_000, 3_999), 1_001);
        assert_eq!(change_due_cents(3_999, 3_999), 0);
    }

    #[test]
    fn test_points_earned_floor() {
        assert_eq!(points_earned(3_999), 3); // $39.99 -> 3 points
        assert_eq!(points_earned(999), 0); // $9.99  -> 0 points
        assert_eq!(points_earned(1_000), 1); // $10.00 -> 1 point
        assert_eq!(points_earned(0), 0);
    }
}
