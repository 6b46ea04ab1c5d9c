//! Overload and pay calculators.
//!
//! Pure per-record functions. All counts are clamped non-negative, and the
//! pay math stays numeric; currency strings are rendered later and never
//! read back.

use crate::models::{Capacity, Overload, PaySummary};
use crate::rules::{BILLING_UNITS_PER_MONTH, GRACE_BAND, PAY_PERIOD_DIVISOR, PREMIUM_MULTIPLIER};

/// Derive overload counts from enrollment and assigned capacity.
///
/// `total` is the headcount beyond base capacity and `max` the headcount
/// beyond the max ceiling, each computed independently. The base portion is
/// the remainder, except that overloads within the grace band are absorbed
/// entirely at base rate.
pub fn compute_overload(total_students: i64, capacity: Capacity) -> Overload {
    let total = (total_students - capacity.base).max(0);
    let max = (total_students - capacity.max).max(0);
    let base = if total <= GRACE_BAND {
        total
    } else {
        total - max
    };

    Overload { total, base, max }
}

/// Convert overload counts to pay figures.
///
/// One currency unit per base-rate student, the premium multiplier per
/// max-rate student, and a per-period to monthly conversion for the total.
pub fn compute_pay(overload: Overload) -> PaySummary {
    let base_pay = overload.base as f64;
    let max_pay = overload.max as f64 * PREMIUM_MULTIPLIER;
    let monthly_total = (base_pay + max_pay) * BILLING_UNITS_PER_MONTH / PAY_PERIOD_DIVISOR;

    PaySummary {
        base_pay,
        max_pay,
        monthly_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format_currency;

    const LOWER: Capacity = Capacity { base: 23, max: 25 };
    const KINDER: Capacity = Capacity { base: 22, max: 24 };

    #[test]
    fn test_worked_example_music_gr_2() {
        // 27 students in a 23/25 section.
        let overload = compute_overload(27, LOWER);
        assert_eq!(overload, Overload { total: 4, base: 2, max: 2 });

        let pay = compute_pay(overload);
        assert_eq!(format_currency(pay.base_pay), "$2.00");
        assert_eq!(format_currency(pay.max_pay), "$3.00");
        assert_eq!(format_currency(pay.monthly_total), "$18.75");
    }

    #[test]
    fn test_under_capacity_is_all_zero() {
        // "KINDER A" with 20 students.
        let overload = compute_overload(20, KINDER);
        assert_eq!(overload, Overload::default());

        let pay = compute_pay(overload);
        assert_eq!(format_currency(pay.base_pay), "$0.00");
        assert_eq!(format_currency(pay.max_pay), "$0.00");
        assert_eq!(format_currency(pay.monthly_total), "$0.00");
    }

    #[test]
    fn test_grace_band_absorbs_small_overload() {
        // 25 students: total overload 2, still within the grace band.
        let overload = compute_overload(25, LOWER);
        assert_eq!(overload.total, 2);
        assert_eq!(overload.base, 2);
        // Max overload is derived independently from the ceiling.
        assert_eq!(overload.max, 0);
    }

    #[test]
    fn test_split_above_grace_band() {
        // 28 students: 5 over base, 3 over max.
        let overload = compute_overload(28, LOWER);
        assert_eq!(overload, Overload { total: 5, base: 2, max: 3 });
        assert_eq!(overload.base + overload.max, overload.total);
    }

    #[test]
    fn test_grace_band_with_independent_max_overload() {
        // A degenerate capacity where max < base + grace: with zero capacity
        // the clamp still applies and max stays independent of the band.
        let overload = compute_overload(2, Capacity::ZERO);
        assert_eq!(overload.total, 2);
        assert_eq!(overload.base, 2);
        assert_eq!(overload.max, 2);
    }

    #[test]
    fn test_negative_enrollment_clamped() {
        let overload = compute_overload(-3, LOWER);
        assert_eq!(overload, Overload::default());
    }

    #[test]
    fn test_unclassified_row_pays_on_full_enrollment() {
        // No tier matched: base and max are both zero, so the whole
        // enrollment counts as overload beyond both thresholds.
        let overload = compute_overload(10, Capacity::ZERO);
        assert_eq!(overload, Overload { total: 10, base: 0, max: 10 });
    }

    #[test]
    fn test_pay_uses_premium_multiplier() {
        let pay = compute_pay(Overload { total: 5, base: 2, max: 3 });
        assert_eq!(pay.base_pay, 2.0);
        assert_eq!(pay.max_pay, 4.5);
        assert_eq!(pay.monthly_total, 6.5 * 30.0 / 8.0);
    }
}
