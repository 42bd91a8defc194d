use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::Days;

use crate::models::{PriceChange, PricePoint};

/// Percentage change between the most recent price and the baseline of a
/// trailing window of `lookback_days`.
///
/// The window is anchored to the latest date in the series, not to the wall
/// clock, so a series that stopped updating still reports the change over
/// its own last `lookback_days`. The baseline is the earliest observation
/// before the latest one that falls on or after `latest - lookback_days`;
/// when every earlier observation predates the window, the earliest
/// observation of the series is used instead.
///
/// Returns `None` when there is nothing to compare: fewer than two points,
/// a zero baseline, or a zero-day window. The percentage is rounded half away
/// from zero to one decimal place and computed on integer cents, so the
/// result never depends on binary floating point.
///
/// The input does not need to be sorted. Points sharing a date are ordered by
/// id, which keeps the result independent of input order.
pub fn compute_change(prices: &[PricePoint], lookback_days: u32) -> Option<PriceChange> {
    if prices.len() < 2 || lookback_days == 0 {
        return None;
    }

    let mut sorted: Vec<&PricePoint> = prices.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    let (latest, earlier) = sorted.split_last()?;
    let earliest = earlier.first()?;

    let baseline_point = latest.date
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .and_then(|reference| earlier.iter().find(|p| p.date >= reference))
        .unwrap_or(earliest);

    let current = to_cents(&latest.price)?;
    let baseline = to_cents(&baseline_point.price)?;
    if baseline == 0 {
        return None;
    }

    let diff = current.checked_sub(baseline)?;
    let tenths = rounded_tenths_of_percent(diff.checked_abs()?, baseline.checked_abs()?)?;

    Some(PriceChange {
        percentage: tenths as f64 / 10.0,
        increased: diff != 0 && (diff > 0) == (baseline > 0),
    })
}

// Prices carry two fractional digits; anything finer is truncated.
fn to_cents(price: &BigDecimal) -> Option<i128> {
    let (cents, _) = price.with_scale(2).as_bigint_and_exponent();
    cents.to_i128()
}

/// `round(numerator / denominator * 1000)` with halves rounded up.
/// Both arguments are non-negative and `denominator` is non-zero.
fn rounded_tenths_of_percent(numerator: i128, denominator: i128) -> Option<i128> {
    let doubled = numerator.checked_mul(2_000)?.checked_add(denominator)?;
    Some(doubled / denominator.checked_mul(2)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;
    use uuid::Uuid;

    fn point(date: &str, price: &str) -> PricePoint {
        PricePoint {
            id: Uuid::new_v4(),
            item_id: Uuid::nil(),
            price: BigDecimal::from_str(price).unwrap(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            created_at: Utc::now(),
        }
    }

    fn series(points: &[(&str, &str)]) -> Vec<PricePoint> {
        points.iter().map(|(d, p)| point(d, p)).collect()
    }

    fn change(percentage: f64, increased: bool) -> Option<PriceChange> {
        Some(PriceChange { percentage, increased })
    }

    #[test]
    fn test_empty_series_has_no_change() {
        assert_eq!(compute_change(&[], 7), None);
    }

    #[test]
    fn test_single_point_has_no_change() {
        for window in [1, 7, 30, 365] {
            assert_eq!(compute_change(&series(&[("2024-01-01", "10.00")]), window), None);
        }
    }

    #[test]
    fn test_two_point_increase() {
        let prices = series(&[("2024-01-01", "100.00"), ("2024-01-05", "120.00")]);
        assert_eq!(compute_change(&prices, 7), change(20.0, true));
    }

    #[test]
    fn test_decrease_reports_magnitude() {
        let prices = series(&[("2024-01-01", "100.00"), ("2024-01-05", "75.00")]);
        assert_eq!(compute_change(&prices, 7), change(25.0, false));
    }

    #[test]
    fn test_zero_baseline_has_no_change() {
        let prices = series(&[("2024-01-01", "0.00"), ("2024-01-05", "120.00")]);
        assert_eq!(compute_change(&prices, 7), None);

        // zero baseline reached through the fallback
        let prices = series(&[("2020-01-01", "0"), ("2024-01-05", "5.00")]);
        assert_eq!(compute_change(&prices, 7), None);
    }

    #[test]
    fn test_flat_series_is_zero_and_not_increased() {
        let prices = series(&[("2024-01-01", "42.00"), ("2024-01-03", "42.00")]);
        let result = compute_change(&prices, 7).unwrap();

        assert_eq!(result, PriceChange { percentage: 0.0, increased: false });
        assert!(result.is_flat());
    }

    #[test]
    fn test_result_is_independent_of_input_order() {
        let prices = series(&[
            ("2024-01-01", "100.00"),
            ("2024-01-20", "110.00"),
            ("2024-01-25", "120.00"),
            ("2024-01-30", "132.00"),
        ]);
        let mut shuffled = prices.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);

        for window in [7, 30, 365] {
            let first = compute_change(&prices, window);
            assert_eq!(first, compute_change(&prices, window));
            assert_eq!(first, compute_change(&shuffled, window));
        }
    }

    #[test]
    fn test_window_falls_back_to_earliest_point() {
        let prices = series(&[("2020-01-01", "50.00"), ("2023-01-01", "100.00")]);
        assert_eq!(compute_change(&prices, 7), change(100.0, true));
    }

    #[test]
    fn test_baseline_is_first_point_inside_window() {
        let prices = series(&[
            ("2024-01-01", "100.00"),
            ("2024-01-20", "110.00"),
            ("2024-01-25", "120.00"),
            ("2024-01-30", "132.00"),
        ]);

        // window starts 2024-01-23
        assert_eq!(compute_change(&prices, 7), change(10.0, true));
        // window starts 2023-12-31
        assert_eq!(compute_change(&prices, 30), change(32.0, true));
        assert_eq!(compute_change(&prices, 365), change(32.0, true));
    }

    #[test]
    fn test_point_on_window_start_is_inside() {
        let prices = series(&[("2024-01-01", "10.00"), ("2024-01-08", "11.00")]);
        assert_eq!(compute_change(&prices, 7), change(10.0, true));
    }

    #[test]
    fn test_window_is_anchored_to_latest_data_not_today() {
        // Data that stopped years ago still reports its own trailing change
        let prices = series(&[("2015-06-01", "20.00"), ("2015-06-03", "25.00")]);
        assert_eq!(compute_change(&prices, 7), change(25.0, true));
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let down = series(&[("2024-01-01", "100.00"), ("2024-01-02", "112.34")]);
        assert_eq!(compute_change(&down, 7), change(12.3, true));

        let up = series(&[("2024-01-01", "100.00"), ("2024-01-02", "112.35")]);
        assert_eq!(compute_change(&up, 7), change(12.4, true));

        let negative = series(&[("2024-01-01", "100.00"), ("2024-01-02", "87.65")]);
        assert_eq!(compute_change(&negative, 7), change(12.4, false));
    }

    #[test]
    fn test_repeating_fractions_round_to_one_decimal() {
        let third = series(&[("2024-01-01", "3.00"), ("2024-01-02", "4.00")]);
        assert_eq!(compute_change(&third, 7), change(33.3, true));

        let two_thirds = series(&[("2024-01-01", "3.00"), ("2024-01-02", "5.00")]);
        assert_eq!(compute_change(&two_thirds, 7), change(66.7, true));
    }

    #[test]
    fn test_duplicate_dates_are_deterministic() {
        let mut prices = series(&[
            ("2024-01-01", "100.00"),
            ("2024-01-01", "80.00"),
            ("2024-01-05", "120.00"),
        ]);
        let expected = compute_change(&prices, 7);
        assert!(expected.is_some());

        prices.swap(0, 1);
        assert_eq!(compute_change(&prices, 7), expected);
    }

    #[test]
    fn test_zero_day_window_has_no_change() {
        let prices = series(&[("2024-01-01", "100.00"), ("2024-01-05", "120.00")]);
        assert_eq!(compute_change(&prices, 0), None);
    }

    #[test]
    fn test_prices_beyond_64_bit_cents() {
        let prices = series(&[
            ("2024-01-01", "100000000000000000000.00"),
            ("2024-01-05", "200000000000000000000.00"),
        ]);
        assert_eq!(compute_change(&prices, 7), change(100.0, true));
    }

    #[test]
    fn test_largest_storable_price() {
        let prices = series(&[("2024-01-01", "0.01"), ("2024-01-05", "99999999.99")]);
        assert_eq!(compute_change(&prices, 7), change(999999999800.0, true));
    }

    #[test]
    fn test_large_window_does_not_underflow() {
        let prices = series(&[("0001-01-05", "10.00"), ("0001-01-10", "20.00")]);
        assert_eq!(compute_change(&prices, u32::MAX), change(100.0, true));
    }
}
