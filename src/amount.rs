// Two-decimal rendering of amounts
//
// Rounds half away from zero on the shortest decimal form of the value, so
// 2.675 renders as 2.68 even though its binary value sits just below.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

pub fn format_amount(amount: f64) -> String {
    // f64 Display is the shortest round-tripping form and never uses exponents
    match Decimal::from_str(&amount.to_string()) {
        Ok(value) => {
            let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(2);
            rounded.to_string()
        }
        // Out of Decimal's range (or not finite)
        Err(_) => format!("{:.2}", amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoints_round_up() {
        assert_eq!(format_amount(0.125), "0.13");
        assert_eq!(format_amount(1.005), "1.01");
        assert_eq!(format_amount(2.675), "2.68");
        assert_eq!(format_amount(0.375), "0.38");
        assert_eq!(format_amount(2.005), "2.01");
    }

    #[test]
    fn test_negative_midpoints_round_away_from_zero() {
        assert_eq!(format_amount(-0.125), "-0.13");
        assert_eq!(format_amount(-3.0), "-3.00");
    }

    #[test]
    fn test_pads_to_two_decimals() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(1000.0), "1000.00");
        assert_eq!(format_amount(450.5), "450.50");
        assert_eq!(format_amount(12.344), "12.34");
    }

    #[test]
    fn test_values_outside_decimal_range_still_render() {
        assert_eq!(format_amount(1e30), format!("{:.2}", 1e30));
    }
}
