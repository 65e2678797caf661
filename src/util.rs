// SPDX-License-Identifier: Apache-2.0

use std::sync::LazyLock;

use regex::Regex;

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// Returns `true` if `formula` is a plain non-negative decimal literal.
pub fn is_number(formula: &str) -> bool {
    DECIMAL.is_match(formula)
}

/// Parses a width formula that is a plain integer literal (an optional minus
/// sign is accepted so that negative widths can be reported as such).
pub fn parse_int(formula: &str) -> Option<i64> {
    formula.trim().parse::<i64>().ok()
}

/// Number of bits needed to represent `number` as an unsigned value. Zero
/// needs no bits.
pub fn required_bits(number: u64) -> usize {
    (u64::BITS - number.leading_zeros()) as usize
}

/// `ceil(log2(n))`, with `ceil_log2(0) == ceil_log2(1) == 0`.
pub fn ceil_log2(n: u64) -> usize {
    if n <= 1 {
        0
    } else {
        required_bits(n - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        assert!(is_number("0"));
        assert!(is_number("32"));
        assert!(!is_number(""));
        assert!(!is_number("N"));
        assert!(!is_number("N+1"));
        assert!(!is_number("-1"));
    }

    #[test]
    fn bit_counts() {
        assert_eq!(required_bits(0), 0);
        assert_eq!(required_bits(1), 1);
        assert_eq!(required_bits(3), 2);
        assert_eq!(required_bits(4), 3);
        assert_eq!(required_bits(255), 8);
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(3), 2);
        assert_eq!(ceil_log2(4), 2);
        assert_eq!(ceil_log2(5), 3);
    }

    #[test]
    fn parse_int_accepts_negative() {
        assert_eq!(parse_int("8"), Some(8));
        assert_eq!(parse_int("-2"), Some(-2));
        assert_eq!(parse_int("N"), None);
    }
}
