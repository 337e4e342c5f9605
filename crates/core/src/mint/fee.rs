//! Fee-rate policy for funding and finalizing mint batches.
//!
//! Rates are in sat/kw. Anything below the relay floor is replaced by a fixed
//! default rather than passed through for the daemon to reject.

/// Lowest fee rate the daemon accepts (sat/kw).
pub const MIN_FEE_RATE: u64 = 253;

/// Rate used for finalize when none (or one below the floor) is given.
pub const DEFAULT_FINALIZE_FEE_RATE: u64 = 1000;

/// Rate used for an explicit fund call when none (or one below the floor) is given.
pub const DEFAULT_FUND_FEE_RATE: u64 = 500;

/// Rate used when sending to an address.
pub const DEFAULT_SEND_FEE_RATE: u64 = 1000;

/// Effective fee rate for a finalize call.
pub fn effective_finalize_fee_rate(requested: Option<u64>) -> u64 {
    floor_or(requested, DEFAULT_FINALIZE_FEE_RATE)
}

/// Effective fee rate for an explicit fund call.
pub fn effective_fund_fee_rate(requested: Option<u64>) -> u64 {
    floor_or(requested, DEFAULT_FUND_FEE_RATE)
}

fn floor_or(requested: Option<u64>, fallback: u64) -> u64 {
    match requested {
        Some(rate) if rate >= MIN_FEE_RATE => rate,
        _ => fallback,
    }
}

/// Parse a fee rate typed by a user.
///
/// Leading whitespace is skipped and the leading run of digits is used, so
/// `"2000 sat/kw"` reads as 2000. Input without leading digits (including
/// negative numbers) yields `None`.
pub fn parse_fee_rate(input: &str) -> Option<u64> {
    let digits: String = input
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_rate_below_floor_uses_default() {
        for rate in [0, 1, 100, 252] {
            assert_eq!(effective_finalize_fee_rate(Some(rate)), 1000);
        }
        assert_eq!(effective_finalize_fee_rate(None), 1000);
    }

    #[test]
    fn test_finalize_rate_at_or_above_floor_is_kept() {
        assert_eq!(effective_finalize_fee_rate(Some(253)), 253);
        assert_eq!(effective_finalize_fee_rate(Some(5000)), 5000);
    }

    #[test]
    fn test_fund_rate_defaults_to_500() {
        assert_eq!(effective_fund_fee_rate(None), 500);
        assert_eq!(effective_fund_fee_rate(Some(252)), 500);
        assert_eq!(effective_fund_fee_rate(Some(300)), 300);
    }

    #[test]
    fn test_parse_fee_rate() {
        assert_eq!(parse_fee_rate("5000"), Some(5000));
        assert_eq!(parse_fee_rate("  750"), Some(750));
        assert_eq!(parse_fee_rate("2000 sat/kw"), Some(2000));
        assert_eq!(parse_fee_rate(""), None);
        assert_eq!(parse_fee_rate("abc"), None);
        assert_eq!(parse_fee_rate("-300"), None);
    }

    #[test]
    fn test_unparseable_input_falls_back() {
        assert_eq!(effective_finalize_fee_rate(parse_fee_rate("fast")), 1000);
        assert_eq!(effective_finalize_fee_rate(parse_fee_rate("12")), 1000);
    }
}
