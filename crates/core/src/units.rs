//! Human formatting for wei-denominated integers.

use alloy_primitives::utils::format_ether as format_ether_padded;
use alloy_primitives::U256;

/// 10^18 -- one native token unit in wei.
pub const WEI_PER_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// 10^14 -- the fourth fractional digit at 18 decimals.
const FOURTH_DECIMAL: U256 = U256::from_limbs([100_000_000_000_000, 0, 0, 0]);

/// Formats wei as ether with trailing zeros trimmed (`1.0`, `0.25`, `12.5`).
pub fn format_ether(wei: U256) -> String {
    let padded = format_ether_padded(wei);
    match padded.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => format!("{padded}.0"),
    }
}

/// Formats an 18-decimal token amount for a summary sentence.
///
/// Amounts of at least one whole token are rounded to four fractional
/// digits and grouped by thousands (`1,000,000.5`). Smaller amounts keep
/// full precision so dust is not rendered as zero.
pub fn format_token_amount(amount: U256) -> String {
    if amount < WEI_PER_ETHER {
        return format_ether(amount);
    }

    let mut whole = amount / WEI_PER_ETHER;
    let frac = amount % WEI_PER_ETHER;
    let mut frac4 = (frac + FOURTH_DECIMAL / U256::from(2)) / FOURTH_DECIMAL;
    if frac4 == U256::from(10_000) {
        whole += U256::from(1);
        frac4 = U256::ZERO;
    }

    let mut out = group_thousands(&whole.to_string());
    if !frac4.is_zero() {
        let digits = format!("{:04}", frac4.to::<u64>());
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ether_trims_trailing_zeros() {
        assert_eq!(format_ether(WEI_PER_ETHER), "1.0");
        assert_eq!(format_ether(U256::ZERO), "0.0");
        assert_eq!(format_ether(WEI_PER_ETHER / U256::from(4)), "0.25");
        assert_eq!(
            format_ether(WEI_PER_ETHER * U256::from(12) + WEI_PER_ETHER / U256::from(2)),
            "12.5"
        );
    }

    #[test]
    fn token_amount_groups_and_rounds() {
        assert_eq!(format_token_amount(WEI_PER_ETHER * U256::from(50)), "50");
        assert_eq!(
            format_token_amount(WEI_PER_ETHER * U256::from(1_000_000)),
            "1,000,000"
        );
        // 1.23456 -> 1.2346
        let v = U256::from(1_234_560_000_000_000_000u128);
        assert_eq!(format_token_amount(v), "1.2346");
        // 9.99999 rounds up into the next whole token
        let v = U256::from(9_999_990_000_000_000_000u128);
        assert_eq!(format_token_amount(v), "10");
    }

    #[test]
    fn token_amount_below_one_keeps_precision() {
        assert_eq!(format_token_amount(U256::from(1)), "0.000000000000000001");
    }
}
