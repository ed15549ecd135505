//! Display helpers for amounts, addresses and holder listings

use std::fmt::Write;

use crate::models::TokenHolder;

/// Render a raw integer amount as a fixed-point decimal with `decimals`
/// fractional digits. Trailing fractional zeros are trimmed and the integer
/// part is grouped with commas.
pub fn format_token_amount(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return group_thousands(&amount.to_string());
    }

    let decimals = decimals as usize;
    let mut digits = amount.to_string();
    if decimals >= digits.len() {
        digits = format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits);
    }

    let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        group_thousands(int_part)
    } else {
        format!("{}.{}", group_thousands(int_part), frac_part)
    }
}

/// Insert a comma every three digits from the right
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `ABCDEF...WXYZ` for anything longer than 12 characters
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Numbered holder list, one line per holder
pub fn format_holder_list(holders: &[TokenHolder], decimals: u8) -> String {
    let mut out = String::new();
    for (i, holder) in holders.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. `{}`: {} ({:.2}%)",
            i + 1,
            truncate_address(&holder.address),
            format_token_amount(holder.amount, decimals),
            holder.percent
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount(1_234_500, 4), "123.45");
        assert_eq!(format_token_amount(100, 0), "100");
        assert_eq!(format_token_amount(5, 6), "0.000005");
    }

    #[test]
    fn test_format_token_amount_edges() {
        assert_eq!(format_token_amount(0, 0), "0");
        assert_eq!(format_token_amount(0, 9), "0");
        assert_eq!(format_token_amount(1_000_000, 6), "1");
        assert_eq!(format_token_amount(1_000, 1), "100");
        assert_eq!(format_token_amount(123_456, 6), "0.123456");
        assert_eq!(format_token_amount(1_234_567_890_000, 6), "1,234,567.89");
        assert_eq!(format_token_amount(u64::MAX, 0), "18,446,744,073,709,551,615");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("123"), "123");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }

    #[test]
    fn test_truncate_address() {
        assert_eq!(truncate_address("ABCDEFGHIJKL"), "ABCDEFGHIJKL");
        assert_eq!(truncate_address("ABCDEFGHIJKLMNOP"), "ABCDEF...MNOP");
        assert_eq!(truncate_address(""), "");
    }

    #[test]
    fn test_holder_list() {
        let holders = vec![
            TokenHolder {
                address: "ABCDEFGHIJKLMNOP".to_string(),
                amount: 1_500_000,
                percent: 60.0,
            },
            TokenHolder {
                address: "short".to_string(),
                amount: 1_000_000,
                percent: 40.0,
            },
        ];
        assert_eq!(
            format_holder_list(&holders, 6),
            "1. `ABCDEF...MNOP`: 1.5 (60.00%)\n2. `short`: 1 (40.00%)\n"
        );
        assert_eq!(format_holder_list(&[], 6), "");
    }
}
