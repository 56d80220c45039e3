//! Hit count parsing
//!
//! `llvm-cov show` abbreviates large counts: `2.5k` means 2500. Counts that
//! overflow the column are shown with an `E` suffix, which is read the same
//! way as `k`.

const SCALE: u64 = 1000;

/// Parse a hit-count field.
///
/// Accepts a plain non-negative integer, or a decimal number followed by `k`
/// or `E` (multiplied by 1000, truncated toward zero).
///
/// ```
/// use llvm_cov_xml::coverage::parse_hits;
///
/// assert_eq!(parse_hits("10"), Some(10));
/// assert_eq!(parse_hits("2.5k"), Some(2500));
/// assert_eq!(parse_hits("3.1E"), Some(3100));
/// assert_eq!(parse_hits("abc"), None);
/// ```
pub fn parse_hits(s: &str) -> Option<u64> {
    if let Ok(hits) = s.parse::<u64>() {
        return Some(hits);
    }

    let mantissa = s.strip_suffix('k').or_else(|| s.strip_suffix('E'))?;
    parse_scaled(mantissa)
}

/// Multiply a decimal string by 1000 using its digits, so `0.3` gives 300
/// rather than 299.
fn parse_scaled(mantissa: &str) -> Option<u64> {
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (mantissa, ""),
    };

    if whole.is_empty() || !is_digits(whole) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if mantissa.ends_with('.') {
        return None;
    }

    let whole: u64 = whole.parse().ok()?;

    // Digits past the thousandths are below one hit and get truncated.
    let mut thousandths = 0u64;
    let mut place = SCALE / 10;
    for digit in fraction.bytes().take(3) {
        thousandths += u64::from(digit - b'0') * place;
        place /= 10;
    }

    whole.checked_mul(SCALE)?.checked_add(thousandths)
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integers() {
        assert_eq!(parse_hits("0"), Some(0));
        assert_eq!(parse_hits("10"), Some(10));
        assert_eq!(parse_hits("123456"), Some(123456));
    }

    #[test]
    fn test_thousands_suffix() {
        assert_eq!(parse_hits("2.5k"), Some(2500));
        assert_eq!(parse_hits("1.23k"), Some(1230));
        assert_eq!(parse_hits("0.3k"), Some(300));
        assert_eq!(parse_hits("12k"), Some(12000));
    }

    #[test]
    fn test_overflow_suffix_is_scaled_like_thousands() {
        assert_eq!(parse_hits("3.1E"), Some(3100));
        assert_eq!(parse_hits("9.99E"), Some(9990));
    }

    #[test]
    fn test_extra_fraction_digits_truncate() {
        assert_eq!(parse_hits("1.2349k"), Some(1234));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_hits("abc"), None);
        assert_eq!(parse_hits(""), None);
        assert_eq!(parse_hits("k"), None);
        assert_eq!(parse_hits("-1"), None);
        assert_eq!(parse_hits("1.5"), None);
        assert_eq!(parse_hits("1.k"), None);
        assert_eq!(parse_hits(".5k"), None);
        assert_eq!(parse_hits("1.5M"), None);
        assert_eq!(parse_hits("1,5k"), None);
    }
}
