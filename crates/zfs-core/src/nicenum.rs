//! Human-readable byte counts: `1536` → `1.50K`.

const UNITS: &[u8; 7] = b" KMGTPE";

/// Render `num` in base 1024 with at most five characters where possible.
///
/// Below 1024 the plain integer is printed. Exact multiples of the unit
/// drop the fraction. Otherwise the first of 2, 1, 0 decimals that fits in
/// five characters wins (0 decimals if none fits).
pub fn nicenum(num: u64) -> String {
    let mut n = num;
    let mut index = 0usize;
    while n >= 1024 {
        n /= 1024;
        index += 1;
    }

    if index == 0 {
        return n.to_string();
    }

    let unit = UNITS[index] as char;
    let shift = 10 * index as u32;
    if num & ((1u64 << shift) - 1) == 0 {
        return format!("{}{}", n, unit);
    }

    let value = num as f64 / (1u64 << shift) as f64;
    let mut out = String::new();
    for precision in (0..=2).rev() {
        out = format!("{:.*}{}", precision, value, unit);
        if out.len() <= 5 {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_are_plain() {
        assert_eq!(nicenum(0), "0");
        assert_eq!(nicenum(1023), "1023");
    }

    #[test]
    fn exact_multiples() {
        assert_eq!(nicenum(1024), "1K");
        assert_eq!(nicenum(5 << 20), "5M");
        assert_eq!(nicenum(1 << 60), "1E");
    }

    #[test]
    fn fractional_precision_shrinks_to_fit() {
        assert_eq!(nicenum(1536), "1.50K");
        assert_eq!(nicenum(10 * 1024 + 512), "10.5K");
        assert_eq!(nicenum(123_456), "121K");
        assert_eq!(nicenum(9000), "8.79K");
    }

    #[test]
    fn max_value() {
        assert_eq!(nicenum(u64::MAX), "16.0E");
    }
}
