//! Value formatters for table cells and tooltips
//!
//! These mirror the Grafana-style unit formats the console UI historically
//! used ("short", "none", "ms"). Cell/tooltip pairs rely on the exact output
//! of these functions, so the suffix set and decimal handling must stay put.

/// Magnitude suffixes for the "short" unit, scaled by 1000.
const SHORT_SUFFIXES: [&str; 5] = ["", " K", " Mil", " Bil", " Tri"];

/// Human-readable magnitude-suffixed number ("short" unit).
///
/// `format_short(1234.0, 1)` -> `"1.2 K"`, `format_short(5.0, 1)` -> `"5.0"`.
pub fn format_short(value: f64, decimals: usize) -> String {
    let mut scaled = value;
    let mut idx = 0;
    while scaled.abs() >= 1000.0 && idx < SHORT_SUFFIXES.len() - 1 {
        scaled /= 1000.0;
        idx += 1;
    }
    format!("{:.*}{}", decimals, scaled, SHORT_SUFFIXES[idx])
}

/// Plain fixed-decimal number ("none" unit); tooltip counterpart of `format_short`.
pub fn format_none(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Millisecond-suffixed number ("ms" unit).
pub fn format_ms(value: f64, decimals: usize) -> String {
    format!("{:.*} ms", decimals, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_below_thousand() {
        assert_eq!(format_short(5.0, 1), "5.0");
        assert_eq!(format_short(0.0, 1), "0.0");
        assert_eq!(format_short(999.9, 1), "999.9");
    }

    #[test]
    fn test_short_magnitudes() {
        assert_eq!(format_short(1234.0, 1), "1.2 K");
        assert_eq!(format_short(1_500_000.0, 1), "1.5 Mil");
        assert_eq!(format_short(2_000_000_000.0, 1), "2.0 Bil");
        assert_eq!(format_short(3_100_000_000_000.0, 1), "3.1 Tri");
    }

    #[test]
    fn test_short_negative() {
        assert_eq!(format_short(-1234.0, 1), "-1.2 K");
    }

    #[test]
    fn test_short_saturates_at_largest_suffix() {
        assert_eq!(format_short(4.2e15, 1), "4200.0 Tri");
    }

    #[test]
    fn test_none_plain() {
        assert_eq!(format_none(1234.56, 1), "1234.6");
        assert_eq!(format_none(0.0, 1), "0.0");
    }

    #[test]
    fn test_ms_decimals() {
        assert_eq!(format_ms(3.0, 2), "3.00 ms");
        assert_eq!(format_ms(12.345, 1), "12.3 ms");
    }
}
