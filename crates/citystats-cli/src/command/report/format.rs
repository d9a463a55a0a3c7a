//! Number formatting shared by the report tables.

use chrono::TimeDelta;

/// A share in `0.0..=1.0` as a percentage with one decimal (`12.3%`).
pub(super) fn percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

/// Rounds half to even, like the scores shown in the published tables.
#[expect(clippy::cast_possible_truncation)]
pub(super) fn round(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Integer with comma thousands separators (`1,234,567`).
pub(super) fn thousands<N>(value: N) -> String
where
    N: ToString,
{
    let text = value.to_string();
    let (sign, digits) = text
        .strip_prefix('-')
        .map_or(("", text.as_str()), |digits| ("-", digits));
    let mut grouped = String::from(sign);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// `H:MM:SS` for a non-negative duration; negative durations get a sign.
pub(super) fn duration(value: TimeDelta) -> String {
    let sign = if value < TimeDelta::zero() { "-" } else { "" };
    let total = value.num_seconds().unsigned_abs();
    let (hours, minutes, seconds) = (total / 3600, total / 60 % 60, total % 60);
    format!("{sign}{hours}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.1234), "12.3%");
        assert_eq!(percent(1.0), "100.0%");
        assert_eq!(percent(0.0), "0.0%");
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round(22.5), 22);
        assert_eq!(round(23.5), 24);
        assert_eq!(round(23.4), 23);
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0u64), "0");
        assert_eq!(thousands(999u64), "999");
        assert_eq!(thousands(1_000u64), "1,000");
        assert_eq!(thousands(1_234_567u64), "1,234,567");
        assert_eq!(thousands(-12_345i64), "-12,345");
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration(TimeDelta::seconds(323)), "0:05:23");
        assert_eq!(duration(TimeDelta::seconds(3 * 3600 + 7)), "3:00:07");
        assert_eq!(duration(TimeDelta::seconds(-61)), "-0:01:01");
    }
}
