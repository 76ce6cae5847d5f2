//! Go literal formatting.

use std::fmt::Write;

/// Quotes `s` as an interpreted Go string literal.
pub fn string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Nanoseconds in a protobuf duration, the unit of Go's `time.Duration`.
pub fn nanos(duration: &prost_types::Duration) -> i128 {
    i128::from(duration.seconds) * 1_000_000_000 + i128::from(duration.nanos)
}

/// Nanoseconds in a std duration.
pub fn std_nanos(duration: std::time::Duration) -> i128 {
    i128::try_from(duration.as_nanos()).unwrap_or(i128::MAX)
}

/// A `time.Duration` literal with its human-readable value as a trailing comment.
///
/// ```
/// use temporal_codegen::targets::go::literal;
///
/// assert_eq!(literal::duration(3_600_000_000_000), "3600000000000 // 1h0m0s");
/// ```
pub fn duration(nanos: i128) -> String {
    format!("{nanos} // {}", duration_string(nanos))
}

/// Formats nanoseconds the way Go's `time.Duration.String` does.
pub fn duration_string(nanos: i128) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }
    let sign = if nanos < 0 { "-" } else { "" };
    let n = nanos.unsigned_abs();

    let body = if n < 1_000 {
        format!("{n}ns")
    } else if n < 1_000_000 {
        format!("{}µs", decimal(n, 1_000))
    } else if n < 1_000_000_000 {
        format!("{}ms", decimal(n, 1_000_000))
    } else {
        let total_secs = n / 1_000_000_000;
        let hours = total_secs / 3600;
        let minutes = (total_secs / 60) % 60;
        let seconds = decimal(n % 60_000_000_000, 1_000_000_000);
        if hours > 0 {
            format!("{hours}h{minutes}m{seconds}s")
        } else if minutes > 0 {
            format!("{minutes}m{seconds}s")
        } else {
            format!("{seconds}s")
        }
    };
    format!("{sign}{body}")
}

/// `value / scale` with the remainder as trailing decimals, zeros trimmed.
fn decimal(value: u128, scale: u128) -> String {
    let whole = value / scale;
    let rem = value % scale;
    if rem == 0 {
        return whole.to_string();
    }
    let width = scale.ilog10() as usize;
    let frac = format!("{rem:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// A float64 literal.
pub fn float(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_match_go_formatting() {
        assert_eq!(duration_string(3_600_000_000_000), "1h0m0s");
        assert_eq!(duration_string(120_000_000_000), "2m0s");
        assert_eq!(duration_string(90_000_000_000), "1m30s");
        assert_eq!(duration_string(10_000_000_000), "10s");
        assert_eq!(duration_string(1_500_000_000), "1.5s");
        assert_eq!(duration_string(500_000_000), "500ms");
        assert_eq!(duration_string(1_500), "1.5µs");
        assert_eq!(duration_string(42), "42ns");
        assert_eq!(duration_string(0), "0s");
        assert_eq!(duration_string(-2_000_000_000), "-2s");
    }

    #[test]
    fn proto_durations_convert_to_nanos() {
        let d = prost_types::Duration {
            seconds: 2,
            nanos: 500_000_000,
        };
        assert_eq!(nanos(&d), 2_500_000_000);
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(string("plain"), "\"plain\"");
        assert_eq!(string("a \"b\"\n"), "\"a \\\"b\\\"\\n\"");
        assert_eq!(string("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(string("\u{1}"), "\"\\x01\"");
        assert_eq!(string("héllo"), "\"héllo\"");
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(float(2.0), "2.0");
        assert_eq!(float(1.5), "1.5");
    }
}
