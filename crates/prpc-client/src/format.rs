//! Human-readable renderings of node fields.

const BYTE_UNITS: [&str; 6] = ["Bytes", "KB", "MB", "GB", "TB", "PB"];
const NUMBER_SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;

/// Base-1024 size with at most two decimals, e.g. `1536 -> "1.5 KB"`.
/// Zero and missing both render as `"0 Bytes"`.
pub fn format_bytes(bytes: impl Into<Option<u64>>) -> String {
    let bytes = match bytes.into() {
        None | Some(0) => return "0 Bytes".to_string(),
        Some(bytes) => bytes,
    };

    let mut unit = 0;
    let mut scale = 1u64;
    while unit < BYTE_UNITS.len() - 1 && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = bytes as f64 / scale as f64;
    format!("{} {}", trim_decimals(&format!("{value:.2}")), BYTE_UNITS[unit])
}

/// `"{d}d {h}h"`, `"{h}h {m}m"` or `"{m}m"`; `"0s"` when missing or zero.
pub fn format_uptime(seconds: impl Into<Option<u64>>) -> String {
    let seconds = match seconds.into() {
        None | Some(0) => return "0s".to_string(),
        Some(seconds) => seconds,
    };

    let days = seconds / DAY as u64;
    let hours = (seconds % DAY as u64) / HOUR as u64;
    let mins = (seconds % HOUR as u64) / MINUTE as u64;

    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// Age of a unix-seconds `timestamp` relative to `now`.
pub fn format_relative_time(timestamp: i64, now: i64) -> String {
    let diff = now.saturating_sub(timestamp);
    if diff < MINUTE {
        "Just now".to_string()
    } else if diff < HOUR {
        format!("{}m ago", diff / MINUTE)
    } else if diff < DAY {
        format!("{}h ago", diff / HOUR)
    } else {
        format!("{}d ago", diff / DAY)
    }
}

pub fn format_percentage(value: impl Into<Option<f64>>, decimals: usize) -> String {
    match value.into() {
        Some(value) => format!("{value:.decimals$}%"),
        None => "0%".to_string(),
    }
}

/// Compact magnitude, e.g. `1_250_000 -> "1.25M"`.
pub fn format_number(num: impl Into<Option<f64>>, decimals: usize) -> String {
    let Some(num) = num.into() else {
        return "0".to_string();
    };
    if num < 1000.0 {
        return format!("{num:.decimals$}");
    }

    let tier = ((num.abs().log10() / 3.0).floor() as usize).min(NUMBER_SUFFIXES.len() - 1);
    if tier == 0 {
        return format!("{num:.decimals$}");
    }
    let scaled = num / 10f64.powi(tier as i32 * 3);
    format!("{scaled:.decimals$}{}", NUMBER_SUFFIXES[tier])
}

/// `"AbCd...WxYz"` style abbreviation keeping `chars` characters on each side.
pub fn shorten_pubkey(pubkey: Option<&str>, chars: usize) -> String {
    let pubkey = match pubkey {
        Some(p) if !p.is_empty() => p,
        _ => return "Unknown".to_string(),
    };

    let len = pubkey.chars().count();
    if len <= chars * 2 + 3 {
        return pubkey.to_string();
    }
    let head: String = pubkey.chars().take(chars).collect();
    let tail: String = pubkey.chars().skip(len - chars).collect();
    format!("{head}...{tail}")
}

fn trim_decimals(rendered: &str) -> &str {
    if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(None), "0 Bytes");
        assert_eq!(format_bytes(1), "1 Bytes");
        assert_eq!(format_bytes(1023), "1023 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_048_576), "1 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024 + 1024 * 1024 * 100), "5.1 GB");
        assert_eq!(format_bytes(1u64 << 40), "1 TB");
        assert_eq!(format_bytes(3u64 << 50), "3 PB");
        // nothing above PB
        assert_eq!(format_bytes(2048u64 << 50), "2048 PB");
    }

    #[test]
    fn uptime() {
        assert_eq!(format_uptime(None), "0s");
        assert_eq!(format_uptime(0), "0s");
        assert_eq!(format_uptime(59), "0m");
        assert_eq!(format_uptime(125), "2m");
        assert_eq!(format_uptime(3_600 + 30 * 60), "1h 30m");
        assert_eq!(format_uptime(2 * 86_400 + 5 * 3_600 + 59), "2d 5h");
    }

    #[test]
    fn relative_time() {
        let now = 1_700_000_000;
        assert_eq!(format_relative_time(now, now), "Just now");
        assert_eq!(format_relative_time(now - 59, now), "Just now");
        // clock skew puts the node slightly in the future
        assert_eq!(format_relative_time(now + 30, now), "Just now");
        assert_eq!(format_relative_time(now - 60, now), "1m ago");
        assert_eq!(format_relative_time(now - 3_599, now), "59m ago");
        assert_eq!(format_relative_time(now - 3_600, now), "1h ago");
        assert_eq!(format_relative_time(now - 86_399, now), "23h ago");
        assert_eq!(format_relative_time(now - 3 * 86_400, now), "3d ago");
    }

    #[test]
    fn relative_time_saturates_on_extreme_timestamps() {
        let now = 1_700_000_000;
        assert_eq!(
            format_relative_time(i64::MIN, now),
            format!("{}d ago", i64::MAX / DAY)
        );
        assert_eq!(format_relative_time(i64::MAX, now), "Just now");
    }

    #[test]
    fn percentage() {
        assert_eq!(format_percentage(None, 2), "0%");
        assert_eq!(format_percentage(42.4567, 2), "42.46%");
        assert_eq!(format_percentage(50.0, 0), "50%");
    }

    #[test]
    fn numbers() {
        assert_eq!(format_number(None, 2), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1_500.0, 1), "1.5K");
        assert_eq!(format_number(1_250_000.0, 2), "1.25M");
        assert_eq!(format_number(7_000_000_000.0, 0), "7B");
    }

    #[test]
    fn pubkeys() {
        assert_eq!(shorten_pubkey(None, 4), "Unknown");
        assert_eq!(shorten_pubkey(Some(""), 4), "Unknown");
        assert_eq!(shorten_pubkey(Some("short"), 4), "short");
        assert_eq!(shorten_pubkey(Some("ABCDEFGHIJK"), 4), "ABCDEFGHIJK");
        assert_eq!(
            shorten_pubkey(Some("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"), 4),
            "7xKX...gAsU"
        );
    }
}
