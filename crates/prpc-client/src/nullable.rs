//! Stand-ins for fields a pNode may report as `null`.
//!
//! Every transform and aggregate goes through these so a missing value and a
//! reported zero are handled the same way in one place.

/// Missing counters (bytes, seconds) count as zero.
pub fn count(value: Option<u64>) -> u64 {
    value.unwrap_or(0)
}

/// Missing visibility means private.
pub fn flag(value: Option<bool>) -> bool {
    value.unwrap_or(false)
}

/// Missing or empty strings fall back to `fallback`.
pub fn text(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// Port 0 is not a usable port, so it is treated like a missing one.
pub fn port(value: Option<u16>, fallback: u16) -> u16 {
    value.filter(|p| *p != 0).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(count(None), 0);
        assert_eq!(count(Some(0)), 0);
        assert_eq!(count(Some(7)), 7);
        assert!(!flag(None));
        assert!(flag(Some(true)));
        assert_eq!(text(None, "unknown"), "unknown");
        assert_eq!(text(Some(""), "unknown"), "unknown");
        assert_eq!(text(Some("0.7.3"), "unknown"), "0.7.3");
        assert_eq!(port(None, 6000), 6000);
        assert_eq!(port(Some(0), 6000), 6000);
        assert_eq!(port(Some(7000), 6000), 7000);
    }
}
