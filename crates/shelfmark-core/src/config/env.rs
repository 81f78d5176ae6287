#[must_use]
pub(super) fn parse_non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
pub(super) fn parse_usize(raw: Option<&str>, default_value: usize, min_value: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value >= min_value)
        .unwrap_or(default_value)
}

#[must_use]
pub(super) fn parse_enabled_default_true(raw: Option<&str>) -> bool {
    !matches!(
        raw.map(|value| value.trim().to_ascii_lowercase())
            .as_deref(),
        Some("off" | "none" | "0" | "false")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usize_reader_enforces_minimum_and_falls_back() {
        assert_eq!(parse_usize(Some(" 25 "), 10, 1), 25);
        assert_eq!(parse_usize(Some("0"), 10, 1), 10);
        assert_eq!(parse_usize(Some("many"), 10, 1), 10);
        assert_eq!(parse_usize(None, 10, 1), 10);
    }

    #[test]
    fn enabled_flag_defaults_to_true() {
        assert!(parse_enabled_default_true(None));
        assert!(parse_enabled_default_true(Some("yes")));
        for raw in ["off", " OFF ", "none", "0", "false"] {
            assert!(!parse_enabled_default_true(Some(raw)), "{raw}");
        }
    }

    #[test]
    fn non_empty_reader_trims() {
        assert_eq!(parse_non_empty(Some("  7 ")), Some("7".to_string()));
        assert_eq!(parse_non_empty(Some("   ")), None);
    }
}
