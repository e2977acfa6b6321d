//! Domain-specific shared validations and defaults for the query boundary

use crate::errors::AppError;

pub const DEFAULT_LOG_LINES: i64 = 200;
pub const MIN_LOG_LINES: i64 = 1;
pub const MAX_LOG_LINES: i64 = 2_000;
pub const DEFAULT_LOG_PRIORITY: &str = "warning";
pub const VALID_PRIORITIES: [&str; 8] = [
    "emerg", "alert", "crit", "err", "warning", "notice", "info", "debug",
];

pub fn clamp_log_lines(requested: i64) -> i64 {
    requested.clamp(MIN_LOG_LINES, MAX_LOG_LINES)
}

pub fn normalize_unit(unit: Option<String>) -> Result<String, AppError> {
    let Some(value) = unit else {
        return Err(AppError::bad_request("missing_unit", "unit is required"));
    };

    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(AppError::bad_request("missing_unit", "unit is required"));
    }

    if normalized.starts_with('-')
        || !normalized.chars().all(|character| {
            character.is_ascii_alphanumeric()
                || character == '-'
                || character == '_'
                || character == '@'
                || character == ':'
                || character == '.'
                || character == '\\'
        })
    {
        return Err(AppError::bad_request(
            "invalid_unit",
            "unit must contain only alphanumeric characters, dashes, underscores, dots, @, :, and \\ and must not start with a dash",
        ));
    }

    Ok(normalized.to_string())
}

/// Blank or absent priorities fall back to `warning`. Anything else must be a
/// journal level name, a level number, or a `FROM..TO` range of those, and is
/// lowercased since `journalctl` only accepts lowercase names.
pub fn normalize_priority(priority: Option<String>) -> Result<String, AppError> {
    let Some(value) = priority
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
    else {
        return Ok(DEFAULT_LOG_PRIORITY.to_string());
    };

    let valid = match value.split_once("..") {
        Some((from, to)) => is_priority_level(from) && is_priority_level(to),
        None => is_priority_level(&value),
    };
    if !valid {
        return Err(AppError::bad_request(
            "invalid_priority",
            "priority must be one of 0-7 or: emerg, alert, crit, err, warning, notice, info, debug, or a FROM..TO range of those",
        ));
    }

    Ok(value)
}

fn is_priority_level(level: &str) -> bool {
    matches!(level, "0" | "1" | "2" | "3" | "4" | "5" | "6" | "7")
        || VALID_PRIORITIES.contains(&level)
}

#[cfg(test)]
mod tests {
    use super::{
        clamp_log_lines, normalize_priority, normalize_unit, DEFAULT_LOG_PRIORITY, MAX_LOG_LINES,
    };

    #[test]
    fn clamps_line_counts_into_range() {
        assert_eq!(clamp_log_lines(0), 1);
        assert_eq!(clamp_log_lines(-25), 1);
        assert_eq!(clamp_log_lines(1), 1);
        assert_eq!(clamp_log_lines(200), 200);
        assert_eq!(clamp_log_lines(5_000), MAX_LOG_LINES);
    }

    #[test]
    fn normalizes_unit_name() {
        let unit = normalize_unit(Some("  sshd@prod.service ".to_string())).expect("valid unit");
        assert_eq!(unit, "sshd@prod.service");
    }

    #[test]
    fn rejects_missing_or_blank_unit() {
        let error = normalize_unit(None).expect_err("expected missing unit");
        assert!(error.to_string().contains("bad request"));

        let error = normalize_unit(Some("   ".to_string())).expect_err("expected blank unit");
        assert!(error.to_string().contains("bad request"));
    }

    #[test]
    fn accepts_systemd_escaped_instance_name() {
        let unit = normalize_unit(Some("app@my\\x2dsite.service".to_string())).expect("valid unit");
        assert_eq!(unit, "app@my\\x2dsite.service");
    }

    #[test]
    fn rejects_unit_that_looks_like_an_option() {
        let error = normalize_unit(Some("--help".to_string())).expect_err("expected invalid unit");
        assert!(error.to_string().contains("bad request"));
    }

    #[test]
    fn rejects_unit_with_disallowed_characters() {
        let error =
            normalize_unit(Some("sshd/service".to_string())).expect_err("expected invalid unit");
        assert!(error.to_string().contains("bad request"));
    }

    #[test]
    fn blank_priority_defaults_to_warning() {
        assert_eq!(normalize_priority(None).expect("default"), DEFAULT_LOG_PRIORITY);
        assert_eq!(
            normalize_priority(Some("  ".to_string())).expect("default"),
            DEFAULT_LOG_PRIORITY
        );
    }

    #[test]
    fn priority_is_trimmed_and_lowercased() {
        assert_eq!(normalize_priority(Some(" Err ".to_string())).expect("valid"), "err");
        assert_eq!(normalize_priority(Some("WARNING".to_string())).expect("valid"), "warning");
        assert_eq!(normalize_priority(Some("3".to_string())).expect("valid"), "3");
    }

    #[test]
    fn priority_ranges_are_accepted() {
        assert_eq!(
            normalize_priority(Some("Err..Warning".to_string())).expect("valid"),
            "err..warning"
        );
        assert_eq!(normalize_priority(Some("0..4".to_string())).expect("valid"), "0..4");
    }

    #[test]
    fn rejects_malformed_priority_range() {
        for raw in ["err..", "..warning", "err..loud", "err..warning..info"] {
            let error = normalize_priority(Some(raw.to_string())).expect_err("expected invalid");
            assert!(error.to_string().contains("bad request"), "{raw}");
        }
    }

    #[test]
    fn rejects_unknown_priority() {
        let error = normalize_priority(Some("loud".to_string())).expect_err("expected invalid");
        assert!(error.to_string().contains("bad request"));
    }
}
