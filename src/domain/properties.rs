//! Parsing of `systemctl show` property blocks
//!
//! The tool prints one `Key=Value` pair per line with no schema guarantees, so
//! every property is treated as optional and malformed lines are dropped.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};

/// Case-insensitive `KEY=VALUE` mapping. The last occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: HashMap<String, String>,
}

impl PropertyMap {
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();

        for line in text.split('\n').map(str::trim) {
            if line.is_empty() {
                continue;
            }

            let Some(index) = line.find('=') else {
                continue;
            };
            if index == 0 {
                continue;
            }

            let key = line[..index].trim().to_ascii_lowercase();
            let value = line[index + 1..].trim().to_string();
            entries.insert(key, value);
        }

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Value for `key`, with missing and blank values both mapped to `None`.
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const OFFSET_FORMATS: [&str; 4] = [
    "%a %Y-%m-%d %H:%M:%S%.f %z",
    "%a %Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S %z",
];

const NAIVE_FORMATS: [&str; 6] = [
    "%a %Y-%m-%d %H:%M:%S%.f",
    "%a %Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Best-effort parse of a systemd timestamp such as `Sat 2026-02-07 20:53:28 MST`.
///
/// Offset-bearing forms are tried first. Otherwise any trailing zone word is
/// dropped and the wall-clock time is read in the host's local zone, which can
/// misplace the offset for uncommon abbreviations. Blank input and `n/a` yield
/// `None`.
pub fn parse_systemd_timestamp(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == "n/a" {
        return None;
    }

    parse_with_offset(raw).or_else(|| parse_without_offset(raw))
}

fn parse_with_offset(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }

    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(parsed);
    }

    let (head, zone) = raw.rsplit_once(' ')?;
    if matches!(zone, "UTC" | "GMT" | "Z") {
        return parse_naive(head).map(|naive| naive.and_utc().fixed_offset());
    }

    None
}

fn parse_without_offset(raw: &str) -> Option<DateTime<FixedOffset>> {
    let naive = parse_naive(raw)
        .or_else(|| raw.rsplit_once(' ').and_then(|(head, _zone)| parse_naive(head)))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.fixed_offset())
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{parse_systemd_timestamp, PropertyMap};

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .expect("valid date")
    }

    #[test]
    fn skips_blank_and_malformed_lines() {
        let map = PropertyMap::parse("=value\nFOO=bar\n\n");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("FOO"), Some("bar"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let map = PropertyMap::parse("ActiveState=active\n");

        assert_eq!(map.get("ActiveState"), Some("active"));
        assert_eq!(map.get("activestate"), Some("active"));
        assert_eq!(map.get("ACTIVESTATE"), Some("active"));
    }

    #[test]
    fn splits_on_first_equals_and_trims() {
        let map = PropertyMap::parse("  ExecStart = /bin/app --flag=1  \r\nno equals here\n");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("ExecStart"), Some("/bin/app --flag=1"));
    }

    #[test]
    fn last_duplicate_wins_across_case() {
        let map = PropertyMap::parse("Result=success\nresult=exit-code\n");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Result"), Some("exit-code"));
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = "Id=app.service\nActiveState=active\nSubState=running\nNRestarts=0\n";

        assert_eq!(PropertyMap::parse(text), PropertyMap::parse(text));
    }

    #[test]
    fn non_blank_maps_empty_values_to_none() {
        let map = PropertyMap::parse("Result=\nMainPID=42\n");

        assert_eq!(map.get("Result"), Some(""));
        assert_eq!(map.non_blank("Result"), None);
        assert_eq!(map.non_blank("MainPID"), Some("42"));
        assert_eq!(map.non_blank("Missing"), None);
    }

    #[test]
    fn timestamp_sentinels_are_none() {
        assert!(parse_systemd_timestamp(None).is_none());
        assert!(parse_systemd_timestamp(Some("")).is_none());
        assert!(parse_systemd_timestamp(Some("   ")).is_none());
        assert!(parse_systemd_timestamp(Some("n/a")).is_none());
        assert!(parse_systemd_timestamp(Some("not a date")).is_none());
    }

    #[test]
    fn parses_utc_zone_word() {
        let parsed =
            parse_systemd_timestamp(Some("Sat 2026-02-07 20:53:28 UTC")).expect("timestamp");

        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert_eq!(parsed.naive_utc(), naive(2026, 2, 7, 20, 53, 28));
    }

    #[test]
    fn parses_numeric_offset() {
        let parsed =
            parse_systemd_timestamp(Some("Sat 2026-02-07 20:53:28 -0700")).expect("timestamp");

        assert_eq!(parsed.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(parsed.naive_utc(), naive(2026, 2, 8, 3, 53, 28));
    }

    #[test]
    fn parses_rfc3339() {
        let parsed = parse_systemd_timestamp(Some("2026-02-08T03:54:36.272567Z")).expect("timestamp");

        assert_eq!(parsed.naive_utc().date(), NaiveDate::from_ymd_opt(2026, 2, 8).expect("date"));
    }

    #[test]
    fn unknown_zone_abbreviation_falls_back_to_local_wall_clock() {
        let parsed =
            parse_systemd_timestamp(Some("Sat 2026-02-07 20:53:28 MST")).expect("timestamp");

        assert_eq!(parsed.naive_local(), naive(2026, 2, 7, 20, 53, 28));
    }
}
