//! HL7 `TS`-shaped (`yyyyMMdd[HHmmss[.S...]]`) date/datetime reformatting
//! into ISO 8601, shared by every crate that needs it so there is exactly
//! one calendar-aware implementation in the workspace.

use chrono::{NaiveDate, NaiveDateTime};

/// Reformats `yyyyMMdd` or `yyyyMMddHHmmss[.S...]` into `yyyy-MM-dd` or
/// `yyyy-MM-ddTHH:mm:ss[.S...]`. Returns `None` for anything that isn't a
/// valid calendar date, including lexically digit-shaped input like
/// `"19801399"`.
pub fn reformat_hl7_datetime(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let (digits, fraction) = match raw.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (raw, None),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    match digits.len() {
        8 => NaiveDate::parse_from_str(digits, "%Y%m%d")
            .ok()
            .map(|date| date.format("%Y-%m-%d").to_string()),
        14 => {
            let datetime = NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S").ok()?;
            let base = datetime.format("%Y-%m-%dT%H:%M:%S").to_string();
            match fraction {
                Some(f) if !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()) => {
                    Some(format!("{base}.{f}"))
                }
                _ => Some(base),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reformats_date_only() {
        assert_eq!(reformat_hl7_datetime("19800202"), Some("1980-02-02".to_string()));
    }

    #[test]
    fn reformats_datetime() {
        assert_eq!(
            reformat_hl7_datetime("20120912011230"),
            Some("2012-09-12T01:12:30".to_string())
        );
    }

    #[test]
    fn preserves_fractional_seconds() {
        assert_eq!(
            reformat_hl7_datetime("20120912011230.5"),
            Some("2012-09-12T01:12:30.5".to_string())
        );
    }

    #[test]
    fn rejects_invalid_calendar_date() {
        assert_eq!(reformat_hl7_datetime("19801399"), None);
    }

    #[test]
    fn rejects_non_digit_input() {
        assert_eq!(reformat_hl7_datetime("not-a-date"), None);
    }
}
