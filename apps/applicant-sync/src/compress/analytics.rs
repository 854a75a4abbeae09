//! Derived experience signals: total years worked and tier-1 employer history.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::applicant::{ExperienceFields, Scalar};
use crate::models::record::Row;

/// Employer tokens matched as substrings of the lowercased company name.
/// Substring matching is loose on purpose: "metadata corp" matches "meta".
pub const TIER1_COMPANIES: &[&str] = &[
    "google",
    "alphabet",
    "meta",
    "facebook",
    "openai",
    "apple",
    "amazon",
    "aws",
    "microsoft",
    "netflix",
    "stripe",
    "airbnb",
    "uber",
    "lyft",
    "databricks",
    "nvidia",
    "tesla",
    "doordash",
    "snowflake",
];

const DAYS_PER_YEAR: f64 = 365.25;

type DateStrategy = fn(&str) -> Option<NaiveDate>;

/// Text formats tried in order against the first ten characters. First success wins.
const DATE_STRATEGIES: &[(&str, DateStrategy)] = &[
    ("YYYY-MM-DD", parse_full_date),
    ("YYYY-MM", parse_year_month),
    ("YYYY", parse_year),
];

fn parse_full_date(raw: &str) -> Option<NaiveDate> {
    four_digit_year(raw)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn parse_year_month(raw: &str) -> Option<NaiveDate> {
    four_digit_year(raw)?;
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()
}

fn parse_year(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 4 {
        return None;
    }
    NaiveDate::from_ymd_opt(four_digit_year(raw)?, 1, 1)
}

/// Years are exactly four digits, followed by `-` or nothing.
fn four_digit_year(raw: &str) -> Option<i32> {
    let year = raw.get(..4)?;
    let terminated = matches!(raw.as_bytes().get(4), None | Some(b'-'));
    if !terminated || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

/// Parses a work-history date cell.
///
/// Numbers are epoch seconds. Text is truncated to ten characters and run
/// through `DATE_STRATEGIES`. Empty, zero, and unparseable values give `None`.
pub fn parse_flexible_date(value: &Scalar) -> Option<NaiveDateTime> {
    match value {
        Scalar::Number(n) => {
            let secs = n.as_f64().filter(|s| s.is_finite() && *s != 0.0)?;
            let whole = secs.floor();
            let nanos = ((secs - whole) * 1e9) as u32;
            DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.naive_utc())
        }
        Scalar::Text(text) => {
            if text.is_empty() {
                return None;
            }
            let head: String = text.chars().take(10).collect();
            DATE_STRATEGIES
                .iter()
                .find_map(|(_, parse)| parse(&head))
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        }
        Scalar::Other(_) => None,
    }
}

/// Sums the positive day spans of every entry and converts them to years,
/// rounded to two decimals. Entries without a parseable start contribute zero;
/// a missing or unparseable end means `now`.
pub fn total_years_experience(rows: &[Row<ExperienceFields>], now: NaiveDateTime) -> f64 {
    let total_days: i64 = rows
        .iter()
        .filter_map(|row| {
            let start = row.fields.start.as_ref().and_then(parse_flexible_date)?;
            let end = row
                .fields
                .end
                .as_ref()
                .and_then(parse_flexible_date)
                .unwrap_or(now);
            let days = (end - start).num_days();
            (days > 0).then_some(days)
        })
        .sum();

    round2(total_days as f64 / DAYS_PER_YEAR)
}

/// True when any company name contains one of `TIER1_COMPANIES`.
pub fn worked_at_tier1(rows: &[Row<ExperienceFields>]) -> bool {
    rows.iter().any(|row| {
        let company = row
            .fields
            .company
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        !company.is_empty() && TIER1_COMPANIES.iter().any(|token| company.contains(token))
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> Scalar {
        Scalar::Text(s.to_string())
    }

    fn row(company: &str, start: Option<Scalar>, end: Option<Scalar>) -> Row<ExperienceFields> {
        Row {
            id: "w".to_string(),
            fields: ExperienceFields {
                company: Some(company.to_string()),
                title: Some("Engineer".to_string()),
                start,
                end,
            },
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_full_date() {
        assert_eq!(parse_flexible_date(&text("2020-03-15")), Some(date(2020, 3, 15)));
    }

    #[test]
    fn test_parse_truncates_timestamps() {
        assert_eq!(
            parse_flexible_date(&text("2020-03-15T08:30:00.000Z")),
            Some(date(2020, 3, 15))
        );
    }

    #[test]
    fn test_parse_year_month_and_year() {
        assert_eq!(parse_flexible_date(&text("2019-07")), Some(date(2019, 7, 1)));
        assert_eq!(parse_flexible_date(&text("2017")), Some(date(2017, 1, 1)));
    }

    #[test]
    fn test_parse_epoch_seconds() {
        let value: Scalar = serde_json::from_value(json!(1577836800)).unwrap();
        assert_eq!(parse_flexible_date(&value), Some(date(2020, 1, 1)));
    }

    #[test]
    fn test_parse_rejects_garbage_and_empty() {
        assert_eq!(parse_flexible_date(&text("N/A")), None);
        assert_eq!(parse_flexible_date(&text("")), None);
        assert_eq!(parse_flexible_date(&text("20201")), None);
        let zero: Scalar = serde_json::from_value(json!(0)).unwrap();
        assert_eq!(parse_flexible_date(&zero), None);
        assert_eq!(parse_flexible_date(&Scalar::Other(json!(true))), None);
    }

    #[test]
    fn test_four_year_span() {
        let rows = [row("Acme", Some(text("2020-01-01")), Some(text("2024-01-01")))];
        assert_eq!(total_years_experience(&rows, now()), 4.0);
    }

    #[test]
    fn test_malformed_start_contributes_zero() {
        let rows = [
            row("Acme", Some(text("N/A")), Some(text("2024-01-01"))),
            row("Acme", None, None),
        ];
        assert_eq!(total_years_experience(&rows, now()), 0.0);
    }

    #[test]
    fn test_missing_end_defaults_to_now() {
        let rows = [row("Acme", Some(text("2023-01-01")), None)];
        assert_eq!(total_years_experience(&rows, now()), 2.0);
    }

    #[test]
    fn test_unparseable_end_defaults_to_now() {
        let rows = [row("Acme", Some(text("2023-01-01")), Some(text("present")))];
        assert_eq!(total_years_experience(&rows, now()), 2.0);
    }

    #[test]
    fn test_negative_spans_excluded() {
        let rows = [
            row("Acme", Some(text("2024-01-01")), Some(text("2020-01-01"))),
            row("Beta", Some(text("2022-01-01")), Some(text("2023-01-01"))),
        ];
        assert_eq!(total_years_experience(&rows, now()), 1.0);
    }

    #[test]
    fn test_spans_are_summed_and_rounded() {
        let rows = [
            row("Acme", Some(text("2020-01-01")), Some(text("2020-07-01"))),
            row("Beta", Some(text("2021-01-01")), Some(text("2021-04-01"))),
        ];
        // 182 + 90 days
        assert_eq!(total_years_experience(&rows, now()), 0.74);
    }

    #[test]
    fn test_tier1_substring_match() {
        assert!(worked_at_tier1(&[row("  Google LLC ", None, None)]));
        assert!(worked_at_tier1(&[row("Amazon Web Services", None, None)]));
        assert!(!worked_at_tier1(&[row("Acme", None, None)]));
    }

    #[test]
    fn test_tier1_is_loose_on_superstrings() {
        assert!(worked_at_tier1(&[row("Metadata Corp", None, None)]));
        assert!(worked_at_tier1(&[row("Pineapple Farms", None, None)]));
    }

    #[test]
    fn test_tier1_ignores_missing_company() {
        let mut blank = row("", None, None);
        blank.fields.company = None;
        assert!(!worked_at_tier1(&[blank]));
    }
}
