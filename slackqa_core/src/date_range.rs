//! Date expressions in natural-language queries.
//!
//! Relative phrases are checked first, in table order, then explicit dates.
//! Everything is pure: the reference day is passed in by [`DateRangeExtractor::extract_at`].

use std::sync::OnceLock;

use chrono::{Datelike, Local, Months, NaiveDate};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// `(start, end)` as ISO calendar dates.
    #[must_use]
    pub fn to_iso(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relative {
    LastMonth,
    MonthBeforeLast,
    ThisMonth,
    NextMonth,
    Yesterday,
    Today,
    Tomorrow,
}

/// Phrase table; first match wins.
const RELATIVE_PHRASES: &[(&str, Relative)] = &[
    ("先月", Relative::LastMonth),
    ("先々月", Relative::MonthBeforeLast),
    ("今月", Relative::ThisMonth),
    ("来月", Relative::NextMonth),
    ("昨日", Relative::Yesterday),
    ("今日", Relative::Today),
    ("明日", Relative::Tomorrow),
    ("month before last", Relative::MonthBeforeLast),
    ("last month", Relative::LastMonth),
    ("this month", Relative::ThisMonth),
    ("next month", Relative::NextMonth),
    ("yesterday", Relative::Yesterday),
    ("today", Relative::Today),
    ("tomorrow", Relative::Tomorrow),
];

static JAPANESE_DATE: OnceLock<Regex> = OnceLock::new();
static NUMERIC_DATE: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn japanese_date() -> &'static Regex {
    JAPANESE_DATE.get_or_init(|| {
        Regex::new(r"(?:(\d{4})年)?(\d{1,2})月(\d{1,2})日")
            .expect("Static regex pattern is guaranteed to be valid")
    })
}

#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn numeric_date() -> &'static Regex {
    NUMERIC_DATE.get_or_init(|| {
        Regex::new(r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})")
            .expect("Static regex pattern is guaranteed to be valid")
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateRangeExtractor;

impl DateRangeExtractor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Extract relative to the local calendar day.
    #[must_use]
    pub fn extract(&self, query: &str) -> Option<DateRange> {
        self.extract_at(query, Local::now().date_naive())
    }

    /// Extract relative to `today`. Invalid calendar dates yield `None`.
    #[must_use]
    pub fn extract_at(&self, query: &str, today: NaiveDate) -> Option<DateRange> {
        let lower = query.to_lowercase();
        if let Some((_, relative)) = RELATIVE_PHRASES
            .iter()
            .find(|(phrase, _)| lower.contains(phrase))
        {
            return resolve_relative(*relative, today);
        }

        if let Some(caps) = japanese_date().captures(query) {
            let year = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<i32>().ok())
                .unwrap_or_else(|| today.year());
            return ymd(year, caps.get(2)?.as_str(), caps.get(3)?.as_str());
        }

        if let Some(caps) = numeric_date().captures(query) {
            let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
            return ymd(year, caps.get(2)?.as_str(), caps.get(3)?.as_str());
        }

        None
    }
}

fn ymd(year: i32, month: &str, day: &str) -> Option<DateRange> {
    let month = month.parse::<u32>().ok()?;
    let day = day.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(DateRange::single)
}

fn resolve_relative(relative: Relative, today: NaiveDate) -> Option<DateRange> {
    let this_month = today.with_day(1)?;
    match relative {
        Relative::Yesterday => today.pred_opt().map(DateRange::single),
        Relative::Today => Some(DateRange::single(today)),
        Relative::Tomorrow => today.succ_opt().map(DateRange::single),
        Relative::ThisMonth => month_span(this_month),
        Relative::LastMonth => month_span(this_month.checked_sub_months(Months::new(1))?),
        Relative::MonthBeforeLast => month_span(this_month.checked_sub_months(Months::new(2))?),
        Relative::NextMonth => month_span(this_month.checked_add_months(Months::new(1))?),
    }
}

/// First to last day of the month starting at `first`.
fn month_span(first: NaiveDate) -> Option<DateRange> {
    let end = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some(DateRange { start: first, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn iso(range: Option<DateRange>) -> Option<(String, String)> {
        range.map(|r| r.to_iso())
    }

    #[test]
    fn today_uses_reference_day() {
        let extractor = DateRangeExtractor::new();
        let today = day(2024, 5, 15);
        assert_eq!(
            iso(extractor.extract_at("今日の会議", today)),
            Some(("2024-05-15".to_string(), "2024-05-15".to_string()))
        );
    }

    #[test]
    fn today_without_reference_matches_local_clock() {
        let today = Local::now().date_naive();
        let range = DateRangeExtractor::new().extract("今日");
        assert_eq!(range, Some(DateRange::single(today)));
    }

    #[test]
    fn explicit_japanese_date() {
        let extractor = DateRangeExtractor::new();
        assert_eq!(
            iso(extractor.extract_at("2024年3月1日の議事録", day(2025, 1, 1))),
            Some(("2024-03-01".to_string(), "2024-03-01".to_string()))
        );
    }

    #[test]
    fn missing_year_defaults_to_current_year() {
        let extractor = DateRangeExtractor::new();
        assert_eq!(
            extractor.extract_at("8月27日の予定", day(2023, 1, 10)),
            Some(DateRange::single(day(2023, 8, 27)))
        );
    }

    #[test]
    fn invalid_calendar_date_is_none() {
        let extractor = DateRangeExtractor::new();
        assert_eq!(extractor.extract_at("2月30日", day(2024, 6, 1)), None);
        assert_eq!(extractor.extract_at("4月31日", day(2024, 6, 1)), None);
    }

    #[test]
    fn no_date_is_none() {
        assert_eq!(DateRangeExtractor::new().extract_at("会議はどこ？", day(2024, 6, 1)), None);
    }

    #[test]
    fn month_ranges() {
        let extractor = DateRangeExtractor::new();
        let today = day(2024, 3, 15);
        assert_eq!(
            extractor.extract_at("先月の売上", today),
            Some(DateRange { start: day(2024, 2, 1), end: day(2024, 2, 29) })
        );
        assert_eq!(
            extractor.extract_at("先々月の売上", today),
            Some(DateRange { start: day(2024, 1, 1), end: day(2024, 1, 31) })
        );
        assert_eq!(
            extractor.extract_at("今月", today),
            Some(DateRange { start: day(2024, 3, 1), end: day(2024, 3, 31) })
        );
        assert_eq!(
            extractor.extract_at("来月", today),
            Some(DateRange { start: day(2024, 4, 1), end: day(2024, 4, 30) })
        );
    }

    #[test]
    fn year_boundaries() {
        let extractor = DateRangeExtractor::new();
        assert_eq!(
            extractor.extract_at("来月", day(2024, 12, 5)),
            Some(DateRange { start: day(2025, 1, 1), end: day(2025, 1, 31) })
        );
        assert_eq!(
            extractor.extract_at("先月", day(2024, 1, 5)),
            Some(DateRange { start: day(2023, 12, 1), end: day(2023, 12, 31) })
        );
        assert_eq!(
            extractor.extract_at("昨日", day(2024, 1, 1)),
            Some(DateRange::single(day(2023, 12, 31)))
        );
    }

    #[test]
    fn relative_phrase_beats_explicit_date() {
        let extractor = DateRangeExtractor::new();
        assert_eq!(
            extractor.extract_at("明日と3月1日", day(2024, 6, 1)),
            Some(DateRange::single(day(2024, 6, 2)))
        );
    }

    #[test]
    fn english_and_numeric_forms() {
        let extractor = DateRangeExtractor::new();
        let today = day(2024, 3, 15);
        assert_eq!(
            extractor.extract_at("What happened yesterday?", today),
            Some(DateRange::single(day(2024, 3, 14)))
        );
        assert_eq!(
            extractor.extract_at("sales the month before last", today),
            Some(DateRange { start: day(2024, 1, 1), end: day(2024, 1, 31) })
        );
        assert_eq!(
            extractor.extract_at("release on 2024/3/1", today),
            Some(DateRange::single(day(2024, 3, 1)))
        );
    }
}
