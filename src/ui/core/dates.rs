use chrono::{Duration, Local, NaiveDate};

pub const DEFAULT_WINDOW_DAYS: i64 = 30;
pub const INVALID_RANGE_MESSAGE: &str =
    "Error: Select valid dates (not in the future and start <= end)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The 30 days ending today.
    pub fn default_window() -> Self {
        let end = today();
        Self {
            start: end - Duration::days(DEFAULT_WINDOW_DAYS),
            end,
        }
    }

    /// Parses and validates a pair of `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if !validate(start, end) {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Reads the calendar date at the head of a payload date or timestamp
/// (`2024-01-31`, `2024-01-31 12:00:00`, `2024-01-31T12:00:00Z`).
pub fn leading_date(text: &str) -> Option<NaiveDate> {
    text.get(..10).and_then(parse_date)
}

pub fn validate(start: NaiveDate, end: NaiveDate) -> bool {
    validate_at(start, end, today())
}

pub fn validate_at(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> bool {
    if start > today || end > today {
        log::debug!("Rejected range {} .. {}: dates cannot be in the future", start, end);
        return false;
    }
    if start > end {
        log::debug!("Rejected range {} .. {}: start is after end", start, end);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn future_end_is_rejected() {
        let today = date("2024-06-15");
        assert!(!validate_at(date("2024-06-01"), date("2024-06-16"), today));
        assert!(!validate_at(date("2024-06-16"), date("2024-06-20"), today));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let today = date("2024-06-15");
        assert!(!validate_at(date("2024-06-10"), date("2024-06-01"), today));
    }

    #[test]
    fn ranges_up_to_today_are_accepted() {
        let today = date("2024-06-15");
        assert!(validate_at(date("2024-06-01"), date("2024-06-15"), today));
        assert!(validate_at(date("2024-06-15"), date("2024-06-15"), today));
        assert!(validate_at(date("2020-01-01"), date("2021-01-01"), today));
    }

    #[test]
    fn default_window_spans_thirty_days() {
        let range = DateRange::default_window();
        assert_eq!((range.end - range.start).num_days(), DEFAULT_WINDOW_DAYS);
        assert!(validate(range.start, range.end));
    }

    #[test]
    fn parse_rejects_garbage_and_future() {
        assert!(DateRange::parse("2024-01-01", "not a date").is_none());
        assert!(DateRange::parse("2024-01-31", "2024-01-01").is_none());
        let far = (today() + Duration::days(3)).format("%Y-%m-%d").to_string();
        assert!(DateRange::parse("2024-01-01", &far).is_none());
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.start_iso(), "2024-01-01");
        assert_eq!(range.end_iso(), "2024-01-31");
    }

    #[test]
    fn leading_date_reads_timestamps() {
        assert_eq!(leading_date("2024-01-31 12:00:00"), Some(date("2024-01-31")));
        assert_eq!(leading_date("2024-01-31T00:00:00Z"), Some(date("2024-01-31")));
        assert_eq!(leading_date("2024"), None);
    }
}
