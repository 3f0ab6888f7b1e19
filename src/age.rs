use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{4})-(\d{1,2})-(\d{1,2})").expect("valid date regex"));

/// Parses a stored birth date. Accepts `YYYY-MM-DD`, RFC 3339 date-times and
/// naive `YYYY-MM-DDTHH:MM:SS`; anything else is unresolvable.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    let caps = DATE_PREFIX_RE.captures(raw)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whole years elapsed between `birth` and `today`.
///
/// Returns `None` for dates in the future.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

pub fn age_from_str(raw: Option<&str>, today: NaiveDate) -> Option<u32> {
    raw.and_then(parse_birth_date)
        .and_then(|birth| age_on(birth, today))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn birthday_not_yet_reached_counts_one_less() {
        let today = date(2024, 6, 15);
        assert_eq!(age_on(date(1990, 6, 16), today), Some(33));
        assert_eq!(age_on(date(1990, 6, 15), today), Some(34));
        assert_eq!(age_on(date(1990, 7, 1), today), Some(33));
        assert_eq!(age_on(date(1990, 1, 31), today), Some(34));
    }

    #[test]
    fn leap_day_birthdays() {
        assert_eq!(age_on(date(2000, 2, 29), date(2023, 2, 28)), Some(22));
        assert_eq!(age_on(date(2000, 2, 29), date(2023, 3, 1)), Some(23));
    }

    #[test]
    fn future_dates_have_no_age() {
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), None);
    }

    #[test]
    fn parses_stored_formats() {
        assert_eq!(parse_birth_date("1985-03-09"), Some(date(1985, 3, 9)));
        assert_eq!(
            parse_birth_date("1985-03-09T00:00:00.000Z"),
            Some(date(1985, 3, 9))
        );
        assert_eq!(parse_birth_date("1985-03-09T10:30:00"), Some(date(1985, 3, 9)));
        assert_eq!(parse_birth_date("1985-3-9 extra"), Some(date(1985, 3, 9)));
        assert_eq!(parse_birth_date(""), None);
        assert_eq!(parse_birth_date("ayer"), None);
        assert_eq!(parse_birth_date("1985-02-31"), None);
    }

    #[test]
    fn absent_or_invalid_birth_date_gives_no_age() {
        let today = date(2024, 1, 1);
        assert_eq!(age_from_str(None, today), None);
        assert_eq!(age_from_str(Some("n/a"), today), None);
        assert_eq!(age_from_str(Some("2000-01-01"), today), Some(24));
    }
}
