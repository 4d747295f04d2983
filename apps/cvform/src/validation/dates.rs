use chrono::{Datelike, Local, NaiveDate};

/// Date format produced by HTML date inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for every age and expiry rule.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the machine running the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Pinned date, for tests and reproducible document runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Whole years between `birth` and `today`, borrowing one year when the birthday
/// has not yet come round in `today`'s year.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    let before_birthday = today.month() < birth.month()
        || (today.month() == birth.month() && today.day() < birth.day());
    if before_birthday {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_day_before_birthday_borrows() {
        assert_eq!(age_on(date(2000, 3, 15), date(2024, 3, 14)), 23);
    }

    #[test]
    fn test_age_on_birthday_counts_full_year() {
        assert_eq!(age_on(date(2000, 3, 15), date(2024, 3, 15)), 24);
    }

    #[test]
    fn test_age_earlier_month_borrows() {
        assert_eq!(age_on(date(2000, 12, 1), date(2024, 11, 30)), 23);
        assert_eq!(age_on(date(2000, 1, 31), date(2024, 2, 1)), 24);
    }

    #[test]
    fn test_age_leap_day_birth() {
        assert_eq!(age_on(date(2004, 2, 29), date(2023, 2, 28)), 18);
        assert_eq!(age_on(date(2004, 2, 29), date(2023, 3, 1)), 19);
    }

    #[test]
    fn test_parse_date_accepts_iso_only() {
        assert_eq!(parse_date(" 2024-03-15 "), Some(date(2024, 3, 15)));
        assert_eq!(parse_date("15/03/2024"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn test_fixed_clock_returns_pinned_date() {
        assert_eq!(FixedClock(date(2026, 1, 2)).today(), date(2026, 1, 2));
    }
}
