use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::LedgerError;

/// Canonical calendar-date format used across the ledger.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Parses a `YYYY-MM-DD` date, rejecting anything that is not a real calendar day.
pub fn parse_date(raw: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| LedgerError::Validation(format!("invalid date `{}` (expected YYYY-MM-DD)", raw)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Rejects amounts that are zero or negative.
pub fn ensure_positive(field: &str, amount: i64) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::Validation(format!(
            "{} must be positive (got {})",
            field, amount
        )));
    }
    Ok(())
}

pub fn ensure_not_blank(field: &str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(LedgerError::Validation(format!(
                "invalid month {:04}-{:02}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
            Some(first_next) => first_next - Duration::days(1),
            None => NaiveDate::MAX,
        }
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Every calendar day of the month in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        (0..self.days_in_month()).map(move |offset| first + Duration::days(offset as i64))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = LedgerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::Validation(format!("invalid month `{}` (expected YYYY-MM)", raw));
        let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Month::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parses_and_counts_days() {
        let feb: Month = "2024-02".parse().unwrap();
        assert_eq!(feb.days_in_month(), 29);
        let feb: Month = "2023-02".parse().unwrap();
        assert_eq!(feb.days_in_month(), 28);
        let dec: Month = "2024-12".parse().unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(dec.to_string(), "2024-12");
    }

    #[test]
    fn month_rejects_malformed_input() {
        for raw in ["2024-13", "2024-1", "24-01", "2024/01", "abcd-ef", ""] {
            assert!(raw.parse::<Month>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn parse_date_requires_real_calendar_day() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("01/06/2024").is_err());
    }
}
