//! Shared traits, calendar helpers, and value types for ledger records.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Number of decimal places every monetary value is stored with.
pub const MONEY_SCALE: u32 = 2;

/// Exposes a stable identifier for records stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Supplies a common contract for retrieving monetary amounts.
pub trait Amounted {
    fn amount(&self) -> Decimal;
}

/// A record that carries a date and can be marked as done.
///
/// Income is done once confirmed, an expense once paid, and a due item once
/// its status is paid.
pub trait Completable {
    fn scheduled_on(&self) -> Option<NaiveDate>;
    fn is_completed(&self) -> bool;
}

/// Converts a record into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Rounds a monetary value to the ledger's fixed scale.
pub fn money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_SCALE)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthError {
    #[error("month must be between 1 and 12, got {0}")]
    OutOfRange(u32),
    #[error("expected YYYY-MM, got `{0}`")]
    Malformed(String),
}

/// A calendar month, used as the unit of aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if !(1..=12).contains(&month) {
            return Err(MonthError::OutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
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
        self.first_day() + Duration::days(i64::from(self.num_days()) - 1)
    }

    pub fn num_days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// Iterates every calendar day of the month in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        (0..self.num_days()).map(move |offset| first + Duration::days(i64::from(offset)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Moves the month forward (positive) or backward (negative).
    pub fn shift(&self, months: i32) -> Self {
        let index = self.index() + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Clamps the month into `[low, high]`.
    pub fn clamp_to(self, low: YearMonth, high: YearMonth) -> Self {
        if self < low {
            low
        } else if self > high {
            high
        } else {
            self
        }
    }

    fn index(&self) -> i32 {
        self.year * 12 + self.month as i32 - 1
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthError::Malformed(trimmed.to_string()))?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(MonthError::Malformed(trimmed.to_string()));
        }
        let year: i32 = year
            .parse()
            .map_err(|_| MonthError::Malformed(trimmed.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthError::Malformed(trimmed.to_string()))?;
        YearMonth::new(year, month)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| (first_next - Duration::days(1)).day())
        .unwrap_or(28)
}

/// Declares a closed set of string-coded choices.
///
/// Each generated enum serializes to its snake_case code, parses from the code
/// (case-insensitive), and exposes a human label.
#[macro_export]
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident {
            $($variant:ident => ($code:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(&self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.code())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::common::ChoiceError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let needle = value.trim().to_ascii_lowercase();
                match needle.as_str() {
                    $($code => Ok($name::$variant),)+
                    _ => Err($crate::common::ChoiceError {
                        kind: stringify!($name),
                        value: value.trim().to_string(),
                        allowed: vec![$($code),+],
                    }),
                }
            }
        }
    };
}

/// Raised when a string does not name one of an enum's choices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}` (expected one of: {})", allowed.join(", "))]
pub struct ChoiceError {
    pub kind: &'static str,
    pub value: String,
    pub allowed: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_months() {
        let month: YearMonth = "2024-03".parse().expect("valid month");
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2024-03");
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("March".parse::<YearMonth>().is_err());
    }

    #[test]
    fn month_bounds_respect_leap_years() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.num_days(), 29);
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(feb.days().count(), 29);
        assert_eq!(YearMonth::new(2023, 2).unwrap().num_days(), 28);
    }

    #[test]
    fn shift_crosses_year_boundaries() {
        let jan = YearMonth::new(2024, 1).unwrap();
        assert_eq!(jan.shift(-1), YearMonth::new(2023, 12).unwrap());
        assert_eq!(jan.shift(24), YearMonth::new(2026, 1).unwrap());
        assert_eq!(jan.shift(-25), YearMonth::new(2021, 12).unwrap());
    }
}
