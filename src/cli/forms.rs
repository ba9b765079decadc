//! `key=value` argument forms used by the add and edit commands.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::errors::CommandError;

/// Value that clears an optional field on edit.
pub const CLEAR: &str = "-";

/// Parsed `key=value` pairs. Every accessor consumes its key so that
/// [`Form::finish`] can reject keys nothing asked for.
#[derive(Debug, Default)]
pub struct Form {
    values: BTreeMap<String, String>,
    today: Option<NaiveDate>,
}

impl Form {
    pub fn parse(args: &[&str], today: NaiveDate) -> Result<Self, CommandError> {
        let mut values = BTreeMap::new();
        for arg in args {
            let (key, value) = arg.split_once('=').ok_or_else(|| {
                CommandError::InvalidArguments(format!("expected key=value, got `{arg}`"))
            })?;
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                return Err(CommandError::InvalidArguments(format!(
                    "missing field name in `{arg}`"
                )));
            }
            if values.insert(key.clone(), value.trim().to_string()).is_some() {
                return Err(CommandError::InvalidArguments(format!(
                    "field `{key}` given more than once"
                )));
            }
        }
        Ok(Self {
            values,
            today: Some(today),
        })
    }

    pub fn text(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn required_text(&mut self, key: &str) -> Result<String, CommandError> {
        self.text(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CommandError::InvalidArguments(format!("`{key}` is required")))
    }

    pub fn decimal(&mut self, key: &str) -> Result<Option<Decimal>, CommandError> {
        self.parsed(key, |raw| Decimal::from_str(raw).map(pocket_domain::money))
    }

    pub fn required_decimal(&mut self, key: &str) -> Result<Decimal, CommandError> {
        self.decimal(key)?
            .ok_or_else(|| CommandError::InvalidArguments(format!("`{key}` is required")))
    }

    /// Accepts `YYYY-MM-DD`, `today`, `tomorrow` or `yesterday`.
    pub fn date(&mut self, key: &str) -> Result<Option<NaiveDate>, CommandError> {
        let today = self.today;
        self.parsed(key, |raw| parse_date(raw, today))
    }

    pub fn required_date(&mut self, key: &str) -> Result<NaiveDate, CommandError> {
        self.date(key)?
            .ok_or_else(|| CommandError::InvalidArguments(format!("`{key}` is required")))
    }

    pub fn choice<T>(&mut self, key: &str) -> Result<Option<T>, CommandError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.parsed(key, T::from_str)
    }

    pub fn flag(&mut self, key: &str) -> Result<Option<bool>, CommandError> {
        self.parsed(key, |raw| match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err("expected yes or no"),
        })
    }

    pub fn count(&mut self, key: &str) -> Result<Option<u32>, CommandError> {
        self.parsed(key, u32::from_str)
    }

    /// Reads an optional field that may be cleared with `-`.
    ///
    /// `None` means the key was absent, `Some(None)` that it was cleared.
    pub fn clearable<T, F, E>(&mut self, key: &str, parse: F) -> Result<Option<Option<T>>, CommandError>
    where
        F: FnOnce(&mut Self, &str) -> Result<Option<T>, E>,
        E: Into<CommandError>,
    {
        match self.values.get(key).map(String::as_str) {
            None => Ok(None),
            Some(CLEAR) | Some("") => {
                self.values.remove(key);
                Ok(Some(None))
            }
            Some(_) => parse(self, key).map(Some).map_err(Into::into),
        }
    }

    /// Fails when keys remain that no accessor consumed.
    pub fn finish(self, allowed: &[&str]) -> Result<(), CommandError> {
        if self.values.is_empty() {
            return Ok(());
        }
        let unknown: Vec<&str> = self.values.keys().map(String::as_str).collect();
        Err(CommandError::InvalidArguments(format!(
            "unknown field(s) {}; expected {}",
            unknown.join(", "),
            allowed.join(", ")
        )))
    }

    fn parsed<T, E, F>(&mut self, key: &str, parse: F) -> Result<Option<T>, CommandError>
    where
        E: Display,
        F: FnOnce(&str) -> Result<T, E>,
    {
        match self.values.remove(key) {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Err(CommandError::InvalidArguments(format!(
                "`{key}` cannot be empty"
            ))),
            Some(raw) => parse(&raw).map(Some).map_err(|err| {
                CommandError::InvalidArguments(format!("invalid {key} `{raw}`: {err}"))
            }),
        }
    }
}

fn parse_date(raw: &str, today: Option<NaiveDate>) -> Result<NaiveDate, String> {
    let relative = |offset: i64| {
        today
            .map(|today| today + Duration::days(offset))
            .ok_or_else(|| "relative dates need a current date".to_string())
    };
    match raw.to_ascii_lowercase().as_str() {
        "today" => relative(0),
        "tomorrow" => relative(1),
        "yesterday" => relative(-1),
        _ => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_domain::PaymentMethod;

    impl Form {
        fn is_empty(&self) -> bool {
            self.values.is_empty()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    #[test]
    fn parses_typed_fields() {
        let mut form = Form::parse(
            &["amount=12.341", "date=tomorrow", "method=Debit", "paid=yes"],
            today(),
        )
        .expect("form");
        assert_eq!(form.decimal("amount").unwrap(), Some(Decimal::new(1234, 2)));
        assert_eq!(
            form.date("date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 21)
        );
        assert_eq!(
            form.choice::<PaymentMethod>("method").unwrap(),
            Some(PaymentMethod::Debit)
        );
        assert_eq!(form.flag("paid").unwrap(), Some(true));
        assert!(form.finish(&[]).is_ok());
    }

    #[test]
    fn rejects_malformed_and_leftover_fields() {
        assert!(Form::parse(&["amount"], today()).is_err());
        assert!(Form::parse(&["a=1", "a=2"], today()).is_err());

        let mut form = Form::parse(&["amount=ten", "colour=red"], today()).unwrap();
        assert!(form.decimal("amount").is_err());
        let err = form.finish(&["amount"]).expect_err("leftover key");
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn clearable_fields_distinguish_absent_from_cleared() {
        let mut form = Form::parse(&["due_date=-", "next_payment=2024-04-01"], today()).unwrap();
        assert_eq!(form.clearable("due_date", Form::date).unwrap(), Some(None));
        assert_eq!(
            form.clearable("next_payment", Form::date).unwrap(),
            Some(NaiveDate::from_ymd_opt(2024, 4, 1))
        );
        assert_eq!(form.clearable("notes", Form::date).unwrap(), None);
        assert!(form.is_empty());
    }
}
