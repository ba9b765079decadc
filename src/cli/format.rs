//! Display helpers shared by the command handlers.

use chrono::NaiveDate;
use pocket_core::DueState;
use rust_decimal::Decimal;
use uuid::Uuid;

const SHORT_ID_LEN: usize = 8;

/// The first characters of an id; enough to address a record in most ledgers.
pub fn short_id(id: Uuid) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

pub fn money(amount: Decimal, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

pub fn amount(amount: Decimal) -> String {
    format!("{amount:.2}")
}

pub fn date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn optional_date(value: Option<NaiveDate>) -> String {
    value.map(date).unwrap_or_else(|| "-".into())
}

pub fn state(state: DueState) -> String {
    state.label().to_string()
}

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_show_two_decimals() {
        assert_eq!(money(Decimal::new(1200, 0), "USD"), "1200.00 USD");
        assert_eq!(amount(Decimal::new(-505, 1)), "-50.50");
    }

    #[test]
    fn short_ids_are_prefixes() {
        let id = Uuid::new_v4();
        assert!(id.to_string().starts_with(&short_id(id)));
        assert_eq!(short_id(id).len(), 8);
    }
}
