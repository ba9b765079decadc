//! Field-level validation shared by forms and CSV import.

use chrono::{Duration, NaiveDate};
use pocket_domain::{Debt, DueItem, Entity, Expense, Income};
use rust_decimal::Decimal;
use thiserror::Error;

pub const PAST_LIMIT_YEARS: i64 = 50;
pub const FUTURE_LIMIT_YEARS: i64 = 5;

/// Largest amount a record may carry: 15 digits, 2 of them decimals.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, 2);

/// A rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Records that can check their own fields against a reference day.
pub trait Validate {
    fn validate(&self, today: NaiveDate) -> Result<(), ValidationError>;
}

/// Accepts dates from 50 years back to 5 years ahead of `today`, in 365-day years.
pub fn validate_date(
    field: &'static str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    let earliest = today - Duration::days(365 * PAST_LIMIT_YEARS);
    let latest = today + Duration::days(365 * FUTURE_LIMIT_YEARS);
    if date < earliest || date > latest {
        return Err(ValidationError::new(
            field,
            format!("date {date} is outside {earliest}..={latest}"),
        ));
    }
    Ok(())
}

pub fn validate_positive(field: &'static str, amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::new(field, "amount must be greater than 0"));
    }
    validate_cap(field, amount)
}

pub fn validate_non_negative(field: &'static str, amount: Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::new(field, "amount must not be negative"));
    }
    validate_cap(field, amount)
}

fn validate_cap(field: &'static str, amount: Decimal) -> Result<(), ValidationError> {
    if amount > MAX_AMOUNT {
        return Err(ValidationError::new(
            field,
            format!("amount must not exceed {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

pub fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "value is required"));
    }
    Ok(())
}

impl Validate for Entity {
    fn validate(&self, _today: NaiveDate) -> Result<(), ValidationError> {
        validate_required("name", &self.name)
    }
}

impl Validate for Debt {
    fn validate(&self, _today: NaiveDate) -> Result<(), ValidationError> {
        validate_non_negative("total_amount", self.total_amount)?;
        validate_non_negative("minimum_payment", self.minimum_payment)?;
        if let Some(installment) = self.monthly_installment {
            validate_non_negative("monthly_installment", installment)?;
        }
        Ok(())
    }
}

impl Validate for Income {
    fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        validate_date("date", self.date, today)?;
        validate_positive("amount", self.amount)
    }
}

impl Validate for Expense {
    fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        validate_date("date", self.date, today)?;
        validate_positive("amount", self.amount)
    }
}

impl Validate for DueItem {
    fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        validate_date("date", self.date, today)?;
        validate_required("concept", &self.concept)?;
        validate_positive("amount", self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_domain::IncomeKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn date_window_spans_fifty_years_back_and_five_ahead() {
        let today = today();
        assert!(validate_date("date", today, today).is_ok());
        assert!(validate_date("date", today - Duration::days(365 * 50), today).is_ok());
        assert!(validate_date("date", today - Duration::days(365 * 50 + 1), today).is_err());
        assert!(validate_date("date", today + Duration::days(365 * 5), today).is_ok());
        assert!(validate_date("date", today + Duration::days(365 * 5 + 1), today).is_err());
    }

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        let today = today();
        let mut income = Income::new(today, IncomeKind::Salary, "pay", Decimal::ZERO);
        let err = income.validate(today).unwrap_err();
        assert_eq!(err.field, "amount");
        income.amount = Decimal::new(-5, 0);
        assert!(income.validate(today).is_err());
        income.amount = Decimal::new(1, 2);
        assert!(income.validate(today).is_ok());
    }

    #[test]
    fn amounts_above_the_cap_are_rejected() {
        let today = today();
        assert_eq!(MAX_AMOUNT, Decimal::new(999_999_999_999_999, 2));
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999999.99");

        let mut income = Income::new(today, IncomeKind::Salary, "pay", MAX_AMOUNT);
        assert!(income.validate(today).is_ok());
        income.amount = MAX_AMOUNT + Decimal::new(1, 2);
        let err = income.validate(today).unwrap_err();
        assert_eq!(err.field, "amount");
        assert_eq!(err.message, "amount must not exceed 9999999999999.99");

        let mut debt = Debt::new(None, pocket_domain::DebtKind::Loan, "car", MAX_AMOUNT);
        assert!(debt.validate(today).is_ok());
        debt.monthly_installment = Some(Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0));
        assert_eq!(debt.validate(today).unwrap_err().field, "monthly_installment");
    }

    #[test]
    fn debts_allow_zero_but_not_negative_amounts() {
        let today = today();
        let mut debt = Debt::new(None, pocket_domain::DebtKind::Loan, "car", Decimal::ZERO);
        assert!(debt.validate(today).is_ok());
        debt.minimum_payment = Decimal::new(-1, 0);
        assert_eq!(debt.validate(today).unwrap_err().field, "minimum_payment");
    }
}
