use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::NaiveDate;
use pocket_core::CoreError;
use rust_decimal::Decimal;
use zip::result::ZipError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One file of a bundle, with its exact header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleFile {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const ENTITIES: BundleFile = BundleFile {
    name: "entities.csv",
    columns: &["name", "kind"],
};

pub const DEBTS: BundleFile = BundleFile {
    name: "debts.csv",
    columns: &[
        "entity",
        "kind",
        "description",
        "total_amount",
        "minimum_payment",
        "due_date",
        "next_payment",
        "status",
        "priority",
        "monthly_installment",
        "remaining_installments",
        "notes",
    ],
};

pub const INCOMES: BundleFile = BundleFile {
    name: "incomes.csv",
    columns: &["date", "kind", "description", "amount", "confirmed"],
};

pub const EXPENSES: BundleFile = BundleFile {
    name: "expenses.csv",
    columns: &[
        "date",
        "kind",
        "category",
        "description",
        "amount",
        "paid",
        "payment_method",
        "debt",
    ],
};

pub const DUE_ITEMS: BundleFile = BundleFile {
    name: "due_items.csv",
    columns: &["date", "concept", "amount", "debt", "status", "notes"],
};

/// Bundle files in dependency order.
pub const BUNDLE_FILES: [BundleFile; 5] = [ENTITIES, DEBTS, INCOMES, EXPENSES, DUE_ITEMS];

pub(crate) fn csv_error(err: csv::Error) -> CoreError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => CoreError::Io(io),
        other => CoreError::Serde(format!("{other:?}")),
    }
}

pub(crate) fn zip_error(err: ZipError) -> CoreError {
    match err {
        ZipError::Io(io) => CoreError::Io(io),
        other => CoreError::Serde(other.to_string()),
    }
}

/// Archive written next to a bundle directory: `<dir>.zip`.
pub fn archive_path(dir: &Path) -> PathBuf {
    match dir.file_name() {
        Some(name) => {
            let mut file_name = OsString::from(name);
            file_name.push(".zip");
            dir.with_file_name(file_name)
        }
        None => dir.join("bundle.zip"),
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), CoreError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("bundle `{}` does not exist", dir.display()),
        )))
    }
}

pub(crate) fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Formats money with exactly two decimals.
pub(crate) fn format_amount(value: Decimal) -> String {
    let mut value = value;
    value.rescale(pocket_domain::MONEY_SCALE);
    value.to_string()
}

pub(crate) fn format_decimal(value: Option<Decimal>) -> String {
    value.map(format_amount).unwrap_or_default()
}

pub(crate) fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, String> {
    parse_optional_date(field, raw)?.ok_or_else(|| format!("{field} is required"))
}

pub(crate) fn parse_optional_date(field: &str, raw: &str) -> Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|err| format!("{field} `{raw}`: {err}"))
}

pub(crate) fn parse_optional_decimal(field: &str, raw: &str) -> Result<Option<Decimal>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(raw)
        .map(|value| Some(pocket_domain::money(value)))
        .map_err(|err| format!("{field} `{raw}`: {err}"))
}

/// Parses an amount, reading an empty cell as zero.
pub(crate) fn parse_amount(field: &str, raw: &str) -> Result<Decimal, String> {
    Ok(parse_optional_decimal(field, raw)?.unwrap_or(Decimal::ZERO))
}

pub(crate) fn parse_optional_count(field: &str, raw: &str) -> Result<Option<u32>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|err| format!("{field} `{raw}`: {err}"))
}

pub(crate) fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "si" | "sí"
    )
}

/// Parses a choice column, using the default for an empty cell.
pub(crate) fn parse_choice<T>(raw: &str) -> Result<T, String>
where
    T: FromStr + Default,
    T::Err: std::fmt::Display,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse::<T>().map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_domain::PaymentMethod;

    #[test]
    fn booleans_accept_affirmative_spellings() {
        for raw in ["true", "TRUE", "1", "yes", "Si", "sí", " Sí "] {
            assert!(parse_bool(raw), "{raw} should be true");
        }
        for raw in ["false", "0", "", "no", "maybe"] {
            assert!(!parse_bool(raw), "{raw} should be false");
        }
    }

    #[test]
    fn empty_cells_fall_back() {
        assert_eq!(parse_amount("amount", "").unwrap(), Decimal::ZERO);
        assert_eq!(parse_optional_date("due_date", " ").unwrap(), None);
        assert_eq!(
            parse_choice::<PaymentMethod>("").unwrap(),
            PaymentMethod::Cash
        );
        assert!(parse_date("date", "").is_err());
    }

    #[test]
    fn amounts_are_written_with_cents() {
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(Decimal::new(1200, 0)), "1200.00");
        assert_eq!(format_decimal(None), "");
    }

    #[test]
    fn amounts_round_to_cents() {
        assert_eq!(
            parse_amount("amount", "10.004").unwrap(),
            Decimal::new(1000, 2)
        );
        assert!(parse_amount("amount", "ten").is_err());
    }
}
