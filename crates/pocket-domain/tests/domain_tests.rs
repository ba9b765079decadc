use chrono::NaiveDate;
use pocket_domain::{
    Completable, DebtStatus, DueItem, DueStatus, EntityKind, Expense, ExpenseKind, Income,
    IncomeKind, Ledger, PaymentMethod, Priority,
};
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn choices_parse_from_codes_case_insensitively() {
    assert_eq!("FINTECH".parse::<EntityKind>().unwrap(), EntityKind::Fintech);
    assert_eq!(
        "in_progress".parse::<DebtStatus>().unwrap(),
        DebtStatus::InProgress
    );
    assert_eq!(" debit ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Debit);
    let err = "weekly".parse::<IncomeKind>().unwrap_err();
    assert!(err.to_string().contains("salary"));
}

#[test]
fn choice_defaults_follow_record_defaults() {
    assert_eq!(EntityKind::default(), EntityKind::Bank);
    assert_eq!(DebtStatus::default(), DebtStatus::Current);
    assert_eq!(Priority::default(), Priority::Medium);
    assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    assert_eq!(DueStatus::default(), DueStatus::Pending);
}

#[test]
fn only_cash_and_debit_affect_cash_flow() {
    let base = Expense::new(date(2024, 3, 1), ExpenseKind::Fixed, "rent", "", Decimal::new(100, 0));
    assert!(base.clone().with_method(PaymentMethod::Cash).affects_cash_flow());
    assert!(base.clone().with_method(PaymentMethod::Debit).affects_cash_flow());
    assert!(!base.with_method(PaymentMethod::Card).affects_cash_flow());
}

#[test]
fn amounts_are_rounded_to_cents() {
    let income = Income::new(
        date(2024, 3, 1),
        IncomeKind::Salary,
        "pay",
        Decimal::new(100_005, 3),
    );
    assert_eq!(income.amount, Decimal::new(10_000, 2));
}

#[test]
fn completion_follows_record_flags() {
    let income = Income::new(date(2024, 1, 1), IncomeKind::Bonus, "", Decimal::ONE);
    assert!(!income.is_completed());
    assert!(income.confirmed().is_completed());

    let mut due = DueItem::new(date(2024, 1, 1), "insurance", Decimal::TEN);
    assert_eq!(due.scheduled_on(), Some(date(2024, 1, 1)));
    due.status = DueStatus::Paid;
    assert!(due.is_completed());
}

#[test]
fn ledger_serializes_with_snake_case_choices() {
    let mut ledger = Ledger::new("Home");
    ledger.expenses.push(
        Expense::new(date(2024, 2, 2), ExpenseKind::DebtPayment, "card", "", Decimal::ONE)
            .with_method(PaymentMethod::Card),
    );
    let json = serde_json::to_string(&ledger).expect("serialize");
    assert!(json.contains("\"debt_payment\""));
    assert!(json.contains("\"card\""));
    let restored: Ledger = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored.expenses, ledger.expenses);
}
