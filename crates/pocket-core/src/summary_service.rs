//! Monthly cash-flow aggregation.

use chrono::{Datelike, NaiveDate};
use pocket_domain::{Ledger, YearMonth};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// How many months either side of today the aggregator accepts.
pub const MONTH_WINDOW: i32 = 24;

const RATIO_SCALE: u32 = 4;

/// Cash movements for one calendar day, plus the running balance through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCashFlow {
    pub date: NaiveDate,
    pub confirmed_income: Decimal,
    pub pending_income: Decimal,
    pub paid_expense: Decimal,
    pub pending_expense: Decimal,
    pub balance: Decimal,
}

impl DailyCashFlow {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            confirmed_income: Decimal::ZERO,
            pending_income: Decimal::ZERO,
            paid_expense: Decimal::ZERO,
            pending_expense: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }

    pub fn income(&self) -> Decimal {
        self.confirmed_income.saturating_add(self.pending_income)
    }

    pub fn expense(&self) -> Decimal {
        self.paid_expense.saturating_add(self.pending_expense)
    }

    pub fn net(&self) -> Decimal {
        self.income().saturating_sub(self.expense())
    }
}

/// Aggregated income and cash-affecting expense for a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: YearMonth,
    /// Set when the requested month fell outside the window and was clamped.
    pub clamped_from: Option<YearMonth>,
    pub confirmed_income: Decimal,
    pub pending_income: Decimal,
    pub paid_expense: Decimal,
    pub pending_expense: Decimal,
    pub installment_total: Decimal,
    /// Monthly installments divided by the month's income; zero without income.
    pub installment_ratio: Decimal,
    pub days: Vec<DailyCashFlow>,
}

impl MonthlySummary {
    pub fn total_income(&self) -> Decimal {
        self.confirmed_income.saturating_add(self.pending_income)
    }

    pub fn total_expense(&self) -> Decimal {
        self.paid_expense.saturating_add(self.pending_expense)
    }

    pub fn net(&self) -> Decimal {
        self.total_income().saturating_sub(self.total_expense())
    }

    pub fn installment_ratio_percent(&self) -> Decimal {
        self.installment_ratio
            .saturating_mul(Decimal::ONE_HUNDRED)
            .round_dp(2)
    }

    pub fn closing_balance(&self) -> Decimal {
        self.days
            .last()
            .map(|day| day.balance)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn day(&self, day: u32) -> Option<&DailyCashFlow> {
        self.days.iter().find(|entry| entry.date.day() == day)
    }
}

pub struct SummaryService;

impl SummaryService {
    /// Clamps `month` into the window of [`MONTH_WINDOW`] months around today.
    pub fn clamp_month(month: YearMonth, today: NaiveDate) -> YearMonth {
        let current = YearMonth::from_date(today);
        month.clamp_to(current.shift(-MONTH_WINDOW), current.shift(MONTH_WINDOW))
    }

    /// Parses an optional `YYYY-MM` value, falling back to the current month.
    pub fn resolve_month(raw: Option<&str>, today: NaiveDate) -> YearMonth {
        raw.and_then(|value| value.parse::<YearMonth>().ok())
            .unwrap_or_else(|| YearMonth::from_date(today))
    }

    /// Builds the monthly cash-flow summary.
    ///
    /// Amounts dated after `today` always land in the pending buckets. Only
    /// cash and debit expenses are counted.
    pub fn monthly(ledger: &Ledger, month: YearMonth, today: NaiveDate) -> MonthlySummary {
        let effective = Self::clamp_month(month, today);
        let clamped_from = (effective != month).then_some(month);
        if let Some(requested) = clamped_from {
            debug!(%requested, %effective, "month outside window, clamped");
        }

        let mut days: Vec<DailyCashFlow> = effective.days().map(DailyCashFlow::empty).collect();

        for income in ledger
            .incomes
            .iter()
            .filter(|income| effective.contains(income.date))
        {
            let slot = &mut days[income.date.day0() as usize];
            if income.confirmed && income.date <= today {
                slot.confirmed_income = slot.confirmed_income.saturating_add(income.amount);
            } else {
                slot.pending_income = slot.pending_income.saturating_add(income.amount);
            }
        }

        for expense in ledger
            .expenses
            .iter()
            .filter(|expense| expense.affects_cash_flow() && effective.contains(expense.date))
        {
            let slot = &mut days[expense.date.day0() as usize];
            if expense.paid && expense.date <= today {
                slot.paid_expense = slot.paid_expense.saturating_add(expense.amount);
            } else {
                slot.pending_expense = slot.pending_expense.saturating_add(expense.amount);
            }
        }

        let mut balance = Decimal::ZERO;
        for day in days.iter_mut() {
            balance = balance.saturating_add(day.net());
            day.balance = balance;
        }

        let confirmed_income = total(days.iter().map(|day| day.confirmed_income));
        let pending_income = total(days.iter().map(|day| day.pending_income));
        let paid_expense = total(days.iter().map(|day| day.paid_expense));
        let pending_expense = total(days.iter().map(|day| day.pending_expense));
        let installment_total = Self::installment_total(ledger);
        let total_income = confirmed_income.saturating_add(pending_income);
        let installment_ratio = if total_income > Decimal::ZERO {
            installment_total
                .checked_div(total_income)
                .map(|ratio| ratio.round_dp(RATIO_SCALE))
                .unwrap_or(Decimal::MAX)
        } else {
            Decimal::ZERO
        };

        MonthlySummary {
            month: effective,
            clamped_from,
            confirmed_income,
            pending_income,
            paid_expense,
            pending_expense,
            installment_total,
            installment_ratio,
            days,
        }
    }

    /// Sum of every debt's approximate monthly installment.
    pub fn installment_total(ledger: &Ledger) -> Decimal {
        total(ledger.debts.iter().map(|debt| debt.installment()))
    }
}

/// Sums amounts, pinning at the `Decimal` bounds instead of overflowing.
///
/// Validated records stay far below the bounds; this only matters for
/// hand-edited ledger files.
pub(crate) fn total(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_domain::{Debt, DebtKind, Expense, ExpenseKind, Income, IncomeKind, PaymentMethod};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn march() -> YearMonth {
        YearMonth::new(2024, 3).unwrap()
    }

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    #[test]
    fn empty_month_is_all_zero() {
        let ledger = Ledger::new("Empty");
        let summary = SummaryService::monthly(&ledger, march(), date(2024, 3, 20));
        assert_eq!(summary.days.len(), 31);
        assert_eq!(summary.total_income(), Decimal::ZERO);
        assert_eq!(summary.total_expense(), Decimal::ZERO);
        assert_eq!(summary.installment_ratio, Decimal::ZERO);
        assert!(summary.days.iter().all(|day| day.balance.is_zero()));
    }

    #[test]
    fn same_day_income_and_cash_expense_net_into_balance() {
        let mut ledger = Ledger::new("March");
        ledger.incomes.push(
            Income::new(date(2024, 3, 15), IncomeKind::Salary, "pay", dec(1000)).confirmed(),
        );
        ledger.expenses.push(
            Expense::new(date(2024, 3, 15), ExpenseKind::Fixed, "rent", "", dec(200))
                .with_method(PaymentMethod::Cash)
                .paid(),
        );
        let summary = SummaryService::monthly(&ledger, march(), date(2024, 3, 31));
        let before = summary.day(14).unwrap().balance;
        let day = summary.day(15).unwrap();
        assert_eq!(day.confirmed_income, dec(1000));
        assert_eq!(day.paid_expense, dec(200));
        assert_eq!(day.balance, before + dec(800));
        assert_eq!(summary.closing_balance(), dec(800));
    }

    #[test]
    fn card_expenses_are_left_out() {
        let mut ledger = Ledger::new("Card");
        ledger.expenses.push(
            Expense::new(date(2024, 3, 2), ExpenseKind::Variable, "fuel", "", dec(50))
                .with_method(PaymentMethod::Card)
                .paid(),
        );
        let summary = SummaryService::monthly(&ledger, march(), date(2024, 3, 31));
        assert_eq!(summary.total_expense(), Decimal::ZERO);
    }

    #[test]
    fn days_after_today_are_pending() {
        let mut ledger = Ledger::new("Future");
        ledger.incomes.push(
            Income::new(date(2024, 3, 10), IncomeKind::Salary, "early", dec(100)).confirmed(),
        );
        ledger.incomes.push(
            Income::new(date(2024, 3, 25), IncomeKind::Bonus, "late", dec(300)).confirmed(),
        );
        let summary = SummaryService::monthly(&ledger, march(), date(2024, 3, 20));
        assert_eq!(summary.confirmed_income, dec(100));
        assert_eq!(summary.pending_income, dec(300));
        assert_eq!(summary.day(25).unwrap().confirmed_income, Decimal::ZERO);
    }

    #[test]
    fn months_outside_window_are_clamped() {
        let today = date(2024, 3, 20);
        let far = YearMonth::new(2030, 1).unwrap();
        let summary = SummaryService::monthly(&Ledger::new("Clamp"), far, today);
        assert_eq!(summary.month, YearMonth::new(2026, 3).unwrap());
        assert_eq!(summary.clamped_from, Some(far));

        let past = YearMonth::new(2000, 1).unwrap();
        assert_eq!(
            SummaryService::clamp_month(past, today),
            YearMonth::new(2022, 3).unwrap()
        );
    }

    #[test]
    fn installment_ratio_divides_by_month_income() {
        let mut ledger = Ledger::new("Ratio");
        ledger
            .debts
            .push(Debt::new(None, DebtKind::Loan, "car", dec(5000)).with_installment(dec(250), Some(20)));
        ledger
            .incomes
            .push(Income::new(date(2024, 3, 1), IncomeKind::Salary, "pay", dec(1000)));
        let summary = SummaryService::monthly(&ledger, march(), date(2024, 3, 31));
        assert_eq!(summary.installment_total, dec(250));
        assert_eq!(summary.installment_ratio, Decimal::new(25, 2));
        assert_eq!(summary.installment_ratio_percent(), dec(25));
    }

    #[test]
    fn resolve_month_falls_back_to_current() {
        let today = date(2024, 3, 20);
        assert_eq!(SummaryService::resolve_month(None, today), march());
        assert_eq!(SummaryService::resolve_month(Some("garbage"), today), march());
        assert_eq!(
            SummaryService::resolve_month(Some("2023-11"), today),
            YearMonth::new(2023, 11).unwrap()
        );
    }
}
