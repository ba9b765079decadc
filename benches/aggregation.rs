use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pocket_core::{DashboardService, SummaryService};
use pocket_domain::{
    Debt, DebtKind, Expense, ExpenseKind, Income, IncomeKind, Ledger, PaymentMethod, YearMonth,
};
use rust_decimal::Decimal;

fn sample_ledger(records: i64) -> Ledger {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let mut ledger = Ledger::new("Bench");
    for offset in 0..records {
        let date = start + Duration::days(offset % 730);
        let mut income = Income::new(date, IncomeKind::Salary, "pay", Decimal::new(150_000, 2));
        income.confirmed = offset % 3 != 0;
        ledger.incomes.push(income);

        let method = match offset % 3 {
            0 => PaymentMethod::Cash,
            1 => PaymentMethod::Debit,
            _ => PaymentMethod::Card,
        };
        let mut expense = Expense::new(date, ExpenseKind::Variable, "food", "market", Decimal::new(4_250, 2))
            .with_method(method);
        expense.paid = offset % 2 == 0;
        ledger.expenses.push(expense);
    }
    for index in 0..20 {
        ledger.debts.push(
            Debt::new(None, DebtKind::Loan, format!("loan {index}"), Decimal::new(1_000_000, 2))
                .with_installment(Decimal::new(25_000, 2), Some(24)),
        );
    }
    ledger
}

fn bench_aggregation(c: &mut Criterion) {
    let ledger = sample_ledger(10_000);
    let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
    let month = YearMonth::new(2024, 3).unwrap();

    c.bench_function("monthly_summary_10k", |b| {
        b.iter(|| SummaryService::monthly(black_box(&ledger), black_box(month), today))
    });
    c.bench_function("dashboard_10k", |b| {
        b.iter(|| DashboardService::build(black_box(&ledger), black_box(month), today).total_debt)
    });
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
