//! The dashboard: debt load, installments, monthly cash flow and upcoming dues.

use chrono::{Duration, NaiveDate};
use pocket_domain::{DueItem, Ledger, YearMonth};
use rust_decimal::Decimal;

use crate::{
    status::{status_of, DueState},
    summary_service::{total, MonthlySummary, SummaryService},
};

pub const UPCOMING_DAYS: i64 = 30;
pub const UPCOMING_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct UpcomingDue<'a> {
    pub item: &'a DueItem,
    pub state: DueState,
}

#[derive(Debug, Clone)]
pub struct Dashboard<'a> {
    /// Outstanding amount of debts that are current or in progress.
    pub total_debt: Decimal,
    pub installment_total: Decimal,
    pub summary: MonthlySummary,
    pub upcoming_dues: Vec<UpcomingDue<'a>>,
}

impl Dashboard<'_> {
    pub fn month_balance(&self) -> Decimal {
        self.summary.net()
    }
}

pub struct DashboardService;

impl DashboardService {
    pub fn build(ledger: &Ledger, month: YearMonth, today: NaiveDate) -> Dashboard<'_> {
        let total_debt = total(
            ledger
                .debts
                .iter()
                .filter(|debt| debt.status.is_active())
                .map(|debt| debt.total_amount),
        );
        Dashboard {
            total_debt,
            installment_total: SummaryService::installment_total(ledger),
            summary: SummaryService::monthly(ledger, month, today),
            upcoming_dues: Self::upcoming_dues(ledger, today),
        }
    }

    /// Pending due items from today through the next 30 days, soonest first.
    pub fn upcoming_dues(ledger: &Ledger, today: NaiveDate) -> Vec<UpcomingDue<'_>> {
        let horizon = today + Duration::days(UPCOMING_DAYS);
        let mut items: Vec<&DueItem> = ledger
            .due_items
            .iter()
            .filter(|item| !item.is_paid() && item.date >= today && item.date <= horizon)
            .collect();
        items.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.concept.cmp(&b.concept)));
        items
            .into_iter()
            .take(UPCOMING_LIMIT)
            .map(|item| UpcomingDue {
                item,
                state: status_of(item, today),
            })
            .collect()
    }
}
