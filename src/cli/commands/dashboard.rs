//! The monthly dashboard.

use pocket_core::{DashboardService, SummaryService};
use pocket_domain::YearMonth;

use crate::cli::format::{self, short_id};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::cli::table::{Table, TableColumn};
use crate::errors::{CommandError, CommandResult};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "dashboard",
        "Monthly cash flow, debt load and upcoming dues",
        "dashboard [[month=]YYYY-MM] [--daily|--json]",
        cmd_dashboard,
    )]
}

fn cmd_dashboard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let today = context.today();
    let daily = args.iter().any(|arg| *arg == "--daily");
    let raw_month = args
        .iter()
        .copied()
        .find(|arg| !arg.starts_with("--"))
        .map(|arg| arg.strip_prefix("month=").unwrap_or(arg));
    if let Some(raw) = raw_month {
        if raw.parse::<YearMonth>().is_err() {
            output::warning(format!("Could not read month `{raw}`; showing the current month."));
        }
    }
    let month = SummaryService::resolve_month(raw_month, today);
    let currency = context.currency().to_string();
    let ledger = context.ledger()?;
    let dashboard = DashboardService::build(ledger, month, today);
    let summary = &dashboard.summary;
    if args.iter().any(|arg| *arg == "--json") {
        let json = serde_json::to_string_pretty(summary)
            .map_err(|err| CommandError::Message(format!("Could not render summary: {err}")))?;
        println!("{json}");
        return Ok(());
    }
    let money = |amount| format::money(amount, &currency);

    if let Some(requested) = summary.clamped_from {
        output::warning(format!(
            "{requested} is outside the supported range; showing {}.",
            summary.month
        ));
    }

    output::section(format!("Dashboard {}", summary.month));
    output::info(format!("  Active debt         : {}", money(dashboard.total_debt)));
    output::info(format!(
        "  Monthly installments: {} ({}% of income)",
        money(dashboard.installment_total),
        format::amount(summary.installment_ratio_percent())
    ));
    output::info(format!(
        "  Income              : {} confirmed, {} pending",
        money(summary.confirmed_income),
        money(summary.pending_income)
    ));
    output::info(format!(
        "  Expenses            : {} paid, {} pending",
        money(summary.paid_expense),
        money(summary.pending_expense)
    ));
    output::info(format!("  Month balance       : {}", money(dashboard.month_balance())));

    let mut days = Table::new(vec![
        TableColumn::left("Date"),
        TableColumn::right("Income"),
        TableColumn::right("Pending in"),
        TableColumn::right("Expense"),
        TableColumn::right("Pending out"),
        TableColumn::right("Balance"),
    ]);
    for day in summary
        .days
        .iter()
        .filter(|day| daily || !day.income().is_zero() || !day.expense().is_zero())
    {
        days.push(vec![
            format::date(day.date),
            format::amount(day.confirmed_income),
            format::amount(day.pending_income),
            format::amount(day.paid_expense),
            format::amount(day.pending_expense),
            format::amount(day.balance),
        ]);
    }
    output::section("Cash flow");
    if days.rows.is_empty() {
        output::info("No movements this month.");
    } else {
        output::info(days.render());
    }

    output::section("Upcoming dues");
    if dashboard.upcoming_dues.is_empty() {
        output::info("Nothing due in the next 30 days.");
        return Ok(());
    }
    let mut dues = Table::new(vec![
        TableColumn::left("Id"),
        TableColumn::left("Date"),
        TableColumn::left("Concept"),
        TableColumn::right("Amount"),
        TableColumn::left("Status"),
    ]);
    for due in &dashboard.upcoming_dues {
        dues.push(vec![
            short_id(due.item.id),
            format::date(due.item.date),
            due.item.concept.clone(),
            format::amount(due.item.amount),
            format::state(due.state),
        ]);
    }
    output::info(dues.render());
    Ok(())
}
