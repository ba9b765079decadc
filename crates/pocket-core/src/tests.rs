use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dashboard_service::DashboardService, debt_service::DebtService,
    due_item_service::DueItemService, entity_service::EntityService,
    expense_service::ExpenseService, income_service::IncomeService, records::resolve_id,
    status::DueState, CoreError, ListFilter,
};
use pocket_domain::{
    Debt, DebtKind, DebtStatus, DueItem, DueStatus, Entity, EntityKind, Expense, ExpenseKind,
    Income, IncomeKind, Ledger, Priority, YearMonth,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
}

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn ledger_with_debt() -> (Ledger, Uuid, Uuid) {
    let mut ledger = Ledger::new("Core");
    let bank = EntityService::add(&mut ledger, Entity::new("Bank", EntityKind::Bank), today())
        .expect("add entity");
    let debt = DebtService::add(
        &mut ledger,
        Debt::new(Some(bank), DebtKind::Loan, "Car loan", dec(8000)),
        today(),
    )
    .expect("add debt");
    (ledger, bank, debt)
}

#[test]
fn entity_names_must_be_unique() {
    let mut ledger = Ledger::new("Entities");
    EntityService::add(&mut ledger, Entity::new("School", EntityKind::School), today())
        .expect("add entity");
    let err = EntityService::add(&mut ledger, Entity::new("School", EntityKind::Other), today())
        .expect_err("duplicate name");
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "name"));
}

#[test]
fn debt_descriptions_must_be_unique() {
    let (mut ledger, bank, car) = ledger_with_debt();
    let err = DebtService::add(
        &mut ledger,
        Debt::new(Some(bank), DebtKind::Card, "Car loan", dec(10)),
        today(),
    )
    .expect_err("duplicate description");
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "description"));
    assert_eq!(ledger.debts.len(), 1);

    let visa = DebtService::add(
        &mut ledger,
        Debt::new(Some(bank), DebtKind::Card, "Visa", dec(10)),
        today(),
    )
    .expect("distinct description");
    let err = DebtService::update(&mut ledger, visa, today(), |debt| {
        debt.description = "Car loan".into();
    })
    .expect_err("rename onto an existing description");
    assert!(matches!(err, CoreError::Validation(ref v) if v.field == "description"));
    assert_eq!(DebtService::get(&ledger, visa).unwrap().description, "Visa");

    DebtService::update(&mut ledger, car, today(), |debt| debt.total_amount = dec(7000))
        .expect("keeping its own description");
}

#[test]
fn removing_entity_cascades_to_debts_and_clears_references() {
    let (mut ledger, bank, debt) = ledger_with_debt();
    let mut expense = Expense::new(today(), ExpenseKind::DebtPayment, "loan", "March", dec(300));
    expense.debt_id = Some(debt);
    ExpenseService::add(&mut ledger, expense, today()).expect("add expense");
    DueItemService::add(
        &mut ledger,
        DueItem::new(today(), "Installment", dec(300)).for_debt(debt),
        today(),
    )
    .expect("add due item");

    EntityService::remove(&mut ledger, bank).expect("remove entity");

    assert!(ledger.debts.is_empty());
    assert_eq!(ledger.expenses.len(), 1);
    assert_eq!(ledger.expenses[0].debt_id, None);
    assert_eq!(ledger.due_items[0].debt_id, None);
}

#[test]
fn debts_must_reference_known_entities() {
    let mut ledger = Ledger::new("Debts");
    let err = DebtService::add(
        &mut ledger,
        Debt::new(Some(Uuid::new_v4()), DebtKind::Card, "Visa", dec(10)),
        today(),
    )
    .expect_err("unknown entity");
    assert!(matches!(err, CoreError::RecordNotFound { kind: "Entity", .. }));
}

#[test]
fn debts_list_by_priority_then_entity_name() {
    let mut ledger = Ledger::new("Order");
    let zeta = EntityService::add(&mut ledger, Entity::new("Zeta", EntityKind::Bank), today())
        .unwrap();
    let alpha = EntityService::add(&mut ledger, Entity::new("Alpha", EntityKind::Bank), today())
        .unwrap();
    let mut low = Debt::new(Some(alpha), DebtKind::Other, "low", dec(1));
    low.priority = Priority::Low;
    let mut high_z = Debt::new(Some(zeta), DebtKind::Other, "high z", dec(1));
    high_z.priority = Priority::High;
    let mut high_a = Debt::new(Some(alpha), DebtKind::Other, "high a", dec(1));
    high_a.priority = Priority::High;
    let mut cancelled = Debt::new(Some(alpha), DebtKind::Other, "done", dec(1));
    cancelled.status = DebtStatus::Cancelled;
    for debt in [low, high_z, high_a, cancelled] {
        DebtService::add(&mut ledger, debt, today()).unwrap();
    }

    let listed: Vec<&str> = DebtService::list(&ledger, ListFilter::Incomplete)
        .into_iter()
        .map(|debt| debt.description.as_str())
        .collect();
    assert_eq!(listed, vec!["high a", "high z", "low"]);
    assert_eq!(DebtService::list(&ledger, ListFilter::All).len(), 4);
}

#[test]
fn update_rejects_invalid_edits_without_mutating() {
    let mut ledger = Ledger::new("Edit");
    let id = IncomeService::add(
        &mut ledger,
        Income::new(today(), IncomeKind::Salary, "pay", dec(1000)),
        today(),
    )
    .unwrap();
    let err = IncomeService::update(&mut ledger, id, today(), |income| {
        income.amount = Decimal::ZERO
    })
    .expect_err("zero amount");
    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(ledger.income(id).unwrap().amount, dec(1000));

    IncomeService::update(&mut ledger, id, today(), |income| income.amount = dec(1200))
        .expect("valid edit");
    assert_eq!(ledger.income(id).unwrap().amount, dec(1200));
}

#[test]
fn bulk_confirm_replaces_previous_set() {
    let mut ledger = Ledger::new("Toggle");
    let ids: Vec<Uuid> = (1..=3)
        .map(|day| {
            let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
            IncomeService::add(
                &mut ledger,
                Income::new(date, IncomeKind::Salary, format!("pay {day}"), dec(100)).confirmed(),
                today(),
            )
            .unwrap()
        })
        .collect();

    let flagged = IncomeService::set_confirmed(&mut ledger, &[ids[1]]).expect("toggle");
    assert_eq!(flagged, 1);
    let confirmed: Vec<Uuid> = ledger
        .incomes
        .iter()
        .filter(|income| income.confirmed)
        .map(|income| income.id)
        .collect();
    assert_eq!(confirmed, vec![ids[1]]);

    IncomeService::set_confirmed(&mut ledger, &[]).expect("clear");
    assert!(ledger.incomes.iter().all(|income| !income.confirmed));
}

#[test]
fn bulk_toggle_with_unknown_id_changes_nothing() {
    let mut ledger = Ledger::new("Toggle");
    let paid = ExpenseService::add(
        &mut ledger,
        Expense::new(today(), ExpenseKind::Fixed, "rent", "", dec(500)).paid(),
        today(),
    )
    .unwrap();
    let err = ExpenseService::set_paid(&mut ledger, &[Uuid::new_v4()]).expect_err("unknown id");
    assert!(matches!(err, CoreError::RecordNotFound { .. }));
    assert!(ledger.expense(paid).unwrap().paid);
}

#[test]
fn due_items_toggle_status_and_list_pending_only() {
    let mut ledger = Ledger::new("Dues");
    let first = DueItemService::add(&mut ledger, DueItem::new(today(), "Power", dec(40)), today())
        .unwrap();
    let second = DueItemService::add(
        &mut ledger,
        DueItem::new(today() + Duration::days(2), "Water", dec(20)),
        today(),
    )
    .unwrap();
    DueItemService::set_paid(&mut ledger, &[first]).unwrap();
    assert_eq!(ledger.due_item(first).unwrap().status, DueStatus::Paid);
    let pending: Vec<Uuid> = DueItemService::list(&ledger, ListFilter::Incomplete)
        .into_iter()
        .map(|item| item.id)
        .collect();
    assert_eq!(pending, vec![second]);
}

#[test]
fn ids_resolve_from_unique_prefixes() {
    let (ledger, _, debt) = ledger_with_debt();
    let prefix = &debt.to_string()[..8];
    assert_eq!(resolve_id(&ledger.debts, "Debt", prefix).unwrap(), debt);
    assert!(resolve_id(&ledger.debts, "Debt", "zzzz").is_err());
}

#[test]
fn dashboard_collects_active_debt_and_upcoming_dues() {
    let (mut ledger, bank, _) = ledger_with_debt();
    let mut closed = Debt::new(Some(bank), DebtKind::Card, "Old card", dec(999));
    closed.status = DebtStatus::Cancelled;
    DebtService::add(&mut ledger, closed, today()).unwrap();
    for offset in [-1, 0, 5, 31] {
        DueItemService::add(
            &mut ledger,
            DueItem::new(today() + Duration::days(offset), format!("due {offset}"), dec(10)),
            today(),
        )
        .unwrap();
    }

    let dashboard = DashboardService::build(&ledger, YearMonth::from_date(today()), today());
    assert_eq!(dashboard.total_debt, dec(8000));
    let concepts: Vec<&str> = dashboard
        .upcoming_dues
        .iter()
        .map(|due| due.item.concept.as_str())
        .collect();
    assert_eq!(concepts, vec!["due 0", "due 5"]);
    assert_eq!(dashboard.upcoming_dues[0].state, DueState::DueToday);
    assert_eq!(dashboard.upcoming_dues[1].state, DueState::Upcoming);
}
