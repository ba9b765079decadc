//! Display-only status categorisation for dated, completable records.

use chrono::NaiveDate;
use pocket_domain::Completable;

pocket_domain::choice_enum! {
    /// Where a record stands relative to today.
    DueState, default = NoDate {
        Completed => ("completed", "Completed"),
        NoDate => ("no_date", "No date"),
        Overdue => ("overdue", "Overdue"),
        DueToday => ("due_today", "Due today"),
        Upcoming => ("upcoming", "Upcoming"),
    }
}

/// Derives the status of a record from its date, completion flag and today's date.
pub fn derive_status(date: Option<NaiveDate>, completed: bool, today: NaiveDate) -> DueState {
    if completed {
        return DueState::Completed;
    }
    let Some(date) = date else {
        return DueState::NoDate;
    };
    match days_until(date, today) {
        delta if delta < 0 => DueState::Overdue,
        0 => DueState::DueToday,
        _ => DueState::Upcoming,
    }
}

pub fn status_of<T: Completable>(record: &T, today: NaiveDate) -> DueState {
    derive_status(record.scheduled_on(), record.is_completed(), today)
}

/// Signed number of days from `today` to `date`.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}
