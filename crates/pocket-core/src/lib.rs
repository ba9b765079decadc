//! pocket-core
//!
//! Business logic and services for Pocketbook.
//! Depends on pocket-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod dashboard_service;
pub mod debt_service;
pub mod due_item_service;
pub mod entity_service;
pub mod error;
pub mod expense_service;
pub mod income_service;
pub mod records;
pub mod status;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod validation;

pub use dashboard_service::*;
pub use debt_service::*;
pub use due_item_service::*;
pub use entity_service::*;
pub use error::CoreError;
pub use expense_service::*;
pub use income_service::*;
pub use records::{resolve_id, ListFilter};
pub use status::{days_until, derive_status, status_of, DueState};
pub use summary_service::*;
pub use time::{Clock, FixedClock};
pub use validation::{Validate, ValidationError, MAX_AMOUNT};

#[cfg(test)]
mod tests;
