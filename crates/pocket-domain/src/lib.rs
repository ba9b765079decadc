//! pocket-domain
//!
//! Pure domain records (Entity, Debt, Income, Expense, DueItem, Ledger).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod common;
pub mod debt;
pub mod due_item;
pub mod entity;
pub mod expense;
pub mod income;
pub mod ledger;

pub use common::*;
pub use debt::*;
pub use due_item::*;
pub use entity::*;
pub use expense::*;
pub use income::*;
pub use ledger::*;
