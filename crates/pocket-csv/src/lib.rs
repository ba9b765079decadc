//! CSV interchange for ledgers.
//!
//! A bundle holds one CSV file per record type, either in a directory or
//! packed into a single zip archive. Foreign keys are written as natural
//! keys (entity name, debt description) so a bundle can be edited by hand
//! and imported into any ledger.

mod bundle;
mod export;
mod import;
mod report;

pub use bundle::{archive_path, BundleFile, BUNDLE_FILES};
pub use export::{bundle_name, export_archive, export_bundle};
pub use import::import_bundle;
pub use report::{ExportReport, FileImport, ImportReport};
