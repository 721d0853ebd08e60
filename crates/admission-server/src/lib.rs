//! Runtime pieces of the admission server binary: configuration loading and
//! the spreadsheet mirror sinks.

pub mod config;
pub mod sheets;

pub use config::{ServerConfig, SheetsConfig};
pub use sheets::{ConfiguredMirror, DisabledMirror, SheetsError, SheetsMirror};
