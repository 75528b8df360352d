//! Output writers.
//!
//! - [`json`]: pretty-printed JSON on standard output for inspection commands
//! - [`csv_export`]: CSV files for export commands
//!
//! Both are mechanical projections of already-normalized data.

pub mod csv_export;
pub mod json;
