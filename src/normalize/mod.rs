//! Normalization of loosely typed listings data.
//!
//! - [`dates`]: flexible date parsing and date ranges
//! - [`fields`]: per-field extraction from raw records into [`NormalizedJob`](crate::models::NormalizedJob)

pub mod dates;
pub mod fields;

pub use dates::DateRange;
pub use fields::{extract_company_name, extract_locations_text, normalize_job};
