//! Derived views over sets of postings.
//!
//! | View | Module | Input |
//! |------|--------|-------|
//! | Employment mode | [`employment`] | one raw record |
//! | Skill mentions in a date range | [`skills`] | paginated search results |
//! | Job-tag ranking | [`skills`] | review-site tag texts |
//! | Zone × type tally | [`zones`] | every listed record |
//!
//! All views are pure folds: running one twice over the same input gives the
//! same output.

pub mod employment;
pub mod skills;
pub mod zones;

pub use employment::classify_employment_mode;
pub use skills::{count_skills, rank_tags};
pub use zones::tally_zones;
