//! Zone × job-type tally.

use crate::models::{RawRecord, ZoneTypeCount};
use crate::utils::object_names;
use itertools::Itertools;
use std::collections::HashMap;

/// Running (zone, type) counts.
#[derive(Debug, Default)]
pub struct ZoneTally {
    counts: HashMap<(String, String), usize>,
}

impl ZoneTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every (zone, type) pair of one record.
    ///
    /// Missing zones or types count as a single `""` placeholder, so every
    /// record contributes at least one pair.
    pub fn observe(&mut self, record: &RawRecord) {
        let zones = names_or_placeholder(record, "locations");
        let types = names_or_placeholder(record, "types");
        for (zone, job_type) in zones.iter().cartesian_product(types.iter()) {
            *self
                .counts
                .entry((zone.clone(), job_type.clone()))
                .or_insert(0) += 1;
        }
    }

    /// Rows by count descending, then zone, then type.
    pub fn into_rows(self) -> Vec<ZoneTypeCount> {
        self.counts
            .into_iter()
            .map(|((zone, job_type), count)| ZoneTypeCount {
                zone,
                job_type,
                count,
            })
            .sorted_by(|a, b| {
                b.count
                    .cmp(&a.count)
                    .then_with(|| a.zone.cmp(&b.zone))
                    .then_with(|| a.job_type.cmp(&b.job_type))
            })
            .collect()
    }
}

/// Distinct `name`s of a record's `key` array (blank ones as `""`), or `[""]`
/// if the array holds no objects.
fn names_or_placeholder(record: &RawRecord, key: &str) -> Vec<String> {
    let names: Vec<String> = object_names(record.get(key)).into_iter().unique().collect();
    if names.is_empty() {
        vec![String::new()]
    } else {
        names
    }
}

/// Tally a whole record set.
pub fn tally_zones<'a>(records: impl IntoIterator<Item = &'a RawRecord>) -> Vec<ZoneTypeCount> {
    let mut tally = ZoneTally::new();
    for record in records {
        tally.observe(record);
    }
    tally.into_rows()
}
