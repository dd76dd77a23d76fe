//! Alert catalogue extraction from Prometheus rule files.
//!
//! Rule documents are parsed into [`AlertRecord`]s by [`normalize`], merged
//! across documents and partitioned by owning team by [`grouping`]. Override
//! files that disable alerts per environment are summarized by [`overrides`].
//! Hand-maintained alert variable sheets are read by [`variables`].

pub mod error;
pub mod grouping;
pub mod normalize;
pub mod overrides;
pub mod threshold;
pub mod variables;


use alertbook_common::types::AlertRecord;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::hash::Hash;

/// Merges `record` into `merged` under `key`.
///
/// The first record stored under a key keeps every field it was built with;
/// a later record with the same key only adds its environments. Whether later
/// descriptions or severities should win instead is undecided upstream, so
/// the first occurrence is kept as-is.
pub fn merge_first_wins<K: Hash + Eq>(
    merged: &mut IndexMap<K, AlertRecord>,
    key: K,
    record: AlertRecord,
) {
    match merged.entry(key) {
        Entry::Occupied(mut existing) => {
            existing.get_mut().environments.extend(record.environments);
        }
        Entry::Vacant(slot) => {
            slot.insert(record);
        }
    }
}
