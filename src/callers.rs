//! Caller attribution and aggregation
//!
//! Second pass over an assembled [`Trace`]: every marker named like the
//! target is attributed to its direct caller, and caller occurrences are
//! counted. Occurrences with no caller (depth 1, or nothing seen one level
//! up in the same thread) are not attributed.

use crate::hierarchy::CallHierarchy;
use crate::interner::{NameId, NameInterner};
use crate::model::Trace;
use std::collections::HashMap;

/// Occurrence count per caller name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerCounts {
    counts: HashMap<NameId, u64>,
}

impl CallerCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence attributed to `caller`
    pub fn record(&mut self, caller: NameId) {
        *self.counts.entry(caller).or_default() += 1;
    }

    pub fn get(&self, caller: NameId) -> u64 {
        self.counts.get(&caller).copied().unwrap_or(0)
    }

    /// Number of distinct callers
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all attributed occurrences
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NameId, u64)> + '_ {
        self.counts.iter().map(|(&id, &count)| (id, count))
    }

    /// Entries by descending count, ties broken by first-seen caller order
    pub fn sorted(&self) -> Vec<(NameId, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }

    /// Counts keyed by resolved caller name
    pub fn by_name<'n>(&self, names: &'n NameInterner) -> HashMap<&'n str, u64> {
        self.iter()
            .filter_map(|(id, count)| names.resolve(id).map(|name| (name, count)))
            .collect()
    }

    /// Print caller summary to stderr
    pub fn print_summary(&self, names: &NameInterner, target: &str) {
        if self.counts.is_empty() {
            eprintln!("\nNo callers of '{}' found.", target);
            return;
        }

        let total = self.total();
        eprintln!("\nCallers of '{}' ({} attributed occurrences)", target, total);
        eprintln!("{:<60} {:>10} {:>8}", "Caller", "Count", "Share");
        eprintln!("{}", "─".repeat(80));

        for (caller, count) in self.sorted() {
            let name = names.resolve(caller).unwrap_or("<unknown>");
            let share = count as f64 / total as f64 * 100.0;
            eprintln!("{:<60} {:>10} {:>7.2}%", name, count, share);
        }

        eprintln!("{}", "─".repeat(80));
    }
}

/// Attribute every occurrence of `target` in `trace` to its direct caller
pub fn attribute_callers(trace: &Trace, target: NameId) -> CallerCounts {
    let mut counts = CallerCounts::new();
    let mut hierarchy = CallHierarchy::new();

    for thread in trace.threads() {
        hierarchy.reset();
        for marker in &thread.markers {
            hierarchy.visit(marker);
            if marker.name != target {
                continue;
            }
            if let Some(caller) = hierarchy.caller_of(marker.depth) {
                counts.record(caller.name);
            }
        }
    }

    counts
}
