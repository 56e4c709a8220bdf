//! The record a comparison, discovery or mutation run hands back for display.

use indexmap::IndexMap;
use serde::Serialize;

use super::project::AlignedSequence;
use super::sites::{self, BindingSite, GapRecord, InsertionRecord, SiteCall};

/// Keyed by score table, then by sequence name.
pub type PerTable<T> = IndexMap<String, IndexMap<String, T>>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct BindingReport {
    pub ref_name: String,
    pub sequence_strs: IndexMap<String, String>,
    pub aligned_seqs: IndexMap<String, String>,
    pub aligned_positions: IndexMap<String, Vec<f64>>,
    pub aligned_scores: PerTable<Vec<Option<f64>>>,
    pub max_scores: IndexMap<String, f64>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub highest_values: PerTable<Vec<Option<f64>>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub binding_sites: PerTable<Vec<BindingSite>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub gaps: PerTable<Vec<GapRecord>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub insertions: PerTable<Vec<InsertionRecord>>,
    /// Per table, per reference position: substituted base to change in the
    /// best covering window.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub mutants_effect: IndexMap<String, Vec<IndexMap<String, f64>>>,
}

impl BindingReport {
    pub fn new(ref_name: &str, sequences: IndexMap<String, String>) -> Self {
        Self {
            ref_name: ref_name.to_string(),
            sequence_strs: sequences,
            ..Default::default()
        }
    }

    pub fn add_aligned(&mut self, table: &str, name: &str, aligned: AlignedSequence) {
        self.aligned_seqs.insert(name.to_string(), aligned.aligned);
        self.aligned_positions
            .insert(name.to_string(), aligned.positions);
        self.aligned_scores
            .entry(table.to_string())
            .or_default()
            .insert(name.to_string(), aligned.scores);
    }

    pub fn add_call(&mut self, table: &str, name: &str, active: Vec<Option<f64>>, call: SiteCall) {
        let name = name.to_string();
        self.highest_values
            .entry(table.to_string())
            .or_default()
            .insert(name.clone(), active);
        self.binding_sites
            .entry(table.to_string())
            .or_default()
            .insert(name.clone(), call.sites);
        self.gaps
            .entry(table.to_string())
            .or_default()
            .insert(name.clone(), call.gaps);
        self.insertions
            .entry(table.to_string())
            .or_default()
            .insert(name, call.insertions);
    }

    /// Turns the sites of one table into gained and lost sites per variant.
    pub fn diff_against_reference(&mut self, table: &str) {
        if let Some(calls) = self.binding_sites.get_mut(table) {
            sites::diff_against_reference(calls, &self.ref_name);
        }
    }

    pub fn keep_first_occurrence(&mut self, table: &str) {
        if let Some(calls) = self.binding_sites.get_mut(table) {
            sites::keep_first_occurrence(calls);
        }
    }

    /// Removes variant sites that the reference already has, then every
    /// variant left without sites.
    pub fn drop_reference_equivalents(&mut self, table: &str) {
        let Some(calls) = self.binding_sites.get_mut(table) else {
            return;
        };
        let reference = calls.get(&self.ref_name).cloned().unwrap_or_default();

        let mut empty = vec![];
        for (name, list) in calls.iter_mut() {
            if *name == self.ref_name {
                continue;
            }
            list.retain(|s| !sites::has_equivalent(s, &reference));
            if list.is_empty() {
                empty.push(name.clone());
            }
        }
        self.drop_sequences(table, &empty);
    }

    /// Drops every sequence of `table` with no sites, then the table itself
    /// when nothing is left.
    pub fn drop_empty(&mut self, table: &str) {
        let empty: Vec<String> = match self.binding_sites.get(table) {
            Some(calls) => calls
                .iter()
                .filter(|(_, list)| list.is_empty())
                .map(|(name, _)| name.clone())
                .collect(),
            None => return,
        };
        self.drop_sequences(table, &empty);

        if self.binding_sites.get(table).map_or(true, |c| c.is_empty()) {
            self.aligned_scores.shift_remove(table);
            self.highest_values.shift_remove(table);
            self.binding_sites.shift_remove(table);
            self.gaps.shift_remove(table);
            self.insertions.shift_remove(table);
            self.max_scores.shift_remove(table);
        }
    }

    fn drop_sequences(&mut self, table: &str, names: &[String]) {
        fn remove<T>(map: &mut PerTable<T>, table: &str, names: &[String]) {
            if let Some(per_seq) = map.get_mut(table) {
                for name in names {
                    per_seq.shift_remove(name);
                }
            }
        }
        remove(&mut self.aligned_scores, table, names);
        remove(&mut self.highest_values, table, names);
        remove(&mut self.binding_sites, table, names);
        remove(&mut self.gaps, table, names);
        remove(&mut self.insertions, table, names);
    }

    pub fn site_count(&self) -> usize {
        self.binding_sites
            .values()
            .flat_map(|m| m.values())
            .map(|v| v.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(subs: &[(f64, f64, &str)]) -> SiteCall {
        SiteCall {
            sites: subs
                .iter()
                .map(|&(start, end, sub)| BindingSite {
                    start,
                    end,
                    subsequence: sub.to_string(),
                    original_start: 0,
                    original_end: 0,
                    present: true,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_drop_reference_equivalents() {
        let mut report = BindingReport::new("wt", IndexMap::new());
        report.add_call("t", "wt", vec![], call(&[(0.0, 3.0, "ACGT")]));
        report.add_call("t", "wt_m0C", vec![], call(&[(0.0, 3.0, "CCGT")]));
        report.add_call("t", "wt_m5A", vec![], call(&[(4.0, 7.0, "AAAA")]));
        report.drop_reference_equivalents("t");

        let names: Vec<_> = report.binding_sites["t"].keys().cloned().collect();
        assert_eq!(names, vec!["wt", "wt_m5A"]);
        assert!(!report.gaps["t"].contains_key("wt_m0C"));
        assert_eq!(report.site_count(), 2);
    }

    #[test]
    fn test_drop_empty() {
        let mut report = BindingReport::new("ref", IndexMap::new());
        report.max_scores.insert("t".to_string(), 1.0);
        report.add_call("t", "ref", vec![], call(&[(0.0, 3.0, "ACGT")]));
        report.add_call("t", "var", vec![], call(&[(0.0, 3.0, "ACGT")]));
        report.diff_against_reference("t");
        report.drop_empty("t");

        assert!(report.binding_sites.is_empty());
        assert!(report.max_scores.is_empty());
    }

    #[test]
    fn test_json_skips_empty_sections() {
        let mut seqs = IndexMap::new();
        seqs.insert("ref".to_string(), "ACGT".to_string());
        let report = BindingReport::new("ref", seqs);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ref_name"], "ref");
        assert_eq!(json["sequence_strs"]["ref"], "ACGT");
        assert!(json.get("binding_sites").is_none());
        assert!(json.get("aligned_scores").is_some());
    }
}
