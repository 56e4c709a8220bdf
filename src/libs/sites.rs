//! Binding-site calls on aligned score tracks, and comparison between calls.

use indexmap::{IndexMap, IndexSet};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref GAP_RUN: Regex = Regex::new(r"-+").unwrap();
    static ref INSERT_RUN: Regex = Regex::new(r"[a-z]+").unwrap();
}

/// A maximal run of active windows, extended to cover the last window's bases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingSite {
    /// Reference coordinate of the first aligned character.
    pub start: f64,
    /// Reference coordinate of the last aligned character.
    pub end: f64,
    /// The aligned characters covered, gaps included.
    pub subsequence: String,
    /// Offsets in the unaligned sequence.
    pub original_start: usize,
    pub original_end: usize,
    /// `false` for a reference site that a variant lost.
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapRecord {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertionRecord {
    pub position: f64,
    pub bases: String,
}

/// Everything found on one aligned sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteCall {
    pub sites: Vec<BindingSite>,
    pub gaps: Vec<GapRecord>,
    pub insertions: Vec<InsertionRecord>,
}

/// Keeps the entries that pass every threshold given; the others become `None`.
///
/// `rank_cutoff` is already a score, converted from a percentile by the table.
pub fn activity_mask(
    scores: &[Option<f64>],
    absolute: Option<f64>,
    rank_cutoff: Option<f64>,
) -> Vec<Option<f64>> {
    scores
        .iter()
        .map(|s| {
            s.filter(|&v| {
                absolute.map_or(true, |t| v >= t) && rank_cutoff.map_or(true, |t| v >= t)
            })
        })
        .collect()
}

fn has_base(bytes: &[u8]) -> bool {
    bytes.iter().any(|&b| b != b'-')
}

fn strip_gaps(s: &str) -> String {
    s.chars().filter(|&c| c != '-').collect()
}

/// Groups the active entries of `active` into binding sites on `aligned`.
///
/// Consecutive active indices belong to the same site, as do indices that
/// are only separated by gap characters. Each site is then extended to the
/// right until `mer - 1` more non-gap characters are covered.
pub fn detect_binding_sites(
    active: &[Option<f64>],
    aligned: &str,
    mer: usize,
    positions: &[f64],
) -> SiteCall {
    let bytes = aligned.as_bytes();
    let idx: Vec<usize> = active
        .iter()
        .enumerate()
        .filter(|(i, s)| s.is_some() && *i < bytes.len())
        .map(|(i, _)| i)
        .collect();

    let mut call = SiteCall::default();
    let mut start = 0;
    for (n, &i) in idx.iter().enumerate() {
        if n == 0 || (i - idx[n - 1] > 1 && has_base(&bytes[idx[n - 1] + 1..i])) {
            start = i;
        }

        let closes = match idx.get(n + 1) {
            None => true,
            Some(&next) => next - i > 1 && has_base(&bytes[i + 1..next]),
        };
        if !closes {
            continue;
        }

        let mut end = i;
        let mut remain = mer.saturating_sub(1);
        while remain > 0 && end + 1 < bytes.len() {
            end += 1;
            if bytes[end] != b'-' {
                remain -= 1;
            }
        }

        let sub = &aligned[start..=end];
        let original_start = bytes[..start].iter().filter(|&&b| b != b'-').count();
        let covered = sub.bytes().filter(|&b| b != b'-').count();
        call.sites.push(BindingSite {
            start: positions[start],
            end: positions[end],
            subsequence: sub.to_string(),
            original_start,
            original_end: (original_start + covered).saturating_sub(1),
            present: true,
        });

        for m in GAP_RUN.find_iter(sub) {
            call.gaps.push(GapRecord {
                start: positions[start + m.start()],
                end: positions[start + m.end() - 1],
            });
        }
        for m in INSERT_RUN.find_iter(sub) {
            let (s, e) = (start + m.start(), start + m.end() - 1);
            call.insertions.push(InsertionRecord {
                position: (positions[s] + positions[e]) / 2.0,
                bases: m.as_str().to_ascii_uppercase(),
            });
        }
    }

    call
}

/// Same bases once gaps are dropped, or the same reference span.
pub fn is_equivalent(a: &BindingSite, b: &BindingSite) -> bool {
    strip_gaps(&a.subsequence) == strip_gaps(&b.subsequence)
        || (a.start, a.end) == (b.start, b.end)
}

pub fn has_equivalent(site: &BindingSite, others: &[BindingSite]) -> bool {
    others.iter().any(|o| is_equivalent(site, o))
}

/// Replaces each variant's sites by what changed against the reference:
/// sites it gained, then reference sites it lost (marked not present). The
/// reference's own list ends up empty.
pub fn diff_against_reference(sites: &mut IndexMap<String, Vec<BindingSite>>, ref_name: &str) {
    let reference = match sites.get_mut(ref_name) {
        Some(list) => std::mem::take(list),
        None => return,
    };

    for (name, list) in sites.iter_mut() {
        if name == ref_name {
            continue;
        }
        let mut diff: Vec<BindingSite> = list
            .iter()
            .filter(|s| !has_equivalent(s, &reference))
            .cloned()
            .collect();
        diff.extend(
            reference
                .iter()
                .filter(|s| !has_equivalent(s, list))
                .map(|s| BindingSite {
                    present: false,
                    ..s.clone()
                }),
        );
        *list = diff;
    }
}

/// Keeps only the first site, in sequence order, for each gap-free subsequence.
pub fn keep_first_occurrence(sites: &mut IndexMap<String, Vec<BindingSite>>) {
    let mut seen = IndexSet::new();
    for list in sites.values_mut() {
        list.retain(|s| seen.insert(strip_gaps(&s.subsequence)));
    }
}
