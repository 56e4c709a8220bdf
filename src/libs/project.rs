//! Moves per-window scores of a variant onto its alignment to the reference.

use serde::Serialize;

use super::align::align_by_name;
use super::error::Result;

/// A variant rendered against the reference, with one position and one
/// score slot per aligned character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSequence {
    pub aligned: String,
    pub positions: Vec<f64>,
    pub scores: Vec<Option<f64>>,
}

impl AlignedSequence {
    /// Projects the raw window scores of the variant onto `aligned`.
    pub fn project(aligned: String, raw: &[Option<f64>]) -> Self {
        let positions = positions(&aligned);
        let scores = project_scores(&aligned, raw);
        Self {
            aligned,
            positions,
            scores,
        }
    }

    /// Same as [`AlignedSequence::project`] on the rendering of a named
    /// single-edit mutant, with no alignment run.
    pub fn project_named(name: &str, seq: &str, raw: &[Option<f64>]) -> Result<Self> {
        Ok(Self::project(align_by_name(name, seq)?, raw))
    }

    pub fn len(&self) -> usize {
        self.aligned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned.is_empty()
    }
}

/// `n` evenly spaced values strictly between `base` and `base + 1`.
///
/// ```
/// let f = tfbind::libs::project::insertion_fractions(3, 4.0);
/// assert_eq!(f, vec![4.25, 4.5, 4.75]);
/// ```
pub fn insertion_fractions(n: usize, base: f64) -> Vec<f64> {
    let step = 1.0 / (n as f64 + 1.0);
    (1..=n).map(|i| base + i as f64 * step).collect()
}

/// Reference coordinates of each aligned character.
///
/// Uppercase letters and `-` take the next integer. A run of lowercase
/// letters sits between the integer before it and the one after it, so an
/// insertion in front of the reference gets coordinates below zero.
///
/// ```
/// let p = tfbind::libs::project::positions("ACgTT");
/// assert_eq!(p, vec![0.0, 1.0, 1.5, 2.0, 3.0]);
/// ```
pub fn positions(aligned: &str) -> Vec<f64> {
    let bytes = aligned.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut next = 0.0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_lowercase() {
            let run = bytes[i..]
                .iter()
                .take_while(|b| b.is_ascii_lowercase())
                .count();
            out.extend(insertion_fractions(run, next - 1.0));
            i += run;
        } else {
            out.push(next);
            next += 1.0;
            i += 1;
        }
    }
    out
}

/// One slot per aligned character: `-` gets no score, every other character
/// takes the next raw score in order. Slots past the last raw score, such as
/// the final `mer - 1` bases, stay empty.
pub fn project_scores(aligned: &str, raw: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut next = raw.iter();
    aligned
        .bytes()
        .map(|b| {
            if b == b'-' {
                None
            } else {
                next.next().copied().flatten()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(v: &[f64]) -> Vec<Option<f64>> {
        v.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_positions() {
        assert_eq!(positions("ACGT"), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(positions("A-GT"), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(positions("aACG"), vec![-0.5, 0.0, 1.0, 2.0]);
        assert_eq!(positions("ACGTa"), vec![0.0, 1.0, 2.0, 3.0, 3.5]);
        assert!(positions("").is_empty());

        let p = positions("AacC");
        assert_eq!(p[0], 0.0);
        assert!((p[1] - 1.0 / 3.0).abs() < 1e-12);
        assert!((p[2] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(p[3], 1.0);
    }

    #[test]
    fn test_project_identity() {
        let raw = some(&[1.0, 2.0, 3.0]);
        let s = AlignedSequence::project("ACGTA".to_string(), &raw);
        assert_eq!(s.len(), 5);
        assert_eq!(s.scores, vec![Some(1.0), Some(2.0), Some(3.0), None, None]);
    }

    #[test]
    fn test_project_gaps_and_insertions() {
        let raw = some(&[1.0, 2.0, 3.0, 4.0]);
        let s = AlignedSequence::project("A-cGTA".to_string(), &raw);
        assert_eq!(
            s.scores,
            vec![Some(1.0), None, Some(2.0), Some(3.0), Some(4.0), None]
        );
        assert_eq!(s.positions, vec![0.0, 1.0, 1.5, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_project_named_matches_aligner() {
        use crate::libs::align::{align_pair, AlignParams};
        use crate::libs::mutants::{enumerate_mutants, Mutation};

        let p = AlignParams::default();
        // homopolymer runs at both ends
        let reference = "AACGTT";
        let bytes = reference.as_bytes();
        for (name, seq) in enumerate_mutants("wt", reference) {
            let raw = some(&vec![1.0; seq.len()]);
            let named = AlignedSequence::project_named(&name, &seq, &raw).unwrap();
            let general = AlignedSequence::project(align_pair(reference, &seq, &p), &raw);
            assert_eq!(named.positions, general.positions, "{}", name);

            match Mutation::from_name(&name).unwrap() {
                // the named gap stays where the base was deleted, the aligner
                // moves it to the start of the run
                Mutation::Deletion { pos } => {
                    assert_eq!(named.aligned.find('-'), Some(pos), "{}", name);
                    let left = general.aligned.find('-').unwrap();
                    assert!(left <= pos, "{}", name);
                    assert!(bytes[left..=pos].iter().all(|&b| b == bytes[pos]), "{}", name);
                    assert_eq!(named.aligned.replace('-', ""), general.aligned.replace('-', ""));
                }
                _ => assert_eq!(named.aligned, general.aligned, "{}", name),
            }
        }

        let d = AlignedSequence::project_named("wt_d1", "ACGTT", &some(&[1.0])).unwrap();
        assert_eq!(d.aligned, "A-CGTT");
        assert_eq!(align_pair(reference, "ACGTT", &p), "-ACGTT");

        let d = AlignedSequence::project_named("wt_d1", "AGT", &some(&[1.0, 2.0])).unwrap();
        assert_eq!(d.aligned, "A-GT");
        assert_eq!(d.positions, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(d.scores, vec![Some(1.0), None, Some(2.0), None]);

        let i = AlignedSequence::project_named("wt_i1T", "ATCGT", &some(&[1.0])).unwrap();
        assert_eq!(i.positions, vec![0.0, 0.5, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_project_keeps_missing() {
        let raw = vec![Some(1.0), None, Some(3.0)];
        assert_eq!(
            project_scores("ACGT", &raw),
            vec![Some(1.0), None, Some(3.0), None]
        );
    }
}
