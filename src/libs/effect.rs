//! Per-position effect of point mutations on the strongest nearby window.

use indexmap::IndexMap;

use super::mutants::Mutation;
use super::nt::DNA_BASES;

/// Maximum over each window of `mer` scores, after padding both ends with
/// `mer - 1` empty slots. The result has one value per base of a sequence
/// that produced `scores`.
///
/// ```
/// let m = tfbind::libs::effect::sliding_max(&[1.0, 3.0, 2.0], 2);
/// assert_eq!(m, vec![1.0, 3.0, 3.0, 2.0]);
/// ```
pub fn sliding_max(scores: &[f64], mer: usize) -> Vec<f64> {
    if scores.is_empty() || mer == 0 {
        return vec![];
    }
    let pad = mer - 1;
    let total = scores.len() + pad;
    (0..total)
        .map(|p| {
            let from = p.saturating_sub(pad);
            let to = (p + 1).min(scores.len());
            scores[from..to]
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

/// For each position of the reference, how much each substitution changes the
/// best window touching that position.
///
/// Only `m{pos}{base}` entries of `mutant_scores` are read. Every map holds
/// the three bases other than the reference base at that position.
pub fn mutant_effects(
    ref_seq: &str,
    ref_scores: &[f64],
    mutant_scores: &IndexMap<String, Vec<f64>>,
    mer: usize,
) -> Vec<IndexMap<String, f64>> {
    let baseline = sliding_max(ref_scores, mer);
    if baseline.len() != ref_seq.len() {
        return vec![];
    }

    let mut effects: Vec<IndexMap<String, f64>> = ref_seq
        .bytes()
        .enumerate()
        .map(|(pos, b)| {
            DNA_BASES
                .iter()
                .filter(|&&c| c != b)
                .map(|&c| ((c as char).to_string(), -baseline[pos]))
                .collect()
        })
        .collect();

    for (name, scores) in mutant_scores {
        let Ok(Mutation::Substitution { pos, base }) = Mutation::from_name(name) else {
            continue;
        };
        if pos >= effects.len() || scores.is_empty() {
            continue;
        }
        let from = (pos + 1).saturating_sub(mer).min(scores.len() - 1);
        let to = (pos + 1).min(scores.len());
        let best = scores[from..to]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if let Some(v) = effects[pos].get_mut(&(base as char).to_string()) {
            *v = best - baseline[pos];
        }
    }

    effects
}
