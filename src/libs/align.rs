//! Global alignment of a variant against a reference with affine gaps.
//!
//! Only the variant is written out: a matched column keeps the variant base,
//! a reference base facing a gap becomes `-`, and a variant base facing a gap
//! in the reference is lowercased. Gaps in the reference are priced so high
//! that they only appear when the variant is longer than the reference.

use std::sync::Arc;

use super::cache::BoundedCache;
use super::error::{BindError, Result};
use super::mutants::Mutation;
use super::nt;

/// Scores of the three-state affine-gap alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignParams {
    pub match_score: f64,
    pub mismatch: f64,
    /// Opening a gap in the variant (a deletion).
    pub gap_open: f64,
    pub gap_extend: f64,
    /// Opening a gap in the reference (an insertion).
    pub ref_gap_open: f64,
    pub ref_gap_extend: f64,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            match_score: 2.0,
            mismatch: -1.0,
            gap_open: -0.5,
            gap_extend: -0.1,
            ref_gap_open: -1_000_000.0,
            ref_gap_extend: -1_000_000.0,
        }
    }
}

// Scores are sums of the parameters, so anything this close is a tie.
const TIE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Diag,
    Del,
    Ins,
}

/// Best candidate, earlier entries winning ties.
fn pick(cands: [(f64, Step); 3]) -> (f64, Step) {
    let best = cands
        .iter()
        .map(|c| c.0)
        .fold(f64::NEG_INFINITY, f64::max);
    cands
        .into_iter()
        .find(|c| c.0 >= best - TIE)
        .unwrap_or(cands[0])
}

/// Aligns `variant` to `reference` and renders the variant side.
///
/// Tracing back from the end with matches preferred over deletions over
/// insertions places every gap at its leftmost equivalent position.
///
/// ```
/// use tfbind::libs::align::{align_pair, AlignParams};
/// let p = AlignParams::default();
/// assert_eq!(align_pair("ACGT", "ACGT", &p), "ACGT");
/// assert_eq!(align_pair("ACGT", "AGT", &p), "A-GT");
/// assert_eq!(align_pair("ACGT", "ACGGT", &p), "ACgGT");
/// ```
pub fn align_pair(reference: &str, variant: &str, params: &AlignParams) -> String {
    let r = reference.as_bytes();
    let v = variant.as_bytes();
    let (n, m) = (r.len(), v.len());
    let w = m + 1;
    let at = |i: usize, j: usize| i * w + j;

    let size = (n + 1) * w;
    let mut mat = vec![f64::NEG_INFINITY; size];
    let mut del = vec![f64::NEG_INFINITY; size];
    let mut ins = vec![f64::NEG_INFINITY; size];
    let mut tb_mat = vec![Step::Diag; size];
    let mut tb_del = vec![Step::Diag; size];
    let mut tb_ins = vec![Step::Diag; size];
    mat[at(0, 0)] = 0.0;

    for i in 0..=n {
        for j in 0..=m {
            if i > 0 && j > 0 {
                let p = at(i - 1, j - 1);
                let (best, step) = pick([
                    (mat[p], Step::Diag),
                    (del[p], Step::Del),
                    (ins[p], Step::Ins),
                ]);
                let s = if r[i - 1].eq_ignore_ascii_case(&v[j - 1]) {
                    params.match_score
                } else {
                    params.mismatch
                };
                mat[at(i, j)] = best + s;
                tb_mat[at(i, j)] = step;
            }
            if i > 0 {
                let p = at(i - 1, j);
                let (best, step) = pick([
                    (mat[p] + params.gap_open, Step::Diag),
                    (del[p] + params.gap_extend, Step::Del),
                    (ins[p] + params.gap_open, Step::Ins),
                ]);
                del[at(i, j)] = best;
                tb_del[at(i, j)] = step;
            }
            if j > 0 {
                let p = at(i, j - 1);
                let (best, step) = pick([
                    (mat[p] + params.ref_gap_open, Step::Diag),
                    (del[p] + params.ref_gap_open, Step::Del),
                    (ins[p] + params.ref_gap_extend, Step::Ins),
                ]);
                ins[at(i, j)] = best;
                tb_ins[at(i, j)] = step;
            }
        }
    }

    let end = at(n, m);
    let (_, mut state) = pick([
        (mat[end], Step::Diag),
        (del[end], Step::Del),
        (ins[end], Step::Ins),
    ]);

    let mut out = Vec::with_capacity(n.max(m) + 1);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let cell = at(i, j);
        match state {
            Step::Diag => {
                out.push(v[j - 1]);
                state = tb_mat[cell];
                i -= 1;
                j -= 1;
            }
            Step::Del => {
                out.push(b'-');
                state = tb_del[cell];
                i -= 1;
            }
            Step::Ins => {
                out.push(v[j - 1].to_ascii_lowercase());
                state = tb_ins[cell];
                j -= 1;
            }
        }
    }
    out.reverse();

    String::from_utf8(out).unwrap_or_default()
}

/// Renders a named single-edit mutant without running the aligner.
///
/// Substitutions come back unchanged, the inserted base is lowercased and a
/// `-` is put back where the deleted base was. Enumerated insertions already
/// sit at the start of their run, so they match [`align_pair`]; a deletion
/// inside a run keeps its named index, where `align_pair` would put the gap
/// at the start of the run.
///
/// ```
/// use tfbind::libs::align::align_by_name;
/// assert_eq!(align_by_name("wt_m1T", "ATGT").unwrap(), "ATGT");
/// assert_eq!(align_by_name("wt_i2A", "ACAGT").unwrap(), "ACaGT");
/// assert_eq!(align_by_name("wt_d1", "AGT").unwrap(), "A-GT");
/// ```
pub fn align_by_name(name: &str, seq: &str) -> Result<String> {
    nt::check_ascii(seq)?;
    let mutation = Mutation::from_name(name)?;
    let out_of_range = || BindError::InvalidMutationName(name.to_string());

    match mutation {
        Mutation::Substitution { .. } => Ok(seq.to_string()),
        Mutation::Insertion { pos, .. } => {
            let base = seq.get(pos..pos + 1).ok_or_else(out_of_range)?;
            Ok(format!(
                "{}{}{}",
                &seq[..pos],
                base.to_ascii_lowercase(),
                &seq[pos + 1..]
            ))
        }
        Mutation::Deletion { pos } => {
            if pos > seq.len() {
                return Err(out_of_range());
            }
            Ok(format!("{}-{}", &seq[..pos], &seq[pos..]))
        }
    }
}

/// Aligner with memoized results, shared by every request of a service.
pub struct ReferenceAligner {
    params: AlignParams,
    memo: BoundedCache<(String, String), String>,
}

impl ReferenceAligner {
    pub fn new(params: AlignParams, capacity: usize) -> Self {
        Self {
            params,
            memo: BoundedCache::new(capacity),
        }
    }

    pub fn align(&self, reference: &str, variant: &str) -> Arc<String> {
        let key = (reference.to_string(), variant.to_string());
        let res: std::result::Result<_, std::convert::Infallible> = self
            .memo
            .get_or_try_insert(&key, || Ok(align_pair(reference, variant, &self.params)));
        match res {
            Ok(aligned) => aligned,
            Err(never) => match never {},
        }
    }

    pub fn cached(&self) -> usize {
        self.memo.len()
    }
}
