use itertools::Itertools;

use super::error::{BindError, Result};

/// Alphabet used for k-mer keys, mutants and matrix rows, in row order.
pub const DNA_BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Row index of an uppercase base in an A,C,G,T ordered matrix.
pub fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

pub fn is_acgt(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| base_index(b).is_some())
}

/// Fails on the first character that is not ASCII, so byte offsets into the
/// sequence are safe to slice by.
pub fn check_ascii(seq: &str) -> Result<()> {
    match seq.char_indices().find(|(_, c)| !c.is_ascii()) {
        Some((pos, base)) => Err(BindError::InvalidBase { base, pos }),
        None => Ok(()),
    }
}

/// ```
/// assert_eq!(tfbind::libs::nt::revcomp("AACG"), "CGTT");
/// ```
pub fn revcomp(s: &str) -> String {
    String::from_utf8(bio::alphabets::dna::revcomp(s.as_bytes())).unwrap_or_default()
}

/// Every k-mer over ACGT, in lexicographic order.
///
/// ```
/// let mers = tfbind::libs::nt::all_kmers(2);
/// assert_eq!(mers.len(), 16);
/// assert_eq!(mers[0], "AA");
/// assert_eq!(mers[15], "TT");
/// ```
pub fn all_kmers(k: usize) -> Vec<String> {
    if k == 0 {
        return vec![];
    }
    (0..k)
        .map(|_| DNA_BASES.iter().map(|&b| b as char))
        .multi_cartesian_product()
        .map(|v| v.into_iter().collect())
        .collect()
}

/// Sliding windows of `k` bytes; empty when the sequence is shorter.
///
/// Windows that would split a multi-byte character are left out; run
/// [`check_ascii`] first where that matters.
pub fn windows(seq: &str, k: usize) -> impl Iterator<Item = &str> {
    let n = if k == 0 || seq.len() < k {
        0
    } else {
        seq.len() - k + 1
    };
    (0..n).filter_map(move |i| seq.get(i..i + k))
}
