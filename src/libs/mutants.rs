//! Single-edit mutants of a sequence and their canonical names.
//!
//! For a sequence of length N the suffixes are
//!
//! * `m{i}{b}` - position `i` substituted by base `b`
//! * `i{i}{b}` - base `b` inserted before position `i`, `i` in `0..=N`
//! * `d{i}`    - position `i` deleted
//!
//! and a mutant is named `{name}_{suffix}`.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use super::error::{BindError, Result};
use super::nt::{self, DNA_BASES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Substitution { pos: usize, base: u8 },
    Insertion { pos: usize, base: u8 },
    Deletion { pos: usize },
}

impl Mutation {
    /// Reads the edit from the last `_` separated part of a mutant name.
    pub fn from_name(name: &str) -> Result<Self> {
        let suffix = name.rsplit('_').next().unwrap_or(name);
        suffix
            .parse()
            .map_err(|_| BindError::InvalidMutationName(name.to_string()))
    }

    /// Applies the edit to the sequence it was derived from.
    pub fn apply(&self, seq: &str) -> Result<String> {
        nt::check_ascii(seq)?;
        let out_of_range = || {
            BindError::InvalidMutationName(format!("{} on a {}bp sequence", self, seq.len()))
        };
        match *self {
            Mutation::Substitution { pos, base } => {
                if pos >= seq.len() {
                    return Err(out_of_range());
                }
                Ok(format!("{}{}{}", &seq[..pos], base as char, &seq[pos + 1..]))
            }
            Mutation::Insertion { pos, base } => {
                if pos > seq.len() {
                    return Err(out_of_range());
                }
                Ok(format!("{}{}{}", &seq[..pos], base as char, &seq[pos..]))
            }
            Mutation::Deletion { pos } => {
                if pos >= seq.len() {
                    return Err(out_of_range());
                }
                Ok(format!("{}{}", &seq[..pos], &seq[pos + 1..]))
            }
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Substitution { pos, base } => write!(f, "m{}{}", pos, *base as char),
            Mutation::Insertion { pos, base } => write!(f, "i{}{}", pos, *base as char),
            Mutation::Deletion { pos } => write!(f, "d{}", pos),
        }
    }
}

impl FromStr for Mutation {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BindError::InvalidMutationName(s.to_string());
        let bytes = s.as_bytes();
        if bytes.len() < 2 {
            return Err(invalid());
        }

        let parse_pos = |digits: &str| -> Result<usize> {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            digits.parse::<usize>().map_err(|_| invalid())
        };
        let parse_base = |b: u8| -> Result<u8> {
            if DNA_BASES.contains(&b) {
                Ok(b)
            } else {
                Err(invalid())
            }
        };

        match bytes[0] {
            b'm' | b'i' => {
                let base = parse_base(bytes[bytes.len() - 1])?;
                let pos = parse_pos(&s[1..s.len() - 1])?;
                if bytes[0] == b'm' {
                    Ok(Mutation::Substitution { pos, base })
                } else {
                    Ok(Mutation::Insertion { pos, base })
                }
            }
            b'd' => Ok(Mutation::Deletion {
                pos: parse_pos(&s[1..])?,
            }),
            _ => Err(invalid()),
        }
    }
}

/// Every other base at every position.
pub fn point_mutations(seq: &str) -> IndexMap<String, String> {
    let mut mutants = IndexMap::new();
    for (pos, b) in seq.bytes().enumerate() {
        for &base in DNA_BASES.iter().filter(|&&c| c != b) {
            let m = Mutation::Substitution { pos, base };
            mutants.insert(m.to_string(), splice(seq, pos, pos + 1, Some(base)));
        }
    }
    mutants
}

/// All four bases before the first position; after that, inserting the base
/// just before the insertion point is skipped since it repeats the previous
/// insertion's sequence.
pub fn insertions(seq: &str) -> IndexMap<String, String> {
    let mut mutants = IndexMap::new();
    for &base in DNA_BASES.iter() {
        let m = Mutation::Insertion { pos: 0, base };
        mutants.insert(m.to_string(), splice(seq, 0, 0, Some(base)));
    }
    for (i, b) in seq.bytes().enumerate() {
        for &base in DNA_BASES.iter().filter(|&&c| c != b) {
            let m = Mutation::Insertion { pos: i + 1, base };
            mutants.insert(m.to_string(), splice(seq, i + 1, i + 1, Some(base)));
        }
    }
    mutants
}

pub fn deletions(seq: &str) -> IndexMap<String, String> {
    (0..seq.len())
        .map(|pos| {
            let m = Mutation::Deletion { pos };
            (m.to_string(), splice(seq, pos, pos + 1, None))
        })
        .collect()
}

/// Substitutions, then insertions, then deletions, keyed `{name}_{suffix}`.
/// The unmutated sequence itself is not included.
pub fn enumerate_mutants(name: &str, seq: &str) -> IndexMap<String, String> {
    let mut mutants = IndexMap::new();
    for (suffix, s) in point_mutations(seq)
        .into_iter()
        .chain(insertions(seq))
        .chain(deletions(seq))
    {
        mutants.insert(format!("{}_{}", name, suffix), s);
    }
    mutants
}

fn splice(seq: &str, from: usize, to: usize, base: Option<u8>) -> String {
    let bytes = seq.as_bytes();
    let mut s = Vec::with_capacity(bytes.len() + 1);
    s.extend_from_slice(&bytes[..from]);
    s.extend(base);
    s.extend_from_slice(&bytes[to..]);
    String::from_utf8_lossy(&s).into_owned()
}
