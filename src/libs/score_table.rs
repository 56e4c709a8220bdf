//! K-mer affinity tables from protein-binding microarray experiments.
//!
//! A table maps every k-mer (and its complement, listed in the second column
//! of the file) to one binding score. Files come in several tab-separated
//! layouts which are told apart by their column count only:
//!
//! | columns | primary | alternate | secondary |
//! |---------|---------|-----------|-----------|
//! | 3       | 2       |           |           |
//! | 4       | 2 or 3  | 3 or 2    |           |
//! | 5       | 2       | 4         | 3         |
//! | 9, 20   | 3       | 2         | 4         |
//!
//! The 4-column layout puts the primary score first when the first value of
//! column 2 is at most 0.5.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use indexmap::IndexMap;

use super::cache::BoundedCache;
use super::error::{BindError, Result};
use super::nt;

/// Score given to `NA` and empty cells, below any realistic threshold.
pub const MISSING_SCORE: f64 = -0.5;

/// Which of the binding metrics a table is read for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreKind {
    /// Enrichment score (E-score).
    Primary,
    /// Median signal intensity (I-score).
    Alternate,
    /// Variability-normalized score (Z-score).
    Secondary,
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 3] = [ScoreKind::Primary, ScoreKind::Alternate, ScoreKind::Secondary];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreKind::Primary => "primary",
            ScoreKind::Alternate => "alternate",
            ScoreKind::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScoreKind {
    type Err = BindError;

    /// Accepts the generic names and the microarray ones (`escore`, `iscore`, `zscore`).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "primary" | "escore" | "e" => Ok(ScoreKind::Primary),
            "alternate" | "iscore" | "i" => Ok(ScoreKind::Alternate),
            "secondary" | "zscore" | "z" => Ok(ScoreKind::Secondary),
            _ => Err(BindError::UnknownScoreKind {
                kind: s.to_string(),
                columns: 0,
            }),
        }
    }
}

type Fields = &'static [(ScoreKind, usize)];

const LAYOUTS: &[(usize, Fields)] = &[
    (3, &[(ScoreKind::Primary, 2)]),
    (
        5,
        &[
            (ScoreKind::Primary, 2),
            (ScoreKind::Secondary, 3),
            (ScoreKind::Alternate, 4),
        ],
    ),
    (
        9,
        &[
            (ScoreKind::Alternate, 2),
            (ScoreKind::Primary, 3),
            (ScoreKind::Secondary, 4),
        ],
    ),
    (
        20,
        &[
            (ScoreKind::Alternate, 2),
            (ScoreKind::Primary, 3),
            (ScoreKind::Secondary, 4),
        ],
    ),
];

const LAYOUT_4_PRIMARY_FIRST: Fields = &[(ScoreKind::Primary, 2), (ScoreKind::Alternate, 3)];
const LAYOUT_4_ALTERNATE_FIRST: Fields = &[(ScoreKind::Alternate, 2), (ScoreKind::Primary, 3)];

/// Column-to-kind mapping for a table, given its first data row.
pub fn detect_layout(first_row: &[&str]) -> Result<Fields> {
    let columns = first_row.len();
    if let Some((_, fields)) = LAYOUTS.iter().find(|(n, _)| *n == columns) {
        return Ok(fields);
    }
    if columns == 4 {
        let v = parse_cell(first_row[2])?;
        return Ok(if v <= 0.5 {
            LAYOUT_4_PRIMARY_FIRST
        } else {
            LAYOUT_4_ALTERNATE_FIRST
        });
    }
    Err(BindError::UnsupportedLayout { columns })
}

fn parse_cell(cell: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "NA" {
        return Ok(MISSING_SCORE);
    }
    cell.parse::<f64>()
        .map_err(|_| BindError::MalformedTable(format!("not a number: '{}'", cell)))
}

fn split_rows(raw: &str) -> Vec<Vec<&str>> {
    raw.trim_matches(|c| c == ' ' || c == '\r' || c == '\n')
        .split('\n')
        .map(|l| l.trim_matches(|c| c == ' ' || c == '\r' || c == '\n'))
        .filter(|l| !l.is_empty())
        .map(|l| l.split('\t').collect())
        .collect()
}

/// A k-mer to score lookup read for one score kind.
pub struct ScoreTable {
    mer: usize,
    scores: HashMap<String, f64>,
    sorted: OnceLock<Vec<f64>>,
    rank_memo: BoundedCache<u64, f64>,
}

impl fmt::Debug for ScoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreTable")
            .field("mer", &self.mer)
            .field("kmers", &self.scores.len())
            .finish()
    }
}

/// One table of a multi-experiment file, with the labels found in its header.
#[derive(Debug)]
pub struct NamedTable {
    pub name: String,
    pub motif: String,
    pub table: ScoreTable,
}

impl ScoreTable {
    /// `mer` is the length of the first data row's k-mer; every key must match it.
    fn from_scores(mer: usize, scores: HashMap<String, f64>) -> Result<Self> {
        if mer == 0 || scores.is_empty() {
            return Err(BindError::MalformedTable("no k-mer rows".to_string()));
        }
        if let Some(k) = scores.keys().find(|k| k.len() != mer) {
            return Err(BindError::MalformedTable(format!(
                "k-mer '{}' is not {} bases long",
                k, mer
            )));
        }
        Ok(Self {
            mer,
            scores,
            sorted: OnceLock::new(),
            rank_memo: BoundedCache::new(1000),
        })
    }

    /// Parses the single-experiment layouts.
    ///
    /// ```
    /// use tfbind::libs::score_table::{ScoreKind, ScoreTable};
    /// let raw = "8-mer\t8-mer\tE-score\nAA\tTT\t0.4\nAC\tGT\t-0.1\n";
    /// let table = ScoreTable::parse(raw, ScoreKind::Primary).unwrap();
    /// assert_eq!(table.mer(), 2);
    /// assert_eq!(table.get("TT"), Some(0.4));
    /// ```
    pub fn parse(raw: &str, kind: ScoreKind) -> Result<Self> {
        let mut rows = split_rows(raw);
        if rows.is_empty() {
            return Err(BindError::MalformedTable("empty table".to_string()));
        }
        if rows[0][0].bytes().any(|b| nt::base_index(b).is_none()) {
            rows.remove(0);
        }
        if rows.is_empty() {
            return Err(BindError::MalformedTable("header without rows".to_string()));
        }

        let columns = rows[0].len();
        let fields = detect_layout(&rows[0])?;
        let idx = fields
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, i)| *i)
            .ok_or_else(|| BindError::UnknownScoreKind {
                kind: kind.to_string(),
                columns,
            })?;
        log::debug!("{}-column table, {} score in column {}", columns, kind, idx);

        let mut values = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() <= idx {
                return Err(BindError::MalformedTable(format!(
                    "row '{}' has {} columns, expected {}",
                    row.join("\t"),
                    row.len(),
                    columns
                )));
            }
            values.push(parse_cell(row[idx])?);
        }

        // forward keys first, complements overwrite on collision
        let mut scores = HashMap::with_capacity(rows.len() * 2);
        for (row, v) in rows.iter().zip(&values) {
            scores.insert(row[0].to_string(), *v);
        }
        for (row, v) in rows.iter().zip(&values) {
            scores.insert(row[1].to_string(), *v);
        }

        Self::from_scores(rows[0][0].len(), scores)
    }

    pub fn from_path<P: AsRef<Path>>(path: P, kind: ScoreKind) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw, kind)
    }

    /// Parses a CIS-BP style file: a `joinID` k-mer column followed by one
    /// score column per experiment. Complements are derived by reverse
    /// complementing each k-mer.
    pub fn parse_cisbp(raw: &str) -> Result<Vec<NamedTable>> {
        let rows = split_rows(raw);
        let Some((header, body)) = rows.split_first() else {
            return Err(BindError::MalformedTable("empty table".to_string()));
        };

        let mer = body.first().map_or(0, |row| row[0].len());

        let mut tables = vec![];
        for (col, title) in header.iter().enumerate().skip(1) {
            let motif = title
                .split(':')
                .nth(2)
                .and_then(|s| s.split('=').next())
                .unwrap_or(title)
                .to_string();
            let name = motif.split('_').next().unwrap_or(&motif).to_string();

            let mut scores = HashMap::with_capacity(body.len() * 2);
            for row in body {
                let cell = row.get(col).ok_or_else(|| {
                    BindError::MalformedTable(format!("row '{}' is short", row.join("\t")))
                })?;
                let v = parse_cell(cell)?;
                scores.insert(row[0].to_string(), v);
                scores.insert(nt::revcomp(row[0]), v);
            }
            tables.push(NamedTable {
                name,
                motif,
                table: Self::from_scores(mer, scores)?,
            });
        }

        Ok(tables)
    }

    pub fn mer(&self) -> usize {
        self.mer
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn get(&self, kmer: &str) -> Option<f64> {
        self.scores.get(kmer).copied()
    }

    /// One score per window of `mer` bases; a window absent from the table is an error.
    pub fn score(&self, seq: &str) -> Result<Vec<f64>> {
        nt::check_ascii(seq)?;
        nt::windows(seq, self.mer)
            .map(|w| {
                self.get(w).ok_or_else(|| BindError::MissingKmer {
                    kmer: w.to_string(),
                })
            })
            .collect()
    }

    pub fn score_sequences(&self, seqs: &IndexMap<String, String>) -> Result<IndexMap<String, Vec<f64>>> {
        seqs.iter()
            .map(|(name, seq)| Ok((name.clone(), self.score(seq)?)))
            .collect()
    }

    pub fn max_score(&self) -> f64 {
        self.scores.values().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Score found at the `percentile`-th position of all values, ascending.
    pub fn rank_threshold(&self, percentile: f64) -> f64 {
        let key = percentile.to_bits();
        if let Some(v) = self.rank_memo.get(&key) {
            return *v;
        }

        let sorted = self.sorted.get_or_init(|| {
            let mut v: Vec<f64> = self.scores.values().copied().collect();
            v.sort_by(|a, b| a.total_cmp(b));
            v
        });
        let n = sorted.len();
        let idx = ((n as f64) * percentile / 100.0).floor().max(0.0) as usize;
        let value = sorted[idx.min(n - 1)];

        self.rank_memo
            .get_or_try_insert::<(), _>(&key, || Ok(value))
            .map(|v| *v)
            .unwrap_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn nine_col() -> String {
        let mut s = String::from("8-mer\tcomp\tmedian\tE-score\tZ-score\tp1\tp2\tq1\tq2\n");
        s += "AA\tTT\t1200\t0.45\t3.1\t0\t0\t0\t0\n";
        s += "AC\tGT\t800\t0.12\t1.0\t0\t0\t0\t0\n";
        s += "AG\tCT\t500\tNA\t0.5\t0\t0\t0\t0\n";
        s
    }

    #[test]
    fn test_nine_column_layout() {
        let t = ScoreTable::parse(&nine_col(), ScoreKind::Primary).unwrap();
        assert_eq!(t.mer(), 2);
        assert_eq!(t.len(), 6);
        assert_relative_eq!(t.get("AA").unwrap(), 0.45);
        assert_relative_eq!(t.get("TT").unwrap(), 0.45);
        assert_relative_eq!(t.get("CT").unwrap(), MISSING_SCORE);

        let t = ScoreTable::parse(&nine_col(), ScoreKind::Alternate).unwrap();
        assert_relative_eq!(t.get("GT").unwrap(), 800.0);
        let t = ScoreTable::parse(&nine_col(), ScoreKind::Secondary).unwrap();
        assert_relative_eq!(t.get("AG").unwrap(), 0.5);
    }

    #[test]
    fn test_five_column_layout() {
        let raw = "AA\tTT\t0.3\t2.0\t900\nAC\tGT\t0.1\t1.0\t700\n";
        let t = ScoreTable::parse(raw, ScoreKind::Secondary).unwrap();
        assert_relative_eq!(t.get("AA").unwrap(), 2.0);
        let t = ScoreTable::parse(raw, ScoreKind::Alternate).unwrap();
        assert_relative_eq!(t.get("GT").unwrap(), 700.0);
    }

    #[test]
    fn test_four_column_heuristic() {
        let low = "AA\tTT\t0.3\t900\nAC\tGT\t0.1\t700\n";
        let t = ScoreTable::parse(low, ScoreKind::Primary).unwrap();
        assert_relative_eq!(t.get("AA").unwrap(), 0.3);

        let high = "AA\tTT\t900\t0.3\nAC\tGT\t700\t0.1\n";
        let t = ScoreTable::parse(high, ScoreKind::Primary).unwrap();
        assert_relative_eq!(t.get("AA").unwrap(), 0.3);
        let t = ScoreTable::parse(high, ScoreKind::Alternate).unwrap();
        assert_relative_eq!(t.get("AC").unwrap(), 700.0);
    }

    #[test]
    fn test_layout_errors() {
        let res = ScoreTable::parse("AA\tTT\t1\t2\t3\t4\n", ScoreKind::Primary);
        assert!(matches!(res, Err(BindError::UnsupportedLayout { columns: 6 })));

        let res = ScoreTable::parse("AA\tTT\t0.3\nAC\tGT\t0.2\n", ScoreKind::Secondary);
        assert!(matches!(res, Err(BindError::UnknownScoreKind { .. })));

        let res = ScoreTable::parse("AA\tTT\tabc\n", ScoreKind::Primary);
        assert!(matches!(res, Err(BindError::MalformedTable(_))));
    }

    #[test]
    fn test_kmer_lengths_must_agree() {
        // k comes from the first data row
        let raw = "8-mer\tcomp\tE\nAAC\tGTT\t0.1\n";
        let t = ScoreTable::parse(raw, ScoreKind::Primary).unwrap();
        assert_eq!(t.mer(), 3);

        let res = ScoreTable::parse("AA\tTT\t0.1\nACG\tCGT\t0.2\n", ScoreKind::Primary);
        assert!(matches!(res, Err(BindError::MalformedTable(_))));

        // an empty complement cell
        let res = ScoreTable::parse("AA\tTT\t0.1\nAC\t\t0.2\n", ScoreKind::Primary);
        assert!(matches!(res, Err(BindError::MalformedTable(_))));

        let res = ScoreTable::parse_cisbp("joinID\tM01:x:A_pbm\nAAC\t0.4\nAC\t0.1\n");
        assert!(matches!(res, Err(BindError::MalformedTable(_))));
    }

    #[test]
    fn test_complement_overwrites() {
        // AT is its own complement; the complement pass wins
        let raw = "AT\tAT\t0.1\nTA\tAT\t0.2\n";
        let t = ScoreTable::parse(raw, ScoreKind::Primary).unwrap();
        assert_relative_eq!(t.get("AT").unwrap(), 0.2);
        assert_relative_eq!(t.get("TA").unwrap(), 0.2);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let a = ScoreTable::parse(&nine_col(), ScoreKind::Primary).unwrap();
        let b = ScoreTable::parse(&nine_col(), ScoreKind::Primary).unwrap();
        assert_eq!(a.mer(), b.mer());
        assert_eq!(a.scores, b.scores);
    }

    #[test]
    fn test_score_and_missing_kmer() {
        let t = ScoreTable::parse(&nine_col(), ScoreKind::Primary).unwrap();
        let scores = t.score("AACT").unwrap();
        assert_eq!(scores.len(), 3);
        assert_relative_eq!(scores[0], 0.45);
        assert_relative_eq!(scores[1], 0.12);
        assert_relative_eq!(scores[2], MISSING_SCORE);

        assert!(t.score("A").unwrap().is_empty());
        match t.score("AAN") {
            Err(BindError::MissingKmer { kmer }) => assert_eq!(kmer, "AN"),
            other => panic!("unexpected {:?}", other),
        }
        match t.score("AC\u{FFFD}GT") {
            Err(BindError::InvalidBase { base, pos }) => {
                assert_eq!(base, '\u{FFFD}');
                assert_eq!(pos, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_max_and_rank() {
        let t = ScoreTable::parse(&nine_col(), ScoreKind::Primary).unwrap();
        assert_relative_eq!(t.max_score(), 0.45);
        // sorted: -0.5 -0.5 0.12 0.12 0.45 0.45
        assert_relative_eq!(t.rank_threshold(0.0), -0.5);
        assert_relative_eq!(t.rank_threshold(50.0), 0.12);
        assert_relative_eq!(t.rank_threshold(90.0), 0.45);
        assert_relative_eq!(t.rank_threshold(100.0), 0.45);
        // memoized
        assert_relative_eq!(t.rank_threshold(50.0), 0.12);
    }

    #[test]
    fn test_cisbp() {
        let raw = "joinID\tM01:x:FOXA1_pbm=1\tM02:y:1234_z\nAAC\t0.4\tNA\nACG\t0.1\t0.3\n";
        let tables = ScoreTable::parse_cisbp(raw).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "FOXA1");
        assert_eq!(tables[0].motif, "FOXA1_pbm");
        assert_relative_eq!(tables[0].table.get("GTT").unwrap(), 0.4);
        assert_eq!(tables[1].name, "1234");
        assert_relative_eq!(tables[1].table.get("AAC").unwrap(), MISSING_SCORE);
        assert_relative_eq!(tables[1].table.get("CGT").unwrap(), 0.3);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!("escore".parse::<ScoreKind>().unwrap(), ScoreKind::Primary);
        assert_eq!("Z".parse::<ScoreKind>().unwrap(), ScoreKind::Secondary);
        assert_eq!("alternate".parse::<ScoreKind>().unwrap(), ScoreKind::Alternate);
        assert!("pwm".parse::<ScoreKind>().is_err());
    }
}
