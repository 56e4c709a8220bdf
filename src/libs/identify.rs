//! Which factors bind each window, from precomputed label by k-mer matrices.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use super::error::{BindError, Result};
use super::nt;

/// Score of every label for every k-mer, read from a tab-separated file
/// whose header row lists the k-mers and whose rows start with a label.
/// `NA`, `nan` and empty cells are stored as NaN and never pass a threshold.
#[derive(Debug, Clone)]
pub struct KmerMatrix {
    mer: usize,
    labels: Vec<String>,
    label_index: HashMap<String, usize>,
    columns: HashMap<String, Vec<f64>>,
    max_value: f64,
}

impl KmerMatrix {
    /// ```
    /// use tfbind::libs::identify::KmerMatrix;
    /// let m = KmerMatrix::parse("label\tAA\tAC\nTF1\t0.5\tNA\nTF2\t0.1\t0.7\n").unwrap();
    /// assert_eq!(m.mer(), 2);
    /// assert_eq!(m.labels(), ["TF1", "TF2"]);
    /// assert!(m.column("AC").unwrap()[0].is_nan());
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty());

        let header: Vec<&str> = lines
            .next()
            .ok_or_else(|| BindError::MalformedTable("empty k-mer matrix".to_string()))?
            .split('\t')
            .skip(1)
            .collect();
        let mer = header.first().map(|k| k.len()).unwrap_or(0);
        if mer == 0 || header.iter().any(|k| k.len() != mer || !nt::is_acgt(k)) {
            return Err(BindError::MalformedTable(
                "k-mer matrix header must list k-mers of one length".to_string(),
            ));
        }

        let mut labels = vec![];
        let mut rows: Vec<Vec<f64>> = vec![];
        for line in lines {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != header.len() + 1 {
                return Err(BindError::MalformedTable(format!(
                    "row '{}' has {} cells, expected {}",
                    fields[0],
                    fields.len(),
                    header.len() + 1
                )));
            }
            labels.push(fields[0].to_string());
            rows.push(fields[1..].iter().map(|c| parse_cell(c)).collect::<Result<_>>()?);
        }

        let columns = header
            .iter()
            .enumerate()
            .map(|(c, kmer)| (kmer.to_string(), rows.iter().map(|r| r[c]).collect()))
            .collect();
        let max_value = rows
            .iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(f64::NEG_INFINITY, f64::max);
        let label_index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();

        Ok(Self {
            mer,
            labels,
            label_index,
            columns,
            max_value,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn mer(&self) -> usize {
        self.mer
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// All labels' values for one k-mer, in label order.
    pub fn column(&self, kmer: &str) -> Option<&[f64]> {
        self.columns.get(kmer).map(|v| v.as_slice())
    }

    pub fn value(&self, label: &str, kmer: &str) -> Option<f64> {
        let row = *self.label_index.get(label)?;
        self.column(kmer).map(|c| c[row])
    }

    /// Largest non-missing value of the whole matrix.
    pub fn max_value(&self) -> f64 {
        self.max_value
    }
}

fn parse_cell(cell: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>()
        .map_err(|_| BindError::MalformedTable(format!("'{}' is not a number", cell)))
}

/// Labels whose matrix values clear the requested thresholds, per window.
///
/// Rank thresholds are percentiles; they are scaled by the largest value of
/// the rank matrix before comparison. With both thresholds a label has to
/// clear both.
#[derive(Debug, Clone)]
pub struct ThresholdIdentifier {
    absolute: Option<Arc<KmerMatrix>>,
    rank: Option<Arc<KmerMatrix>>,
}

impl ThresholdIdentifier {
    pub fn new(absolute: Option<Arc<KmerMatrix>>, rank: Option<Arc<KmerMatrix>>) -> Result<Self> {
        if let (Some(a), Some(r)) = (&absolute, &rank) {
            if a.mer() != r.mer() {
                return Err(BindError::MalformedTable(format!(
                    "absolute matrix is {}-mer but rank matrix is {}-mer",
                    a.mer(),
                    r.mer()
                )));
            }
        }
        if absolute.is_none() && rank.is_none() {
            return Err(BindError::MissingIdentityMatrix("absolute or rank"));
        }
        Ok(Self { absolute, rank })
    }

    pub fn mer(&self) -> usize {
        self.absolute
            .as_ref()
            .or(self.rank.as_ref())
            .map(|m| m.mer())
            .unwrap_or(0)
    }

    /// Labels of the windows of one sequence.
    pub fn identify_sequence(
        &self,
        seq: &str,
        absolute: Option<f64>,
        rank: Option<f64>,
    ) -> Result<Vec<Vec<String>>> {
        nt::check_ascii(seq)?;
        let abs_matrix = match absolute {
            Some(t) => Some((
                self.absolute
                    .as_deref()
                    .ok_or(BindError::MissingIdentityMatrix("absolute"))?,
                t,
            )),
            None => None,
        };
        let rank_matrix = match rank {
            Some(t) => {
                let m = self
                    .rank
                    .as_deref()
                    .ok_or(BindError::MissingIdentityMatrix("rank"))?;
                Some((m, t * m.max_value() / 100.0))
            }
            None => None,
        };

        let windows = nt::windows(seq, self.mer());
        let out: Vec<Vec<String>> = match (abs_matrix, rank_matrix) {
            (None, None) => return Err(BindError::NoThresholdProvided),
            (Some((m, t)), None) | (None, Some((m, t))) => windows
                .map(|kmer| passing(m, kmer, t).collect())
                .collect(),
            (Some((a, at)), Some((r, rt))) => windows
                .map(|kmer| {
                    passing(a, kmer, at)
                        .filter(|label| r.value(label, kmer).map_or(false, |v| v >= rt))
                        .collect()
                })
                .collect(),
        };
        Ok(out)
    }

    /// Labels of the windows of every sequence, keyed by sequence name.
    pub fn identify(
        &self,
        seqs: &IndexMap<String, String>,
        absolute: Option<f64>,
        rank: Option<f64>,
    ) -> Result<IndexMap<String, Vec<Vec<String>>>> {
        seqs.iter()
            .map(|(name, seq)| Ok((name.clone(), self.identify_sequence(seq, absolute, rank)?)))
            .collect()
    }
}

/// Labels of `matrix` whose value for `kmer` is at least `threshold`.
/// A k-mer missing from the matrix yields nothing.
fn passing<'a>(
    matrix: &'a KmerMatrix,
    kmer: &str,
    threshold: f64,
) -> impl Iterator<Item = String> + 'a {
    let column = matrix.column(kmer).unwrap_or(&[]);
    column
        .iter()
        .zip(matrix.labels())
        .filter(move |(v, _)| **v >= threshold)
        .map(|(_, l)| l.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABSOLUTE: &str = "\
label\tAC\tCG\tGT
TF1\t0.6\t0.2\tNA
TF2\t0.3\t0.5\t0.45
";

    const RANK: &str = "\
label\tAC\tCG\tGT
TF2\t10\t15\t2
TF1\t16\t0\t1
";

    fn identifier(abs: bool, rank: bool) -> ThresholdIdentifier {
        ThresholdIdentifier::new(
            abs.then(|| Arc::new(KmerMatrix::parse(ABSOLUTE).unwrap())),
            rank.then(|| Arc::new(KmerMatrix::parse(RANK).unwrap())),
        )
        .unwrap()
    }

    #[test]
    fn test_absolute() {
        let id = identifier(true, false);
        let labels = id.identify_sequence("ACGT", Some(0.4), None).unwrap();
        assert_eq!(
            labels,
            vec![vec!["TF1".to_string()], vec!["TF2".to_string()], vec!["TF2".to_string()]]
        );
    }

    #[test]
    fn test_rank_scaled() {
        let id = identifier(false, true);
        // 50% of the largest rank 16 is 8
        let labels = id.identify_sequence("ACG", None, Some(50.0)).unwrap();
        assert_eq!(labels[0], vec!["TF2".to_string(), "TF1".to_string()]);
        assert_eq!(labels[1], vec!["TF2".to_string()]);
    }

    #[test]
    fn test_both_thresholds_by_label() {
        let id = identifier(true, true);
        let labels = id.identify_sequence("ACG", Some(0.25), Some(75.0)).unwrap();
        // AC: TF1 0.6/16 and TF2 0.3/10; only TF1 clears rank 12
        assert_eq!(labels[0], vec!["TF1".to_string()]);
        // CG: TF2 0.5/15
        assert_eq!(labels[1], vec!["TF2".to_string()]);
    }

    #[test]
    fn test_missing_kmer_and_short_sequence() {
        let id = identifier(true, false);
        let labels = id.identify_sequence("AAC", Some(0.0), None).unwrap();
        assert!(labels[0].is_empty());
        assert_eq!(labels[1].len(), 2);
        assert!(id.identify_sequence("A", Some(0.0), None).unwrap().is_empty());
    }

    #[test]
    fn test_errors() {
        let id = identifier(true, false);
        assert!(matches!(
            id.identify_sequence("ACGT", None, None),
            Err(BindError::NoThresholdProvided)
        ));
        assert!(matches!(
            id.identify_sequence("ACGT", None, Some(0.5)),
            Err(BindError::MissingIdentityMatrix("rank"))
        ));
        assert!(matches!(
            id.identify_sequence("AC\u{FFFD}GT", Some(0.4), None),
            Err(BindError::InvalidBase { pos: 2, .. })
        ));
        assert!(ThresholdIdentifier::new(None, None).is_err());
        assert!(KmerMatrix::parse("label\tAC\tCGT\n").is_err());
        assert!(KmerMatrix::parse("label\tAC\nTF1\tx\n").is_err());
    }

    #[test]
    fn test_identify_many() {
        let id = identifier(true, false);
        let mut seqs = IndexMap::new();
        seqs.insert("s1".to_string(), "ACG".to_string());
        seqs.insert("s2".to_string(), "GT".to_string());
        let res = id.identify(&seqs, Some(0.4), None).unwrap();
        assert_eq!(res.keys().collect::<Vec<_>>(), vec!["s1", "s2"]);
        assert_eq!(res["s2"], vec![vec!["TF2".to_string()]]);
    }
}
