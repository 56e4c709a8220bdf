//! Position weight matrices turned into log-odds scoring matrices.

use std::path::Path;

use super::error::{BindError, Result};
use super::nt;

const EPS: f64 = 0.00001;
const SUM_TOLERANCE: f64 = 0.01;
const BACKGROUND: f64 = 0.25;

/// Header lines of UniProbe blocks that are not probability matrices,
/// with the number of lines each block spans.
const SKIPPED_BLOCKS: &[(&str, usize)] = &[
    ("Energy matrix for enoLOGOS", 7),
    ("Reverse complement matrix for enoLOGOS", 7),
    ("Enrichment score matrix", 6),
];

#[derive(Debug, Clone)]
pub struct MotifMatrix {
    pub name: Option<String>,
    pub motif: Option<String>,
    /// Normalized probabilities, one `[A, C, G, T]` entry per position.
    probs: Vec<[f64; 4]>,
    /// log2(p / 0.25) of `probs`.
    log_odds: Vec<[f64; 4]>,
}

impl MotifMatrix {
    /// Builds from four rows (A, C, G, T) of per-position probabilities.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.len() != 4 {
            return Err(BindError::InvalidProbabilityMatrix(format!(
                "expected 4 rows, got {}",
                rows.len()
            )));
        }
        let width = rows[0].len();
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return Err(BindError::InvalidProbabilityMatrix(
                "rows are empty or of unequal length".to_string(),
            ));
        }

        let mut probs = Vec::with_capacity(width);
        for col in 0..width {
            let column = [rows[0][col], rows[1][col], rows[2][col], rows[3][col]];
            let sum: f64 = column.iter().sum();
            if (sum - 1.0).abs() > SUM_TOLERANCE {
                return Err(BindError::InvalidProbabilityMatrix(format!(
                    "column {} sums to {}",
                    col, sum
                )));
            }
            if column.iter().any(|&p| !(-EPS..=1.0 + EPS).contains(&p)) {
                return Err(BindError::InvalidProbabilityMatrix(format!(
                    "column {} has values outside [0, 1]",
                    col
                )));
            }

            let column = column.map(|p| if p <= 0.0 { EPS } else { p });
            let sum: f64 = column.iter().sum();
            probs.push(column.map(|p| p / sum));
        }

        let log_odds = probs
            .iter()
            .map(|c| c.map(|p| (p / BACKGROUND).log2()))
            .collect();

        Ok(Self {
            name: None,
            motif: None,
            probs,
            log_odds,
        })
    }

    pub fn len(&self) -> usize {
        self.log_odds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_odds.is_empty()
    }

    pub fn probabilities(&self) -> &[[f64; 4]] {
        &self.probs
    }

    pub fn log_odds(&self) -> &[[f64; 4]] {
        &self.log_odds
    }

    /// Best reachable window score: the sum of each position's maximum.
    pub fn highest_score(&self) -> f64 {
        self.log_odds
            .iter()
            .map(|c| c.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .sum()
    }

    /// One log-odds sum per window of `len()` bases.
    pub fn score(&self, seq: &str) -> Result<Vec<f64>> {
        let bytes = seq.as_bytes();
        let width = self.len();
        if bytes.len() < width {
            return Ok(vec![]);
        }

        let mut idx = Vec::with_capacity(bytes.len());
        for (pos, &b) in bytes.iter().enumerate() {
            let i = nt::base_index(b).ok_or(BindError::InvalidBase {
                base: b as char,
                pos,
            })?;
            idx.push(i);
        }

        Ok((0..=bytes.len() - width)
            .map(|start| {
                self.log_odds
                    .iter()
                    .zip(&idx[start..start + width])
                    .map(|(col, &i)| col[i])
                    .sum()
            })
            .collect())
    }

    /// Reads every probability matrix of a UniProbe PWM file.
    ///
    /// A matrix is either four `X:` prefixed lines in any base order, or a
    /// bare block of four numeric lines. Energy and enrichment blocks are
    /// skipped, as is any other annotation line.
    pub fn parse_uniprobe(content: &str) -> Result<Vec<Self>> {
        let lines: Vec<&str> = content
            .lines()
            .map(|l| l.trim_matches(|c: char| c.is_whitespace()))
            .collect();

        let mut out = vec![];
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            if line.is_empty() {
                i += 1;
                continue;
            }

            if line.len() > 1 && line.as_bytes()[1] == b':' {
                let mut block: Vec<&str> = lines[i..(i + 4).min(lines.len())].to_vec();
                block.sort_by_key(|l| l.as_bytes().first().copied());
                let rows = block
                    .iter()
                    .map(|l| parse_numbers(l.get(2..).unwrap_or("")))
                    .collect::<Result<Vec<_>>>()?;
                out.push(Self::from_rows(&rows)?);
                i += 4;
            } else if let Some((_, span)) = SKIPPED_BLOCKS.iter().find(|(h, _)| *h == line) {
                i += span;
            } else if !line.starts_with('0') {
                i += 1;
            } else {
                let block = &lines[i..(i + 4).min(lines.len())];
                let rows = block
                    .iter()
                    .map(|l| parse_numbers(l))
                    .collect::<Result<Vec<_>>>()?;
                out.push(Self::from_rows(&rows)?);
                i += 4;
            }
        }

        Ok(out)
    }

    /// Reads a CIS-BP `PWM.txt`: blank-line separated blocks of `key\tvalue`
    /// headers, then a `Pos\tA\tC\tG\tT` table with one position per row.
    pub fn parse_cisbp(content: &str) -> Result<Vec<Self>> {
        let content = content.replace('\r', "");
        let mut out = vec![];

        for block in content.split("\n\n") {
            if block.trim().is_empty() {
                continue;
            }
            let Some((header, table)) = block.split_once("Pos\tA\tC\tG\tT") else {
                continue;
            };
            let table = table.trim();
            if table.is_empty() {
                continue;
            }

            let mut name = None;
            let mut motif = None;
            for line in header.trim().lines() {
                match line.split_once('\t') {
                    Some(("TF Name", v)) => name = Some(v.trim().to_string()),
                    Some(("Motif", v)) => motif = Some(v.trim().to_string()),
                    _ => {}
                }
            }

            let mut rows = vec![vec![]; 4];
            for line in table.lines() {
                let fields: Vec<&str> = line.split('\t').skip(1).collect();
                if fields.len() != 4 {
                    return Err(BindError::InvalidProbabilityMatrix(format!(
                        "position row '{}' does not have 4 values",
                        line
                    )));
                }
                for (row, f) in rows.iter_mut().zip(fields) {
                    row.push(parse_number(f)?);
                }
            }

            let mut matrix = Self::from_rows(&rows)?;
            matrix.name = name;
            matrix.motif = motif;
            out.push(matrix);
        }

        Ok(out)
    }

    /// Picks the parser by content: CIS-BP when a `Pos\tA\tC\tG\tT` header exists.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Self>> {
        let content = std::fs::read_to_string(path)?;
        if content.contains("Pos\tA\tC\tG\tT") {
            Self::parse_cisbp(&content)
        } else {
            Self::parse_uniprobe(&content)
        }
    }
}

fn parse_number(s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| BindError::InvalidProbabilityMatrix(format!("not a number: '{}'", s)))
}

fn parse_numbers(line: &str) -> Result<Vec<f64>> {
    line.split_whitespace().map(parse_number).collect()
}
