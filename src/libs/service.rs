//! Load-once engine state and the three analysis pipelines built on it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use log::{debug, info, warn};

use super::align::{AlignParams, ReferenceAligner};
use super::cache::BoundedCache;
use super::effect::mutant_effects;
use super::error::{BindError, Result};
use super::identify::{KmerMatrix, ThresholdIdentifier};
use super::mutants::enumerate_mutants;
use super::project::{project_scores, AlignedSequence};
use super::report::BindingReport;
use super::score_table::{ScoreKind, ScoreTable};
use super::sites::{activity_mask, detect_binding_sites};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Relative table paths and identified labels resolve against this.
    pub score_dir: PathBuf,
    /// Absolute-score k-mer matrix per score kind.
    pub absolute_matrices: HashMap<ScoreKind, PathBuf>,
    /// Percentile-rank k-mer matrix, shared by every score kind.
    pub rank_matrix: Option<PathBuf>,
    pub table_cache: usize,
    pub align_cache: usize,
    pub align: AlignParams,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            score_dir: PathBuf::from("."),
            absolute_matrices: HashMap::new(),
            rank_matrix: None,
            table_cache: 1000,
            align_cache: 128,
            align: AlignParams::default(),
        }
    }
}

/// Absolute score and percentile thresholds; either may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub absolute: Option<f64>,
    pub rank: Option<f64>,
}

impl Thresholds {
    pub fn is_set(&self) -> bool {
        self.absolute.is_some() || self.rank.is_some()
    }
}

/// Owns the caches and identity matrices; build one and share it by reference.
pub struct BindingService {
    config: ServiceConfig,
    tables: BoundedCache<(PathBuf, ScoreKind), ScoreTable>,
    aligner: ReferenceAligner,
    identifiers: HashMap<ScoreKind, ThresholdIdentifier>,
}

impl BindingService {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let rank = match &config.rank_matrix {
            Some(path) => {
                info!("Loading rank matrix {}", path.display());
                Some(Arc::new(KmerMatrix::from_path(path)?))
            }
            None => None,
        };

        let mut identifiers = HashMap::new();
        for kind in ScoreKind::ALL {
            let absolute = match config.absolute_matrices.get(&kind) {
                Some(path) => {
                    info!("Loading {} matrix {}", kind, path.display());
                    Some(Arc::new(KmerMatrix::from_path(path)?))
                }
                None => None,
            };
            if absolute.is_none() && rank.is_none() {
                continue;
            }
            identifiers.insert(kind, ThresholdIdentifier::new(absolute, rank.clone())?);
        }

        Ok(Self {
            tables: BoundedCache::new(config.table_cache),
            aligner: ReferenceAligner::new(config.align, config.align_cache),
            identifiers,
            config,
        })
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.score_dir.join(path)
        }
    }

    /// Parsed table for a path and kind, read from disk only once.
    pub fn table(&self, name: &str, kind: ScoreKind) -> Result<Arc<ScoreTable>> {
        let path = self.resolve(name);
        let key = (path, kind);
        if let Some(table) = self.tables.get(&key) {
            debug!("Table cache hit: {} ({})", key.0.display(), kind);
            return Ok(table);
        }
        self.tables.get_or_try_insert(&key, || {
            debug!("Parsing {} for {} scores", key.0.display(), kind);
            ScoreTable::from_path(&key.0, kind)
        })
    }

    pub fn identifier(&self, kind: ScoreKind) -> Option<&ThresholdIdentifier> {
        self.identifiers.get(&kind)
    }

    /// Aligns `seq` to `reference` and projects its raw window scores.
    pub fn project(&self, reference: &str, seq: &str, raw: &[Option<f64>]) -> AlignedSequence {
        let aligned = self.aligner.align(reference, seq);
        AlignedSequence::project(aligned.as_ref().clone(), raw)
    }

    /// Scores every sequence with every table and aligns it to the reference.
    /// With a threshold, binding sites are called too; `diff_only` then keeps
    /// only the sites that differ from the reference's.
    pub fn compare(
        &self,
        seqs: &IndexMap<String, String>,
        ref_name: &str,
        tables: &[String],
        kind: ScoreKind,
        thresholds: Thresholds,
        diff_only: bool,
    ) -> Result<BindingReport> {
        let ref_seq = seqs
            .get(ref_name)
            .ok_or_else(|| BindError::MissingSequence(ref_name.to_string()))?;
        let mut report = BindingReport::new(ref_name, seqs.clone());

        for file in tables {
            let table = self.table(file, kind)?;
            let scores = table.score_sequences(seqs)?;
            report.max_scores.insert(file.clone(), table.max_score());
            let rank_cutoff = thresholds.rank.map(|p| table.rank_threshold(p));

            for (name, seq) in seqs {
                let raw = present(&scores[name]);
                let aligned = self.project(ref_seq, seq, &raw);
                if thresholds.is_set() {
                    let active = activity_mask(&aligned.scores, thresholds.absolute, rank_cutoff);
                    let call = detect_binding_sites(
                        &active,
                        &aligned.aligned,
                        table.mer(),
                        &aligned.positions,
                    );
                    report.add_call(file, name, active, call);
                }
                report.add_aligned(file, name, aligned);
            }

            if thresholds.is_set() && diff_only {
                report.diff_against_reference(file);
            }
        }

        info!(
            "Compared {} sequences on {} tables, {} sites",
            seqs.len(),
            tables.len(),
            report.site_count()
        );
        Ok(report)
    }

    /// Finds the tables worth looking at with the identifier, then calls
    /// sites only on the windows where each table's label was identified.
    pub fn discover(
        &self,
        seqs: &IndexMap<String, String>,
        ref_name: &str,
        kind: ScoreKind,
        thresholds: Thresholds,
        diff_only: bool,
    ) -> Result<BindingReport> {
        if !thresholds.is_set() {
            return Err(BindError::NoThresholdProvided);
        }
        let ref_seq = seqs
            .get(ref_name)
            .ok_or_else(|| BindError::MissingSequence(ref_name.to_string()))?;
        let identifier = self.identifier(kind).ok_or({
            if thresholds.absolute.is_some() {
                BindError::MissingIdentityMatrix("absolute")
            } else {
                BindError::MissingIdentityMatrix("rank")
            }
        })?;

        let identified = identifier.identify(seqs, thresholds.absolute, thresholds.rank)?;
        let labels: IndexSet<&String> = identified.values().flatten().flatten().collect();
        info!("Identified {} labels", labels.len());

        let mut report = BindingReport::new(ref_name, seqs.clone());
        for label in labels {
            if !self.resolve(label).is_file() {
                warn!("No score table for identified label {}", label);
                continue;
            }
            let table = self.table(label, kind)?;
            if table.mer() != identifier.mer() {
                return Err(BindError::MalformedTable(format!(
                    "{} is a {}-mer table but the matrices are {}-mer",
                    label,
                    table.mer(),
                    identifier.mer()
                )));
            }
            let scores = table.score_sequences(seqs)?;
            report.max_scores.insert(label.clone(), table.max_score());

            for (name, seq) in seqs {
                let raw = &scores[name];
                let windows = &identified[name];
                let restricted: Vec<Option<f64>> = raw
                    .iter()
                    .zip(windows)
                    .map(|(&s, ids)| ids.contains(label).then_some(s))
                    .collect();

                let aligned = self.project(ref_seq, seq, &present(raw));
                let active = project_scores(&aligned.aligned, &restricted);
                let call =
                    detect_binding_sites(&active, &aligned.aligned, table.mer(), &aligned.positions);
                report.add_call(label, name, active, call);
                report.add_aligned(label, name, aligned);
            }

            if diff_only {
                report.diff_against_reference(label);
                report.drop_empty(label);
            }
        }

        Ok(report)
    }

    /// Scores every single-edit mutant of one sequence and reports the sites
    /// they create or change, plus the effect of each substitution.
    pub fn mutate(
        &self,
        name: &str,
        seq: &str,
        tables: &[String],
        kind: ScoreKind,
        thresholds: Thresholds,
    ) -> Result<BindingReport> {
        if !thresholds.is_set() {
            return Err(BindError::NoThresholdProvided);
        }

        let mut sequences = IndexMap::new();
        sequences.insert(name.to_string(), seq.to_string());
        sequences.extend(enumerate_mutants(name, seq));
        info!("{} mutants of {}", sequences.len() - 1, name);

        let mut report = BindingReport::new(name, sequences.clone());
        for file in tables {
            let table = self.table(file, kind)?;
            let scores = table.score_sequences(&sequences)?;
            report.max_scores.insert(file.clone(), table.max_score());
            let rank_cutoff = thresholds.rank.map(|p| table.rank_threshold(p));

            for (mutant, mutant_seq) in &sequences {
                let raw = present(&scores[mutant]);
                let aligned = if mutant == name {
                    AlignedSequence::project(mutant_seq.clone(), &raw)
                } else {
                    AlignedSequence::project_named(mutant, mutant_seq, &raw)?
                };
                let active = activity_mask(&aligned.scores, thresholds.absolute, rank_cutoff);
                let call =
                    detect_binding_sites(&active, &aligned.aligned, table.mer(), &aligned.positions);
                report.add_call(file, mutant, active, call);
                report.add_aligned(file, mutant, aligned);
            }

            report.keep_first_occurrence(file);
            let effects = mutant_effects(seq, &scores[name], &scores, table.mer());
            report.mutants_effect.insert(file.clone(), effects);
            report.drop_reference_equivalents(file);
        }

        info!("{} sites left after filtering", report.site_count());
        Ok(report)
    }
}

fn present(scores: &[f64]) -> Vec<Option<f64>> {
    scores.iter().copied().map(Some).collect()
}
