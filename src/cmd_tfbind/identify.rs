use clap::*;
use std::io::Write;
use std::sync::Arc;
use tfbind::libs::identify::{KmerMatrix, ThresholdIdentifier};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("identify")
        .about("Lists the factors binding each window, from precomputed matrices")
        .after_help(
            r###"
A matrix is a TSV with a header row `label` followed by every k-mer, and one
row per factor. `NA` or empty cells never pass a threshold.

--absolute compares against the --absolute-matrix values directly.
--rank is a percentile, scaled by the largest value of --rank-matrix.
With both, a factor has to clear both.

Output columns: name, 0-based window start, k-mer, comma-separated labels.
Windows without labels are skipped.

Examples:
1. Factors with an E-score of at least 0.45
   tfbind identify tests/tfbind/seqs.fa --absolute-matrix tests/tfbind/abs.tsv -a 0.45

2. Add a rank cutoff
   tfbind identify tests/tfbind/seqs.fa \
       --absolute-matrix tests/tfbind/abs.tsv --rank-matrix tests/tfbind/rank.tsv \
       -a 0.45 -r 90

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input FASTA file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("absolute_matrix")
                .long("absolute-matrix")
                .num_args(1)
                .help("Label by k-mer matrix of scores"),
        )
        .arg(
            Arg::new("rank_matrix")
                .long("rank-matrix")
                .num_args(1)
                .help("Label by k-mer matrix of ranks"),
        )
        .args(super::arg_thresholds())
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let seqs = tfbind::read_fasta(args.get_one::<String>("infile").unwrap())?;
    let thresholds = super::thresholds(args);
    let mut writer = tfbind::writer(args.get_one::<String>("outfile").unwrap())?;

    let load = |id: &str| -> anyhow::Result<Option<Arc<KmerMatrix>>> {
        match args.get_one::<String>(id) {
            Some(path) => {
                let content = tfbind::read_to_string(path)?;
                Ok(Some(Arc::new(KmerMatrix::parse(&content)?)))
            }
            None => Ok(None),
        }
    };
    let identifier = ThresholdIdentifier::new(load("absolute_matrix")?, load("rank_matrix")?)?;

    //----------------------------
    // Ops
    //----------------------------
    let identified = identifier.identify(&seqs, thresholds.absolute, thresholds.rank)?;
    let mer = identifier.mer();
    for (name, windows) in &identified {
        let seq = &seqs[name];
        for (i, labels) in windows.iter().enumerate() {
            if labels.is_empty() {
                continue;
            }
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                name,
                i,
                &seq[i..i + mer],
                labels.join(",")
            )?;
        }
    }

    Ok(())
}
