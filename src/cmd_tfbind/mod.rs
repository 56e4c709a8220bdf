//! Subcommand modules for the `tfbind` binary.

pub mod align;
pub mod compare;
pub mod discover;
pub mod identify;
pub mod mutants;
pub mod mutate;
pub mod pwm;
pub mod score;

use clap::*;
use tfbind::libs::score_table::ScoreKind;
use tfbind::libs::service::Thresholds;

pub fn arg_kind() -> Arg {
    Arg::new("kind")
        .long("kind")
        .short('k')
        .num_args(1)
        .default_value("primary")
        .value_parser(|s: &str| s.parse::<ScoreKind>().map_err(|e| e.to_string()))
        .help("Score kind: primary (E-score), alternate (I-score) or secondary (Z-score)")
}

pub fn arg_thresholds() -> [Arg; 2] {
    [
        Arg::new("absolute")
            .long("absolute")
            .short('a')
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Windows scoring at least this are active"),
        Arg::new("rank")
            .long("rank")
            .short('r')
            .num_args(1)
            .value_parser(value_parser!(f64))
            .help("Windows at or above this percentile (0-100) are active"),
    ]
}

pub fn arg_cache_size() -> Arg {
    Arg::new("cache_size")
        .long("cache-size")
        .num_args(1)
        .default_value("128")
        .value_parser(value_parser!(usize))
        .help("Number of alignments kept in memory")
}

pub fn arg_outfile() -> Arg {
    Arg::new("outfile")
        .long("outfile")
        .short('o')
        .num_args(1)
        .default_value("stdout")
        .help("Output filename. [stdout] for screen")
}

pub fn kind(args: &ArgMatches) -> ScoreKind {
    *args.get_one::<ScoreKind>("kind").unwrap()
}

pub fn thresholds(args: &ArgMatches) -> Thresholds {
    Thresholds {
        absolute: args.get_one::<f64>("absolute").copied(),
        rank: args.get_one::<f64>("rank").copied(),
    }
}

/// Sequences of the input file, plus the reference name: `--ref` or the first record.
pub fn read_with_ref(
    args: &ArgMatches,
) -> anyhow::Result<(indexmap::IndexMap<String, String>, String)> {
    let infile = args.get_one::<String>("infile").unwrap();
    let seqs = tfbind::read_fasta(infile)?;
    let first = match seqs.keys().next() {
        Some(name) => name.to_string(),
        None => anyhow::bail!("No sequences in {}", infile),
    };

    let ref_name = args.get_one::<String>("ref").cloned().unwrap_or(first);
    if !seqs.contains_key(&ref_name) {
        anyhow::bail!("Reference {} is not in {}", ref_name, infile);
    }

    Ok((seqs, ref_name))
}
