use clap::*;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tfbind::libs::service::{BindingService, ServiceConfig};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("discover")
        .about("Finds binding factors first, then compares their sites")
        .after_help(
            r###"
The windows of every sequence are first looked up in the precomputed matrices
(see `tfbind identify`). Each label found is a score table path relative to
--score-dir; only those tables are loaded, and each one only counts the
windows where its label was identified. Labels with no table on disk are
skipped with a warning.

With --diff-only, sequences left without sites and tables left without
sequences are dropped from the report.

The report has the same fields as `tfbind compare`.

Examples:
1. E-score matrices, threshold 0.45
   tfbind discover tests/tfbind/seqs.fa --score-dir tests/tfbind \
       --absolute-matrix tests/tfbind/abs.tsv -a 0.45

2. Changes only, by rank
   tfbind discover tests/tfbind/seqs.fa --score-dir tests/tfbind \
       --rank-matrix tests/tfbind/rank.tsv -r 90 --diff-only

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
            Arg::new("score_dir")
                .long("score-dir")
                .short('d')
                .required(true)
                .num_args(1)
                .help("Directory the labels of the matrices are relative to"),
        )
        .arg(
            Arg::new("absolute_matrix")
                .long("absolute-matrix")
                .num_args(1)
                .help("Label by k-mer matrix of scores for --kind"),
        )
        .arg(
            Arg::new("rank_matrix")
                .long("rank-matrix")
                .num_args(1)
                .help("Label by k-mer matrix of ranks"),
        )
        .arg(
            Arg::new("ref")
                .long("ref")
                .num_args(1)
                .help("Name of the reference sequence. Defaults to the first one"),
        )
        .arg(super::arg_kind())
        .args(super::arg_thresholds())
        .arg(
            Arg::new("diff_only")
                .long("diff-only")
                .action(ArgAction::SetTrue)
                .help("Only report sites that differ from the reference"),
        )
        .arg(super::arg_cache_size())
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let (seqs, ref_name) = super::read_with_ref(args)?;
    let kind = super::kind(args);

    let mut absolute_matrices = HashMap::new();
    if let Some(path) = args.get_one::<String>("absolute_matrix") {
        absolute_matrices.insert(kind, PathBuf::from(path));
    }
    let config = ServiceConfig {
        score_dir: PathBuf::from(args.get_one::<String>("score_dir").unwrap()),
        absolute_matrices,
        rank_matrix: args.get_one::<String>("rank_matrix").map(PathBuf::from),
        align_cache: *args.get_one::<usize>("cache_size").unwrap(),
        ..Default::default()
    };
    let service = BindingService::new(config)?;

    //----------------------------
    // Ops
    //----------------------------
    let report = service.discover(
        &seqs,
        &ref_name,
        kind,
        super::thresholds(args),
        args.get_flag("diff_only"),
    )?;

    let mut writer = tfbind::writer(args.get_one::<String>("outfile").unwrap())?;
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;

    Ok(())
}
