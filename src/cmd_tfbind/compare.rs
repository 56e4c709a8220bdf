use clap::*;
use std::io::Write;
use tfbind::libs::service::{BindingService, ServiceConfig};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("compare")
        .about("Compares binding sites of sequences against a reference")
        .after_help(
            r###"
For every score table, every sequence is scored, aligned to the reference and
its window scores are moved onto the alignment. With --absolute or --rank, runs
of windows clearing the thresholds are reported as binding sites, each
extended by k - 1 bases to cover its last window.

With --diff-only, a sequence keeps only the sites the reference does not have,
plus the reference sites it lost (`"present": false`). Two sites are the same
when their bases match once gaps are dropped, or when they span the same
reference coordinates.

The report is JSON with these fields:
    ref_name, sequence_strs, aligned_seqs, aligned_positions,
    aligned_scores, max_scores, highest_values, binding_sites,
    gaps, insertions

Examples:
1. Sites of an E-score above 0.45
   tfbind compare tests/tfbind/seqs.fa -t tests/tfbind/escore.txt -a 0.45

2. Only what changed against `ref`, using the 95th percentile of each table
   tfbind compare tests/tfbind/seqs.fa -t tests/tfbind/escore.txt \
       --ref ref -r 95 --diff-only

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
            Arg::new("table")
                .long("table")
                .short('t')
                .required(true)
                .num_args(1)
                .action(ArgAction::Append)
                .help("Score table file; may be repeated"),
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
    let tables: Vec<String> = args.get_many::<String>("table").unwrap().cloned().collect();
    let thresholds = super::thresholds(args);
    if args.get_flag("diff_only") && !thresholds.is_set() {
        log::warn!("--diff-only has no effect without --absolute or --rank");
    }

    let service = BindingService::new(ServiceConfig {
        align_cache: *args.get_one::<usize>("cache_size").unwrap(),
        ..Default::default()
    })?;

    //----------------------------
    // Ops
    //----------------------------
    let report = service.compare(
        &seqs,
        &ref_name,
        &tables,
        super::kind(args),
        thresholds,
        args.get_flag("diff_only"),
    )?;

    let mut writer = tfbind::writer(args.get_one::<String>("outfile").unwrap())?;
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;

    Ok(())
}
