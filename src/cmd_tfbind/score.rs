use clap::*;
use std::io::Write;
use tfbind::libs::score_table::ScoreTable;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("score")
        .about("Scores every window of sequences with a k-mer table")
        .after_help(
            r###"
Input table layouts are detected by their column count:

    columns   primary   alternate   secondary
    3         2
    4         2 or 3    3 or 2
    5         2         4           3
    9, 20     3         2           4

Columns are 0-based. The first two columns hold a k-mer and its complement.
A header row is present when the first field is not made of A, C, G and T.
`NA` or empty cells get -0.5.

With --cisbp the table is a CIS-BP E-score file: a k-mer column followed by
one column per experiment.

Output columns: [table], name, 0-based window start, k-mer, score.

Examples:
1. Scores against a 4-mer E-score table
   tfbind score tests/tfbind/escore.txt tests/tfbind/seqs.fa

2. Z-scores
   tfbind score tests/tfbind/escore.txt tests/tfbind/seqs.fa --kind secondary

3. Max score and the 90th percentile of a table
   tfbind score tests/tfbind/escore.txt --stat --rank 90

"###,
        )
        .arg(
            Arg::new("table")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Score table file"),
        )
        .arg(
            Arg::new("infile")
                .required_unless_present("stat")
                .num_args(1)
                .index(2)
                .help("Input FASTA file. [stdin] for standard input"),
        )
        .arg(super::arg_kind())
        .arg(
            Arg::new("cisbp")
                .long("cisbp")
                .action(ArgAction::SetTrue)
                .help("The table is a CIS-BP multi-experiment E-score file"),
        )
        .arg(
            Arg::new("stat")
                .long("stat")
                .action(ArgAction::SetTrue)
                .help("Print k, the number of k-mers and the max score instead"),
        )
        .arg(
            Arg::new("rank")
                .long("rank")
                .num_args(1)
                .value_parser(value_parser!(f64))
                .help("With --stat, also print the score at this percentile"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let table_file = args.get_one::<String>("table").unwrap();
    let kind = super::kind(args);
    let mut writer = tfbind::writer(args.get_one::<String>("outfile").unwrap())?;

    let tables: Vec<(Option<String>, ScoreTable)> = if args.get_flag("cisbp") {
        let raw = tfbind::read_to_string(table_file)?;
        ScoreTable::parse_cisbp(&raw)?
            .into_iter()
            .map(|t| (Some(t.motif), t.table))
            .collect()
    } else {
        let raw = tfbind::read_to_string(table_file)?;
        vec![(None, ScoreTable::parse(&raw, kind)?)]
    };
    log::info!("Loaded {} table(s) from {}", tables.len(), table_file);

    //----------------------------
    // Ops
    //----------------------------
    if args.get_flag("stat") {
        let rank = args.get_one::<f64>("rank").copied();
        for (label, table) in &tables {
            let prefix = label.as_ref().map(|l| format!("{}\t", l)).unwrap_or_default();
            write!(writer, "{}{}\t{}\t{}", prefix, table.mer(), table.len(), table.max_score())?;
            if let Some(p) = rank {
                write!(writer, "\t{}", table.rank_threshold(p))?;
            }
            writeln!(writer)?;
        }
        return Ok(());
    }

    let seqs = tfbind::read_fasta(args.get_one::<String>("infile").unwrap())?;
    for (label, table) in &tables {
        let prefix = label.as_ref().map(|l| format!("{}\t", l)).unwrap_or_default();
        for (name, seq) in &seqs {
            let scores = table.score(seq)?;
            for (i, (kmer, score)) in tfbind::libs::nt::windows(seq, table.mer())
                .zip(scores)
                .enumerate()
            {
                writeln!(writer, "{}{}\t{}\t{}\t{}", prefix, name, i, kmer, score)?;
            }
        }
    }

    Ok(())
}
