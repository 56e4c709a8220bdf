use clap::*;
use std::io::Write;
use tfbind::libs::motif::MotifMatrix;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("pwm")
        .about("Scores sequences with position weight matrices")
        .after_help(
            r###"
Reads UniProbe PWM files (A:, C:, G:, T: rows in any order, or a bare block of
four numeric rows) and CIS-BP PWM.txt files (one position per row under a
`Pos A C G T` header). Each column is checked to sum to 1 and turned into
log2(p / 0.25), zeros being replaced by 1e-5 first.

Output columns: matrix, name, 0-based window start, log-odds score.
The matrix is named by its CIS-BP motif ID, or by its 1-based index.

Examples:
1. Log-odds scores of every window
   tfbind pwm tests/tfbind/motif.pwm tests/tfbind/seqs.fa

2. Length and best reachable score of each matrix
   tfbind pwm tests/tfbind/motif.pwm --info

"###,
        )
        .arg(
            Arg::new("matrix")
                .required(true)
                .num_args(1)
                .index(1)
                .help("PWM file"),
        )
        .arg(
            Arg::new("infile")
                .required_unless_present("info")
                .num_args(1)
                .index(2)
                .help("Input FASTA file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("info")
                .long("info")
                .action(ArgAction::SetTrue)
                .help("Print the length and the highest score of each matrix instead"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let matrix_file = args.get_one::<String>("matrix").unwrap();
    let mut writer = tfbind::writer(args.get_one::<String>("outfile").unwrap())?;

    let content = tfbind::read_to_string(matrix_file)?;
    let matrices = if content.contains("Pos\tA\tC\tG\tT") {
        MotifMatrix::parse_cisbp(&content)?
    } else {
        MotifMatrix::parse_uniprobe(&content)?
    };
    if matrices.is_empty() {
        anyhow::bail!("No matrix found in {}", matrix_file);
    }

    let labeled: Vec<(String, &MotifMatrix)> = matrices
        .iter()
        .enumerate()
        .map(|(i, m)| (m.motif.clone().unwrap_or_else(|| (i + 1).to_string()), m))
        .collect();

    if args.get_flag("info") {
        for (label, m) in &labeled {
            writeln!(writer, "{}\t{}\t{:.4}", label, m.len(), m.highest_score())?;
        }
        return Ok(());
    }

    let seqs = tfbind::read_fasta(args.get_one::<String>("infile").unwrap())?;
    for (label, m) in &labeled {
        for (name, seq) in &seqs {
            for (i, score) in m.score(seq)?.iter().enumerate() {
                writeln!(writer, "{}\t{}\t{}\t{:.4}", label, name, i, score)?;
            }
        }
    }

    Ok(())
}
