use clap::*;
use std::io::Write;
use tfbind::libs::align::{align_by_name, ReferenceAligner};
use tfbind::libs::project::positions;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("align")
        .about("Renders sequences in the coordinates of a reference")
        .after_help(
            r###"
Each sequence is aligned globally to the reference with affine gaps.
The reference is never gapped unless a sequence is longer than it:

* uppercase - a base facing a reference base, matched or not
* `-`       - a reference base missing from the sequence
* lowercase - a base inserted in the sequence

Among equally good alignments, gaps are put at their leftmost position.

Scores: match 2, mismatch -1, gap open -0.5, gap extend -0.1.
Gaps in the reference cost -1e6.

With --named, sequences named `{ref}_m{i}{b}`, `{ref}_i{i}{b}` and `{ref}_d{i}`
(as written by `tfbind mutants`) are rendered from their names.

With --positions, a TSV of the reference coordinate of every aligned
character is written instead; inserted bases get fractions.

Examples:
1. Align all sequences to the first one
   tfbind align tests/tfbind/seqs.fa

2. Pick the reference
   tfbind align tests/tfbind/seqs.fa --ref del

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
            Arg::new("ref")
                .long("ref")
                .num_args(1)
                .help("Name of the reference sequence. Defaults to the first one"),
        )
        .arg(
            Arg::new("named")
                .long("named")
                .action(ArgAction::SetTrue)
                .help("Render single-edit mutants from their names"),
        )
        .arg(
            Arg::new("positions")
                .long("positions")
                .action(ArgAction::SetTrue)
                .help("Write coordinates instead of aligned sequences"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let (seqs, ref_name) = super::read_with_ref(args)?;
    let is_named = args.get_flag("named");
    let mut writer = tfbind::writer(args.get_one::<String>("outfile").unwrap())?;

    let aligner = ReferenceAligner::new(Default::default(), seqs.len().max(1));
    let reference = &seqs[&ref_name];

    for (name, seq) in &seqs {
        let aligned = if name == &ref_name {
            seq.to_string()
        } else if is_named {
            align_by_name(name, seq)?
        } else {
            aligner.align(reference, seq).to_string()
        };

        if args.get_flag("positions") {
            let pos: Vec<String> = positions(&aligned).iter().map(|p| format!("{}", p)).collect();
            writeln!(writer, "{}\t{}", name, pos.join(","))?;
        } else {
            writeln!(writer, ">{}\n{}", name, aligned)?;
        }
    }

    Ok(())
}
