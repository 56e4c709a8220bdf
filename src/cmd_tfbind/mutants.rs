use clap::*;
use tfbind::libs::mutants::enumerate_mutants;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("mutants")
        .about("Writes every single-edit mutant of sequences")
        .after_help(
            r###"
For a sequence of length N, mutants are written in this order:

* substitutions  {name}_m{i}{b}  - 3N, position i becomes base b
* insertions     {name}_i{i}{b}  - base b inserted before position i;
                                   all 4 bases at 0, then 3 per later
                                   position, skipping the base before it
* deletions      {name}_d{i}     - N, position i removed

Each input record is written first, followed by its mutants.

Examples:
1. All mutants of each record
   tfbind mutants tests/tfbind/seqs.fa

2. Without the input records
   tfbind mutants tests/tfbind/seqs.fa --no-origin

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
            Arg::new("no_origin")
                .long("no-origin")
                .action(ArgAction::SetTrue)
                .help("Do not write the input records"),
        )
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let seqs = tfbind::read_fasta(args.get_one::<String>("infile").unwrap())?;
    let no_origin = args.get_flag("no_origin");
    let mut writer = tfbind::writer(args.get_one::<String>("outfile").unwrap())?;

    for (name, seq) in &seqs {
        if !no_origin {
            tfbind::write_fasta(&mut writer, [(name, seq)])?;
        }
        let mutants = enumerate_mutants(name, seq);
        log::info!("{}: {} mutants", name, mutants.len());
        tfbind::write_fasta(&mut writer, &mutants)?;
    }

    Ok(())
}
