use clap::*;
use std::io::Write;
use tfbind::libs::service::{BindingService, ServiceConfig};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("mutate")
        .about("Reports binding sites created or changed by single-edit mutants")
        .after_help(
            r###"
The input holds one sequence. All of its substitution, insertion and deletion
mutants (see `tfbind mutants`) are scored with every table and their sites are
called. Then, per table:

* a site whose bases (gaps dropped) were already seen in the reference or an
  earlier mutant is removed
* a mutant site equal to a reference site is removed
* mutants left without sites are dropped

`mutants_effect` lists, for every reference position, how each substitution
changes the best score among the windows covering that position.

Examples:
1. Mutations around a site with an E-score above 0.45
   tfbind mutate tests/tfbind/one.fa -t tests/tfbind/escore.txt -a 0.45

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input FASTA file with one sequence. [stdin] for standard input"),
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
        .arg(super::arg_kind())
        .args(super::arg_thresholds())
        .arg(super::arg_outfile())
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let seqs = tfbind::read_fasta(infile)?;
    if seqs.len() != 1 {
        anyhow::bail!("{} has {} sequences, expected one", infile, seqs.len());
    }
    let (name, seq) = seqs.first().ok_or_else(|| anyhow::anyhow!("{} is empty", infile))?;
    let tables: Vec<String> = args.get_many::<String>("table").unwrap().cloned().collect();

    let service = BindingService::new(ServiceConfig::default())?;

    //----------------------------
    // Ops
    //----------------------------
    let report = service.mutate(name, seq, &tables, super::kind(args), super::thresholds(args))?;

    let mut writer = tfbind::writer(args.get_one::<String>("outfile").unwrap())?;
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;

    Ok(())
}
