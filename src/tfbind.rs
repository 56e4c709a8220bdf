extern crate clap;
use clap::*;
use log::LevelFilter;
use std::io::Write;

mod cmd_tfbind;

fn main() -> anyhow::Result<()> {
    let app = Command::new("tfbind")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`tfbind` - Transcription factor binding sites along DNA sequences")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("Increase logging verbosity: -v info, -vv debug, -vvv trace"),
        )
        .subcommand(cmd_tfbind::score::make_subcommand())
        .subcommand(cmd_tfbind::pwm::make_subcommand())
        .subcommand(cmd_tfbind::align::make_subcommand())
        .subcommand(cmd_tfbind::mutants::make_subcommand())
        .subcommand(cmd_tfbind::identify::make_subcommand())
        .subcommand(cmd_tfbind::compare::make_subcommand())
        .subcommand(cmd_tfbind::discover::make_subcommand())
        .subcommand(cmd_tfbind::mutate::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Scoring:
    * score    - k-mer table scores of every window
    * pwm      - log-odds scores from position weight matrices
    * identify - factors clearing thresholds in precomputed matrices

* Variants:
    * align    - variants rendered against a reference
    * mutants  - all single-edit mutants of a sequence

* Binding sites:
    * compare  - sites of variants against a reference
    * discover - identify factors first, then compare their sites
    * mutate   - sites created or changed by every single-edit mutant

"###,
        );

    let matches = app.get_matches();
    init_logger(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("score", sub_matches)) => cmd_tfbind::score::execute(sub_matches),
        Some(("pwm", sub_matches)) => cmd_tfbind::pwm::execute(sub_matches),
        Some(("align", sub_matches)) => cmd_tfbind::align::execute(sub_matches),
        Some(("mutants", sub_matches)) => cmd_tfbind::mutants::execute(sub_matches),
        Some(("identify", sub_matches)) => cmd_tfbind::identify::execute(sub_matches),
        Some(("compare", sub_matches)) => cmd_tfbind::compare::execute(sub_matches),
        Some(("discover", sub_matches)) => cmd_tfbind::discover::execute(sub_matches),
        Some(("mutate", sub_matches)) => cmd_tfbind::mutate::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}

fn init_logger(verbosity: u8) {
    let filter_level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(buf, "{ts} [{}] - {}", record.level(), record.args())
        })
        .filter_level(filter_level)
        .init();
}
