extern crate clap;
use clap::*;

mod cmd_pgcmp;

fn main() -> anyhow::Result<()> {
    let app = Command::new("pgcmp")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`pgcmp` - Pathogen Genome CoMParison")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log more. -v for progress, -vv for debugging"),
        )
        .subcommand(cmd_pgcmp::backbone::make_subcommand())
        .subcommand(cmd_pgcmp::grimm::make_subcommand())
        .subcommand(cmd_pgcmp::snps::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Genome rearrangements:
    * backbone - progressiveMauve backbones: to GRIMM gene orders and BED tracks
    * grimm    - GRIMM reports: rearrangement steps

* Variants:
    * snps - MUMmer show-snps: to BED tracks

"###,
        );

    let matches = app.get_matches();

    env_logger::Builder::new()
        .filter_level(match matches.get_count("verbose") {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    // Check which subcomamnd the user ran...
    match matches.subcommand() {
        Some(("backbone", sub_matches)) => cmd_pgcmp::backbone::execute(sub_matches),
        Some(("grimm", sub_matches)) => cmd_pgcmp::grimm::execute(sub_matches),
        Some(("snps", sub_matches)) => cmd_pgcmp::snps::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
