pub mod steps;

pub fn make_subcommand() -> clap::Command {
    clap::Command::new("grimm")
        .about("GRIMM report tools")
        .subcommand(steps::make_subcommand())
}

pub fn execute(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("steps", sub_matches)) => steps::execute(sub_matches),
        _ => Ok(()),
    }
}
