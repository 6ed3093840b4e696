pub mod to_grimm;

pub fn make_subcommand() -> clap::Command {
    clap::Command::new("backbone")
        .about("progressiveMauve backbone tools")
        .after_help(
            r###"Note:
Only backbones of two genomes are supported. Genome 1 (seq0) is the reference.
"###,
        )
        .subcommand(to_grimm::make_subcommand())
}

pub fn execute(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("to-grimm", sub_matches)) => to_grimm::execute(sub_matches),
        _ => Ok(()),
    }
}
