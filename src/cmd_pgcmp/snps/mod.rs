pub mod to_bed;

pub fn make_subcommand() -> clap::Command {
    clap::Command::new("snps")
        .about("MUMmer show-snps tools")
        .subcommand(to_bed::make_subcommand())
}

pub fn execute(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("to-bed", sub_matches)) => to_bed::execute(sub_matches),
        _ => Ok(()),
    }
}
