use anyhow::Context;
use clap::*;
use pgcmp::libs::bed::Track;
use pgcmp::libs::snps::read_snps;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("to-bed")
        .about("Convert MUMmer show-snps output to a BED track")
        .after_help(
            r###"
Writes one 1 bp feature per SNP on the reference (not the query) genome, named
`R > Q` and colored by the query base:
    A red, T magenta, C blue, G green

Notes:
* Run show-snps with -IHTClr: tab-delimited, headerless, with sequence lengths
  and without indels
* show-snps positions are 1-based, BED is 0-based

Examples:
1. Convert:
   show-snps -IHTClr aln.delta > aln.snps
   pgcmp snps to-bed aln.snps -o aln.snv.bed

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input .snps file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .num_args(1)
                .help("Track name. Default is <stem of infile>_snv"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let name = match args.get_one::<String>("name") {
        Some(name) => name.to_string(),
        None => format!("{}_snv", pgcmp::basename(infile)),
    };

    let snps = read_snps(pgcmp::reader(infile)?).with_context(|| format!("could not parse {}", infile))?;

    let mut track = Track::new(&name, "SNPs called by MUMmer");
    track.features = snps.iter().map(|snp| snp.to_bed()).collect();

    let mut writer = pgcmp::writer(args.get_one::<String>("outfile").unwrap())?;
    track.write(&mut writer)?;
    writer.flush()?;

    Ok(())
}
