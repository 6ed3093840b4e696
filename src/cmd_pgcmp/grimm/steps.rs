use clap::*;
use pgcmp::libs::grimm::parse_report;
use std::io::{Read, Write};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("steps")
        .about("Extract the rearrangement steps of a GRIMM report")
        .after_help(
            r###"
Parses the output of `grimm -f <file>` and writes:

* The header fields as comment lines, `# key: value`
* One tab-separated line per rearrangement step:
    step chrom_1 gene_1_pos gene_1_num chrom_2 gene_2_pos gene_2_num operation

Step 0, the starting genome, is not a rearrangement and is left out.

Examples:
1. From a saved report:
   pgcmp grimm steps aln.grimm.out

2. Straight from GRIMM:
   grimm -f aln.grimm | pgcmp grimm steps stdin

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("GRIMM report. [stdin] for standard input"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let mut text = String::new();
    pgcmp::reader(infile)?.read_to_string(&mut text)?;

    let report = parse_report(&text)?;

    let mut writer = pgcmp::writer(args.get_one::<String>("outfile").unwrap())?;
    for (key, value) in &report.header {
        writer.write_fmt(format_args!("# {}: {}\n", key, value))?;
    }
    writer.write_fmt(format_args!(
        "step\tchrom_1\tgene_1_pos\tgene_1_num\tchrom_2\tgene_2_pos\tgene_2_num\toperation\n"
    ))?;
    for step in &report.steps {
        writer.write_fmt(format_args!("{}\n", step))?;
    }
    writer.flush()?;

    Ok(())
}
