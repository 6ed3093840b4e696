use anyhow::Context;
use clap::*;
use pgcmp::libs::backbone::read_backbone;
use pgcmp::libs::chrom::ChromosomeIndex;
use pgcmp::libs::gene_order::{gene_orders, number_genes, write_gene_orders};
use pgcmp::libs::grimm::{parse_report, run_grimm};
use pgcmp::libs::reconcile::{reconcile, to_tracks, GapKind};
use std::io::{Read, Write};
use std::path::Path;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("to-grimm")
        .about("Convert a backbone to GRIMM gene orders, and optionally to BED tracks")
        .after_help(
            r###"
Numbers the blocks shared by both genomes along genome 1 and writes the signed gene
order of each genome in GRIMM's input format:

    >seq0
    1 2 $ 3 4
    >seq1
    1 -3 $ 2 4

Notes:
* `$` separates chromosomes. It needs --ref / --query, the FASTA files given to
  progressiveMauve, in the same order
* Without a FASTA file a genome is treated as one chromosome
* With --bed, GRIMM is run on the gene orders and its optimal rearrangement steps are
  reconciled with the backbone into three BED tracks on the reference:
    * <name>_indels         - deletions, insertions and indels
    * <name>_rearrangements - flanks of each rearrangement step
    * <name>_ambiguous      - insertions with two candidate anchors
* --grimm-output reuses a saved GRIMM report instead of running GRIMM

Examples:
1. Gene orders only:
   pgcmp backbone to-grimm aln.backbone

2. Multichromosomal gene orders:
   pgcmp backbone to-grimm aln.backbone aln.grimm -r ref.fa -q query.fa

3. BED tracks:
   pgcmp backbone to-grimm aln.backbone aln.grimm -r ref.fa -q query.fa --bed aln.bed

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input .backbone file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("outfile")
                .num_args(1)
                .index(2)
                .default_value("stdout")
                .help("Output gene orders. [stdout] or [-] for screen"),
        )
        .arg(
            Arg::new("ref")
                .long("ref")
                .short('r')
                .num_args(1)
                .help("FASTA of genome 1, the reference"),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .num_args(1)
                .help("FASTA of genome 2, the query"),
        )
        .arg(
            Arg::new("bed")
                .long("bed")
                .short('b')
                .num_args(1)
                .requires("ref")
                .help("Write BED tracks to this file"),
        )
        .arg(
            Arg::new("grimm")
                .long("grimm")
                .num_args(1)
                .default_value("grimm")
                .help("Path to the GRIMM executable"),
        )
        .arg(
            Arg::new("grimm_args")
                .long("grimm-args")
                .num_args(1)
                .allow_hyphen_values(true)
                .help("Additional arguments passed directly to GRIMM"),
        )
        .arg(
            Arg::new("grimm_output")
                .long("grimm-output")
                .num_args(1)
                .requires("bed")
                .help("A saved GRIMM report to use instead of running GRIMM"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .num_args(1)
                .help("Prefix of BED track names. Default is the stem of infile"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let outfile = args.get_one::<String>("outfile").unwrap();
    let opt_bed = args.get_one::<String>("bed");
    let opt_grimm = args.get_one::<String>("grimm").unwrap();
    let opt_grimm_args: Vec<String> = args
        .get_one::<String>("grimm_args")
        .map(|s| s.split_whitespace().map(|e| e.to_string()).collect())
        .unwrap_or_default();
    let opt_grimm_output = args.get_one::<String>("grimm_output");
    let opt_name = match args.get_one::<String>("name") {
        Some(name) => name.to_string(),
        None => pgcmp::basename(infile),
    };

    // Fail before writing anything
    if opt_bed.is_some() && opt_grimm_output.is_none() && which::which(opt_grimm).is_err() {
        anyhow::bail!(
            "{} not found or not executable. Please install GRIMM or pass --grimm-output.",
            opt_grimm
        );
    }

    //----------------------------
    // Load
    //----------------------------
    let blocks = read_backbone(pgcmp::reader(infile)?)
        .with_context(|| format!("could not parse {}", infile))?;
    let ref_index = args
        .get_one::<String>("ref")
        .map(|f| ChromosomeIndex::from_fasta(f))
        .transpose()?;
    let query_index = args
        .get_one::<String>("query")
        .map(|f| ChromosomeIndex::from_fasta(f))
        .transpose()?;
    let saved_report = match opt_grimm_output {
        Some(report_file) => {
            let mut text = String::new();
            pgcmp::reader(report_file)?
                .read_to_string(&mut text)
                .with_context(|| format!("could not read {}", report_file))?;
            Some(text)
        }
        None => None,
    };
    let bed_writer = match opt_bed {
        Some(bedfile) => Some(pgcmp::writer(bedfile)?),
        None => None,
    };

    //----------------------------
    // Gene orders
    //----------------------------
    let numbered = number_genes(&blocks);
    let orders = gene_orders(&numbered, ref_index.as_ref(), query_index.as_ref());

    {
        let mut writer = pgcmp::writer(outfile)?;
        write_gene_orders(&mut writer, &orders)?;
        writer.flush()?;
    }

    let mut writer = match bed_writer {
        Some(writer) => writer,
        None => return Ok(()),
    };
    let ref_index = match ref_index.as_ref() {
        Some(index) => index,
        None => anyhow::bail!("--bed needs the reference FASTA, --ref"),
    };

    //----------------------------
    // GRIMM
    //----------------------------
    let report_text = match saved_report {
        Some(text) => text,
        None if outfile == "stdout" || outfile == "-" => {
            // GRIMM reads from a file
            let mut temp_file = tempfile::NamedTempFile::new()?;
            write_gene_orders(&mut temp_file, &orders)?;
            temp_file.flush()?;
            run_grimm(opt_grimm, temp_file.path(), &opt_grimm_args)?
        }
        None => run_grimm(opt_grimm, Path::new(outfile), &opt_grimm_args)?,
    };
    let report = parse_report(&report_text)?;
    if let Some(distance) = report.distance() {
        log::info!("Rearrangement distance: {}", distance);
    }

    //----------------------------
    // BED
    //----------------------------
    let rec = reconcile(&numbered, &report.steps)?;
    log::info!(
        "{} deletion(s), {} insertion(s), {} indel(s), {} ambiguous insertion(s), {} step(s)",
        rec.count(GapKind::Deletion),
        rec.count(GapKind::Insertion),
        rec.count(GapKind::Indel),
        rec.count(GapKind::AmbiguousInsertion),
        rec.events.len()
    );

    for track in to_tracks(&rec, ref_index, &opt_name) {
        track.write(&mut writer)?;
    }
    writer.flush()?;

    Ok(())
}
