//! Reading the report of GRIMM, the genome rearrangement distance calculator.
//!
//! A report is three parts separated by `=` rules: a `Key: Value` header, a middle
//! part we don't use, and the optimal sequence of rearrangements:
//!
//! ```text
//! Number of Genes:	5 + 4 caps
//! Number of Chromosomes:	2 (multichromosomal)
//! Multichromosomal Distance:	2
//! ======================================================================
//! ...
//! ======================================================================
//! An optimal sequence of rearrangements:
//! Step 0: (Source)
//! Step 1: Chrom. 1, gene 2 [2] through chrom. 1, gene 3 [3]: Reversal
//! ```
//!
//! In `gene 2 [3]` the first number is the position within the chromosome and the
//! bracketed one is the signed gene label.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::path::Path;

lazy_static! {
    static ref RE_RULE: Regex = Regex::new(r"(?m)^={10,}[ \t]*\r?$").unwrap();
    static ref RE_STEP: Regex = Regex::new(
        r"^Step (\d+): Chrom\. (\d+), gene (\d+) \[(-?\d+)\] through chrom\. (\d+), gene (\d+) \[(-?\d+)\]:\s*(.+)$"
    )
    .unwrap();
    static ref RE_INT: Regex = Regex::new(r"^-?\d+$").unwrap();
    static ref RE_PAREN: Regex = Regex::new(r"\s*\(.*\)\s*$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Reversal,
    Translocation,
    Fission,
    Fusion,
    Other(String),
}

impl Operation {
    /// Chromosome caps (gene labels beyond the backbone) may show up in these.
    pub fn allows_caps(&self) -> bool {
        matches!(
            self,
            Operation::Fission | Operation::Fusion | Operation::Translocation
        )
    }
}

impl From<&str> for Operation {
    fn from(s: &str) -> Self {
        match s.trim() {
            "Reversal" => Operation::Reversal,
            "Translocation" => Operation::Translocation,
            "Fission" => Operation::Fission,
            "Fusion" => Operation::Fusion,
            other => Operation::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Reversal => write!(f, "Reversal"),
            Operation::Translocation => write!(f, "Translocation"),
            Operation::Fission => write!(f, "Fission"),
            Operation::Fusion => write!(f, "Fusion"),
            Operation::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RearrangementStep {
    pub step: usize,
    pub chrom_1: usize,
    pub gene_1_pos: usize,
    pub gene_1_num: i64,
    pub chrom_2: usize,
    pub gene_2_pos: usize,
    pub gene_2_num: i64,
    pub operation: Operation,
}

impl RearrangementStep {
    /// Parses one trace line, `None` for anything else
    ///
    /// ```
    /// # use pgcmp::libs::grimm::{Operation, RearrangementStep};
    /// let line = "Step 3: Chrom. 1, gene 4 [-7] through chrom. 2, gene 1 [12]: Translocation ";
    /// let step = RearrangementStep::parse(line).unwrap();
    /// assert_eq!(step.step, 3);
    /// assert_eq!(step.gene_1_pos, 4);
    /// assert_eq!(step.gene_1_num, -7);
    /// assert_eq!(step.chrom_2, 2);
    /// assert_eq!(step.gene_2_num, 12);
    /// assert_eq!(step.operation, Operation::Translocation);
    ///
    /// assert!(RearrangementStep::parse("Step 0: (Source)").is_none());
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let caps = RE_STEP.captures(line.trim())?;
        Some(Self {
            step: caps[1].parse().ok()?,
            chrom_1: caps[2].parse().ok()?,
            gene_1_pos: caps[3].parse().ok()?,
            gene_1_num: caps[4].parse().ok()?,
            chrom_2: caps[5].parse().ok()?,
            gene_2_pos: caps[6].parse().ok()?,
            gene_2_num: caps[7].parse().ok()?,
            operation: Operation::from(caps[8].trim()),
        })
    }
}

impl fmt::Display for RearrangementStep {
    /// Tab separated
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.step,
            self.chrom_1,
            self.gene_1_pos,
            self.gene_1_num,
            self.chrom_2,
            self.gene_2_pos,
            self.gene_2_num,
            self.operation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Int(v) => write!(f, "{}", v),
            HeaderValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrimmReport {
    pub header: IndexMap<String, HeaderValue>,
    pub steps: Vec<RearrangementStep>,
}

impl GrimmReport {
    pub fn distance(&self) -> Option<i64> {
        self.header
            .iter()
            .find(|(k, _)| k.ends_with("Distance"))
            .and_then(|(_, v)| match v {
                HeaderValue::Int(d) => Some(*d),
                HeaderValue::Text(_) => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrimmError {
    /// The report lacks the expected three parts
    Malformed(String),
    /// GRIMM exited with an error
    ToolFailed { status: String, stderr: String },
}

impl fmt::Display for GrimmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrimmError::Malformed(msg) => write!(f, "Malformed GRIMM output: {}", msg),
            GrimmError::ToolFailed { status, stderr } => {
                write!(f, "GRIMM failed ({}):\n{}", status, stderr)
            }
        }
    }
}

impl std::error::Error for GrimmError {}

fn parse_header(part: &str) -> IndexMap<String, HeaderValue> {
    let mut header = IndexMap::new();
    for line in part.lines() {
        let (key, value) = match line.split_once(':') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => continue,
        };
        if key.is_empty() {
            continue;
        }

        let value = if key == "Number of Chromosomes" {
            RE_PAREN.replace(value, "").to_string()
        } else {
            value.to_string()
        };
        let value = if RE_INT.is_match(&value) {
            match value.parse::<i64>() {
                Ok(v) => HeaderValue::Int(v),
                Err(_) => HeaderValue::Text(value),
            }
        } else {
            HeaderValue::Text(value)
        };

        header.insert(key.to_string(), value);
    }
    header
}

/// Parses a whole GRIMM report. The starting state, step 0, is dropped.
pub fn parse_report(output: &str) -> Result<GrimmReport, GrimmError> {
    let parts: Vec<&str> = RE_RULE.splitn(output, 3).collect();
    if parts.len() < 3 {
        return Err(GrimmError::Malformed(format!(
            "expected 3 parts separated by rules, found {}",
            parts.len()
        )));
    }

    let header = parse_header(parts[0]);
    let steps: Vec<RearrangementStep> = parts[2]
        .lines()
        .filter_map(RearrangementStep::parse)
        .filter(|s| s.step != 0)
        .collect();
    log::info!("GRIMM reported {} rearrangement step(s)", steps.len());

    Ok(GrimmReport { header, steps })
}

/// Runs `<bin> -f <infile> [args]` and returns its standard output.
///
/// There is no timeout; the call blocks until GRIMM exits.
pub fn run_grimm(bin: &str, infile: &Path, args: &[String]) -> anyhow::Result<String> {
    let exe = match which::which(bin) {
        Ok(exe) => exe,
        Err(_) => anyhow::bail!("{} not found or not executable. Please install GRIMM first.", bin),
    };
    log::info!("Running {} -f {}", exe.display(), infile.display());

    let output = std::process::Command::new(&exe)
        .arg("-f")
        .arg(infile)
        .args(args)
        .output()?;

    if !output.status.success() {
        return Err(GrimmError::ToolFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
        .into());
    }

    Ok(String::from_utf8(output.stdout)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Number of Genes:\t5 + 4 caps
Number of Chromosomes:\t2 (multichromosomal)
Multichromosomal Distance:\t3

======================================================================

Genome1:
Chrom. 1: 1 2 3 $
Chrom. 2: 4 5 $

======================================================================

An optimal sequence of rearrangements:
Step 0: (Source)
Chrom. 1: 1 2 3 $
Chrom. 2: 4 5 $
Step 1: Chrom. 1, gene 2 [2] through chrom. 1, gene 3 [3]: Reversal
Chrom. 1: 1 -3 -2 $
Chrom. 2: 4 5 $
Step 2: Chrom. 1, gene 3 [-2] through chrom. 2, gene 1 [4]: Translocation
Step 3: Chrom. 2, gene 2 [5] through chrom. 2, gene 3 [9]: Fission
";

    #[test]
    fn test_parse_report() {
        let report = parse_report(REPORT).unwrap();

        assert_eq!(
            report.header.get("Number of Genes"),
            Some(&HeaderValue::Text("5 + 4 caps".to_string()))
        );
        assert_eq!(
            report.header.get("Number of Chromosomes"),
            Some(&HeaderValue::Int(2))
        );
        assert_eq!(report.distance(), Some(3));
        assert_eq!(report.header.keys().next().unwrap(), "Number of Genes");

        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.steps[0].operation, Operation::Reversal);
        assert_eq!(report.steps[1].gene_1_num, -2);
        assert_eq!(report.steps[1].chrom_2, 2);
        assert_eq!(report.steps[2].operation, Operation::Fission);
        assert_eq!(
            report.steps[2].to_string(),
            "3\t2\t2\t5\t2\t3\t9\tFission"
        );
    }

    #[test]
    fn test_step_zero_dropped() {
        let report = "a: 1\n==========\n\n==========\nStep 0: Chrom. 1, gene 1 [1] through chrom. 1, gene 1 [1]: Reversal\n";
        assert!(parse_report(report).unwrap().steps.is_empty());
    }

    #[test]
    fn test_malformed_report() {
        let err = parse_report("Number of Genes: 3\n").unwrap_err();
        assert!(matches!(err, GrimmError::Malformed(_)));
    }

    #[test]
    fn test_other_operation() {
        let step = RearrangementStep::parse(
            "Step 4: Chrom. 1, gene 1 [1] through chrom. 1, gene 2 [2]: Transposition",
        )
        .unwrap();
        assert_eq!(step.operation, Operation::Other("Transposition".to_string()));
        assert!(!step.operation.allows_caps());
    }
}
