use crate::libs::bed::{BedFeature, Region, Rgb, BLACK};
use std::io::BufRead;

/// One row of `show-snps -IHTClr`
///
/// Columns: ref pos, ref nt, query nt, query pos, distance to the nearest mismatch,
/// distance to the nearest contig end, ref length, query length, ref direction,
/// query direction, ref contig, query contig.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snp {
    pub ref_pos: u64, // 1-based
    pub ref_nt: String,
    pub query_nt: String,
    pub query_pos: u64,
    pub ref_contig: String,
    pub query_contig: String,
}

impl Snp {
    /// ```
    /// # use pgcmp::libs::snps::Snp;
    /// let line = "1035\tA\tG\t1033\t56\t1035\t2800000\t2810000\t1\t1\tchr1\tctg7";
    /// let snp = Snp::parse(line).unwrap();
    /// assert_eq!(snp.ref_pos, 1035);
    /// assert_eq!(snp.query_nt, "G");
    /// assert_eq!(snp.ref_contig, "chr1");
    ///
    /// assert!(Snp::parse("1035\tA\tG").is_err());
    /// ```
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let fields: Vec<&str> = line.split('\t').map(|f| f.trim()).collect();
        if fields.len() < 12 {
            anyhow::bail!("expected 12 columns, found {}", fields.len());
        }

        Ok(Self {
            ref_pos: fields[0]
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid reference position \"{}\"", fields[0]))?,
            ref_nt: fields[1].to_string(),
            query_nt: fields[2].to_string(),
            query_pos: fields[3]
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid query position \"{}\"", fields[3]))?,
            ref_contig: fields[10].to_string(),
            query_contig: fields[11].to_string(),
        })
    }

    pub fn color(&self) -> Rgb {
        match self.query_nt.to_ascii_uppercase().as_str() {
            "A" => (255, 0, 0),
            "T" => (255, 0, 255),
            "C" => (0, 0, 255),
            "G" => (0, 255, 0),
            _ => BLACK,
        }
    }

    /// A 1 bp feature on the reference
    pub fn to_bed(&self) -> BedFeature {
        let region = Region::new(&self.ref_contig, self.ref_pos.saturating_sub(1), self.ref_pos);
        BedFeature::single(
            &region,
            &format!("{} > {}", self.ref_nt, self.query_nt),
            '+',
            self.color(),
        )
    }
}

/// Reads every SNP, reporting the 1-based line of a malformed row.
pub fn read_snps<R: BufRead>(reader: R) -> anyhow::Result<Vec<Snp>> {
    let mut snps = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let snp = Snp::parse(&line).map_err(|e| anyhow::anyhow!("SNP line {}: {}", i + 1, e))?;
        snps.push(snp);
    }
    Ok(snps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snp_to_bed() {
        let input = "\
1035\tA\tG\t1033\t56\t1035\t2800000\t2810000\t1\t1\tchr1\tctg7

2000\tC\tT\t1998\t100\t2000\t2800000\t2810000\t1\t-1\tchr1\tctg7
";
        let snps = read_snps(input.as_bytes()).unwrap();
        assert_eq!(snps.len(), 2);
        assert_eq!(
            snps[0].to_bed().to_string(),
            "chr1\t1034\t1035\tA > G\t0\t+\t1034\t1035\t0,255,0"
        );
        assert_eq!(snps[1].color(), (255, 0, 255));
    }

    #[test]
    fn test_bad_line() {
        let input = "1035\tA\tG\t1033\t56\t1035\t2800000\t2810000\t1\t1\tchr1\tctg7\nx\tA\tG\t1\t1\t1\t1\t1\t1\t1\tchr1\tctg7\n";
        let err = read_snps(input.as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("SNP line 2:"));
    }
}
