use anyhow::Context;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromEntry {
    pub name: String,
    pub cumulative_end: u64,
}

/// Chromosome boundaries of one genome, laid end to end in file order the way the
/// aligner concatenated them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChromosomeIndex {
    entries: Vec<ChromEntry>,
}

impl ChromosomeIndex {
    /// ```
    /// # use pgcmp::libs::chrom::ChromosomeIndex;
    /// let index = ChromosomeIndex::from_sizes(&[("chr1", 1000), ("chr2", 1500)]).unwrap();
    /// assert_eq!(index.len(), 2);
    /// assert_eq!(index.boundaries(), vec![1000, 2500]);
    /// ```
    pub fn from_sizes<S: AsRef<str>>(sizes: &[(S, u64)]) -> anyhow::Result<Self> {
        if sizes.is_empty() {
            anyhow::bail!("No sequences to build a chromosome index from");
        }

        let mut entries = Vec::with_capacity(sizes.len());
        let mut cumulative_end = 0;
        for (name, size) in sizes {
            cumulative_end += size;
            entries.push(ChromEntry {
                name: name.as_ref().to_string(),
                cumulative_end,
            });
        }

        Ok(Self { entries })
    }

    /// Reads `(name, length)` of every record in a FASTA file, in file order.
    pub fn from_fasta(infile: &str) -> anyhow::Result<Self> {
        let reader = crate::reader(infile)?;
        let mut fa_in = noodles_fasta::io::Reader::new(reader);

        let mut sizes: Vec<(String, u64)> = vec![];
        for result in fa_in.records() {
            let record = result.with_context(|| format!("invalid FASTA record in {}", infile))?;
            let name = String::from_utf8(record.name().into())?;
            sizes.push((name, record.sequence().len() as u64));
        }
        log::info!("{}: {} sequence(s)", infile, sizes.len());

        Self::from_sizes(&sizes).with_context(|| format!("{} has no sequences", infile))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ChromEntry] {
        &self.entries
    }

    pub fn boundaries(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.cumulative_end).collect()
    }

    /// Global start of the `idx`-th chromosome.
    pub fn chrom_start(&self, idx: usize) -> u64 {
        if idx == 0 {
            0
        } else {
            self.entries[idx - 1].cumulative_end
        }
    }

    /// Index of the chromosome holding the 0-based global `offset`.
    /// Offsets past the end are clamped to the last chromosome.
    pub fn position(&self, offset: u64) -> usize {
        self.entries
            .iter()
            .position(|e| e.cumulative_end > offset)
            .unwrap_or(self.entries.len().saturating_sub(1))
    }

    /// Returns the name and global start of the chromosome holding the 0-based
    /// global `offset`.
    ///
    /// ```
    /// # use pgcmp::libs::chrom::ChromosomeIndex;
    /// let index = ChromosomeIndex::from_sizes(&[("chr1", 1000), ("chr2", 1500)]).unwrap();
    /// assert_eq!(index.locate(0), ("chr1", 0));
    /// assert_eq!(index.locate(999), ("chr1", 0));
    /// assert_eq!(index.locate(1000), ("chr2", 1000));
    /// assert_eq!(index.locate(9999), ("chr2", 1000));
    /// ```
    pub fn locate(&self, offset: u64) -> (&str, u64) {
        let idx = self.position(offset);
        (self.entries[idx].name.as_str(), self.chrom_start(idx))
    }

    /// Maps a 1-based closed global range to a 0-based half-open range local to the
    /// chromosome of `start`. The right end is clamped to that chromosome.
    ///
    /// ```
    /// # use pgcmp::libs::chrom::ChromosomeIndex;
    /// let index = ChromosomeIndex::from_sizes(&[("chr1", 1000), ("chr2", 1500)]).unwrap();
    /// assert_eq!(index.to_local_range(100, 200), ("chr1".to_string(), 99, 200));
    /// assert_eq!(index.to_local_range(1001, 1010), ("chr2".to_string(), 0, 10));
    /// assert_eq!(index.to_local_range(990, 1010), ("chr1".to_string(), 989, 1000));
    /// ```
    pub fn to_local_range(&self, start: u64, end: u64) -> (String, u64, u64) {
        let offset = start.saturating_sub(1);
        let idx = self.position(offset);
        let chrom_start = self.chrom_start(idx);
        let chrom_end = self.entries[idx].cumulative_end;

        let lo = offset.min(chrom_end);
        let hi = end.min(chrom_end).max(lo);

        (self.entries[idx].name.clone(), lo - chrom_start, hi - chrom_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index() {
        let sizes: Vec<(String, u64)> = vec![];
        assert!(ChromosomeIndex::from_sizes(&sizes).is_err());
    }

    #[test]
    fn test_boundary_positions() {
        let index = ChromosomeIndex::from_sizes(&[("a", 1000), ("b", 1500), ("c", 10)]).unwrap();
        assert_eq!(index.position(949), 0);
        assert_eq!(index.position(1049), 1);
        assert_eq!(index.position(2500), 2);
        assert_eq!(index.position(2510), 2);
        assert_eq!(index.chrom_start(2), 2500);
    }

    #[test]
    fn test_local_range_zero_length() {
        let index = ChromosomeIndex::from_sizes(&[("a", 1000)]).unwrap();
        // an insertion point between bases 500 and 501
        assert_eq!(index.to_local_range(501, 500), ("a".to_string(), 500, 500));
    }
}
