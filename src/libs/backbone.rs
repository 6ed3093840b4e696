use std::fmt;
use std::io::BufRead;

/// One row of a progressiveMauve `.backbone` file for two genomes.
///
/// Coordinates are 1-based and closed. A negative sign marks the reverse strand and
/// a `0 0` pair marks a block absent from that genome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentBlock {
    pub index: usize, // row order in the file, used to break sorting ties
    pub ref_start: i64,
    pub ref_end: i64,
    pub query_start: i64,
    pub query_end: i64,
    pub gene_number: Option<u32>,
}

impl AlignmentBlock {
    pub fn new(index: usize, ref_start: i64, ref_end: i64, query_start: i64, query_end: i64) -> Self {
        Self {
            index,
            ref_start,
            ref_end,
            query_start,
            query_end,
            gene_number: None,
        }
    }

    pub fn in_ref(&self) -> bool {
        self.ref_start != 0 || self.ref_end != 0
    }

    pub fn in_query(&self) -> bool {
        self.query_start != 0 || self.query_end != 0
    }

    /// Aligned in both genomes
    pub fn is_shared(&self) -> bool {
        self.in_ref() && self.in_query()
    }

    /// Present only in genome 1
    pub fn is_deletion(&self) -> bool {
        self.in_ref() && !self.in_query()
    }

    /// Present only in genome 2
    pub fn is_insertion(&self) -> bool {
        !self.in_ref() && self.in_query()
    }

    /// Positive-strand 1-based closed range on genome 1
    ///
    /// ```
    /// # use pgcmp::libs::backbone::AlignmentBlock;
    /// let block = AlignmentBlock::new(0, -250, -101, 20, 169);
    /// assert_eq!(block.ref_range(), (101, 250));
    /// assert_eq!(block.ref_len(), 150);
    /// ```
    pub fn ref_range(&self) -> (u64, u64) {
        abs_range(self.ref_start, self.ref_end)
    }

    /// Positive-strand 1-based closed range on genome 2
    pub fn query_range(&self) -> (u64, u64) {
        abs_range(self.query_start, self.query_end)
    }

    pub fn ref_len(&self) -> u64 {
        range_len(self.ref_range())
    }

    pub fn query_len(&self) -> u64 {
        range_len(self.query_range())
    }

    /// The two genomes see this block on opposite strands.
    pub fn is_inverted(&self) -> bool {
        self.ref_start.signum() * self.query_start.signum() < 0
    }

    /// Gene label as it reads along genome 2, negated for inverted blocks
    ///
    /// ```
    /// # use pgcmp::libs::backbone::AlignmentBlock;
    /// let mut block = AlignmentBlock::new(0, 5, 10, -25, -20);
    /// assert_eq!(block.signed_gene(), None);
    /// block.gene_number = Some(3);
    /// assert_eq!(block.signed_gene(), Some(-3));
    /// ```
    pub fn signed_gene(&self) -> Option<i64> {
        self.gene_number.map(|g| {
            if self.is_inverted() {
                -(g as i64)
            } else {
                g as i64
            }
        })
    }
}

fn abs_range(start: i64, end: i64) -> (u64, u64) {
    let (a, b) = (start.unsigned_abs(), end.unsigned_abs());
    (a.min(b), a.max(b))
}

fn range_len((start, end): (u64, u64)) -> u64 {
    if start == 0 && end == 0 {
        0
    } else {
        end - start + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackboneError {
    /// Wrong number of columns; only pairwise backbones are supported
    Columns { line: usize, found: usize },
    /// A field that is not an integer
    Field { line: usize, field: String },
}

impl fmt::Display for BackboneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackboneError::Columns { line, found } => write!(
                f,
                "Backbone line {}: expected 4 columns for two genomes, found {}",
                line, found
            ),
            BackboneError::Field { line, field } => {
                write!(f, "Backbone line {}: invalid coordinate \"{}\"", line, field)
            }
        }
    }
}

impl std::error::Error for BackboneError {}

pub struct BackboneReader<R> {
    reader: R,
    line_buf: String,
    line_no: usize,
    index: usize,
}

impl<R: BufRead> BackboneReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buf: String::new(),
            line_no: 0,
            index: 0,
        }
    }

    fn parse_line(&self, line: &str) -> Result<AlignmentBlock, BackboneError> {
        let fields: Vec<&str> = line.split('\t').map(|f| f.trim()).collect();
        if fields.len() != 4 {
            return Err(BackboneError::Columns {
                line: self.line_no,
                found: fields.len(),
            });
        }

        let mut coords = [0i64; 4];
        for (slot, field) in coords.iter_mut().zip(&fields) {
            *slot = field.parse::<i64>().map_err(|_| BackboneError::Field {
                line: self.line_no,
                field: field.to_string(),
            })?;
        }

        Ok(AlignmentBlock::new(
            self.index, coords[0], coords[1], coords[2], coords[3],
        ))
    }
}

impl<R: BufRead> Iterator for BackboneReader<R> {
    type Item = anyhow::Result<AlignmentBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();
            match self.reader.read_line(&mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.line_buf.trim_end_matches(['\r', '\n']);
                    if line.trim().is_empty() || line.starts_with("seq0_leftend") {
                        continue;
                    }

                    let block = match self.parse_line(line) {
                        Ok(block) => block,
                        Err(e) => return Some(Err(e.into())),
                    };
                    if !block.in_ref() && !block.in_query() {
                        log::debug!("Skip empty backbone row at line {}", self.line_no);
                        continue;
                    }

                    self.index += 1;
                    return Some(Ok(block));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Reads all blocks of a backbone file.
pub fn read_backbone<R: BufRead>(reader: R) -> anyhow::Result<Vec<AlignmentBlock>> {
    BackboneReader::new(reader).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backbone() {
        let input = "\
seq0_leftend\tseq0_rightend\tseq1_leftend\tseq1_rightend
1\t100\t1\t100
101\t150\t0\t0
0\t0\t101\t130
0\t0\t0\t0
151\t300\t-280\t-131
";
        let blocks = read_backbone(input.as_bytes()).unwrap();

        assert_eq!(blocks.len(), 4);
        assert!(blocks[0].is_shared());
        assert!(blocks[1].is_deletion());
        assert!(blocks[2].is_insertion());
        assert_eq!(blocks[2].query_len(), 30);
        assert_eq!(blocks[3].index, 3);
        assert!(blocks[3].is_inverted());
        assert_eq!(blocks[3].query_range(), (131, 280));
        assert!(blocks.iter().all(|b| b.gene_number.is_none()));
    }

    #[test]
    fn test_parse_backbone_errors() {
        let input = "seq0_leftend\tseq0_rightend\tseq1_leftend\tseq1_rightend\n1\t100\tx\t100\n";
        let err = read_backbone(input.as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BackboneError>(),
            Some(&BackboneError::Field {
                line: 2,
                field: "x".to_string()
            })
        );

        let input = "1\t100\t1\t100\t1\t100\n";
        let err = read_backbone(input.as_bytes()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BackboneError>(),
            Some(&BackboneError::Columns { line: 1, found: 6 })
        );
    }
}
