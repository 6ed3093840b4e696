use itertools::Itertools;
use std::fmt;

pub type Rgb = (u8, u8, u8);

pub const BLACK: Rgb = (0, 0, 0);

/// Colors handed out in turn to features split across two contigs.
pub const PALETTE: [Rgb; 20] = [
    (31, 119, 180),
    (174, 199, 232),
    (255, 127, 14),
    (255, 187, 120),
    (44, 160, 44),
    (152, 223, 138),
    (214, 39, 40),
    (255, 152, 150),
    (148, 103, 189),
    (197, 176, 213),
    (140, 86, 75),
    (196, 156, 148),
    (227, 119, 194),
    (247, 182, 210),
    (127, 127, 127),
    (199, 199, 199),
    (188, 189, 34),
    (219, 219, 141),
    (23, 190, 207),
    (158, 218, 229),
];

/// Round-robin over [`PALETTE`]
#[derive(Debug, Default, Clone)]
pub struct Palette {
    next: usize,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// ```
    /// # use pgcmp::libs::bed::{Palette, PALETTE};
    /// let mut palette = Palette::new();
    /// for _ in 0..20 {
    ///     palette.next_color();
    /// }
    /// assert_eq!(palette.next_color(), PALETTE[0]);
    /// ```
    pub fn next_color(&mut self) -> Rgb {
        let color = PALETTE[self.next % PALETTE.len()];
        self.next += 1;
        color
    }
}

/// A 0-based half-open interval on one contig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(contig: &str, start: u64, end: u64) -> Self {
        Self {
            contig: contig.to_string(),
            start,
            end,
        }
    }

    /// Same contig, overlapping or abutting
    pub fn touches(&self, other: &Region) -> bool {
        self.contig == other.contig && self.start <= other.end && other.start <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedFeature {
    pub contig: String,
    pub start: u64,
    pub end: u64,
    pub label: String,
    pub score: u32,
    pub strand: char,
    pub thick_start: u64,
    pub thick_end: u64,
    pub color: Rgb,
    /// `(size, relative start)` of each block; empty for a single block
    pub blocks: Vec<(u64, u64)>,
}

impl BedFeature {
    pub fn single(region: &Region, label: &str, strand: char, color: Rgb) -> Self {
        Self {
            contig: region.contig.clone(),
            start: region.start,
            end: region.end,
            label: label.to_string(),
            score: 0,
            strand,
            thick_start: region.start,
            thick_end: region.end,
            color,
            blocks: vec![],
        }
    }

    /// Two blocks joined by a thin line. Both regions must lie on the same contig;
    /// touching regions are merged into one block.
    pub fn paired(a: &Region, b: &Region, label: &str, strand: char, color: Rgb) -> Self {
        let (first, second) = if (a.start, a.end) <= (b.start, b.end) {
            (a, b)
        } else {
            (b, a)
        };

        if first.touches(second) {
            let merged = Region::new(&first.contig, first.start, first.end.max(second.end));
            return Self::single(&merged, label, strand, color);
        }

        let mut feature = Self::single(
            &Region::new(&first.contig, first.start, second.end),
            label,
            strand,
            color,
        );
        feature.blocks = vec![
            (first.end - first.start, 0),
            (second.end - second.start, second.start - first.start),
        ];
        feature
    }
}

impl fmt::Display for BedFeature {
    /// ```
    /// # use pgcmp::libs::bed::{BedFeature, Region};
    /// let a = Region::new("chr1", 99, 200);
    /// let b = Region::new("chr1", 499, 510);
    /// let feature = BedFeature::paired(&b, &a, "Reversal_1", '.', (0, 0, 0));
    /// assert_eq!(
    ///     feature.to_string(),
    ///     "chr1\t99\t510\tReversal_1\t0\t.\t99\t510\t0,0,0\t2\t101,11\t0,400"
    /// );
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{},{},{}",
            self.contig,
            self.start,
            self.end,
            self.label,
            self.score,
            self.strand,
            self.thick_start,
            self.thick_end,
            self.color.0,
            self.color.1,
            self.color.2
        )?;
        if self.blocks.len() > 1 {
            write!(
                f,
                "\t{}\t{}\t{}",
                self.blocks.len(),
                self.blocks.iter().map(|b| b.0).join(","),
                self.blocks.iter().map(|b| b.1).join(",")
            )?;
        }
        Ok(())
    }
}

/// Renders one or two flanks of an event. Two flanks on one contig become one
/// two-block feature in `color`; flanks on different contigs become two features
/// sharing the next palette color.
pub fn render_flanks(
    flanks: &[Region],
    label: &str,
    strand: char,
    color: Rgb,
    palette: &mut Palette,
) -> Vec<BedFeature> {
    match flanks {
        [] => vec![],
        [one] => vec![BedFeature::single(one, label, strand, color)],
        [a, b, ..] if a.contig == b.contig => {
            vec![BedFeature::paired(a, b, label, strand, color)]
        }
        [a, b, ..] => {
            let shared = palette.next_color();
            vec![
                BedFeature::single(a, label, strand, shared),
                BedFeature::single(b, label, strand, shared),
            ]
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    pub name: String,
    pub description: String,
    pub features: Vec<BedFeature>,
}

impl Track {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            features: vec![],
        }
    }

    pub fn header(&self) -> String {
        format!(
            "track name=\"{}\" description=\"{}\" itemRgb=\"on\"",
            self.name, self.description
        )
    }

    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{}", self.header())?;
        for feature in &self.features {
            writeln!(writer, "{}", feature)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let feature = BedFeature::single(&Region::new("chr1", 99, 150), "del:-51", '+', (214, 39, 40));
        assert_eq!(
            feature.to_string(),
            "chr1\t99\t150\tdel:-51\t0\t+\t99\t150\t214,39,40"
        );
    }

    #[test]
    fn test_paired_merges_overlap() {
        let feature = BedFeature::paired(
            &Region::new("chr1", 100, 200),
            &Region::new("chr1", 150, 300),
            "x",
            '.',
            BLACK,
        );
        assert_eq!((feature.start, feature.end), (100, 300));
        assert!(feature.blocks.is_empty());
    }

    #[test]
    fn test_render_cross_contig() {
        let mut palette = Palette::new();
        palette.next_color();

        let features = render_flanks(
            &[Region::new("chr1", 10, 20), Region::new("chr2", 30, 40)],
            "Translocation_2",
            '.',
            BLACK,
            &mut palette,
        );
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].color, PALETTE[1]);
        assert_eq!(features[1].color, PALETTE[1]);
        assert_eq!(features[1].contig, "chr2");

        let features = render_flanks(
            &[Region::new("chr1", 10, 20), Region::new("chr1", 30, 40)],
            "Reversal_1",
            '.',
            BLACK,
            &mut palette,
        );
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].blocks, vec![(10, 0), (10, 20)]);
        assert_eq!(palette.next_color(), PALETTE[2]);
    }

    #[test]
    fn test_track_header() {
        let mut track = Track::new("sample_indels", "Insertions and deletions");
        track.features.push(BedFeature::single(
            &Region::new("chr1", 5, 5),
            "ins:+30",
            '+',
            BLACK,
        ));
        let mut out = vec![];
        track.write(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "track name=\"sample_indels\" description=\"Insertions and deletions\" itemRgb=\"on\"\nchr1\t5\t5\tins:+30\t0\t+\t5\t5\t0,0,0\n"
        );
    }
}
