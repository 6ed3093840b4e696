//! Reconciles the backbone with a GRIMM trace.
//!
//! Gaps, blocks present in only one genome, become deletions, insertions or indels
//! anchored on genome 1. Each rearrangement step is then pinned to genome 1 by the
//! breakpoints next to the genes it moves.
//!
//! Ranges here are 1-based closed global coordinates of genome 1. An insertion point
//! between bases `p` and `p + 1` is the empty range `(p + 1, p)`.

use crate::libs::backbone::AlignmentBlock;
use crate::libs::bed::{self, BedFeature, Palette, Region, Rgb, Track};
use crate::libs::chrom::ChromosomeIndex;
use crate::libs::gene_order::query_order;
use crate::libs::grimm::{Operation, RearrangementStep};
use std::collections::HashMap;
use std::fmt;

pub const DELETION_COLOR: Rgb = (214, 39, 40);
pub const INSERTION_COLOR: Rgb = (31, 119, 180);
pub const INDEL_COLOR: Rgb = (148, 103, 189);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    Deletion,
    Insertion,
    Indel,
    AmbiguousInsertion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapFeature {
    pub kind: GapKind,
    /// One range, or the two candidate anchors of an ambiguous insertion
    pub anchors: Vec<(u64, u64)>,
    pub ins_len: u64,
    pub del_len: u64,
    pub strand: char,
    pub label: String,
}

impl GapFeature {
    fn borders_on_left(&self, edge: u64) -> Option<(u64, u64)> {
        if self.kind == GapKind::AmbiguousInsertion {
            return None;
        }
        let (s, e) = self.anchors[0];
        (e + 1 == edge).then_some((s.min(edge), edge))
    }

    fn borders_on_right(&self, edge: u64) -> Option<(u64, u64)> {
        if self.kind == GapKind::AmbiguousInsertion {
            return None;
        }
        let (s, e) = self.anchors[0];
        (s == edge + 1).then_some((edge, e.max(edge)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RearrangementEvent {
    pub step: RearrangementStep,
    pub flanks: Vec<(u64, u64)>,
}

impl RearrangementEvent {
    pub fn label(&self) -> String {
        format!("{}_{}", self.step.operation, self.step.step)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub features: Vec<GapFeature>,
    pub events: Vec<RearrangementEvent>,
}

impl Reconciliation {
    pub fn count(&self, kind: GapKind) -> usize {
        self.features.iter().filter(|f| f.kind == kind).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// A step names a gene that was never numbered
    UnknownGene { gene: i64, step: RearrangementStep },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::UnknownGene { gene, step } => write!(
                f,
                "Step {} ({}) references gene {} which is not in the backbone\nStep: {}",
                step.step, step.operation, gene, step
            ),
        }
    }
}

impl std::error::Error for ReconcileError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    /// The side as seen along a gene label; negative labels read genome 1 backwards.
    fn along(self, label: i64) -> Side {
        match (self, label < 0) {
            (side, false) => side,
            (Side::Left, true) => Side::Right,
            (Side::Right, true) => Side::Left,
        }
    }
}

/// Genome-1 edge of a block
fn edge(block: &AlignmentBlock, side: Side) -> u64 {
    let (start, end) = block.ref_range();
    match side {
        Side::Left => start,
        Side::Right => end,
    }
}

/// Insertion point just outside `side` of a block
fn point_beside(block: &AlignmentBlock, side: Side) -> (u64, u64) {
    let e = edge(block, side);
    match side {
        Side::Left => (e, e - 1),
        Side::Right => (e + 1, e),
    }
}

/// The gap in genome 2 between two shared blocks, and whether genome 2 runs forward
/// through it.
fn query_gap(prev: &AlignmentBlock, next: &AlignmentBlock) -> Option<((u64, u64), bool)> {
    let p = prev.query_range();
    let n = next.query_range();
    if n.0 > p.1 {
        Some(((p.1 + 1, n.0 - 1), true))
    } else if p.0 > n.1 {
        Some(((n.1 + 1, p.0 - 1), false))
    } else {
        None
    }
}

/// Classifies every block missing from one genome.
///
/// `numbered` is the output of [`crate::libs::gene_order::number_genes`].
pub fn classify_gaps(numbered: &[AlignmentBlock]) -> Vec<GapFeature> {
    let mut features = vec![];

    // insertion blocks by their genome-2 range
    let mut pool: HashMap<(u64, u64), usize> = HashMap::new();
    for block in numbered.iter().filter(|b| b.is_insertion()) {
        pool.entry(block.query_range()).or_insert(block.index);
    }
    let mut consumed: Vec<usize> = vec![];

    // deletions and indels, along genome 1
    let ref_blocks: Vec<&AlignmentBlock> = numbered.iter().filter(|b| b.in_ref()).collect();
    for (i, block) in ref_blocks.iter().enumerate() {
        if !block.is_deletion() {
            continue;
        }
        let del_len = block.ref_len();
        let strand = if block.ref_start > 0 { '+' } else { '-' };

        let prev = if i > 0 { ref_blocks.get(i - 1) } else { None };
        let next = ref_blocks.get(i + 1);
        let gap = match (prev, next) {
            (Some(p), Some(n)) if p.gene_number.is_some() && n.gene_number.is_some() => {
                query_gap(p, n)
            }
            _ => None,
        };

        let matched = gap.and_then(|((s, e), forward)| {
            if s > e {
                return None;
            }
            pool.remove(&(s, e)).map(|idx| (idx, e - s + 1, forward))
        });

        match matched {
            Some((idx, ins_len, forward)) => {
                consumed.push(idx);
                features.push(GapFeature {
                    kind: GapKind::Indel,
                    anchors: vec![block.ref_range()],
                    ins_len,
                    del_len,
                    strand: if forward { '+' } else { '-' },
                    label: format!("indel:+{}/-{}", ins_len, del_len),
                });
            }
            None => features.push(GapFeature {
                kind: GapKind::Deletion,
                anchors: vec![block.ref_range()],
                ins_len: 0,
                del_len,
                strand,
                label: format!("del:-{}", del_len),
            }),
        }
    }
    log::debug!("{} insertion(s) paired into indels", consumed.len());

    // the remaining insertions, along genome 2
    let query_blocks = query_order(numbered);
    let mut ambiguous = 0;
    for (i, block) in query_blocks.iter().enumerate() {
        if !block.is_insertion() || consumed.contains(&block.index) {
            continue;
        }
        let ins_len = block.query_len();

        let prev = query_blocks[..i].iter().rev().find(|b| b.gene_number.is_some());
        let next = query_blocks[i + 1..].iter().find(|b| b.gene_number.is_some());

        let plain = |anchor: (u64, u64), strand: char| GapFeature {
            kind: GapKind::Insertion,
            anchors: vec![anchor],
            ins_len,
            del_len: 0,
            strand,
            label: format!("ins:+{}", ins_len),
        };

        match (prev, next) {
            (Some(p), Some(n)) => {
                let sp = p.signed_gene().unwrap_or_default();
                let sn = n.signed_gene().unwrap_or_default();
                if sn - sp == 1 {
                    let (left, right) = if sp > 0 { (p, n) } else { (n, p) };
                    let anchor = (edge(left, Side::Right) + 1, edge(right, Side::Left) - 1);
                    features.push(plain(anchor, if sp > 0 { '+' } else { '-' }));
                } else {
                    ambiguous += 1;
                    let a = edge(p, Side::Right.along(sp));
                    let b = edge(n, Side::Left.along(sn));
                    features.push(GapFeature {
                        kind: GapKind::AmbiguousInsertion,
                        anchors: vec![(a, a), (b, b)],
                        ins_len,
                        del_len: 0,
                        strand: '.',
                        label: format!("ambiguous_ins_{}:+{}", ambiguous, ins_len),
                    });
                }
            }
            (Some(p), None) => {
                let sp = p.signed_gene().unwrap_or_default();
                let strand = if sp > 0 { '+' } else { '-' };
                features.push(plain(point_beside(p, Side::Right.along(sp)), strand));
            }
            (None, Some(n)) => {
                let sn = n.signed_gene().unwrap_or_default();
                let strand = if sn > 0 { '+' } else { '-' };
                features.push(plain(point_beside(n, Side::Left.along(sn)), strand));
            }
            (None, None) => {
                log::warn!(
                    "Insertion {:?} has no aligned block in genome 2 to anchor on, skipped",
                    block.query_range()
                );
            }
        }
    }

    features
}

/// Breakpoint next to `block` on `side`, widened to an adjoining gap feature.
fn flank_at(block: &AlignmentBlock, side: Side, features: &[GapFeature]) -> (u64, u64) {
    let e = edge(block, side);
    features
        .iter()
        .find_map(|f| match side {
            Side::Left => f.borders_on_left(e),
            Side::Right => f.borders_on_right(e),
        })
        .unwrap_or((e, e))
}

/// Block of a gene label. Chromosome caps are `None` where the operation allows them.
fn lookup<'a>(
    by_gene: &HashMap<u32, &'a AlignmentBlock>,
    gene: i64,
    step: &RearrangementStep,
) -> Result<Option<&'a AlignmentBlock>, ReconcileError> {
    let found = u32::try_from(gene.unsigned_abs())
        .ok()
        .and_then(|g| by_gene.get(&g).copied());
    match found {
        Some(block) => Ok(Some(block)),
        None if step.operation.allows_caps() => Ok(None),
        None => Err(ReconcileError::UnknownGene {
            gene,
            step: step.clone(),
        }),
    }
}

/// Anchors each rearrangement step on genome 1.
pub fn locate_flanks(
    numbered: &[AlignmentBlock],
    features: &[GapFeature],
    steps: &[RearrangementStep],
) -> Result<Vec<RearrangementEvent>, ReconcileError> {
    let by_gene: HashMap<u32, &AlignmentBlock> = numbered
        .iter()
        .filter_map(|b| b.gene_number.map(|g| (g, b)))
        .collect();

    let mut events = vec![];
    for step in steps {
        let first = lookup(&by_gene, step.gene_1_num, step)?;
        let second = lookup(&by_gene, step.gene_2_num, step)?;

        let flanks: Vec<(u64, u64)> = if step.operation == Operation::Fission {
            first
                .map(|b| flank_at(b, Side::Right.along(step.gene_1_num), features))
                .or_else(|| second.map(|b| flank_at(b, Side::Left.along(step.gene_2_num), features)))
                .into_iter()
                .collect()
        } else {
            first
                .map(|b| flank_at(b, Side::Left.along(step.gene_1_num), features))
                .into_iter()
                .chain(second.map(|b| flank_at(b, Side::Right.along(step.gene_2_num), features)))
                .collect()
        };

        if flanks.is_empty() {
            log::warn!("Step {} ({}) only touches chromosome caps", step.step, step.operation);
        }
        events.push(RearrangementEvent {
            step: step.clone(),
            flanks,
        });
    }

    Ok(events)
}

pub fn reconcile(
    numbered: &[AlignmentBlock],
    steps: &[RearrangementStep],
) -> Result<Reconciliation, ReconcileError> {
    let features = classify_gaps(numbered);
    let events = locate_flanks(numbered, &features, steps)?;
    Ok(Reconciliation { features, events })
}

fn to_region(index: &ChromosomeIndex, (start, end): (u64, u64)) -> Region {
    let (contig, left, right) = index.to_local_range(start, end);
    Region::new(&contig, left, right)
}

/// Renders the three tracks: indels, rearrangements and ambiguous insertions.
pub fn to_tracks(rec: &Reconciliation, index: &ChromosomeIndex, prefix: &str) -> Vec<Track> {
    let mut palette = Palette::new();

    let mut indels = Track::new(
        &format!("{}_indels", prefix),
        "Insertions and deletions relative to the reference",
    );
    let mut ambiguous = Track::new(
        &format!("{}_ambiguous", prefix),
        "Insertions with two candidate anchors in the reference",
    );
    for feature in &rec.features {
        let color = match feature.kind {
            GapKind::Deletion => DELETION_COLOR,
            GapKind::Insertion => INSERTION_COLOR,
            GapKind::Indel => INDEL_COLOR,
            GapKind::AmbiguousInsertion => {
                let regions: Vec<Region> =
                    feature.anchors.iter().map(|&a| to_region(index, a)).collect();
                ambiguous.features.extend(bed::render_flanks(
                    &regions,
                    &feature.label,
                    feature.strand,
                    INSERTION_COLOR,
                    &mut palette,
                ));
                continue;
            }
        };
        let region = to_region(index, feature.anchors[0]);
        indels
            .features
            .push(BedFeature::single(&region, &feature.label, feature.strand, color));
    }

    let mut rearrangements = Track::new(
        &format!("{}_rearrangements", prefix),
        "Flanks of GRIMM rearrangement steps",
    );
    for event in &rec.events {
        let regions: Vec<Region> = event.flanks.iter().map(|&f| to_region(index, f)).collect();
        rearrangements.features.extend(bed::render_flanks(
            &regions,
            &event.label(),
            '.',
            bed::BLACK,
            &mut palette,
        ));
    }

    vec![indels, rearrangements, ambiguous]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::gene_order::number_genes;

    fn blocks(rows: &[(i64, i64, i64, i64)]) -> Vec<AlignmentBlock> {
        number_genes(
            &rows
                .iter()
                .enumerate()
                .map(|(i, &(a, b, c, d))| AlignmentBlock::new(i, a, b, c, d))
                .collect::<Vec<_>>(),
        )
    }

    fn step(n: usize, g1: i64, g2: i64, op: &str) -> RearrangementStep {
        RearrangementStep {
            step: n,
            chrom_1: 1,
            gene_1_pos: 1,
            gene_1_num: g1,
            chrom_2: 1,
            gene_2_pos: 2,
            gene_2_num: g2,
            operation: Operation::from(op),
        }
    }

    #[test]
    fn test_indel_detected() {
        let numbered = blocks(&[
            (1, 99, 101, 200),
            (100, 150, 0, 0),
            (0, 0, 201, 229),
            (151, 300, 230, 379),
        ]);
        let features = classify_gaps(&numbered);

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].kind, GapKind::Indel);
        assert_eq!(features[0].anchors, vec![(100, 150)]);
        assert_eq!(features[0].ins_len, 29);
        assert_eq!(features[0].del_len, 51);
        assert_eq!(features[0].strand, '+');
        assert_eq!(features[0].label, "indel:+29/-51");
    }

    #[test]
    fn test_plain_deletion_without_matching_insertion() {
        let numbered = blocks(&[
            (1, 99, 101, 200),
            (100, 150, 0, 0),
            (0, 0, 201, 220),
            (151, 300, 230, 379),
        ]);
        let features = classify_gaps(&numbered);

        assert_eq!(features.len(), 2);
        assert_eq!(features[0].kind, GapKind::Deletion);
        assert_eq!(features[0].label, "del:-51");
        assert_eq!(features[1].kind, GapKind::Insertion);
    }

    #[test]
    fn test_reverse_indel() {
        let numbered = blocks(&[
            (1, 99, -379, -230),
            (100, 150, 0, 0),
            (0, 0, 201, 229),
            (151, 300, -200, -101),
        ]);
        let features = classify_gaps(&numbered);

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].kind, GapKind::Indel);
        assert_eq!(features[0].strand, '-');
    }

    #[test]
    fn test_unambiguous_insertion() {
        let numbered = blocks(&[(1, 100, 1, 100), (0, 0, 101, 130), (101, 200, 131, 230)]);
        let features = classify_gaps(&numbered);

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].kind, GapKind::Insertion);
        assert_eq!(features[0].anchors, vec![(101, 100)]);
        assert_eq!(features[0].label, "ins:+30");
    }

    #[test]
    fn test_inverted_insertion() {
        // genome 2 reads -2 ins -1
        let numbered = blocks(&[(1, 100, -230, -131), (0, 0, 101, 130), (101, 200, -100, -1)]);
        let features = classify_gaps(&numbered);

        assert_eq!(features[0].kind, GapKind::Insertion);
        assert_eq!(features[0].anchors, vec![(101, 100)]);
        assert_eq!(features[0].strand, '-');
    }

    #[test]
    fn test_ambiguous_insertion() {
        // genome 2 reads 1 ins 3 2
        let numbered = blocks(&[
            (1, 100, 1, 100),
            (101, 200, 231, 330),
            (201, 300, 131, 230),
            (0, 0, 101, 130),
        ]);
        let features = classify_gaps(&numbered);

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].kind, GapKind::AmbiguousInsertion);
        assert_eq!(features[0].anchors, vec![(100, 100), (201, 201)]);
        assert_eq!(features[0].label, "ambiguous_ins_1:+30");
    }

    #[test]
    fn test_flanks_of_reversal() {
        let numbered = blocks(&[
            (1, 100, 1, 100),
            (101, 150, 0, 0),
            (151, 300, -250, -101),
            (301, 400, 251, 350),
        ]);
        let features = classify_gaps(&numbered);
        let events = locate_flanks(&numbered, &features, &[step(1, 2, 2, "Reversal")]).unwrap();

        assert_eq!(events.len(), 1);
        // left flank widened over the deletion, right flank on the block edge
        assert_eq!(events[0].flanks, vec![(101, 151), (300, 300)]);
        assert_eq!(events[0].label(), "Reversal_1");
    }

    #[test]
    fn test_caps_and_unknown_genes() {
        let numbered = blocks(&[(1, 100, 1, 100), (101, 200, 101, 200)]);
        let features = classify_gaps(&numbered);

        let events = locate_flanks(&numbered, &features, &[step(1, 2, 5, "Fission")]).unwrap();
        assert_eq!(events[0].flanks, vec![(200, 200)]);

        let events = locate_flanks(&numbered, &features, &[step(2, 7, 2, "Fusion")]).unwrap();
        assert_eq!(events[0].flanks, vec![(200, 200)]);

        let err = locate_flanks(&numbered, &features, &[step(3, 1, 9, "Reversal")]).unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownGene { gene: 9, .. }));
    }

    #[test]
    fn test_tracks() {
        let numbered = blocks(&[(1, 99, 1, 99), (100, 200, 0, 0)]);
        let rec = reconcile(&numbered, &[]).unwrap();
        assert_eq!(rec.count(GapKind::Deletion), 1);

        let index = ChromosomeIndex::from_sizes(&[("chr1", 500)]).unwrap();
        let tracks = to_tracks(&rec, &index, "sample");
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].name, "sample_indels");
        assert_eq!(
            tracks[0].features[0].to_string(),
            "chr1\t99\t200\tdel:-101\t0\t+\t99\t200\t214,39,40"
        );
        assert!(tracks[1].features.is_empty());
    }
}
