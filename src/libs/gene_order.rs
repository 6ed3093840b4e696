//! Signed gene orders of two genomes, in the input format of GRIMM.
//!
//! Genes are the alignment blocks shared by both genomes. They are numbered along
//! genome 1, so genome 1 reads `1 2 3 ...`; genome 2 lists the same numbers in its own
//! physical order, negated where a block sits on the opposite strand. `$` closes a
//! chromosome.

use crate::libs::backbone::AlignmentBlock;
use crate::libs::chrom::ChromosomeIndex;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneToken {
    Gene(i64),
    Break,
}

impl fmt::Display for GeneToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneToken::Gene(g) => write!(f, "{}", g),
            GeneToken::Break => write!(f, "$"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneOrder {
    pub name: String,
    pub tokens: Vec<GeneToken>,
}

impl GeneOrder {
    /// Signed gene labels without the chromosome breaks
    pub fn genes(&self) -> Vec<i64> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                GeneToken::Gene(g) => Some(*g),
                GeneToken::Break => None,
            })
            .collect()
    }

    pub fn breaks(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, GeneToken::Break))
            .count()
    }
}

impl fmt::Display for GeneOrder {
    /// ```
    /// # use pgcmp::libs::gene_order::{GeneOrder, GeneToken};
    /// let order = GeneOrder {
    ///     name: "seq1".to_string(),
    ///     tokens: vec![GeneToken::Gene(2), GeneToken::Break, GeneToken::Gene(-1)],
    /// };
    /// assert_eq!(order.to_string(), ">seq1\n2 $ -1\n");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ">{}", self.name)?;
        writeln!(f, "{}", self.tokens.iter().join(" "))
    }
}

/// Walks chromosome boundaries forward only.
///
/// A jump over chromosomes without genes still yields a single `$`.
struct BreakTracker<'a> {
    index: Option<&'a ChromosomeIndex>,
    current: usize,
}

impl<'a> BreakTracker<'a> {
    fn new(index: Option<&'a ChromosomeIndex>) -> Self {
        Self { index, current: 0 }
    }

    /// True when the 1-based global `pos` lies in a later chromosome than the
    /// previous call's.
    fn crosses(&mut self, pos: u64) -> bool {
        let index = match self.index {
            Some(index) => index,
            None => return false,
        };
        let next = index.position(pos.saturating_sub(1));
        if next > self.current {
            self.current = next;
            true
        } else {
            false
        }
    }
}

/// Sorts by genome 1 and numbers the shared blocks 1, 2, 3, ...
///
/// Blocks are ordered by their leftmost genome-1 base; ties fall back to file order.
/// Blocks missing from either genome are kept, unnumbered.
pub fn number_genes(blocks: &[AlignmentBlock]) -> Vec<AlignmentBlock> {
    let mut sorted: Vec<AlignmentBlock> = blocks
        .iter()
        .cloned()
        .map(|mut b| {
            b.gene_number = None;
            b
        })
        .collect();
    sorted.sort_by_key(|b| (b.ref_range().0, b.index));

    let mut gene_num = 0;
    for block in sorted.iter_mut().filter(|b| b.is_shared()) {
        gene_num += 1;
        block.gene_number = Some(gene_num);
    }
    log::info!("Numbered {} genes out of {} blocks", gene_num, sorted.len());

    sorted
}

/// The physical order of genome 2: blocks present in it, sorted by their leftmost base.
pub fn query_order(numbered: &[AlignmentBlock]) -> Vec<&AlignmentBlock> {
    let mut order: Vec<&AlignmentBlock> = numbered.iter().filter(|b| b.in_query()).collect();
    order.sort_by_key(|b| (b.query_range().0, b.index));
    order
}

/// Builds the gene orders of genome 1 (`seq0`) and genome 2 (`seq1`) from numbered
/// blocks. Without a chromosome index a genome is a single chromosome.
pub fn gene_orders(
    numbered: &[AlignmentBlock],
    ref_index: Option<&ChromosomeIndex>,
    query_index: Option<&ChromosomeIndex>,
) -> [GeneOrder; 2] {
    let mut ref_order = GeneOrder {
        name: "seq0".to_string(),
        tokens: vec![],
    };
    let mut tracker = BreakTracker::new(ref_index);
    let mut ref_sorted: Vec<&AlignmentBlock> = numbered.iter().collect();
    ref_sorted.sort_by_key(|b| (b.ref_range().0, b.index));
    for block in ref_sorted {
        let gene = match block.gene_number {
            Some(g) => g as i64,
            None => continue,
        };
        push_gene(&mut ref_order, &mut tracker, block.ref_range().0, gene);
    }

    let mut query = GeneOrder {
        name: "seq1".to_string(),
        tokens: vec![],
    };
    let mut tracker = BreakTracker::new(query_index);
    for block in query_order(numbered) {
        let gene = match block.signed_gene() {
            Some(g) => g,
            None => continue,
        };
        push_gene(&mut query, &mut tracker, block.query_range().0, gene);
    }

    [ref_order, query]
}

fn push_gene(order: &mut GeneOrder, tracker: &mut BreakTracker, pos: u64, gene: i64) {
    if tracker.crosses(pos) && !order.tokens.is_empty() {
        order.tokens.push(GeneToken::Break);
    }
    order.tokens.push(GeneToken::Gene(gene));
}

pub fn write_gene_orders<W: std::io::Write>(
    writer: &mut W,
    orders: &[GeneOrder],
) -> std::io::Result<()> {
    for order in orders {
        write!(writer, "{}", order)?;
    }
    Ok(())
}
