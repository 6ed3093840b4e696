pub mod backbone;
pub mod bed;
pub mod chrom;
pub mod gene_order;
pub mod grimm;
pub mod io;
pub mod reconcile;
pub mod snps;
