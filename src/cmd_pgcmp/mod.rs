//! Subcommand modules for the `pgcmp` binary.

pub mod backbone;
pub mod grimm;
pub mod snps;
