//! Guide selection: filter → rank → per-gene top-k.

pub mod filter;
pub mod rank;
pub mod select;

pub use filter::filter_candidates;
pub use rank::{contains_homopolymer, rank_candidate, rank_candidates};
pub use select::{select_top_k, under_filled_genes};
