pub mod domain;
pub mod error;
pub mod fs_util;
pub mod geo;
pub mod knowledge;
pub mod ncbi;
pub mod output;
pub mod providers;
pub mod rcsb;
pub mod srr;
pub mod tui;
pub mod uniprot;
