pub mod align;
pub mod cache;
pub mod effect;
pub mod error;
pub mod identify;
pub mod io;
pub mod motif;
pub mod mutants;
pub mod nt;
pub mod project;
pub mod report;
pub mod score_table;
pub mod service;
pub mod sites;
