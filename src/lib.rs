//! abr-search - Australian Business Register search tooling
//!
//! Streams business records out of ABR bulk XML extracts, loads them into an
//! OpenSearch-compatible engine with sentence embeddings attached, and runs
//! keyword and k-NN searches side by side from the command line.

pub mod cli;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod search;

pub use error::{AbrError, Result};
