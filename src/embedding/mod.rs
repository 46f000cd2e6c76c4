//! Local sentence embeddings for the k-NN search path
//!
//! - `EmbeddingProvider` trait for abstraction (tests substitute a fake)
//! - `FastEmbedProvider` for local ONNX inference via fastembed
//!
//! E5-family models expect task prefixes: `"query: "` on search queries and
//! `"passage: "` on indexed text. Prefixes come from the embedding config so
//! non-E5 models can run without them.

mod provider;

pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
