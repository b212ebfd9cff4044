//! Digest utility and commitment builder.

pub mod digest;
pub mod merkle;

// Commonly used re-exports
pub use digest::{digest_hex, digest_str, sha256, Bytes32};
pub use merkle::{compute_root, leaf_digest, tree_depth, EMPTY_ROOT};
