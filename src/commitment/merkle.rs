// src/commitment/merkle.rs
//! # Commitment Builder
//!
//! Derives one root digest committing to an ordered transaction sequence.
//!
//! Each transaction contributes a leaf digest over `hash ‖ from ‖ to ‖ value`.
//! Leaves are combined in one of two ways (see [`CommitmentScheme`]):
//!
//! * `Flat` hashes the concatenation of every leaf's hex digest in one pass.
//!   This is the compatible default; it is a single-level fold, not a tree.
//! * `Binary` hashes hex digests pairwise up to a root, duplicating the last
//!   node of odd-length levels.
//!
//! Both are pure functions of the ordered leaf list. An empty sequence yields
//! [`EMPTY_ROOT`].

use crate::commitment::digest::digest_str;
use crate::config::CommitmentScheme;
use crate::types::Transaction;

/// Root reported for an empty transaction sequence: 32 zero bytes in hex.
pub const EMPTY_ROOT: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Digest of one transaction's leaf preimage.
pub fn leaf_digest(tx: &Transaction) -> String {
    digest_str(&tx.leaf_preimage())
}

/// Computes the commitment root (hex, no prefix) over `transactions`.
pub fn compute_root(transactions: &[Transaction], scheme: CommitmentScheme) -> String {
    if transactions.is_empty() {
        return EMPTY_ROOT.to_string();
    }
    let leaves: Vec<String> = transactions.iter().map(leaf_digest).collect();
    match scheme {
        CommitmentScheme::Flat => fold_leaves(&leaves),
        CommitmentScheme::Binary => compute_binary_root(leaves),
    }
}

/// `0x`-prefixed form used in reports.
pub fn prefixed(root: &str) -> String {
    format!("0x{root}")
}

/// Single-level reduction: one digest over the concatenated leaf digests.
fn fold_leaves(leaves: &[String]) -> String {
    digest_str(&leaves.concat())
}

/// Pairwise reduction up to a single root.
fn compute_binary_root(mut level: Vec<String>) -> String {
    if level.is_empty() {
        return EMPTY_ROOT.to_string();
    }
    while level.len() > 1 {
        if level.len() % 2 != 0 {
            if let Some(last) = level.last().cloned() {
                level.push(last);
            }
        }
        level = level.chunks(2).map(|pair| hash_pair(&pair[0], &pair[1])).collect();
    }
    level.swap_remove(0)
}

/// Hashes two hex digests together to form a parent node.
pub fn hash_pair(left: &str, right: &str) -> String {
    let mut joined = String::with_capacity(left.len() + right.len());
    joined.push_str(left);
    joined.push_str(right);
    digest_str(&joined)
}

/// Number of levels in a binary tree over `leaf_count` leaves, root included.
pub fn tree_depth(leaf_count: usize) -> usize {
    match leaf_count {
        0 => 0,
        1 => 1,
        n => (usize::BITS - (n - 1).leading_zeros()) as usize + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txs() -> Vec<Transaction> {
        vec![
            Transaction::new("0xAAA", "alice", "bob", "1"),
            Transaction::new("0xBBB", "bob", "carol", "2"),
            Transaction::new("0xCCC", "carol", "dave", "3"),
        ]
    }

    #[test]
    fn test_compute_root_determinism() {
        for scheme in [CommitmentScheme::Flat, CommitmentScheme::Binary] {
            assert_eq!(compute_root(&txs(), scheme), compute_root(&txs(), scheme));
        }
    }

    #[test]
    fn test_compute_root_empty() {
        assert_eq!(compute_root(&[], CommitmentScheme::Flat), EMPTY_ROOT);
        assert_eq!(compute_root(&[], CommitmentScheme::Binary), EMPTY_ROOT);
    }

    #[test]
    fn test_flat_root_matches_literal_fold() {
        let expected_leaves: Vec<String> = ["0xAAAalicebob1", "0xBBBbobcarol2", "0xCCCcaroldave3"]
            .iter()
            .map(|s| digest_str(s))
            .collect();
        let expected = digest_str(&expected_leaves.concat());
        assert_eq!(compute_root(&txs(), CommitmentScheme::Flat), expected);
    }

    #[test]
    fn test_binary_root_structure() {
        let leaves: Vec<String> = txs().iter().map(leaf_digest).collect();
        let left = hash_pair(&leaves[0], &leaves[1]);
        let right = hash_pair(&leaves[2], &leaves[2]);
        assert_eq!(compute_root(&txs(), CommitmentScheme::Binary), hash_pair(&left, &right));

        let single = &txs()[..1];
        assert_eq!(compute_root(single, CommitmentScheme::Binary), leaves[0]);
    }

    #[test]
    fn test_reordering_changes_root() {
        let mut reversed = txs();
        reversed.reverse();
        for scheme in [CommitmentScheme::Flat, CommitmentScheme::Binary] {
            assert_ne!(compute_root(&txs(), scheme), compute_root(&reversed, scheme));
        }
    }

    #[test]
    fn test_field_mutation_changes_root() {
        let base = compute_root(&txs(), CommitmentScheme::Flat);
        let mut mutated = txs();
        mutated[1].value = "20".into();
        assert_ne!(base, compute_root(&mutated, CommitmentScheme::Flat));

        let mut mutated = txs();
        mutated[2].from = "mallory".into();
        assert_ne!(base, compute_root(&mutated, CommitmentScheme::Flat));
    }

    #[test]
    fn test_hash_pair_inequality() {
        let a = digest_str("a");
        let b = digest_str("b");
        assert_ne!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn test_tree_depth() {
        assert_eq!(tree_depth(0), 0);
        assert_eq!(tree_depth(1), 1);
        assert_eq!(tree_depth(2), 2);
        assert_eq!(tree_depth(3), 3);
        assert_eq!(tree_depth(4), 3);
        assert_eq!(tree_depth(5), 4);
        assert_eq!(tree_depth(1024), 11);
    }

    #[test]
    fn test_prefixed() {
        assert_eq!(prefixed("ab"), "0xab");
    }
}
