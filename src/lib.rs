//! Left-leaning red-black order-statistic tree for Rust.
//!
//! This crate provides [`LLRBTreeMap`], a sorted map with the familiar
//! `BTreeMap`-style API plus the classic symbol-table operations of an ordered
//! binary search tree, all in guaranteed O(log n):
//!
//! - [`floor`](LLRBTreeMap::floor) / [`ceiling`](LLRBTreeMap::ceiling) - Nearest keys at or around a query
//! - [`rank`](LLRBTreeMap::rank) - Number of keys strictly less than a query
//! - [`select`](LLRBTreeMap::select) - The key at a given sorted position
//! - [`delete_min`](LLRBTreeMap::delete_min) / [`delete_max`](LLRBTreeMap::delete_max) - Ordered deletion
//! - Indexing by [`Rank`] - e.g., `map[Rank(0)]` for the first element
//!
//! # Example
//!
//! ```
//! use llrb_tree::{LLRBTreeMap, MapError, Rank};
//!
//! let mut scores = LLRBTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//!
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Ordered queries
//! assert_eq!(scores.floor(&"Bz"), Some(&"Bob"));
//! assert_eq!(scores.ceiling(&"Bz"), Some(&"Carol"));
//! assert_eq!(scores.rank(&"Carol"), 2);
//! assert_eq!(scores.select(1), Ok(&"Bob"));
//! assert_eq!(scores[Rank(0)], 100);
//!
//! // Ordered deletion reports underflow instead of silently doing nothing
//! assert_eq!(scores.delete_min(), Ok(("Alice", 100)));
//! scores.clear();
//! assert_eq!(scores.delete_min(), Err(MapError::EmptyMap));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Balanced** - Height never exceeds 2 log<sub>2</sub>(n + 1), even for sorted input
//! - **O(log n) rank operations** - Order-statistic queries via subtree size augmentation
//! - **`serde`** (optional) - Serialize and deserialize maps as ordinary key/value maps
//! - **`tracing`** (optional) - Structured trace events for structural changes
//!
//! # Implementation
//!
//! The map is a left-leaning red-black tree (a binary encoding of a 2-3 tree)
//! whose nodes live in an arena and refer to each other through compact handles.
//! Insertion and deletion rebalance bottom-up with rotations and color flips, and
//! every node carries the size of its subtree.

#![no_std]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

#[macro_use]
mod macros;

mod error;
mod order_statistic;
mod raw;

pub mod llrb_tree_map;

pub use error::{MapError, Violation};
pub use llrb_tree_map::{LLRBTreeMap, Stats};
pub use order_statistic::Rank;
