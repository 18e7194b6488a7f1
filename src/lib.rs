#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The build-once chained hash table underlying every frozen collection.
///
/// This module provides the capacity selector and `ChainTable`, a raw table
/// that takes explicit hashes and equality predicates.
pub mod chain_table;

/// Equality rules used to hash and compare keys.
pub mod equality;

/// Error types.
pub mod error;

/// A read-only map over `ChainTable`, with an optional sorted key projection.
///
/// This module provides `FrozenMap` and `SortedFrozenMap`, which wrap the
/// `ChainTable` and provide a standard read-only map interface with
/// configurable equality rules.
pub mod frozen_map;

/// A read-only set over `ChainTable`.
pub mod frozen_set;

/// Ordering rules used by sorted maps.
pub mod ordering;

pub use chain_table::ChainTable;
pub use chain_table::next_capacity;
pub use equality::DefaultHashBuilder;
pub use equality::EqualityFn;
pub use equality::KeyEquality;
pub use error::KeyNotFound;
pub use frozen_map::FrozenMap;
pub use frozen_map::SortedFrozenMap;
pub use frozen_set::FrozenSet;
pub use ordering::KeyOrder;
pub use ordering::NaturalOrder;
