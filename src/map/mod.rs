//! Storage for mesh elements and per-element properties.
//!
//! [`DenseMap`] is the generational arena the mesh stores its elements in.
//! For temporary per-element data in algorithms (new positions, markers,
//! quadrics, ...), [`HandleMap`] and [`HandleSet`] are used: they are hash
//! based and thus do not waste memory if only some elements get a value.
//! `FxHash` is used since keys are small integers.

use fxhash::{FxHashMap, FxHashSet};

mod dense;

pub use self::dense::{DenseMap, Handles, Iter, IterMut};


/// A sparse map from handles to values.
pub type HandleMap<H, T> = FxHashMap<H, T>;

/// A sparse set of handles.
pub type HandleSet<H> = FxHashSet<H>;
