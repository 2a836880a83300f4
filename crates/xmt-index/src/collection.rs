//! Sorted position sets with linear-time set algebra.
//!
//! An [`IndexCollection`] is the finalized form of a tag: a strictly ascending
//! list of 1-based positions together with the universe size its complement
//! is taken against.
//!
//! # Example
//!
//! ```rust
//! use xmt_index::IndexCollection;
//!
//! let first = IndexCollection::named(vec![1], 3, "first");
//! let last_two = IndexCollection::named(vec![2, 3], 3, "last_two");
//!
//! let both = &first | &last_two;
//! assert_eq!(both.indices(), &[1, 2, 3]);
//! assert_eq!(both.name(), Some("(first | last_two)"));
//!
//! assert!((!&both).is_empty());
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, Not, Sub};

use crate::Position;

/// A sorted, duplicate-free set of positions over a universe `[1, total_len]`.
///
/// Equality compares positions only; the universe size and the display name
/// are ignored.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexCollection {
    indices: Vec<Position>,
    total_len: usize,
    name: Option<String>,
}

impl IndexCollection {
    /// Creates an unnamed collection.
    ///
    /// `indices` must already be strictly ascending; use
    /// [`from_unsorted`](Self::from_unsorted) otherwise.
    pub fn new(indices: Vec<Position>, total_len: usize) -> Self {
        debug_assert!(
            indices.windows(2).all(|w| w[0] < w[1]),
            "indices must be strictly ascending"
        );
        Self {
            indices,
            total_len,
            name: None,
        }
    }

    /// Creates a named collection from strictly ascending indices.
    pub fn named(indices: Vec<Position>, total_len: usize, name: impl Into<String>) -> Self {
        Self::new(indices, total_len).with_name(name)
    }

    /// Creates a collection from positions in any order, possibly repeated.
    pub fn from_unsorted<I: IntoIterator<Item = Position>>(indices: I, total_len: usize) -> Self {
        let mut indices: Vec<Position> = indices.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self::new(indices, total_len)
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the positions in ascending order.
    pub fn indices(&self) -> &[Position] {
        &self.indices
    }

    /// Returns the universe size.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Returns the display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the number of positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the collection holds no positions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Checks membership (O(log n)).
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        self.indices.binary_search(&position).is_ok()
    }

    /// Returns an iterator over the positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.indices.iter().copied()
    }

    /// Consumes the collection, returning its positions.
    pub fn into_indices(self) -> Vec<Position> {
        self.indices
    }

    /// Positions present in both collections (AND).
    ///
    /// The universe of the result is the smaller of the two.
    pub fn intersection(&self, other: &Self) -> Self {
        let (a, b) = (&self.indices, &other.indices);
        let mut result = Vec::with_capacity(a.len().min(b.len()));
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i] == b[j] {
                result.push(a[i]);
                i += 1;
                j += 1;
            } else if a[i] < b[j] {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self {
            indices: result,
            total_len: self.total_len.min(other.total_len),
            name: derived_name(self, "&", other),
        }
    }

    /// Positions present in either collection (OR).
    ///
    /// The universe of the result is the larger of the two.
    pub fn union(&self, other: &Self) -> Self {
        let (a, b) = (&self.indices, &other.indices);
        let mut result = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i] < b[j] {
                result.push(a[i]);
                i += 1;
            } else if a[i] > b[j] {
                result.push(b[j]);
                j += 1;
            } else {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
        result.extend_from_slice(&a[i..]);
        result.extend_from_slice(&b[j..]);
        Self {
            indices: result,
            total_len: self.total_len.max(other.total_len),
            name: derived_name(self, "|", other),
        }
    }

    /// Positions in `self` absent from `other` (MINUS).
    ///
    /// The universe of the result is the smaller of the two.
    pub fn difference(&self, other: &Self) -> Self {
        let (a, b) = (&self.indices, &other.indices);
        let mut result = Vec::with_capacity(a.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i] == b[j] {
                i += 1;
                j += 1;
            } else if a[i] < b[j] {
                result.push(a[i]);
                i += 1;
            } else {
                j += 1;
            }
        }
        result.extend_from_slice(&a[i..]);
        Self {
            indices: result,
            total_len: self.total_len.min(other.total_len),
            name: derived_name(self, "-", other),
        }
    }

    /// Positions in `[1, total_len]` absent from this collection.
    pub fn complement(&self) -> Self {
        let mut result = Vec::with_capacity(self.total_len.saturating_sub(self.indices.len()));
        let mut present = self.indices.iter().peekable();
        for position in 1..=self.total_len {
            while present.next_if(|&&p| p < position).is_some() {}
            if present.next_if_eq(&&position).is_none() {
                result.push(position);
            }
        }
        Self {
            indices: result,
            total_len: self.total_len,
            name: self.name.as_ref().map(|name| format!("~{}", name)),
        }
    }
}

fn derived_name(a: &IndexCollection, op: &str, b: &IndexCollection) -> Option<String> {
    match (&a.name, &b.name) {
        (Some(a), Some(b)) => Some(format!("({} {} {})", a, op, b)),
        _ => None,
    }
}

impl PartialEq for IndexCollection {
    fn eq(&self, other: &Self) -> bool {
        self.indices == other.indices
    }
}

impl Eq for IndexCollection {}

impl Hash for IndexCollection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.indices.hash(state);
    }
}

impl fmt::Display for IndexCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IndexCollection({}, with {} indices)",
            self.name.as_deref().unwrap_or("unnamed"),
            self.indices.len()
        )
    }
}

impl BitAnd for &IndexCollection {
    type Output = IndexCollection;

    fn bitand(self, rhs: Self) -> IndexCollection {
        self.intersection(rhs)
    }
}

impl BitOr for &IndexCollection {
    type Output = IndexCollection;

    fn bitor(self, rhs: Self) -> IndexCollection {
        self.union(rhs)
    }
}

impl Sub for &IndexCollection {
    type Output = IndexCollection;

    fn sub(self, rhs: Self) -> IndexCollection {
        self.difference(rhs)
    }
}

impl Not for &IndexCollection {
    type Output = IndexCollection;

    fn not(self) -> IndexCollection {
        self.complement()
    }
}

impl<'a> IntoIterator for &'a IndexCollection {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}
