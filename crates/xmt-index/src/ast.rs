//! Expression tree for index strings.
//!
//! An [`IndexExpression`] is what the parser produces before any total length
//! is known. Resolving it against a length validates every endpoint and yields
//! the concrete, sorted positions.

use std::fmt;

use crate::error::{IndexError, IndexResult};
use crate::Position;

/// A parsed index string: one or more components joined by `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexExpression {
    /// Components in the order they were written.
    pub components: Vec<RangeComponent>,
}

/// A single component of an index string.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeComponent {
    /// A bare index: `3`, `-1`
    Singleton(i64),
    /// Comma-separated indices: `1,4,-1`
    List(Vec<i64>),
    /// A stepped, inclusive range: `2..5`, `..-2`, `3..`, `1../2`
    Range {
        /// First index (defaults to `1`).
        start: Option<i64>,
        /// Last index (defaults to the total length).
        end: Option<i64>,
        /// Step (defaults to `1`).
        step: Option<i64>,
    },
}

/// Resolves a single written index against `total_len`.
///
/// `0` is rejected, negative values count from the end (`-1` is the last
/// position) and anything that lands outside `[1, total_len]` is rejected.
///
/// # Examples
///
/// ```rust
/// use xmt_index::resolve_index;
///
/// assert_eq!(resolve_index(2, 5).unwrap(), 2);
/// assert_eq!(resolve_index(-1, 5).unwrap(), 5);
/// assert!(resolve_index(0, 5).is_err());
/// assert!(resolve_index(6, 5).is_err());
/// ```
pub fn resolve_index(index: i64, total_len: usize) -> IndexResult<Position> {
    if index == 0 {
        return Err(IndexError::ZeroIndex);
    }
    let total = i64::try_from(total_len).map_err(|_| IndexError::OutOfRange { index, total_len })?;
    let resolved = if index < 0 { total + index + 1 } else { index };
    if resolved < 1 || resolved > total {
        return Err(IndexError::OutOfRange { index, total_len });
    }
    Ok(resolved as Position)
}

impl IndexExpression {
    /// Resolves every component against `total_len` and unions the results.
    ///
    /// The returned positions are strictly ascending. Fails on the first
    /// invalid component; no partial result is produced.
    pub fn resolve(&self, total_len: usize) -> IndexResult<Vec<Position>> {
        let mut positions = Vec::new();
        for component in &self.components {
            positions.extend(component.resolve(total_len)?);
        }
        positions.sort_unstable();
        positions.dedup();
        Ok(positions)
    }
}

impl RangeComponent {
    /// Resolves this component against `total_len`.
    ///
    /// The result is ascending and duplicate-free.
    pub fn resolve(&self, total_len: usize) -> IndexResult<Vec<Position>> {
        match self {
            RangeComponent::Singleton(index) => Ok(vec![resolve_index(*index, total_len)?]),
            RangeComponent::List(indices) => {
                let mut positions = indices
                    .iter()
                    .map(|&index| resolve_index(index, total_len))
                    .collect::<IndexResult<Vec<_>>>()?;
                positions.sort_unstable();
                positions.dedup();
                Ok(positions)
            }
            RangeComponent::Range { start, end, step } => {
                let step = step.unwrap_or(1);
                if step <= 0 {
                    return Err(IndexError::InvalidStep(step));
                }
                let start = resolve_index(start.unwrap_or(1), total_len)?;
                let end = match end {
                    Some(end) => resolve_index(*end, total_len)?,
                    None => total_len,
                };
                if start > end {
                    return Err(IndexError::InvertedRange { start, end });
                }
                Ok((start..=end).step_by(step as usize).collect())
            }
        }
    }
}

impl fmt::Display for IndexExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl fmt::Display for RangeComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeComponent::Singleton(index) => write!(f, "{}", index),
            RangeComponent::List(indices) => {
                let parts: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
            RangeComponent::Range { start, end, step } => {
                if let Some(start) = start {
                    write!(f, "{}", start)?;
                }
                write!(f, "..")?;
                if let Some(end) = end {
                    write!(f, "{}", end)?;
                }
                if let Some(step) = step {
                    write!(f, "/{}", step)?;
                }
                Ok(())
            }
        }
    }
}
