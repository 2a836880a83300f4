//! # xmt-index
//!
//! Index-range expressions and position sets for xmt recipes.
//!
//! This crate provides:
//! - **Index-String Parser**: Parse compact range syntax into concrete positions
//! - **IndexCollection**: Sorted position sets with linear-time set algebra
//!
//! All positions are 1-based.
//!
//! ## Usage
//!
//! ```rust
//! use xmt_index::{parse_index_string, IndexCollection};
//!
//! let all = parse_index_string("1..3", 3).unwrap();
//! let last_two = parse_index_string("2,3", 3).unwrap();
//!
//! let all = IndexCollection::named(all, 3, "all");
//! let last_two = IndexCollection::named(last_two, 3, "last_two");
//!
//! assert_eq!((&all - &last_two).indices(), &[1]);
//! ```
//!
//! ## Index-String Syntax Quick Reference
//!
//! | Form | Meaning | Example (length 6) |
//! |------|---------|--------------------|
//! | `n` | Single position | `2` → `[2]` |
//! | `-n` | Position counted from the end | `-1` → `[6]` |
//! | `a,b,c` | List | `5,1,5` → `[1, 5]` |
//! | `a..b` | Inclusive range | `2..4` → `[2, 3, 4]` |
//! | `..b` / `a..` | Open-ended range | `4..` → `[4, 5, 6]` |
//! | `a..b/s` | Stepped range | `1../2` → `[1, 3, 5]` |
//! | `x;y` | Union | `1;-1` → `[1, 6]` |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ast;
mod collection;
mod error;
mod parser;

pub use ast::{resolve_index, IndexExpression, RangeComponent};
pub use collection::IndexCollection;
pub use error::{IndexError, IndexResult};
pub use parser::{parse_expression, parse_index_string};

/// A 1-based position in an assembled content sequence.
pub type Position = usize;
