//! Index-string parser implementation using nom.
//!
//! Grammar:
//!
//! ```text
//! expression := component (';' component)*
//! component  := range | list | singleton
//! range      := integer? '..' integer? ('/' integer)?
//! list       := integer (',' integer)+
//! singleton  := integer
//! integer    := '-'? digit+
//! ```
//!
//! Whitespace is allowed around every token.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use crate::ast::{IndexExpression, RangeComponent};
use crate::error::{IndexError, IndexResult};
use crate::Position;

/// Parse an index string into its expression tree without resolving it.
///
/// # Examples
///
/// ```rust
/// use xmt_index::parse_expression;
///
/// let expr = parse_expression("1..3; 5,6").unwrap();
/// assert_eq!(expr.components.len(), 2);
/// assert_eq!(expr.to_string(), "1..3;5,6");
/// ```
pub fn parse_expression(input: &str) -> IndexResult<IndexExpression> {
    let input = input.trim();
    if input.is_empty() {
        return Err(IndexError::Empty);
    }

    match all_consuming(delimited(ws, expression, ws))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let position = input.len() - e.input.len();
            Err(IndexError::Syntax {
                position,
                message: format!("unexpected input at: '{}'", truncate(e.input, 20)),
            })
        }
        Err(nom::Err::Incomplete(_)) => Err(IndexError::Syntax {
            position: input.len(),
            message: "incomplete expression".to_string(),
        }),
    }
}

/// Parse an index string and resolve it against `total_len`.
///
/// The result is strictly ascending, duplicate-free and every element lies in
/// `[1, total_len]`.
///
/// # Examples
///
/// ```rust
/// use xmt_index::parse_index_string;
///
/// assert_eq!(parse_index_string("1..4", 4).unwrap(), vec![1, 2, 3, 4]);
/// assert_eq!(parse_index_string("2,1,3,3", 3).unwrap(), vec![1, 2, 3]);
/// assert_eq!(parse_index_string("1,-1", 5).unwrap(), vec![1, 5]);
/// assert_eq!(parse_index_string("../2", 5).unwrap(), vec![1, 3, 5]);
/// assert!(parse_index_string("0", 5).is_err());
/// ```
pub fn parse_index_string(input: &str, total_len: usize) -> IndexResult<Vec<Position>> {
    parse_expression(input)?.resolve(total_len)
}

fn truncate(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============================================================================
// Expression
// ============================================================================

fn expression(input: &str) -> IResult<&str, IndexExpression> {
    map(
        separated_list1(delimited(ws, char(';'), ws), component),
        |components| IndexExpression { components },
    )(input)
}

fn component(input: &str) -> IResult<&str, RangeComponent> {
    // Order matters: a range and a list both start with an integer.
    alt((range, list))(input)
}

fn range(input: &str) -> IResult<&str, RangeComponent> {
    let (input, start) = opt(terminated(integer, ws))(input)?;
    let (input, _) = tag("..")(input)?;
    let (input, end) = opt(preceded(ws, integer))(input)?;
    let (input, step) = opt(preceded(delimited(ws, char('/'), ws), integer))(input)?;

    Ok((input, RangeComponent::Range { start, end, step }))
}

/// A list of one is a singleton.
fn list(input: &str) -> IResult<&str, RangeComponent> {
    map(
        separated_list1(delimited(ws, char(','), ws), integer),
        |mut indices| {
            if indices.len() == 1 {
                RangeComponent::Singleton(indices.remove(0))
            } else {
                RangeComponent::List(indices)
            }
        },
    )(input)
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

/// Optional whitespace
fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}
