//! Formula evaluation.
//!
//! A formula body is evaluated in one of two modes:
//!
//! - an aggregate function over a single range (`SUM(A1:B5)`, `AVG`,
//!   `AVERAGE`, `COUNT`), or
//! - a left-to-right arithmetic chain of literals and cell references with no
//!   operator precedence (`2+3*4` is `((0+2)+3)*4`).
//!
//! Evaluation never fails. Every step produces a `Result`, but a failed step
//! contributes nothing (chains) or collapses the whole function to zero
//! (aggregates), so a formula always yields a number.

use log::trace;
use thiserror::Error;

use super::{CellRef, SheetSize};

/// Read access to the grid while a formula is being evaluated.
pub trait EvalContext {
    /// Bounds used to validate references.
    fn size(&self) -> SheetSize;

    /// Current value of a cell, recomputing it first if it is stale.
    /// Out-of-bounds cells and non-numeric cells read as 0.
    fn value_of(&mut self, cell: CellRef) -> f64;

    /// Whether the cell has any content at all.
    fn has_content(&self, cell: CellRef) -> bool;
}

/// Reasons a formula step failed. These are collapsed to zero by the evaluator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("invalid cell reference: {0}")]
    BadReference(String),

    #[error("malformed range: {0}")]
    MalformedRange(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("missing closing parenthesis")]
    MissingParen,

    #[error("invalid number: {0}")]
    BadNumber(String),
}

/// Aggregate functions that take a single range argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Average,
    Count,
}

/// Recognized function prefixes, checked in order.
const AGGREGATES: &[(&str, Aggregate)] = &[
    ("SUM(", Aggregate::Sum),
    ("AVG(", Aggregate::Average),
    ("AVERAGE(", Aggregate::Average),
    ("COUNT(", Aggregate::Count),
];

/// Evaluate a formula body (the text after `=`).
pub fn evaluate<C: EvalContext + ?Sized>(body: &str, ctx: &mut C) -> f64 {
    let body = body.trim();
    if let Some(result) = evaluate_function(body, ctx) {
        return result.unwrap_or_else(|err| {
            trace!("function `{}` evaluates to 0: {}", body, err);
            0.0
        });
    }
    evaluate_chain(body, ctx)
}

/// Returns None when `body` is not a function call at all.
fn evaluate_function<C: EvalContext + ?Sized>(
    body: &str,
    ctx: &mut C,
) -> Option<Result<f64, EvalError>> {
    for (prefix, func) in AGGREGATES {
        if let Some(rest) = body.strip_prefix(prefix) {
            return Some(evaluate_aggregate(*func, rest, ctx));
        }
    }

    // Any other `NAME(` is an unknown function rather than an arithmetic chain.
    let name_len = body.bytes().take_while(|b| b.is_ascii_uppercase()).count();
    if name_len > 0 && body[name_len..].starts_with('(') {
        return Some(Err(EvalError::UnknownFunction(body[..name_len].to_string())));
    }
    None
}

fn evaluate_aggregate<C: EvalContext + ?Sized>(
    func: Aggregate,
    args: &str,
    ctx: &mut C,
) -> Result<f64, EvalError> {
    let span = parse_range_arg(args, ctx.size())?;
    let result: f64 = match func {
        Aggregate::Sum => span.cells().map(|cell| ctx.value_of(cell)).sum(),
        Aggregate::Average => {
            let count = span.cell_count();
            if count == 0 {
                0.0
            } else {
                let total: f64 = span.cells().map(|cell| ctx.value_of(cell)).sum();
                total / count as f64
            }
        }
        Aggregate::Count => span.cells().filter(|cell| ctx.has_content(*cell)).count() as f64,
    };
    Ok(result)
}

/// A rectangular block of cells walked exactly as written.
///
/// Endpoints are not normalized: when the start row (or column) is past the
/// end, the span is empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: CellRef,
    pub end: CellRef,
}

impl Span {
    pub fn cells(&self) -> impl Iterator<Item = CellRef> {
        let (cols_from, cols_to) = (self.start.col, self.end.col);
        (self.start.row..=self.end.row)
            .flat_map(move |row| (cols_from..=cols_to).map(move |col| CellRef::new(row, col)))
    }

    pub fn cell_count(&self) -> usize {
        if self.start.row > self.end.row || self.start.col > self.end.col {
            return 0;
        }
        (self.end.row - self.start.row + 1) * (self.end.col - self.start.col + 1)
    }
}

/// Parse the text following `NAME(`, e.g. `A1:B5)`.
/// Anything after the closing parenthesis is ignored.
pub fn parse_range_arg(args: &str, size: SheetSize) -> Result<Span, EvalError> {
    let Some((inner, _)) = args.split_once(')') else {
        return Err(EvalError::MissingParen);
    };
    let inner: String = inner.chars().filter(|c| !c.is_whitespace()).collect();
    let Some((from, to)) = inner.split_once(':') else {
        return Err(EvalError::MalformedRange(inner));
    };
    let start =
        CellRef::parse(from, size).ok_or_else(|| EvalError::BadReference(from.to_string()))?;
    let end = CellRef::parse(to, size).ok_or_else(|| EvalError::BadReference(to.to_string()))?;
    Ok(Span { start, end })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn from_byte(b: u8) -> Option<Operator> {
        match b {
            b'+' => Some(Operator::Add),
            b'-' => Some(Operator::Sub),
            b'*' => Some(Operator::Mul),
            b'/' => Some(Operator::Div),
            _ => None,
        }
    }

    fn apply(self, acc: f64, operand: f64) -> f64 {
        match self {
            Operator::Add => acc + operand,
            Operator::Sub => acc - operand,
            Operator::Mul => acc * operand,
            // Division by zero leaves the accumulator alone.
            Operator::Div if operand == 0.0 => acc,
            Operator::Div => acc / operand,
        }
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Number(&'a str),
    Reference(&'a str),
    Operator(Operator),
}

/// Splits a whitespace-free chain into tokens, dropping unrecognized bytes.
struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Tokens { text, pos: 0 }
    }

    fn take_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> &'a str {
        let text = self.text;
        let start = self.pos;
        let bytes = text.as_bytes();
        while self.pos < bytes.len() && pred(bytes[self.pos]) {
            self.pos += 1;
        }
        &text[start..self.pos]
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let text = self.text;
        let bytes = text.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b.is_ascii_digit() || b == b'.' {
                let mut seen_dot = false;
                return Some(Token::Number(self.take_while(|c| {
                    if c == b'.' {
                        if seen_dot {
                            return false;
                        }
                        seen_dot = true;
                        return true;
                    }
                    c.is_ascii_digit()
                })));
            }
            if b.is_ascii_alphabetic() {
                let first = self.pos;
                self.pos += 1;
                self.take_while(|c| c.is_ascii_alphanumeric());
                return Some(Token::Reference(&text[first..self.pos]));
            }
            self.pos += 1;
            if let Some(op) = Operator::from_byte(b) {
                return Some(Token::Operator(op));
            }
        }
        None
    }
}

fn evaluate_chain<C: EvalContext + ?Sized>(text: &str, ctx: &mut C) -> f64 {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    // A lone reference is returned as-is.
    if cleaned.starts_with(|c: char| c.is_ascii_alphabetic())
        && let Some(cell) = CellRef::parse(&cleaned, ctx.size())
    {
        return ctx.value_of(cell);
    }

    let mut result = 0.0;
    let mut pending = Operator::Add;
    for token in Tokens::new(&cleaned) {
        let operand = match token {
            Token::Operator(op) => {
                pending = op;
                continue;
            }
            Token::Number(text) => text
                .parse::<f64>()
                .map_err(|_| EvalError::BadNumber(text.to_string())),
            Token::Reference(text) => CellRef::parse(text, ctx.size())
                .map(|cell| ctx.value_of(cell))
                .ok_or_else(|| EvalError::BadReference(text.to_string())),
        };
        match operand {
            Ok(value) => result = pending.apply(result, value),
            Err(err) => trace!("skipping operand in `{}`: {}", cleaned, err),
        }
    }
    result
}
