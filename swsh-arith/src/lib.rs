// This file is part of swsh, a POSIX-conformant shell.
// Copyright (C) 2022 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! This crate implements arithmetic expansion.
//!
//! The [`eval`] function evaluates an expression as a signed 64-bit integer.
//! Integer constants may be decimal, octal (with a leading `0`), or
//! hexadecimal (with a leading `0x`). Identifiers are looked up through the
//! [`Env`] trait, where an unset variable counts as zero. Assignment
//! operators write the result back through the same trait.
//!
//! Operators, from the lowest precedence to the highest:
//!
//! - `=` `*=` `/=` `%=` `+=` `-=` `<<=` `>>=` `&=` `^=` `|=` (right-to-left)
//! - `? :` (right-to-left)
//! - `||`
//! - `&&`
//! - `|`
//! - `^`
//! - `&`
//! - `==` `!=`
//! - `<` `<=` `>` `>=`
//! - `<<` `>>`
//! - `+` `-`
//! - `*` `/` `%`
//! - unary `+` `-` `!` `~`
//!
//! ```
//! # use std::collections::HashMap;
//! # use swsh_arith::eval;
//! let mut env = HashMap::new();
//! assert_eq!(eval("x = 0x10 + 020 + 8", &mut env), Ok(40));
//! assert_eq!(env["x"], "40");
//! ```

use std::ops::Range;
use thiserror::Error;

mod env;
mod eval;
mod token;

pub use env::Env;
pub use token::TokenError;
pub use token::parse_integer;

/// Cause of a syntax error
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum SyntaxError {
    /// The expression ends where a value is expected.
    #[error("incomplete expression")]
    IncompleteExpression,
    /// An operator appears where a value is expected.
    #[error("expected a value")]
    MissingValue,
    /// An opening parenthesis is not closed.
    #[error("unmatched parenthesis")]
    UnclosedParen { opening_location: Range<usize> },
    /// A closing parenthesis has no opening counterpart.
    #[error("unmatched `)`")]
    UnmatchedCloseParen,
    /// A `?` is not followed by a matching `:`.
    #[error("expected `:`")]
    QuestionWithoutColon { question_location: Range<usize> },
    /// A `:` appears without a preceding `?`.
    #[error("`:` without matching `?`")]
    ColonWithoutQuestion,
    /// A token follows a complete expression.
    #[error("unexpected token")]
    RedundantToken,
}

/// Cause of an evaluation error
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum EvalError<E> {
    /// A variable value is not a valid number.
    #[error("invalid variable value: {0:?}")]
    InvalidVariableValue(String),
    /// The result does not fit in the integer type.
    #[error("overflow")]
    Overflow,
    /// The divisor of `/` or `%` is zero.
    #[error("division by zero")]
    DivisionByZero,
    /// The right-hand side of a shift is negative.
    #[error("negative shift amount")]
    ReverseShifting,
    /// The left-hand side of an assignment is not a variable.
    #[error("assignment to a non-variable")]
    AssignmentToValue,
    /// The environment rejected the assignment.
    #[error(transparent)]
    AssignVariableError(E),
}

/// Cause of an arithmetic expansion error
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum ErrorCause<E> {
    /// Error in tokenization
    #[error(transparent)]
    TokenError(#[from] TokenError),
    /// Error parsing the expression
    #[error(transparent)]
    SyntaxError(#[from] SyntaxError),
    /// Error evaluating the parsed expression
    #[error(transparent)]
    EvalError(#[from] EvalError<E>),
}

/// Description of an error that occurred during expansion
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("{cause}")]
pub struct Error<E> {
    /// Cause of the error
    pub cause: ErrorCause<E>,
    /// Range of the substring in the evaluated expression string where the
    /// error occurred
    pub location: Range<usize>,
}

/// Performs arithmetic expansion.
///
/// An empty expression evaluates to zero.
pub fn eval<E: Env>(expression: &str, env: &mut E) -> Result<i64, Error<E::AssignVariableError>> {
    eval::Evaluator::new(expression, env)?.evaluate_all()
}
