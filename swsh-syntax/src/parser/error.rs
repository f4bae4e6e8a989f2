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

//! Definition of errors that happen in the parser.

use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Types of syntax errors.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum SyntaxError {
    /// A single quotation lacks a closing `'`.
    #[error("the single quote is not closed")]
    UnclosedSingleQuote,
    /// A double quotation lacks a closing `"`.
    #[error("the double quote is not closed")]
    UnclosedDoubleQuote,
    /// A parameter expansion lacks a closing `}`.
    #[error("the parameter expansion is not closed")]
    UnclosedParam,
    /// A command substitution started with `$(` but lacks a closing `)`.
    #[error("the command substitution is not closed")]
    UnclosedCommandSubstitution,
    /// A command substitution started with `` ` `` but lacks a closing `` ` ``.
    #[error("the backquote is not closed")]
    UnclosedBackquote,
    /// An arithmetic expansion lacks a closing `))`.
    #[error("the arithmetic expansion is not closed")]
    UnclosedArith,
    /// Unexpected token.
    #[error("syntax error: unexpected token")]
    UnexpectedToken,
    /// The file descriptor specified for a redirection cannot be used.
    #[error("the file descriptor is too large")]
    FdOutOfRange,
    /// A redirection operator is missing its operand.
    #[error("the redirection operator is missing its operand")]
    MissingRedirOperand,
    /// A here-document operator is missing its delimiter token.
    #[error("the here-document operator is missing its delimiter")]
    MissingHereDocDelimiter,
    /// The input ended before the content of a here-document.
    #[error("content of the here-document is missing")]
    MissingHereDocContent,
    /// A here-document content is missing its delimiter.
    #[error("the delimiter to close the here-document content is missing")]
    UnclosedHereDocContent,
    /// A grouping is not closed.
    #[error("the grouping is missing its closing `}}`")]
    UnclosedGrouping,
    /// A subshell is not closed.
    #[error("the subshell is missing its closing `)`")]
    UnclosedSubshell,
    /// A compound command contains no commands where some are required.
    #[error("a command is missing in the compound command")]
    EmptyCompoundList,
    /// A do clause is not closed.
    #[error("the `do` clause is missing its closing `done`")]
    UnclosedDoClause,
    /// The variable name is missing in a for loop.
    #[error("the variable name is missing in the `for` loop")]
    MissingForName,
    /// The variable name is not a valid word in a for loop.
    #[error("the variable name is invalid")]
    InvalidForName,
    /// A for, while or until loop is missing a do clause.
    #[error("the loop is missing its `do` clause")]
    MissingDoClause,
    /// An if command is missing the then clause.
    #[error("the `if` command is missing the `then` clause")]
    IfMissingThen,
    /// An if command is not closed.
    #[error("the `if` command is missing its closing `fi`")]
    UnclosedIf,
    /// The case command is missing its subject.
    #[error("the subject is missing after `case`")]
    MissingCaseSubject,
    /// The case command is missing `in` after the subject.
    #[error("`in` is missing in the `case` command")]
    MissingIn,
    /// The `)` is missing in a case item.
    #[error("the pattern list is not properly closed by a `)`")]
    UnclosedPatternList,
    /// The pattern is missing in a case item.
    #[error("a pattern is missing in the `case` command")]
    MissingPattern,
    /// A case command is not closed.
    #[error("the `case` command is missing its closing `esac`")]
    UnclosedCase,
    /// The `(` is not followed by `)` in a function definition.
    #[error("`)` is missing after `(`")]
    UnmatchedParenthesis,
    /// The function body is missing in a function definition command.
    #[error("the function body must be a compound command")]
    MissingFunctionBody,
    /// A pipeline is missing after a `&&` or `||` token.
    #[error("a command is missing after `&&` or `||`")]
    MissingPipeline,
    /// A command is missing after a `!` token.
    #[error("a command is missing after `!`")]
    MissingCommandAfterBang,
    /// A command is missing after a `|` token.
    #[error("a command is missing after `|`")]
    MissingCommandAfterBar,
}

/// Types of errors that may happen in parsing.
#[derive(Clone, Debug, Error)]
pub enum ErrorCause {
    /// Error in an underlying input function.
    #[error("error while reading commands: {0}")]
    Io(Rc<std::io::Error>),
    /// Syntax error.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl PartialEq for ErrorCause {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ErrorCause::Syntax(e1), ErrorCause::Syntax(e2)) => e1 == e2,
            _ => false,
        }
    }
}

impl From<std::io::Error> for ErrorCause {
    fn from(e: std::io::Error) -> ErrorCause {
        ErrorCause::Io(Rc::new(e))
    }
}

/// Explanation of a failure in parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    pub cause: ErrorCause,
    /// Line number where the error was found
    pub line_no: u64,
    /// Text of the token at which the error was found
    pub token: Vec<u8>,
}

impl Error {
    /// Tests whether the error is caused by an input error.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self.cause, ErrorCause::Io(_))
    }
}

/// Formats the error as `<line>: <message> Token: <token>`.
///
/// The shell prefixes the result with its name when reporting the error.
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line_no, self.cause)?;
        if !self.token.is_empty() {
            let token = crate::marker::remove_quotes(&self.token);
            write!(f, " Token: {}", String::from_utf8_lossy(&token))?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Result of parsing.
pub type Result<T> = std::result::Result<T, Error>;
