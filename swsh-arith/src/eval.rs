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

//! Shift/reduce evaluation
//!
//! The evaluator keeps an operand stack and an operator stack. Operands are
//! shifted as they are read; an incoming binary operator first reduces every
//! stacked operator that binds at least as tightly. Reductions compute values
//! immediately, so there is no intermediate syntax tree.
//!
//! The conditional operator is not stacked. When `?` arrives, the condition
//! has already been reduced onto the operand stack, and both arms are parsed
//! by recursive calls. The arm that is not selected, and the right-hand side
//! of a short-circuited `&&` or `||`, are parsed in skipping mode where no
//! variable is assigned and no arithmetic error is raised.

use crate::token::{Operator, Token, TokenValue, Tokens, parse_integer};
use crate::{Env, Error, ErrorCause, EvalError, SyntaxError};
use std::ops::Range;

/// Operand on the stack
#[derive(Clone, Debug, Eq, PartialEq)]
enum Term<'a> {
    Value(i64),
    Variable {
        name: &'a str,
        location: Range<usize>,
    },
}

/// Entry of the operator stack
#[derive(Clone, Debug, Eq, PartialEq)]
enum Pending {
    Prefix(Operator, Range<usize>),
    Binary {
        operator: Operator,
        location: Range<usize>,
        /// Whether this operator short-circuited its right-hand side
        skipping: bool,
    },
    Paren(Range<usize>),
}

type EvalResult<T, E> = Result<T, Error<<E as Env>::AssignVariableError>>;

pub(crate) struct Evaluator<'a, 'e, E: Env> {
    tokens: Tokens<'a>,
    lookahead: Token<'a>,
    env: &'e mut E,
    /// Nesting depth of skipped sub-expressions
    skip: usize,
}

impl<'a, 'e, E: Env> Evaluator<'a, 'e, E> {
    pub fn new(expression: &'a str, env: &'e mut E) -> EvalResult<Self, E> {
        let mut tokens = Tokens::new(expression);
        let lookahead = tokens.next_token()?;
        Ok(Evaluator {
            tokens,
            lookahead,
            env,
            skip: 0,
        })
    }

    fn advance(&mut self) -> EvalResult<(), E> {
        self.lookahead = self.tokens.next_token()?;
        Ok(())
    }

    fn syntax_error<T>(cause: SyntaxError, location: Range<usize>) -> EvalResult<T, E> {
        Err(Error {
            cause: ErrorCause::SyntaxError(cause),
            location,
        })
    }

    fn eval_error<T>(
        cause: EvalError<E::AssignVariableError>,
        location: Range<usize>,
    ) -> EvalResult<T, E> {
        Err(Error {
            cause: ErrorCause::EvalError(cause),
            location,
        })
    }

    /// Evaluates the whole expression.
    pub fn evaluate_all(mut self) -> EvalResult<i64, E> {
        if self.lookahead.value == TokenValue::EndOfInput {
            return Ok(0);
        }
        let term = self.expression(1)?;
        match self.lookahead.value {
            TokenValue::EndOfInput => self.resolve(&term),
            TokenValue::Operator(Operator::Colon) => Self::syntax_error(
                SyntaxError::ColonWithoutQuestion,
                self.lookahead.location.clone(),
            ),
            TokenValue::Operator(Operator::CloseParen) => Self::syntax_error(
                SyntaxError::UnmatchedCloseParen,
                self.lookahead.location.clone(),
            ),
            _ => Self::syntax_error(
                SyntaxError::RedundantToken,
                self.lookahead.location.clone(),
            ),
        }
    }

    /// Returns the numeric value of an operand.
    fn resolve(&mut self, term: &Term<'a>) -> EvalResult<i64, E> {
        match term {
            Term::Value(value) => Ok(*value),
            Term::Variable { .. } if self.skip > 0 => Ok(0),
            Term::Variable { name, location } => match self.env.get_variable(name) {
                None => Ok(0),
                Some(value) => match parse_variable_value(&value) {
                    Some(number) => Ok(number),
                    None => Self::eval_error(EvalError::InvalidVariableValue(value), location.clone()),
                },
            },
        }
    }

    /// Parses and evaluates an expression that ends before any binary
    /// operator with a precedence lower than `min_precedence`.
    fn expression(&mut self, min_precedence: u8) -> EvalResult<Term<'a>, E> {
        let mut operands = Vec::new();
        let mut operators = Vec::new();

        loop {
            // An operand is expected here.
            let Token { value, location } = self.lookahead.clone();
            match value {
                TokenValue::Number(number) => operands.push(Term::Value(number)),
                TokenValue::Identifier(name) => operands.push(Term::Variable { name, location }),
                TokenValue::Operator(
                    operator @ (Operator::Plus | Operator::Minus | Operator::Bang | Operator::Tilde),
                ) => {
                    operators.push(Pending::Prefix(operator, location));
                    self.advance()?;
                    continue;
                }
                TokenValue::Operator(Operator::OpenParen) => {
                    operators.push(Pending::Paren(location));
                    self.advance()?;
                    continue;
                }
                TokenValue::EndOfInput => {
                    return Self::syntax_error(SyntaxError::IncompleteExpression, location);
                }
                TokenValue::Operator(_) => {
                    return Self::syntax_error(SyntaxError::MissingValue, location);
                }
            }
            self.advance()?;

            // An operator is expected here.
            loop {
                let Token { value, location } = self.lookahead.clone();
                let in_paren = operators.iter().any(|p| matches!(p, Pending::Paren(_)));
                let operator = match value {
                    TokenValue::Operator(Operator::CloseParen) if in_paren => {
                        self.reduce(&mut operands, &mut operators, 0, false)?;
                        operators.pop();
                        self.advance()?;
                        continue;
                    }
                    TokenValue::Operator(operator)
                        if operator
                            .precedence()
                            .is_some_and(|p| in_paren || p >= min_precedence) =>
                    {
                        operator
                    }
                    _ => {
                        self.reduce(&mut operands, &mut operators, 0, false)?;
                        if let Some(Pending::Paren(opening_location)) = operators.pop() {
                            return Self::syntax_error(
                                SyntaxError::UnclosedParen { opening_location },
                                location,
                            );
                        }
                        return match operands.pop() {
                            Some(term) => Ok(term),
                            None => Self::syntax_error(SyntaxError::IncompleteExpression, location),
                        };
                    }
                };

                let precedence = operator.precedence().unwrap_or(0);
                let right_associative = operator.is_right_associative();
                self.reduce(&mut operands, &mut operators, precedence, right_associative)?;
                self.advance()?;

                if operator == Operator::Question {
                    let value = self.conditional(&mut operands, location)?;
                    operands.push(Term::Value(value));
                    continue;
                }

                let skipping = match operator {
                    Operator::AndAnd => self.top_value(&mut operands)? == 0,
                    Operator::BarBar => self.top_value(&mut operands)? != 0,
                    _ => false,
                };
                if skipping {
                    self.skip += 1;
                }
                operators.push(Pending::Binary {
                    operator,
                    location,
                    skipping,
                });
                break;
            }
        }
    }

    /// Resolves the operand on the top of the stack in place.
    fn top_value(&mut self, operands: &mut [Term<'a>]) -> EvalResult<i64, E> {
        match operands.last_mut() {
            Some(term) => {
                let value = self.resolve(term)?;
                *term = Term::Value(value);
                Ok(value)
            }
            None => Self::syntax_error(SyntaxError::IncompleteExpression, 0..0),
        }
    }

    /// Evaluates both arms of a conditional whose condition is on top of the
    /// operand stack, and returns the selected value.
    fn conditional(
        &mut self,
        operands: &mut Vec<Term<'a>>,
        question_location: Range<usize>,
    ) -> EvalResult<i64, E> {
        let condition = self.top_value(operands)?;
        operands.pop();

        let skip_then = usize::from(condition == 0);
        self.skip += skip_then;
        let then_term = self.expression(1)?;
        let then_value = self.resolve(&then_term)?;
        self.skip -= skip_then;

        if self.lookahead.value != TokenValue::Operator(Operator::Colon) {
            return Self::syntax_error(
                SyntaxError::QuestionWithoutColon { question_location },
                self.lookahead.location.clone(),
            );
        }
        self.advance()?;

        let skip_else = usize::from(condition != 0);
        self.skip += skip_else;
        let else_term = self.expression(2)?;
        let else_value = self.resolve(&else_term)?;
        self.skip -= skip_else;

        Ok(if condition != 0 { then_value } else { else_value })
    }

    /// Reduces stacked operators that bind at least as tightly as an
    /// incoming operator with the given precedence.
    ///
    /// Reduction stops at an open parenthesis.
    fn reduce(
        &mut self,
        operands: &mut Vec<Term<'a>>,
        operators: &mut Vec<Pending>,
        precedence: u8,
        right_associative: bool,
    ) -> EvalResult<(), E> {
        while let Some(top) = operators.last() {
            let reducible = match top {
                Pending::Paren(_) => false,
                Pending::Prefix(..) => true,
                Pending::Binary { operator, .. } => {
                    let stacked = operator.precedence().unwrap_or(0);
                    stacked > precedence || (stacked == precedence && !right_associative)
                }
            };
            if !reducible {
                break;
            }

            match operators.pop() {
                Some(Pending::Prefix(operator, location)) => {
                    let Some(term) = operands.pop() else {
                        return Self::syntax_error(SyntaxError::IncompleteExpression, location);
                    };
                    let value = self.resolve(&term)?;
                    let result = self.apply_prefix(operator, value, location)?;
                    operands.push(Term::Value(result));
                }
                Some(Pending::Binary {
                    operator,
                    location,
                    skipping,
                }) => {
                    let (Some(rhs), Some(lhs)) = (operands.pop(), operands.pop()) else {
                        return Self::syntax_error(SyntaxError::IncompleteExpression, location);
                    };
                    let result = if skipping {
                        self.skip -= 1;
                        i64::from(operator == Operator::BarBar)
                    } else {
                        self.apply_binary(operator, lhs, rhs, location)?
                    };
                    operands.push(Term::Value(result));
                }
                Some(Pending::Paren(_)) | None => break,
            }
        }
        Ok(())
    }

    fn apply_prefix(
        &mut self,
        operator: Operator,
        value: i64,
        location: Range<usize>,
    ) -> EvalResult<i64, E> {
        if self.skip > 0 {
            return Ok(0);
        }
        match operator {
            Operator::Plus => Ok(value),
            Operator::Minus => match value.checked_neg() {
                Some(result) => Ok(result),
                None => Self::eval_error(EvalError::Overflow, location),
            },
            Operator::Bang => Ok(i64::from(value == 0)),
            Operator::Tilde => Ok(!value),
            _ => Self::syntax_error(SyntaxError::MissingValue, location),
        }
    }

    fn apply_binary(
        &mut self,
        operator: Operator,
        lhs: Term<'a>,
        rhs: Term<'a>,
        location: Range<usize>,
    ) -> EvalResult<i64, E> {
        if let Some(compound) = operator.assignment() {
            let Term::Variable {
                name,
                location: name_location,
            } = &lhs
            else {
                return Self::eval_error(EvalError::AssignmentToValue, location);
            };
            let rhs_value = self.resolve(&rhs)?;
            if self.skip > 0 {
                return Ok(0);
            }
            let result = match compound {
                None => rhs_value,
                Some(operator) => {
                    let lhs_value = self.resolve(&lhs)?;
                    self.arithmetic(operator, lhs_value, rhs_value, location)?
                }
            };
            if let Err(e) = self.env.assign_variable(name, result.to_string()) {
                return Self::eval_error(EvalError::AssignVariableError(e), name_location.clone());
            }
            return Ok(result);
        }

        let lhs_value = self.resolve(&lhs)?;
        let rhs_value = self.resolve(&rhs)?;
        if self.skip > 0 {
            return Ok(0);
        }
        self.arithmetic(operator, lhs_value, rhs_value, location)
    }

    fn arithmetic(
        &mut self,
        operator: Operator,
        lhs: i64,
        rhs: i64,
        location: Range<usize>,
    ) -> EvalResult<i64, E> {
        use Operator::*;
        let checked = |result: Option<i64>| match result {
            Some(value) => Ok(value),
            None => Self::eval_error(EvalError::Overflow, location.clone()),
        };
        match operator {
            BarBar => Ok(i64::from(lhs != 0 || rhs != 0)),
            AndAnd => Ok(i64::from(lhs != 0 && rhs != 0)),
            Bar => Ok(lhs | rhs),
            Caret => Ok(lhs ^ rhs),
            And => Ok(lhs & rhs),
            EqualEqual => Ok(i64::from(lhs == rhs)),
            BangEqual => Ok(i64::from(lhs != rhs)),
            Less => Ok(i64::from(lhs < rhs)),
            LessEqual => Ok(i64::from(lhs <= rhs)),
            Greater => Ok(i64::from(lhs > rhs)),
            GreaterEqual => Ok(i64::from(lhs >= rhs)),
            LessLess | GreaterGreater => {
                if rhs < 0 {
                    return Self::eval_error(EvalError::ReverseShifting, location.clone());
                }
                let amount = u32::try_from(rhs).unwrap_or(u32::MAX);
                if operator == LessLess {
                    checked(lhs.checked_shl(amount))
                } else {
                    checked(lhs.checked_shr(amount))
                }
            }
            Plus => checked(lhs.checked_add(rhs)),
            Minus => checked(lhs.checked_sub(rhs)),
            Asterisk => checked(lhs.checked_mul(rhs)),
            Slash | Percent if rhs == 0 => {
                Self::eval_error(EvalError::DivisionByZero, location.clone())
            }
            Slash => checked(lhs.checked_div(rhs)),
            Percent => checked(lhs.checked_rem(rhs)),
            _ => Self::syntax_error(SyntaxError::MissingValue, location.clone()),
        }
    }
}

/// Converts a variable value to a number.
///
/// The value may be surrounded by blanks and may have a sign. The digits
/// follow the same rules as a constant in an expression.
fn parse_variable_value(value: &str) -> Option<i64> {
    let value = value.trim_matches([' ', '\t', '\n']);
    if value.is_empty() {
        return Some(0);
    }
    if let Some(digits) = value.strip_prefix('-') {
        parse_integer(digits).map(i64::wrapping_neg)
    } else {
        parse_integer(value.strip_prefix('+').unwrap_or(value))
    }
}
