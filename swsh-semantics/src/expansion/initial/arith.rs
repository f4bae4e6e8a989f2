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

//! Arithmetic expansion

use super::super::Expansion;
use super::{ErrorCause, Expander, Result};
use swsh_env::Env;
use swsh_env::variable::{AssignError, Scope};
use swsh_syntax::bytes::decode;
use swsh_syntax::marker::remove_quotes;
use swsh_syntax::parser::lex::mark_word;

/// Variable access for the arithmetic evaluator
struct VarEnv<'a>(&'a mut Env);

impl swsh_arith::Env for VarEnv<'_> {
    type AssignVariableError = AssignError;

    fn get_variable(&mut self, name: &str) -> Option<String> {
        let env = &*self.0;
        env.variables.value(name, env.stack.line_no)
    }

    fn assign_variable(
        &mut self,
        name: &str,
        value: String,
    ) -> std::result::Result<(), AssignError> {
        self.0
            .get_or_create_variable(name, Scope::Global)
            .assign(value)
            .map(drop)
    }
}

impl Expander<'_> {
    /// Evaluates the expression in `$((...))`.
    ///
    /// The expression first undergoes parameter expansion, command
    /// substitution and nested arithmetic expansion as if it were in double
    /// quotes.
    pub(super) fn arith(&mut self, body: &[u8]) -> Result<String> {
        let marked = mark_word(body, true).map_err(|_| {
            let text = format!("$(({}))", decode(body));
            self.error(ErrorCause::BadSubstitution(text))
        })?;
        let mut out = Expansion::default();
        self.expand(&marked, true, false, &mut out)?;
        let expression = decode(&remove_quotes(&out.text)).into_owned();

        let result = swsh_arith::eval(&expression, &mut VarEnv(&mut *self.env));
        match result {
            Ok(value) => Ok(value.to_string()),
            Err(error) => Err(self.error(ErrorCause::Arith(error))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::expand_word;
    use super::*;
    use assert_matches::assert_matches;
    use swsh_env_test_helper::virtual_env;
    use swsh_syntax::syntax::Word;

    fn word(source: &str) -> Word {
        Word {
            text: mark_word(source.as_bytes(), false).unwrap(),
            line_no: 2,
        }
    }

    #[test]
    fn constant_expression() {
        let (mut env, _) = virtual_env();
        let (field, _) = expand_word(&mut env, &word("$((1 + 2 * 3))")).unwrap();
        assert_eq!(field.value, "7");
    }

    #[test]
    fn variables_and_assignment() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new("x", Scope::Global)
            .assign("5")
            .unwrap();
        let (field, _) = expand_word(&mut env, &word("$((x += 2)):$x:$(($x * 2))")).unwrap();
        assert_eq!(field.value, "7:7:14");
    }

    #[test]
    fn division_by_zero() {
        let (mut env, _) = virtual_env();
        let error = expand_word(&mut env, &word("$((1/0))")).unwrap_err();
        assert_eq!(error.line_no, 2);
        assert_matches!(error.cause, ErrorCause::Arith(_));
    }

    #[test]
    fn assignment_to_read_only_variable() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new("r", Scope::Global)
            .make_read_only();
        let error = expand_word(&mut env, &word("$((r = 1))")).unwrap_err();
        assert_matches!(error.cause, ErrorCause::Arith(_));
    }
}
