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

//! Parameter expansion

use super::super::{Expansion, Mode, to_pattern};
use super::{ErrorCause, Expander, Result};
use swsh_env::option::NoUnset;
use swsh_env::variable::{IFS, Scope};
use swsh_fnmatch::Pattern;
use swsh_syntax::bytes::{decode, encode};
use swsh_syntax::marker::{is_name, remove_quotes};
use swsh_syntax::parser::lex::mark_word;

/// Message of `${name:?}` with an empty word
const DEFAULT_ERROR_MESSAGE: &str = "parameter null or not set";

/// Value of a parameter
#[derive(Clone, Debug, Eq, PartialEq)]
enum Value {
    Scalar(String),
    /// Positional parameters expanded by `@` or `*`
    Array(Vec<String>),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Switch {
    /// `-`
    Default,
    /// `=`
    Assign,
    /// `?`
    Error,
    /// `+`
    Alter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Prefix,
    Suffix,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Modifier<'a> {
    None,
    /// `${#name}`
    Length,
    Switch {
        switch: Switch,
        /// Whether an empty value counts as unset
        colon: bool,
        word: &'a [u8],
    },
    Trim {
        side: Side,
        longest: bool,
        pattern: &'a [u8],
    },
}

/// Parsed content of `${...}`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct BracedParam<'a> {
    name: &'a str,
    modifier: Modifier<'a>,
}

/// Returns the length of the parameter name at the beginning of `body`.
fn name_len(body: &[u8]) -> Option<usize> {
    let first = *body.first()?;
    if first.is_ascii_alphabetic() || first == b'_' {
        Some(
            body.iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count(),
        )
    } else if first.is_ascii_digit() {
        Some(body.iter().take_while(|b| b.is_ascii_digit()).count())
    } else if b"@*#?-$!".contains(&first) {
        Some(1)
    } else {
        None
    }
}

fn switch_of(byte: u8) -> Option<Switch> {
    match byte {
        b'-' => Some(Switch::Default),
        b'=' => Some(Switch::Assign),
        b'?' => Some(Switch::Error),
        b'+' => Some(Switch::Alter),
        _ => None,
    }
}

/// Parses the content between the braces.
fn parse(body: &[u8]) -> Option<BracedParam<'_>> {
    if let Some(rest) = body.strip_prefix(b"#") {
        if !rest.is_empty() && name_len(rest) == Some(rest.len()) {
            let name = std::str::from_utf8(rest).ok()?;
            return Some(BracedParam {
                name,
                modifier: Modifier::Length,
            });
        }
    }

    let len = name_len(body)?;
    let name = std::str::from_utf8(&body[..len]).ok()?;
    let modifier = match &body[len..] {
        [] => Modifier::None,
        [b':', op, word @ ..] => Modifier::Switch {
            switch: switch_of(*op)?,
            colon: true,
            word,
        },
        [b'#', b'#', pattern @ ..] => Modifier::Trim {
            side: Side::Prefix,
            longest: true,
            pattern,
        },
        [b'#', pattern @ ..] => Modifier::Trim {
            side: Side::Prefix,
            longest: false,
            pattern,
        },
        [b'%', b'%', pattern @ ..] => Modifier::Trim {
            side: Side::Suffix,
            longest: true,
            pattern,
        },
        [b'%', pattern @ ..] => Modifier::Trim {
            side: Side::Suffix,
            longest: false,
            pattern,
        },
        [op, word @ ..] => Modifier::Switch {
            switch: switch_of(*op)?,
            colon: false,
            word,
        },
    };
    Some(BracedParam { name, modifier })
}

/// Tests whether the value triggers the switch.
fn is_vacant(value: &Option<Value>, colon: bool) -> bool {
    match value {
        None => true,
        Some(Value::Scalar(value)) => colon && value.is_empty(),
        Some(Value::Array(values)) => {
            values.is_empty() || (colon && values.iter().all(String::is_empty))
        }
    }
}

fn trim(value: &str, pattern: &Pattern, side: Side, longest: bool) -> String {
    let bytes = encode(value);
    let rest = match side {
        Side::Prefix => pattern.find_prefix(&bytes, longest).map(|len| &bytes[len..]),
        Side::Suffix => pattern.find_suffix(&bytes, longest).map(|start| &bytes[..start]),
    };
    match rest {
        Some(rest) => decode(rest).into_owned(),
        None => value.to_owned(),
    }
}

impl Expander<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        let env = &*self.env;
        let params = env.variables.positional_params();
        let scalar = |value: String| Some(Value::Scalar(value));
        match name {
            "@" | "*" => Some(Value::Array(params.to_vec())),
            "#" => scalar(params.len().to_string()),
            "?" => scalar(env.exit_status.to_string()),
            "-" => scalar(env.options.to_short_string()),
            "$" => scalar(env.main_pid.to_string()),
            "!" => scalar(env.last_async_pid?.to_string()),
            "0" => scalar(env.arg0.clone()),
            _ if name.starts_with(|c: char| c.is_ascii_digit()) => {
                let index = name.parse::<usize>().ok()?.checked_sub(1)?;
                scalar(params.get(index)?.clone())
            }
            _ => scalar(env.variables.value(name, env.stack.line_no)?),
        }
    }

    fn check_unset(&self, name: &str, value: &Option<Value>) -> Result<()> {
        if value.is_none() && self.env.options.is_on(NoUnset) {
            Err(self.error(ErrorCause::Unset(name.to_owned())))
        } else {
            Ok(())
        }
    }

    /// Returns the string that joins positional parameters in `$*`.
    fn ifs_separator(&self) -> String {
        match self.env.variables.get(IFS).and_then(|v| v.value.as_deref()) {
            None => " ".to_owned(),
            Some(ifs) => ifs.chars().next().map(String::from).unwrap_or_default(),
        }
    }

    fn push_param(&self, name: &str, value: Option<Value>, in_dquote: bool, out: &mut Expansion) {
        match value {
            None => self.push_value(b"", in_dquote, out),
            Some(Value::Scalar(value)) => self.push_value(&encode(&value), in_dquote, out),
            Some(Value::Array(values)) => {
                if self.mode.contains(Mode::SPLIT) && (name == "@" || !in_dquote) {
                    self.push_fields(&values, in_dquote, out)
                } else {
                    let separator = if name == "@" {
                        " ".to_owned()
                    } else {
                        self.ifs_separator()
                    };
                    self.push_value(&encode(&values.join(&separator)), in_dquote, out)
                }
            }
        }
    }

    /// Expands an unbraced parameter like `$foo` or `$1`.
    pub(super) fn raw_param(&mut self, name: &str, in_dquote: bool, out: &mut Expansion) -> Result<()> {
        let value = self.lookup(name);
        self.check_unset(name, &value)?;
        self.push_param(name, value, in_dquote, out);
        Ok(())
    }

    /// Expands the word of a modifier and appends the result to `out`.
    fn expand_modifier_word(&mut self, word: &[u8], in_dquote: bool, out: &mut Expansion) -> Result<()> {
        let marked = mark_word(word, in_dquote).map_err(|_| {
            let word = decode(word).into_owned();
            self.error(ErrorCause::BadSubstitution(word))
        })?;
        self.expand(&marked, in_dquote, true, out)
    }

    /// Expands the word of a modifier to marked text without field splitting
    /// and pathname expansion.
    fn expand_modifier_detached(&mut self, word: &[u8], in_dquote: bool) -> Result<Vec<u8>> {
        let mode = self.mode;
        self.mode = mode.difference(Mode::SPLIT | Mode::GLOB);
        let mut out = Expansion::default();
        let result = self.expand_modifier_word(word, in_dquote, &mut out);
        self.mode = mode;
        result.map(|()| out.text)
    }

    fn expand_modifier_to_string(&mut self, word: &[u8], in_dquote: bool) -> Result<String> {
        let text = self.expand_modifier_detached(word, in_dquote)?;
        Ok(decode(&remove_quotes(&text)).into_owned())
    }

    /// Expands `${...}`.
    ///
    /// `body` is the text between the braces.
    pub(super) fn braced_param(&mut self, body: &[u8], in_dquote: bool, out: &mut Expansion) -> Result<()> {
        let Some(param) = parse(body) else {
            let text = format!("${{{}}}", decode(body));
            return Err(self.error(ErrorCause::BadSubstitution(text)));
        };
        let name = param.name;
        let value = self.lookup(name);

        match param.modifier {
            Modifier::None => {
                self.check_unset(name, &value)?;
                self.push_param(name, value, in_dquote, out);
            }

            Modifier::Length => {
                self.check_unset(name, &value)?;
                let length = match value {
                    None => 0,
                    Some(Value::Scalar(value)) => value.chars().count(),
                    Some(Value::Array(values)) => values.len(),
                };
                self.push_value(length.to_string().as_bytes(), in_dquote, out);
            }

            Modifier::Switch {
                switch,
                colon,
                word,
            } => {
                let vacant = is_vacant(&value, colon);
                match switch {
                    Switch::Default if vacant => self.expand_modifier_word(word, in_dquote, out)?,
                    Switch::Alter if !vacant => self.expand_modifier_word(word, in_dquote, out)?,
                    Switch::Alter => (),
                    Switch::Assign if vacant => {
                        if !is_name(name.as_bytes()) {
                            let cause = ErrorCause::NonassignableParameter(name.to_owned());
                            return Err(self.error(cause));
                        }
                        let new_value = self.expand_modifier_to_string(word, in_dquote)?;
                        let result = self
                            .env
                            .get_or_create_variable(name, Scope::Global)
                            .assign(new_value.clone());
                        if result.is_err() {
                            return Err(self.error(ErrorCause::ReadOnly(name.to_owned())));
                        }
                        self.push_value(&encode(&new_value), in_dquote, out);
                    }
                    Switch::Error if vacant => {
                        let message = if word.is_empty() {
                            DEFAULT_ERROR_MESSAGE.to_owned()
                        } else {
                            self.expand_modifier_to_string(word, in_dquote)?
                        };
                        let name = name.to_owned();
                        return Err(self.error(ErrorCause::EmptyOrUnset { name, message }));
                    }
                    Switch::Default | Switch::Assign | Switch::Error => {
                        self.push_param(name, value, in_dquote, out)
                    }
                }
            }

            Modifier::Trim {
                side,
                longest,
                pattern,
            } => {
                self.check_unset(name, &value)?;
                let pattern = self.expand_modifier_detached(pattern, in_dquote)?;
                let value = match to_pattern(&pattern) {
                    None => value,
                    Some(pattern) => value.map(|value| match value {
                        Value::Scalar(value) => {
                            Value::Scalar(trim(&value, &pattern, side, longest))
                        }
                        Value::Array(values) => Value::Array(
                            values
                                .into_iter()
                                .map(|value| trim(&value, &pattern, side, longest))
                                .collect(),
                        ),
                    }),
                };
                self.push_param(name, value, in_dquote, out);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::{ErrorCause, expand_word, expand_words};
    use super::*;
    use assert_matches::assert_matches;
    use swsh_env::Env;
    use swsh_env::option::On;
    use swsh_env::semantics::ExitStatus;
    use swsh_env_test_helper::virtual_env;
    use swsh_syntax::syntax::Word;

    fn word(source: &str) -> Word {
        Word {
            text: mark_word(source.as_bytes(), false).unwrap(),
            line_no: 1,
        }
    }

    fn expand(env: &mut Env, source: &str) -> String {
        expand_word(env, &word(source)).unwrap().0.value
    }

    fn set(env: &mut Env, name: &str, value: &str) {
        env.variables
            .get_or_new(name, Scope::Global)
            .assign(value)
            .unwrap();
    }

    #[test]
    fn parsing_braced_params() {
        assert_eq!(
            parse(b"foo"),
            Some(BracedParam {
                name: "foo",
                modifier: Modifier::None
            })
        );
        assert_eq!(
            parse(b"#foo"),
            Some(BracedParam {
                name: "foo",
                modifier: Modifier::Length
            })
        );
        assert_eq!(
            parse(b"#"),
            Some(BracedParam {
                name: "#",
                modifier: Modifier::None
            })
        );
        assert_eq!(
            parse(b"10:-x"),
            Some(BracedParam {
                name: "10",
                modifier: Modifier::Switch {
                    switch: Switch::Default,
                    colon: true,
                    word: b"x"
                }
            })
        );
        assert_eq!(
            parse(b"x##*/"),
            Some(BracedParam {
                name: "x",
                modifier: Modifier::Trim {
                    side: Side::Prefix,
                    longest: true,
                    pattern: b"*/"
                }
            })
        );
        assert_eq!(parse(b"x:"), None);
        assert_eq!(parse(b"x/y"), None);
        assert_eq!(parse(b""), None);
    }

    #[test]
    fn special_parameters() {
        let (mut env, _) = virtual_env();
        *env.variables.positional_params_mut() = vec!["a".to_string(), "b".to_string()];
        env.exit_status = ExitStatus(42);
        env.arg0 = "myshell".to_string();
        assert_eq!(expand(&mut env, "$#"), "2");
        assert_eq!(expand(&mut env, "$?"), "42");
        assert_eq!(expand(&mut env, "$0"), "myshell");
        assert_eq!(expand(&mut env, "$2${1}"), "ba");
        assert_eq!(expand(&mut env, "$$"), env.main_pid.to_string());
        assert_eq!(expand(&mut env, "[$!]"), "[]");
        assert_eq!(expand(&mut env, "$@"), "a b");
    }

    #[test]
    fn options_parameter() {
        let (mut env, _) = virtual_env();
        env.options.set(swsh_env::option::ErrExit, On);
        env.options.set(swsh_env::option::XTrace, On);
        assert_eq!(expand(&mut env, "$-"), "ex");
    }

    #[test]
    fn star_joins_with_first_ifs_character() {
        let (mut env, _) = virtual_env();
        *env.variables.positional_params_mut() = vec!["a".to_string(), "b".to_string()];
        set(&mut env, IFS, ":-");
        assert_eq!(expand(&mut env, r#""$*""#), "a:b");
        set(&mut env, IFS, "");
        assert_eq!(expand(&mut env, r#""$*""#), "ab");
    }

    #[test]
    fn default_and_alternative_values() {
        let (mut env, _) = virtual_env();
        set(&mut env, "empty", "");
        set(&mut env, "full", "value");
        assert_eq!(expand(&mut env, "${unset-x}"), "x");
        assert_eq!(expand(&mut env, "${empty-x}"), "");
        assert_eq!(expand(&mut env, "${empty:-x}"), "x");
        assert_eq!(expand(&mut env, "${full:-x}"), "value");
        assert_eq!(expand(&mut env, "${unset+x}"), "");
        assert_eq!(expand(&mut env, "${empty+x}"), "x");
        assert_eq!(expand(&mut env, "${empty:+x}"), "");
        assert_eq!(expand(&mut env, "${full:+'$x'}"), "$x");
    }

    #[test]
    fn assign_default_value() {
        let (mut env, _) = virtual_env();
        set(&mut env, "v", "");
        assert_eq!(expand(&mut env, "${v:-def}${v:=set}${v}"), "defsetset");
        assert_eq!(env.variables.value("v", 0).as_deref(), Some("set"));
    }

    #[test]
    fn assign_to_special_parameter_fails() {
        let (mut env, _) = virtual_env();
        let error = expand_word(&mut env, &word("${1:=x}")).unwrap_err();
        assert_eq!(error.cause, ErrorCause::NonassignableParameter("1".to_string()));
    }

    #[test]
    fn assign_to_read_only_variable_fails() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new("ro", Scope::Global)
            .make_read_only();
        let error = expand_word(&mut env, &word("${ro=x}")).unwrap_err();
        assert_eq!(error.cause, ErrorCause::ReadOnly("ro".to_string()));
    }

    #[test]
    fn error_if_unset() {
        let (mut env, _) = virtual_env();
        let error = expand_word(&mut env, &word("${x:?}")).unwrap_err();
        assert_matches!(error.cause, ErrorCause::EmptyOrUnset { name, message } => {
            assert_eq!(name, "x");
            assert_eq!(message, DEFAULT_ERROR_MESSAGE);
        });
        let error = expand_word(&mut env, &word("${x?custom message}")).unwrap_err();
        assert_eq!(error.to_string(), "1: x: custom message");
        set(&mut env, "x", "ok");
        assert_eq!(expand(&mut env, "${x:?}"), "ok");
    }

    #[test]
    fn nounset_option() {
        let (mut env, _) = virtual_env();
        env.options.set(NoUnset, On);
        let error = expand_word(&mut env, &word("$x")).unwrap_err();
        assert_eq!(error.cause, ErrorCause::Unset("x".to_string()));
        assert_eq!(expand(&mut env, "${x-ok}"), "ok");
        assert_eq!(expand(&mut env, "$@"), "");
    }

    #[test]
    fn length() {
        let (mut env, _) = virtual_env();
        set(&mut env, "x", "héllo");
        assert_eq!(expand(&mut env, "${#x}"), "5");
        assert_eq!(expand(&mut env, "${#unset}"), "0");
    }

    #[test]
    fn trimming() {
        let (mut env, _) = virtual_env();
        set(&mut env, "path", "/usr/local/bin.tar.gz");
        assert_eq!(expand(&mut env, "${path#*/}"), "usr/local/bin.tar.gz");
        assert_eq!(expand(&mut env, "${path##*/}"), "bin.tar.gz");
        assert_eq!(expand(&mut env, "${path%.*}"), "/usr/local/bin.tar");
        assert_eq!(expand(&mut env, "${path%%.*}"), "/usr/local/bin");
        assert_eq!(expand(&mut env, "${path%x}"), "/usr/local/bin.tar.gz");
        assert_eq!(expand(&mut env, r#"${path%"*"}"#), "/usr/local/bin.tar.gz");
    }

    #[test]
    fn trimming_positional_parameters() {
        let (mut env, _) = virtual_env();
        *env.variables.positional_params_mut() = vec!["a.c".to_string(), "b.c".to_string()];
        let (fields, _) = expand_words(&mut env, &[word(r#""${@%.c}""#)]).unwrap();
        let values: Vec<_> = fields.into_iter().map(|f| f.value).collect();
        assert_eq!(values, ["a", "b"]);
    }

    #[test]
    fn bad_substitution() {
        let (mut env, _) = virtual_env();
        let error = expand_word(&mut env, &word("${x/y}")).unwrap_err();
        assert_eq!(error.cause, ErrorCause::BadSubstitution("${x/y}".to_string()));
    }
}
