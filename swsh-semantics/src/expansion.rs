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

//! Word expansion.
//!
//! The word expansion converts a [`Word`] in marked text to [`Field`]s. It
//! consists of the steps below, performed in this order:
//!
//! 1. The *initial expansion* scans the word from left to right and replaces
//!    tilde prefixes, parameter expansions, command substitutions and
//!    arithmetic expansions with their results. The result is still marked
//!    text, and the byte range produced by each expansion is recorded as an
//!    expansion [`Range`].
//! 2. *Field splitting* divides the text at IFS characters, but only inside
//!    the recorded ranges.
//! 3. *Pathname expansion* replaces a field that contains an unquoted `*`,
//!    `?` or `[` with the sorted names of matching files.
//! 4. *Quote removal* removes the markers.
//!
//! Which steps are performed depends on the context in which the word
//! appears. See [`Mode`].
//!
//! # Expansion ranges
//!
//! The output of an unquoted expansion is field-split on the characters of
//! `$IFS`. The output of `"$@"` is instead split on the null bytes the
//! expansion puts between positional parameters, so that each parameter
//! becomes a separate field while staying quoted. If there are no positional
//! parameters, `"$@"` leaves a vanishing range, and a field that contains
//! nothing but the range and quotes is removed.
//!
//! Pattern characters in the unquoted output of an expansion take part in
//! pathname expansion just like those written literally in the word. The
//! output of an expansion in double quotes is quoted and never expands to
//! pathnames.

mod glob;
mod initial;
mod split;

pub use self::glob::glob;
pub use self::split::{Range, RangeKind, split};
use self::initial::Expander;
use bitflags::bitflags;
use std::rc::Rc;
use swsh_env::Env;
use swsh_env::semantics::{ExitStatus, Field};
use swsh_env::system::Errno;
use swsh_env::option::NoGlob;
use swsh_env::variable::{AssignError, IFS, IFS_INITIAL_VALUE};
use swsh_fnmatch::{Pattern, PatternChar};
use swsh_syntax::bytes::{decode, encode};
use swsh_syntax::marker::{remove_quotes, unmark};
use swsh_syntax::parser::lex::mark_here_doc;
use swsh_syntax::syntax::{HereDoc, Word};
use thiserror::Error;

bitflags! {
    /// Steps of the word expansion that are performed besides the initial
    /// expansion and quote removal
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct Mode: u8 {
        /// Tilde expansion at the beginning of the word
        const TILDE = 1 << 0;
        /// Tilde expansion after each unquoted `:` as well, as in the value
        /// of an assignment
        const TILDE_AFTER_COLON = 1 << 1;
        /// Field splitting
        ///
        /// This also makes `"$@"` expand to separate fields.
        const SPLIT = 1 << 2;
        /// Pathname expansion
        const GLOB = 1 << 3;
    }
}

impl Mode {
    /// Mode for command words and the words of a `for` loop
    pub const MULTIPLE: Mode = Mode::TILDE.union(Mode::SPLIT).union(Mode::GLOB);
    /// Mode for a word that expands to exactly one field, such as the subject
    /// of a `case` command or the operand of a redirection
    pub const SINGLE: Mode = Mode::TILDE;
    /// Mode for the value of an assignment
    pub const ASSIGNMENT: Mode = Mode::TILDE.union(Mode::TILDE_AFTER_COLON);
}

/// Types of errors that may occur in the word expansion.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ErrorCause {
    /// Error in arithmetic expansion
    #[error("arithmetic expansion: {0}")]
    Arith(#[from] swsh_arith::Error<AssignError>),

    /// Parameter that is unset or empty in `${name:?message}`
    #[error("{name}: {message}")]
    EmptyOrUnset { name: String, message: String },

    /// Unset parameter expanded while the `nounset` option is on
    #[error("{0}: parameter not set")]
    Unset(String),

    /// Assignment to a read-only variable
    #[error("{0}: cannot assign to a read-only variable")]
    ReadOnly(String),

    /// Assignment to a special or positional parameter in `${name:=word}`
    #[error("{0}: cannot assign to a special parameter")]
    NonassignableParameter(String),

    /// Malformed `${...}`
    #[error("{0}: bad substitution")]
    BadSubstitution(String),

    /// System error that prevented command substitution
    #[error("cannot perform command substitution: {}", .0.desc())]
    CommandSubst(Errno),
}

/// Explanation of an expansion failure.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{line_no}: {cause}")]
pub struct Error {
    pub cause: ErrorCause,
    /// Line number of the word being expanded
    pub line_no: u64,
}

/// Result of word expansion.
pub type Result<T> = std::result::Result<T, Error>;

/// Result of the initial expansion
///
/// `text` is marked text. `ranges` are sorted and do not overlap.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Expansion {
    pub text: Vec<u8>,
    pub ranges: Vec<Range>,
}

/// Performs the initial expansion on marked text.
///
/// Returns the expansion and the exit status of the last command
/// substitution performed, if any.
pub fn expand_marked(
    env: &mut Env,
    text: &[u8],
    mode: Mode,
    line_no: u64,
) -> Result<(Expansion, Option<ExitStatus>)> {
    let mut expander = Expander::new(env, mode, line_no);
    let mut expansion = Expansion::default();
    expander.expand(text, false, true, &mut expansion)?;
    Ok((expansion, expander.last_command_subst_status))
}

/// Returns the value of `$IFS`, or the default value if it is unset.
fn ifs(env: &Env) -> Vec<u8> {
    env.variables
        .get(IFS)
        .and_then(|v| v.value.as_deref())
        .map_or_else(|| IFS_INITIAL_VALUE.as_bytes().to_vec(), |ifs| encode(ifs).into_owned())
}

fn to_field(marked: &[u8], line_no: u64) -> Field {
    let value = decode(&remove_quotes(marked)).into_owned();
    Field { value, line_no }
}

/// Expands words to any number of fields.
///
/// All the steps of the word expansion are performed, except that pathname
/// expansion is skipped if the `noglob` option is on.
///
/// The second item of the result is the exit status of the last command
/// substitution, which becomes the exit status of a simple command that has
/// no command word.
pub fn expand_words<'a, I>(env: &mut Env, words: I) -> Result<(Vec<Field>, Option<ExitStatus>)>
where
    I: IntoIterator<Item = &'a Word>,
{
    let mut mode = Mode::MULTIPLE;
    if env.options.is_on(NoGlob) {
        mode.remove(Mode::GLOB);
    }

    let mut fields = Vec::new();
    let mut last_status = None;
    for word in words {
        let (expansion, status) = expand_marked(env, &word.text, mode, word.line_no)?;
        last_status = status.or(last_status);

        let ifs = ifs(env);
        for field in split(&expansion.text, &expansion.ranges, &ifs) {
            match mode.contains(Mode::GLOB).then(|| glob(env, &field)).flatten() {
                Some(paths) => fields.extend(paths.into_iter().map(|path| Field {
                    value: path,
                    line_no: word.line_no,
                })),
                None => fields.push(to_field(&field, word.line_no)),
            }
        }
    }
    Ok((fields, last_status))
}

/// Expands a word to a single field.
///
/// Tilde expansion is performed, but field splitting and pathname expansion
/// are not.
pub fn expand_word(env: &mut Env, word: &Word) -> Result<(Field, Option<ExitStatus>)> {
    let (expansion, status) = expand_marked(env, &word.text, Mode::SINGLE, word.line_no)?;
    Ok((to_field(&expansion.text, word.line_no), status))
}

/// Expands the value of an assignment.
///
/// This is the same as [`expand_word`] except that tilde expansion is also
/// performed after each `:`.
pub fn expand_value(env: &mut Env, word: &Word) -> Result<(String, Option<ExitStatus>)> {
    let (expansion, status) = expand_marked(env, &word.text, Mode::ASSIGNMENT, word.line_no)?;
    Ok((to_field(&expansion.text, word.line_no).value, status))
}

/// Expands a word to a pattern.
///
/// Quoted characters in the word match literally. Returns `None` if the
/// pattern cannot be compiled.
pub fn expand_pattern(env: &mut Env, word: &Word) -> Result<Option<Pattern>> {
    let (expansion, _) = expand_marked(env, &word.text, Mode::SINGLE, word.line_no)?;
    Ok(to_pattern(&expansion.text))
}

/// Compiles marked text into a pattern.
///
/// Quoted characters are literal characters of the pattern.
#[must_use]
pub fn to_pattern(marked: &[u8]) -> Option<Pattern> {
    let chars = unmark(marked).map(|(byte, quoted)| {
        if quoted {
            PatternChar::Literal(byte)
        } else {
            PatternChar::Normal(byte)
        }
    });
    Pattern::parse(chars).ok()
}

/// Expands the content of a here-document.
///
/// If the delimiter was quoted, the content is returned intact. Otherwise,
/// parameter expansion, command substitution and arithmetic expansion are
/// performed.
pub fn expand_here_doc(env: &mut Env, here_doc: &Rc<HereDoc>, line_no: u64) -> Result<String> {
    let (expansion, _) = expand_marked(env, &here_doc.marked_content(), Mode::empty(), line_no)?;
    Ok(to_field(&expansion.text, line_no).value)
}

/// Expands a string as if it were the content of a here-document.
///
/// This is used for variables like `$PS4` whose value undergoes parameter
/// expansion before use.
pub fn expand_text(env: &mut Env, text: &str, line_no: u64) -> Result<String> {
    let marked = mark_here_doc(&encode(text));
    let (expansion, _) = expand_marked(env, &marked, Mode::empty(), line_no)?;
    Ok(to_field(&expansion.text, line_no).value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swsh_env::option::On;
    use swsh_env::variable::Scope;
    use swsh_env_test_helper::{stub_file, virtual_env};

    fn word(source: &str) -> Word {
        Word {
            text: swsh_syntax::parser::lex::mark_word(source.as_bytes(), false).unwrap(),
            line_no: 1,
        }
    }

    fn values(fields: Vec<Field>) -> Vec<String> {
        fields.into_iter().map(|f| f.value).collect()
    }

    #[test]
    fn words_are_split_and_quotes_removed() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new("v", Scope::Global)
            .assign(" a  b ")
            .unwrap();
        let words = [word("x$v'y'"), word(r#""$v""#), word("''")];
        let (fields, status) = expand_words(&mut env, &words).unwrap();
        assert_eq!(values(fields), ["x", "a", "b", "y", " a  b ", ""]);
        assert_eq!(status, None);
    }

    #[test]
    fn positional_parameters_in_double_quotes() {
        let (mut env, _) = virtual_env();
        *env.variables.positional_params_mut() =
            vec!["a".to_string(), "b c".to_string(), "d".to_string()];
        let (fields, _) = expand_words(&mut env, &[word(r#""$@""#)]).unwrap();
        assert_eq!(values(fields), ["a", "b c", "d"]);
        let (fields, _) = expand_words(&mut env, &[word(r#""$*""#)]).unwrap();
        assert_eq!(values(fields), ["a b c d"]);
        let (fields, _) = expand_words(&mut env, &[word(r#"<"$@">"#)]).unwrap();
        assert_eq!(values(fields), ["<a", "b c", "d>"]);
    }

    #[test]
    fn empty_quoted_at_vanishes() {
        let (mut env, _) = virtual_env();
        let (fields, _) = expand_words(&mut env, &[word(r#""$@""#), word("x")]).unwrap();
        assert_eq!(values(fields), ["x"]);
    }

    #[test]
    fn alternative_word_keeps_at_ranges() {
        let (mut env, _) = virtual_env();
        *env.variables.positional_params_mut() = vec!["1 2".to_string(), "3".to_string()];
        let (fields, _) = expand_words(&mut env, &[word(r#"${1+"$@"}"#)]).unwrap();
        assert_eq!(values(fields), ["1 2", "3"]);
    }

    #[test]
    fn pathname_expansion() {
        let (mut env, state) = virtual_env();
        stub_file(&state, "/tmp/b.txt", "");
        stub_file(&state, "/tmp/a.txt", "");
        stub_file(&state, "/tmp/.hidden.txt", "");
        let (fields, _) = expand_words(&mut env, &[word("/tmp/*.txt")]).unwrap();
        assert_eq!(values(fields), ["/tmp/a.txt", "/tmp/b.txt"]);

        let (fields, _) = expand_words(&mut env, &[word("/tmp/*.none")]).unwrap();
        assert_eq!(values(fields), ["/tmp/*.none"]);

        let (fields, _) = expand_words(&mut env, &[word("/tmp/'*'.txt")]).unwrap();
        assert_eq!(values(fields), ["/tmp/*.txt"]);
    }

    #[test]
    fn pattern_characters_from_unquoted_variables_expand() {
        let (mut env, state) = virtual_env();
        stub_file(&state, "/a1", "");
        stub_file(&state, "/a2", "");
        env.variables
            .get_or_new("p", Scope::Global)
            .assign("/a*")
            .unwrap();
        let (fields, _) = expand_words(&mut env, &[word("$p")]).unwrap();
        assert_eq!(values(fields), ["/a1", "/a2"]);
        let (fields, _) = expand_words(&mut env, &[word(r#""$p""#)]).unwrap();
        assert_eq!(values(fields), ["/a*"]);
    }

    #[test]
    fn bytes_not_valid_in_utf8_are_preserved() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new("v", Scope::Global)
            .assign(decode(b"\xfe\xe3\x81"))
            .unwrap();
        let raw = Word {
            text: swsh_syntax::parser::lex::mark_word(b"a\xffb", false).unwrap(),
            line_no: 1,
        };
        let (fields, _) = expand_words(&mut env, &[raw, word("${v}x")]).unwrap();
        let bytes: Vec<Vec<u8>> = fields
            .iter()
            .map(|field| encode(&field.value).into_owned())
            .collect();
        assert_eq!(bytes, [b"a\xffb".to_vec(), b"\xfe\xe3\x81x".to_vec()]);
    }

    #[test]
    fn noglob_disables_pathname_expansion() {
        let (mut env, state) = virtual_env();
        stub_file(&state, "/tmp/a.txt", "");
        env.options.set(NoGlob, On);
        let (fields, _) = expand_words(&mut env, &[word("/tmp/*")]).unwrap();
        assert_eq!(values(fields), ["/tmp/*"]);
    }

    #[test]
    fn single_field_expansion() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new("v", Scope::Global)
            .assign("a  b")
            .unwrap();
        let (field, _) = expand_word(&mut env, &word("$v*")).unwrap();
        assert_eq!(field.value, "a  b*");
    }

    #[test]
    fn tilde_in_assignment_value() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new("HOME", Scope::Global)
            .assign("/home/me")
            .unwrap();
        let (value, _) = expand_value(&mut env, &word("~/a:~/b:x~")).unwrap();
        assert_eq!(value, "/home/me/a:/home/me/b:x~");
        let (field, _) = expand_word(&mut env, &word("~/a:~/b")).unwrap();
        assert_eq!(field.value, "/home/me/a:~/b");
    }

    #[test]
    fn patterns_from_words() {
        let (mut env, _) = virtual_env();
        let pattern = expand_pattern(&mut env, &word("a*")).unwrap().unwrap();
        assert!(pattern.is_match(b"abc"));
        let pattern = expand_pattern(&mut env, &word(r"a\*")).unwrap().unwrap();
        assert!(!pattern.is_match(b"abc"));
        assert!(pattern.is_match(b"a*"));
    }

    #[test]
    fn here_doc_content() {
        let (mut env, _) = virtual_env();
        env.variables
            .get_or_new("v", Scope::Global)
            .assign("value")
            .unwrap();
        let here_doc = Rc::new(HereDoc {
            delimiter: b"END".to_vec(),
            quoted: false,
            remove_tabs: false,
            content: "$v \"q\" \\$v\n".as_bytes().to_vec().into(),
        });
        assert_eq!(
            expand_here_doc(&mut env, &here_doc, 1).unwrap(),
            "value \"q\" $v\n"
        );

        let quoted = Rc::new(HereDoc {
            delimiter: b"END".to_vec(),
            quoted: true,
            remove_tabs: false,
            content: "$v\n".as_bytes().to_vec().into(),
        });
        assert_eq!(expand_here_doc(&mut env, &quoted, 1).unwrap(), "$v\n");
    }

    #[test]
    fn error_display_has_line_number() {
        let error = Error {
            cause: ErrorCause::Unset("x".to_string()),
            line_no: 3,
        };
        assert_eq!(error.to_string(), "3: x: parameter not set");
    }
}
