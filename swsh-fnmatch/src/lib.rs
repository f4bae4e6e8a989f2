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

//! This crate provides globbing pattern matching.
//!
//! A pattern is built from an iterator of [`PatternChar`]s so that the caller
//! decides which characters are quoted. Quoted characters always match
//! themselves. Of the normal characters, `?` matches any single byte, `*`
//! matches any byte string, and `[...]` is a bracket expression with ranges,
//! `!` or `^` complement, and `[:class:]` character classes.
//!
//! Patterns work on bytes, not characters, and do not depend on the locale.
//!
//! ```
//! # use swsh_fnmatch::{Pattern, without_escape};
//! let pattern = Pattern::parse(without_escape(b"a*[0-9]")).unwrap();
//! assert!(pattern.is_match(b"abc1"));
//! assert!(!pattern.is_match(b"abc"));
//! assert_eq!(pattern.find_prefix(b"a12b3", true), Some(5));
//! assert_eq!(pattern.find_prefix(b"a12b3", false), Some(2));
//! ```

pub mod ast;
mod char_iter;

pub use self::char_iter::*;
use self::ast::{Ast, Atom, ToRegex};
use regex::bytes::{Regex, RegexBuilder};
use thiserror::Error;

/// Character of a pattern
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PatternChar {
    /// Character that may have a special meaning
    Normal(u8),
    /// Quoted character that always matches itself
    Literal(u8),
}

impl PatternChar {
    /// Returns the byte value.
    #[inline]
    #[must_use]
    pub fn byte(self) -> u8 {
        match self {
            PatternChar::Normal(b) | PatternChar::Literal(b) => b,
        }
    }
}

/// Configuration for a pattern
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub struct Config {
    /// Whether a leading period in the subject must be matched by a literal
    /// period in the pattern
    ///
    /// This is used in pathname expansion, where `*` does not match hidden
    /// files.
    pub literal_period: bool,
}

/// Error in pattern compilation
#[derive(Clone, Debug, Error)]
#[error(transparent)]
pub struct Error(#[from] regex::Error);

/// Compiled globbing pattern
#[derive(Clone, Debug)]
pub struct Pattern {
    ast: Ast,
    regex: Regex,
    config: Config,
}

impl Pattern {
    /// Compiles a pattern with the default configuration.
    #[inline]
    pub fn parse<I>(pattern: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
    {
        Self::parse_with_config(pattern, Config::default())
    }

    /// Compiles a pattern with the given configuration.
    pub fn parse_with_config<I>(pattern: I, config: Config) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
    {
        let ast = Ast::new(pattern);
        let regex = RegexBuilder::new(&format!("^(?:{})$", ast.to_regex()))
            .unicode(false)
            .dot_matches_new_line(true)
            .build()?;
        Ok(Pattern { ast, regex, config })
    }

    /// Returns the pattern as a literal byte string if it has no special
    /// characters.
    #[must_use]
    pub fn as_literal(&self) -> Option<Vec<u8>> {
        self.ast.to_literal()
    }

    /// Tests whether the whole subject matches the pattern.
    #[must_use]
    pub fn is_match(&self, subject: &[u8]) -> bool {
        if self.config.literal_period
            && subject.first() == Some(&b'.')
            && self.ast.atoms.first() != Some(&Atom::Char(b'.'))
        {
            return false;
        }
        self.regex.is_match(subject)
    }

    /// Finds a prefix of the subject that matches the pattern.
    ///
    /// Returns the length of the longest or shortest matching prefix.
    #[must_use]
    pub fn find_prefix(&self, subject: &[u8], longest: bool) -> Option<usize> {
        let mut lengths: Box<dyn Iterator<Item = usize>> = if longest {
            Box::new((0..=subject.len()).rev())
        } else {
            Box::new(0..=subject.len())
        };
        lengths.find(|&len| self.is_match(&subject[..len]))
    }

    /// Finds a suffix of the subject that matches the pattern.
    ///
    /// Returns the start index of the longest or shortest matching suffix.
    #[must_use]
    pub fn find_suffix(&self, subject: &[u8], longest: bool) -> Option<usize> {
        let mut starts: Box<dyn Iterator<Item = usize>> = if longest {
            Box::new(0..=subject.len())
        } else {
            Box::new((0..=subject.len()).rev())
        };
        starts.find(|&start| self.is_match(&subject[start..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &[u8]) -> Pattern {
        Pattern::parse(without_escape(s)).unwrap()
    }

    #[test]
    fn literal_pattern() {
        let p = pattern(b"abc");
        assert!(p.is_match(b"abc"));
        assert!(!p.is_match(b"abcd"));
        assert!(!p.is_match(b"xabc"));
        assert_eq!(p.as_literal(), Some(b"abc".to_vec()));
    }

    #[test]
    fn wildcards() {
        let p = pattern(b"a*c?");
        assert!(p.is_match(b"ac1"));
        assert!(p.is_match(b"abbbc\n"));
        assert!(!p.is_match(b"ac"));
        assert_eq!(p.as_literal(), None);
    }

    #[test]
    fn quoted_wildcards_match_literally() {
        let p = Pattern::parse(with_escape(br"a\*")).unwrap();
        assert!(p.is_match(b"a*"));
        assert!(!p.is_match(b"ab"));
    }

    #[test]
    fn regex_meta_characters_are_literal() {
        let p = pattern(b"a.b(c)+$");
        assert!(p.is_match(b"a.b(c)+$"));
        assert!(!p.is_match(b"axb(c)+$"));
    }

    #[test]
    fn bracket_expressions() {
        let p = pattern(b"[a-c][!0-9][[:upper:]]");
        assert!(p.is_match(b"bxZ"));
        assert!(!p.is_match(b"b1Z"));
        assert!(!p.is_match(b"dxZ"));
        assert!(!p.is_match(b"bxz"));
    }

    #[test]
    fn non_ascii_bytes() {
        let p = pattern(b"\x81?");
        assert!(p.is_match(b"\x81\xff"));
        assert!(!p.is_match(b"\x82\xff"));
    }

    #[test]
    fn literal_period() {
        let config = Config {
            literal_period: true,
        };
        let p = Pattern::parse_with_config(without_escape(b"*"), config).unwrap();
        assert!(p.is_match(b"file"));
        assert!(!p.is_match(b".hidden"));
        let p = Pattern::parse_with_config(without_escape(b".*"), config).unwrap();
        assert!(p.is_match(b".hidden"));
    }

    #[test]
    fn prefix_matching() {
        let p = pattern(b"*/");
        assert_eq!(p.find_prefix(b"usr/local/bin", false), Some(4));
        assert_eq!(p.find_prefix(b"usr/local/bin", true), Some(10));
        assert_eq!(p.find_prefix(b"bin", true), None);
    }

    #[test]
    fn suffix_matching() {
        let p = pattern(b".*");
        assert_eq!(p.find_suffix(b"a.tar.gz", false), Some(5));
        assert_eq!(p.find_suffix(b"a.tar.gz", true), Some(1));
        assert_eq!(p.find_suffix(b"abc", true), None);
    }
}
