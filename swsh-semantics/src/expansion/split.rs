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

//! Field splitting
//!
//! Field splitting divides the result of the initial expansion into fields.
//! Only bytes inside an expansion [`Range`] are delimiters. Other bytes,
//! including quotes, are always part of a field.
//!
//! Within a [`RangeKind::FieldSplit`] range, IFS whitespace characters
//! (space, tab and newline that appear in `$IFS`) and the null bytes
//! separating positional parameters delimit fields, and sequences of them
//! are treated as one delimiter. Any other IFS character delimits exactly one
//! field, so two of them in a row produce an empty field between them.
//! A field is produced only if something has been accumulated for it: an
//! unquoted expansion that results in only delimiters produces no field.

/// Kind of an expansion range
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RangeKind {
    /// Unquoted expansion, split on IFS characters and null bytes
    FieldSplit,
    /// Quoted `"$@"`, split on null bytes only
    ///
    /// Each resulting field stays quoted.
    SplitOnNull,
    /// Quoted `"$@"` with no positional parameters
    ///
    /// The range is empty. The field containing it is removed if the field
    /// has nothing but quotes.
    Vanishing,
}

/// Part of the initial expansion result produced by an expansion
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
    pub kind: RangeKind,
}

impl Range {
    fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }
}

fn is_ifs_whitespace(byte: u8, ifs: &[u8]) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n') && ifs.contains(&byte)
}

/// Accumulator of fields
#[derive(Debug, Default)]
struct Splitter {
    fields: Vec<Vec<u8>>,
    current: Vec<u8>,
    /// Whether the current field has anything that makes it a field
    has_content: bool,
    /// Whether the current field contains a vanishing range
    vanishing: bool,
    /// Whether the last field was delimited by IFS whitespace
    ///
    /// A non-whitespace IFS character right after such whitespace does not
    /// delimit another field.
    last_whitespace: bool,
}

impl Splitter {
    fn push(&mut self, bytes: &[u8]) {
        self.current.extend(bytes);
        self.has_content = true;
        self.last_whitespace = false;
    }

    fn emit(&mut self) {
        let field = std::mem::take(&mut self.current);
        let only_quotes = field.iter().all(|&byte| byte == swsh_syntax::marker::QUOTE);
        if !(self.vanishing && only_quotes) {
            self.fields.push(field);
        }
        self.has_content = false;
        self.vanishing = false;
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        if self.has_content {
            self.emit();
        }
        self.fields
    }
}

/// Splits marked text into fields.
///
/// `ranges` must be sorted and must not overlap. The results are still
/// marked text.
#[must_use]
pub fn split(text: &[u8], ranges: &[Range], ifs: &[u8]) -> Vec<Vec<u8>> {
    use swsh_syntax::marker::{ESCAPE, QUOTE};

    let mut splitter = Splitter::default();
    let mut ranges = ranges.iter().peekable();
    let mut index = 0;
    loop {
        // Vanishing ranges are empty, so they are handled before the byte at
        // their position.
        while let Some(range) = ranges.next_if(|range| range.end <= index && range.start <= index) {
            if range.kind == RangeKind::Vanishing {
                splitter.vanishing = true;
                splitter.has_content = true;
            }
        }
        let Some(&byte) = text.get(index) else { break };
        let range = ranges.peek().filter(|range| range.contains(index));

        if byte == ESCAPE {
            let end = (index + 2).min(text.len());
            splitter.push(&text[index..end]);
            index = end;
            continue;
        }
        index += 1;

        match range.map(|range| range.kind) {
            None | Some(RangeKind::Vanishing) => splitter.push(&[byte]),
            Some(RangeKind::SplitOnNull) => {
                if byte == b'\0' {
                    splitter.current.push(QUOTE);
                    splitter.emit();
                    splitter.push(&[QUOTE]);
                } else {
                    splitter.push(&[byte]);
                }
            }
            Some(RangeKind::FieldSplit) => {
                if byte == b'\0' || is_ifs_whitespace(byte, ifs) {
                    if splitter.has_content {
                        splitter.emit();
                        splitter.last_whitespace = true;
                    }
                } else if ifs.contains(&byte) {
                    if splitter.has_content || !splitter.last_whitespace {
                        splitter.emit();
                    }
                    splitter.last_whitespace = false;
                } else {
                    splitter.push(&[byte]);
                }
            }
        }
    }
    splitter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use swsh_syntax::marker::{ESCAPE, QUOTE};

    const IFS: &[u8] = b" \t\n";

    fn range(start: usize, end: usize) -> Range {
        Range {
            start,
            end,
            kind: RangeKind::FieldSplit,
        }
    }

    #[test]
    fn text_without_ranges_is_one_field() {
        assert_eq!(split(b"a b", &[], IFS), [b"a b"]);
        assert_eq!(split(b"", &[], IFS), Vec::<Vec<u8>>::new());
        assert_eq!(split(&[QUOTE, QUOTE], &[], IFS), [[QUOTE, QUOTE]]);
    }

    #[test]
    fn whitespace_in_range() {
        let fields = split(b"x a  b y", &[range(1, 7)], IFS);
        assert_eq!(fields, [&b"x"[..], b"a", b"b", b"y"]);
        let fields = split(b"  a  ", &[range(0, 5)], IFS);
        assert_eq!(fields, [b"a"]);
        let fields = split(b"   ", &[range(0, 3)], IFS);
        assert_eq!(fields, Vec::<Vec<u8>>::new());
    }

    #[test]
    fn non_whitespace_delimiters() {
        let fields = split(b"a::b:", &[range(0, 5)], b":");
        assert_eq!(fields, [&b"a"[..], b"", b"b"]);
        let fields = split(b":a", &[range(0, 2)], b":");
        assert_eq!(fields, [&b""[..], b"a"]);
    }

    #[test]
    fn whitespace_around_non_whitespace_delimiter() {
        let fields = split(b"a : b", &[range(0, 5)], b" :");
        assert_eq!(fields, [b"a", b"b"]);
        let fields = split(b" : b", &[range(0, 4)], b" :");
        assert_eq!(fields, [&b""[..], b"b"]);
    }

    #[test]
    fn empty_ifs_disables_splitting() {
        let fields = split(b"a b", &[range(0, 3)], b"");
        assert_eq!(fields, [b"a b"]);
    }

    #[test]
    fn escaped_bytes_are_not_delimiters() {
        let text = [b'a', ESCAPE, b' ', b'b'];
        assert_eq!(split(&text, &[range(0, 4)], IFS), [text]);
    }

    #[test]
    fn null_bytes_split_quoted_range() {
        let text = [QUOTE, b'a', b'\0', b'b', QUOTE];
        let ranges = [Range {
            start: 1,
            end: 4,
            kind: RangeKind::SplitOnNull,
        }];
        assert_eq!(
            split(&text, &ranges, IFS),
            [[QUOTE, b'a', QUOTE], [QUOTE, b'b', QUOTE]]
        );
    }

    #[test]
    fn vanishing_range_removes_quoted_field() {
        let text = [QUOTE, QUOTE];
        let ranges = [Range {
            start: 1,
            end: 1,
            kind: RangeKind::Vanishing,
        }];
        assert_eq!(split(&text, &ranges, IFS), Vec::<Vec<u8>>::new());

        let text = [b'x', QUOTE, QUOTE];
        let ranges = [Range {
            start: 2,
            end: 2,
            kind: RangeKind::Vanishing,
        }];
        assert_eq!(split(&text, &ranges, IFS), [text]);
    }
}
