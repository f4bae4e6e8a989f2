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

//! Here-document content reader

use super::Lexer;
use crate::parser::error::{Result, SyntaxError};
use crate::syntax::HereDoc;

impl Lexer<'_> {
    /// Reads the contents of all pending here-documents.
    ///
    /// This function is called just after a newline token is consumed.
    pub(super) fn read_here_docs(&mut self) -> Result<()> {
        for here_doc in std::mem::take(&mut self.pending_here_docs) {
            let content = self.here_doc_content(&here_doc)?;
            log::trace!(
                target: "swsh::lex",
                "here-document ending with {:?}: {} bytes",
                String::from_utf8_lossy(&here_doc.delimiter),
                content.len(),
            );
            // The cell is empty because each here-document is pushed once.
            let _ = here_doc.content.set(content);
        }
        Ok(())
    }

    /// Reads lines verbatim until a line that equals the delimiter.
    fn here_doc_content(&mut self, here_doc: &HereDoc) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        loop {
            let mut line = Vec::new();
            let mut terminated = false;
            while let Some(byte) = self.consume()? {
                if byte == b'\n' {
                    terminated = true;
                    break;
                }
                line.push(byte);
            }

            let skip = if here_doc.remove_tabs {
                line.iter().take_while(|&&b| b == b'\t').count()
            } else {
                0
            };
            let line = &line[skip..];
            if line == here_doc.delimiter.as_slice() {
                return Ok(content);
            }
            if !terminated {
                return Err(self.error(SyntaxError::UnclosedHereDocContent));
            }
            content.extend_from_slice(line);
            content.push(b'\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::alias::EmptyGlossary;
    use crate::input::Memory;
    use crate::parser::error::SyntaxError;
    use crate::parser::lex::Lexer;
    use crate::syntax::HereDoc;
    use std::rc::Rc;

    fn here_doc(delimiter: &[u8], remove_tabs: bool) -> Rc<HereDoc> {
        Rc::new(HereDoc {
            delimiter: delimiter.to_vec(),
            quoted: false,
            remove_tabs,
            content: Default::default(),
        })
    }

    #[test]
    fn content_is_read_verbatim() {
        let doc = here_doc(b"EOF", false);
        let mut lexer = Lexer::new(Box::new(Memory::new(b"\n  $x 'y' \\\n\tEOF\nEOF\n")));
        lexer.push_here_doc(Rc::clone(&doc));
        lexer.next_token(true, &EmptyGlossary).unwrap();
        assert_eq!(doc.content.get().unwrap(), b"  $x 'y' \\\n\tEOF\n");
    }

    #[test]
    fn multiple_here_docs_in_order() {
        let doc1 = here_doc(b"ONE", false);
        let doc2 = here_doc(b"TWO", true);
        let mut lexer = Lexer::new(Box::new(Memory::new(b"\na\nONE\n\tb\n\tTWO\n")));
        lexer.push_here_doc(Rc::clone(&doc1));
        lexer.push_here_doc(Rc::clone(&doc2));
        lexer.next_token(true, &EmptyGlossary).unwrap();
        assert_eq!(doc1.content.get().unwrap(), b"a\n");
        assert_eq!(doc2.content.get().unwrap(), b"b\n");
    }

    #[test]
    fn delimiter_at_end_of_input() {
        let doc = here_doc(b"END", false);
        let mut lexer = Lexer::new(Box::new(Memory::new(b"\nx\nEND")));
        lexer.push_here_doc(Rc::clone(&doc));
        lexer.next_token(true, &EmptyGlossary).unwrap();
        assert_eq!(doc.content.get().unwrap(), b"x\n");
    }

    #[test]
    fn unclosed_content() {
        let doc = here_doc(b"END", false);
        let mut lexer = Lexer::new(Box::new(Memory::new(b"\nx\n")));
        lexer.push_here_doc(doc);
        let error = lexer.next_token(true, &EmptyGlossary).unwrap_err();
        assert_eq!(error.cause, SyntaxError::UnclosedHereDocContent.into());
    }
}
