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

//! Type definitions for functions.
//!
//! This module provides data types for defining shell functions.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::hash::Hash;
use std::hash::Hasher;
use std::rc::Rc;
use swsh_syntax::syntax::Node;

/// Definition of a function.
#[derive(Clone, Debug)]
pub struct Function {
    /// String that identifies the function.
    pub name: String,

    /// Command that is executed when the function is called.
    ///
    /// The body is shared with the syntax tree that contained the function
    /// definition command, so it stays alive while the function is defined
    /// even after the tree is dropped.
    pub body: Rc<Node>,

    /// Line number of the function definition command
    pub line_no: u64,
}

/// Wrapper of [`Function`] for inserting into a hash set.
///
/// A `HashEntry` wraps a `Function` in `Rc` so that the function can be
/// referred to even after the function has been removed from the environment.
/// This is the case when a function unsets or redefines itself while it is
/// running. The `Hash` and `PartialEq` implementation for `HashEntry` only
/// compares names.
#[derive(Clone, Debug)]
pub struct HashEntry(pub Rc<Function>);

impl HashEntry {
    /// Convenience method for creating a new function as a `HashEntry`.
    pub fn new(name: String, body: Rc<Node>, line_no: u64) -> HashEntry {
        HashEntry(Rc::new(Function {
            name,
            body,
            line_no,
        }))
    }
}

impl PartialEq for HashEntry {
    /// Compares the names of two hash entries.
    fn eq(&self, other: &HashEntry) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for HashEntry {}

impl Hash for HashEntry {
    /// Hashes the name of the function.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state)
    }
}

impl Borrow<str> for HashEntry {
    fn borrow(&self) -> &str {
        &self.0.name
    }
}

/// Collection of functions.
pub type FunctionSet = HashSet<HashEntry>;

#[cfg(test)]
mod tests {
    use super::*;
    use swsh_syntax::syntax::NodeKind;

    fn body() -> Rc<Node> {
        Rc::new(Node::new(NodeKind::Term(vec![]), 1))
    }

    #[test]
    fn redefinition_replaces_by_name() {
        let mut set = FunctionSet::new();
        set.insert(HashEntry::new("f".to_string(), body(), 1));
        let old = set.replace(HashEntry::new("f".to_string(), body(), 5));
        assert_eq!(old.unwrap().0.line_no, 1);
        assert_eq!(set.get("f").unwrap().0.line_no, 5);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn removed_function_stays_alive() {
        let mut set = FunctionSet::new();
        set.insert(HashEntry::new("f".to_string(), body(), 1));
        let running = Rc::clone(&set.get("f").unwrap().0);
        assert!(set.remove("f"));
        assert_eq!(running.name, "f");
    }
}
