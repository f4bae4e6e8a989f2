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

//! Execution of the case command

use crate::Handle;
use crate::command::Command;
use crate::expansion::{expand_pattern, expand_word};
use std::ops::ControlFlow::Continue;
use swsh_env::Env;
use swsh_env::semantics::{ExitStatus, Result};
use swsh_syntax::bytes::encode;
use swsh_syntax::syntax::{CaseItem, Word};

/// Executes the case command.
///
/// The patterns are expanded and tried in order until one matches the
/// subject. A pattern that does not parse matches nothing. The exit status
/// is zero if no pattern matches or the matched item has an empty body.
pub fn execute(env: &mut Env, subject: &Word, items: &[CaseItem]) -> Result {
    let subject = match expand_word(env, subject) {
        Ok((field, _)) => field.value,
        Err(error) => return error.handle(env),
    };

    for item in items {
        for pattern in &item.patterns {
            let pattern = match expand_pattern(env, pattern) {
                Ok(pattern) => pattern,
                Err(error) => return error.handle(env),
            };
            if pattern.is_some_and(|pattern| pattern.is_match(&encode(&subject))) {
                return match &item.body {
                    Some(body) => body.execute(env),
                    None => {
                        env.exit_status = ExitStatus::SUCCESS;
                        Continue(())
                    }
                };
            }
        }
    }

    env.exit_status = ExitStatus::SUCCESS;
    Continue(())
}
