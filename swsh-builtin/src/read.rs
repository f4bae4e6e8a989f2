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

//! Read built-in
//!
//! The **`read`** built-in reads a line from the standard input and assigns
//! it to variables.
//!
//! # Synopsis
//!
//! ```sh
//! read [-r] name...
//! ```
//!
//! # Description
//!
//! The built-in reads bytes up to a newline or the end of input. Unless the
//! `-r` option is given, a backslash quotes the next byte and a
//! backslash-newline pair continues the line. The input is read one byte at
//! a time so that the rest of the input is left for other commands.
//!
//! The line is split into fields on the characters of `$IFS` the way field
//! splitting does. Each name is assigned one field in order. The last name
//! gets the rest of the line, including the separators inside it but not
//! the trailing IFS whitespace. Names left over get empty values.
//!
//! # Exit status
//!
//! Zero if a line was read, one if the end of input was reached before a
//! newline or an error occurred, and two on a usage error. The variables are
//! assigned even at the end of input.

use crate::common::syntax::{OptionSpec, parse_arguments};
use crate::common::{report_failure, syntax_error};
use swsh_env::builtin::Result;
use swsh_env::io::Fd;
use swsh_env::semantics::{ExitStatus, Field};
use swsh_env::system::Errno;
use swsh_env::variable::{IFS, IFS_INITIAL_VALUE, Scope};
use swsh_env::{Env, System as _};
use swsh_syntax::bytes::{decode, encode};
use swsh_syntax::marker::is_name;

const OPTION_SPECS: &[OptionSpec] = &[OptionSpec::new('r')];

/// Byte of input with a flag telling whether it was quoted by a backslash
type InputByte = (u8, bool);

/// Reads a line from the standard input.
///
/// Returns the line without the terminating newline, and whether the
/// newline was found.
fn read_line(env: &mut Env, is_raw: bool) -> std::result::Result<(Vec<InputByte>, bool), Errno> {
    let mut line = Vec::new();
    let mut escaping = false;
    let mut buffer = [0; 1];
    loop {
        let count = match env.system.read(Fd::STDIN, &mut buffer) {
            Err(Errno::EINTR) => continue,
            result => result?,
        };
        if count == 0 {
            return Ok((line, false));
        }
        let byte = buffer[0];
        if escaping {
            escaping = false;
            if byte != b'\n' {
                line.push((byte, true));
            }
            continue;
        }
        match byte {
            b'\n' => return Ok((line, true)),
            b'\\' if !is_raw => escaping = true,
            _ => line.push((byte, false)),
        }
    }
}

/// Splits the line into `count` fields.
fn split(line: &[InputByte], ifs: &[u8], count: usize) -> Vec<Vec<u8>> {
    let is_ifs = |&(byte, quoted): &InputByte| !quoted && ifs.contains(&byte);
    let is_whitespace =
        |input: &InputByte| is_ifs(input) && matches!(input.0, b' ' | b'\t' | b'\n');
    let skip_whitespace = |rest: &[InputByte]| rest.iter().take_while(|b| is_whitespace(b)).count();
    let bytes = |part: &[InputByte]| part.iter().map(|&(byte, _)| byte).collect::<Vec<u8>>();

    let mut rest = &line[skip_whitespace(line)..];
    let mut fields = Vec::with_capacity(count);
    while fields.len() + 1 < count && !rest.is_empty() {
        let end = rest.iter().position(|b| is_ifs(b)).unwrap_or(rest.len());
        fields.push(bytes(&rest[..end]));
        rest = &rest[end..];
        rest = &rest[skip_whitespace(rest)..];
        if rest.first().is_some_and(|b| is_ifs(b) && !is_whitespace(b)) {
            rest = &rest[1..];
            rest = &rest[skip_whitespace(rest)..];
        }
    }

    let trailing = rest.iter().rev().take_while(|b| is_whitespace(b)).count();
    fields.push(bytes(&rest[..rest.len() - trailing]));
    fields.resize(count, Vec::new());
    fields
}

/// Entry point of the read built-in
pub fn main(env: &mut Env, args: Vec<Field>) -> Result {
    let (options, operands) = match parse_arguments(OPTION_SPECS, args) {
        Ok(parse) => parse,
        Err(error) => return syntax_error(env, &error.to_string()),
    };
    if operands.is_empty() {
        return syntax_error(env, "missing variable name");
    }
    if let Some(name) = operands.iter().find(|name| !is_name(name.value.as_bytes())) {
        let message = format!("{}: invalid variable name", name.value);
        return syntax_error(env, &message);
    }
    let is_raw = !options.is_empty();

    let (line, newline_found) = match read_line(env, is_raw) {
        Ok(input) => input,
        Err(errno) => {
            let message = format!("error reading from the standard input: {}", errno.desc());
            return report_failure(env, &message);
        }
    };

    let ifs = match env.variables.get(IFS).and_then(|v| v.value.as_deref()) {
        Some(ifs) => encode(ifs).into_owned(),
        None => IFS_INITIAL_VALUE.as_bytes().to_vec(),
    };
    let fields = split(&line, &ifs, operands.len());

    let mut result = Result::new(if newline_found {
        ExitStatus::SUCCESS
    } else {
        ExitStatus::FAILURE
    });
    for (name, value) in operands.iter().zip(fields) {
        let name = &name.value;
        let value = decode(&value).into_owned();
        let assigned = env
            .get_or_create_variable(name.as_str(), Scope::Global)
            .assign(value)
            .is_ok();
        if !assigned {
            result = report_failure(env, &format!("{name}: cannot assign to a read-only variable"));
        }
    }
    result
}
