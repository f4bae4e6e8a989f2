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

use crate::{file_with_content, subject};
use std::str::from_utf8;

#[test]
fn alias_defined_on_previous_line() {
    let stdin = file_with_content(b"alias g='echo hi'\n g\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(result.status.code(), Some(0), "{:?}", result.status);
    assert_eq!(from_utf8(&result.stdout), Ok("hi\n"));
    assert_eq!(from_utf8(&result.stderr), Ok(""));
}

#[test]
fn temporary_assignment_is_exported_to_utility() {
    let stdin = file_with_content(b"x=1; x=2 sh -c 'echo $x'\n echo $x\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(result.status.code(), Some(0), "{:?}", result.status);
    assert_eq!(from_utf8(&result.stdout), Ok("2\n1\n"));
}

#[test]
fn for_loop_over_words() {
    let stdin = file_with_content(b"for i in a b c; do echo $i; done\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(result.status.code(), Some(0), "{:?}", result.status);
    assert_eq!(from_utf8(&result.stdout), Ok("a\nb\nc\n"));
}

#[test]
fn default_and_assign_expansions() {
    let stdin = file_with_content(b"v=; echo ${v:-def}${v:=set}${v}\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(result.status.code(), Some(0), "{:?}", result.status);
    assert_eq!(from_utf8(&result.stdout), Ok("defsetset\n"));
}

#[test]
fn arithmetic_with_hex_and_octal() {
    let stdin = file_with_content(b"echo $(( 0x10 + 020 + 8 ))\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(result.status.code(), Some(0), "{:?}", result.status);
    assert_eq!(from_utf8(&result.stdout), Ok("40\n"));
}

#[test]
fn case_with_pattern() {
    let stdin = file_with_content(b"case abc in a*) echo A;; *) echo X;; esac\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(result.status.code(), Some(0), "{:?}", result.status);
    assert_eq!(from_utf8(&result.stdout), Ok("A\n"));
}

#[test]
fn exit_trap_runs_on_exit() {
    let stdin = file_with_content(b"trap 'echo bye' 0\n exit 0\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(result.status.code(), Some(0), "{:?}", result.status);
    assert_eq!(from_utf8(&result.stdout), Ok("bye\n"));
}

#[test]
fn positional_parameters_in_double_quotes() {
    let stdin = file_with_content(
        b"set -- a 'b c' d
        for i in \"$@\"; do echo \"[$i]\"; done
        for i in \"$*\"; do echo \"[$i]\"; done\n",
    );
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(from_utf8(&result.stdout), Ok("[a]\n[b c]\n[d]\n[a b c d]\n"));
}

#[test]
fn here_document_expansion() {
    let stdin = file_with_content(b"v=x\ncat <<EOF\n$v\nEOF\ncat <<'EOF'\n$v\nEOF\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(from_utf8(&result.stdout), Ok("x\n$v\n"));
}

#[test]
fn readonly_variable_is_not_changed() {
    let stdin = file_with_content(b"readonly X=1\n(X=2) || echo failed\necho $X\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(from_utf8(&result.stdout), Ok("failed\n1\n"));
}

#[test]
fn syntax_error_exits_non_interactive_shell() {
    let stdin = file_with_content(b"echo 1\nfi\necho 2\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(result.status.code(), Some(2), "{:?}", result.status);
    assert_eq!(from_utf8(&result.stdout), Ok("1\n"));
    assert!(!result.stderr.is_empty());
}

#[test]
fn command_string_with_name_and_parameters() {
    let result = subject()
        .args(["-c", "echo $0 $#; echo \"$2\"", "name", "a", "b c"])
        .output()
        .unwrap();
    assert_eq!(result.status.code(), Some(0), "{:?}", result.status);
    assert_eq!(from_utf8(&result.stdout), Ok("name 2\nb c\n"));
}

#[test]
fn missing_script_file() {
    let result = subject().arg("/no/such/script/file").output().unwrap();
    assert_eq!(result.status.code(), Some(127), "{:?}", result.status);
}

#[test]
fn not_found_command() {
    let stdin = file_with_content(b"no_such_command_swsh_test\necho $?\n");
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(from_utf8(&result.stdout), Ok("127\n"));
    let stderr = from_utf8(&result.stderr).unwrap();
    assert!(stderr.contains("no_such_command_swsh_test: command not found"), "{stderr:?}");
}
