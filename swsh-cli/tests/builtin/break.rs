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
fn breaking_one_for_loop_not_nested() {
    let stdin = file_with_content(
        b"for i in 1 2 3; do
            echo in $i
            break 1
            echo out $i
        done
        echo done $?\n",
    );
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(from_utf8(&result.stdout), Ok("in 1\ndone 0\n"));
}

#[test]
fn breaking_one_while_loop_not_nested() {
    let stdin = file_with_content(
        b"while true; do
            echo in
            break 1
            echo out
        done
        echo done $?\n",
    );
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(from_utf8(&result.stdout), Ok("in\ndone 0\n"));
}

#[test]
fn breaking_two_nested_loops() {
    let stdin = file_with_content(
        b"for i in 1 2 3; do
            echo in $i
            until false; do
                echo inner $i
                break 2
                echo out inner
            done
            echo out $i
        done
        echo done $?\n",
    );
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(from_utf8(&result.stdout), Ok("in 1\ninner 1\ndone 0\n"));
}

#[test]
fn breaking_more_loops_than_exist() {
    let stdin = file_with_content(
        b"for i in 1 2; do
            for j in a b; do
                echo $i$j
                break 10
            done
        done
        echo done\n",
    );
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(from_utf8(&result.stdout), Ok("1a\ndone\n"));
}

#[test]
fn continuing_outer_loop() {
    let stdin = file_with_content(
        b"for i in 1 2; do
            for j in a b; do
                echo $i$j
                continue 2
            done
            echo never
        done\n",
    );
    let result = subject().stdin(stdin).output().unwrap();
    assert_eq!(from_utf8(&result.stdout), Ok("1a\n2a\n"));
}
