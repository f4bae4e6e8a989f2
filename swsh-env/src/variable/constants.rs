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

//! Variable name and default value constants

/// The name of the `CDPATH` variable
///
/// The `CDPATH` variable lists directories the `cd` built-in searches.
pub const CDPATH: &str = "CDPATH";

/// The name of the `HOME` variable
///
/// The `HOME` variable stores the path to the user's home directory.
pub const HOME: &str = "HOME";

/// The name of the `IFS` variable
///
/// The `IFS` variable separator characters for field splitting.
/// The initial value is `" \t\n"`.
pub const IFS: &str = "IFS";

/// The initial value of the `IFS` variable (`" \t\n"`)
pub const IFS_INITIAL_VALUE: &str = " \t\n";

/// The name of the `LINENO` variable
///
/// The `LINENO` variable expands to the line number of the current command.
pub const LINENO: &str = "LINENO";

/// The name of the `OLDPWD` variable
///
/// The `cd` built-in saves the previous working directory in it.
pub const OLDPWD: &str = "OLDPWD";

/// The name of the `OPTARG` variable
///
/// The `getopts` built-in stores the argument of an option in it.
pub const OPTARG: &str = "OPTARG";

/// The name of the `OPTIND` variable
///
/// The initial value is `1`.
pub const OPTIND: &str = "OPTIND";

/// The initial value of the `OPTIND` variable (`1`)
pub const OPTIND_INITIAL_VALUE: &str = "1";

/// The name of the `PATH` variable
///
/// The `PATH` variable stores the directories to search for executables.
pub const PATH: &str = "PATH";

/// The name of the `PS1` variable
///
/// The `PS1` variable is the primary prompt string.
/// The initial value depends on the user's privilege level.
/// See [`PS1_INITIAL_VALUE_NON_ROOT`] and [`PS1_INITIAL_VALUE_ROOT`].
pub const PS1: &str = "PS1";

/// The initial value of the `PS1` variable for non-root user (`"$ "`)
pub const PS1_INITIAL_VALUE_NON_ROOT: &str = "$ ";

/// The initial value of the `PS1` variable for root user (`"# "`)
pub const PS1_INITIAL_VALUE_ROOT: &str = "# ";

/// The name of the `PS2` variable
///
/// The `PS2` variable is the secondary prompt string, which is shown
/// when the shell expects more input to complete a command.
/// The initial value is `"> "`.
pub const PS2: &str = "PS2";

/// The initial value of the `PS2` variable (`"> "`)
pub const PS2_INITIAL_VALUE: &str = "> ";

/// The name of the `PS4` variable
///
/// The value is prefixed to commands printed by the
/// [`XTrace`](crate::option::XTrace) option. The initial value is `"+ "`.
pub const PS4: &str = "PS4";

/// The initial value of the `PS4` variable (`"+ "`)
pub const PS4_INITIAL_VALUE: &str = "+ ";

/// The name of the `PWD` variable
///
/// The `PWD` variable stores the current working directory.
pub const PWD: &str = "PWD";

/// The name of the `RANDOM` variable
///
/// The `RANDOM` variable expands to a random number in `0..=65535`.
pub const RANDOM: &str = "RANDOM";
