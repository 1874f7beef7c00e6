// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `options` and `inis` commands.


use crate::config::Config;

/// Lines printed by `kegenv inis`, one per configuration source in load order.
#[must_use]
pub fn format_inis(loaded_files: &[String]) -> Vec<String> {
    if loaded_files.is_empty() {
        return vec!["no configuration files loaded, using defaults".to_string()];
    }
    loaded_files.to_vec()
}

/// Prints the resolved configuration.
pub fn run_options_command(config: &Config) {
    print_lines(config.format_options());
}

/// Prints the configuration sources that were loaded.
pub fn run_inis_command(loaded_files: &[String]) {
    print_lines(format_inis(loaded_files));
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
