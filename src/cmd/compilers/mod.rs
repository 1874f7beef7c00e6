// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Compilers command implementation.


use crate::core::compiler::Compiler;

/// One line per selectable compiler: identifier, C tool, C++ tool.
#[must_use]
pub fn format_compilers(default: Compiler) -> Vec<String> {
    let rows: Vec<_> = Compiler::all()
        .map(|compiler| (compiler, compiler.tool_name(), compiler.cxx_tool_name()))
        .collect();
    let width = rows
        .iter()
        .map(|(compiler, ..)| compiler.to_string().len())
        .max()
        .unwrap_or(0);
    let cc_width = rows.iter().map(|(_, cc, _)| cc.len()).max().unwrap_or(0);
    let cxx_width = rows.iter().map(|(.., cxx)| cxx.len()).max().unwrap_or(0);

    rows.into_iter()
        .map(|(compiler, cc, cxx)| {
            let name = compiler.to_string();
            if compiler == default {
                format!("{name:<width$}  {cc:<cc_width$}  {cxx:<cxx_width$}  (default)")
            } else {
                format!("{name:<width$}  {cc:<cc_width$}  {cxx}")
            }
        })
        .collect()
}

/// Lists the selectable compilers, marking the configured default.
pub fn run_compilers_command(default: Compiler) {
    for line in format_compilers(default) {
        println!("{line}");
    }
}
