// kegenv: Build Environment Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Env | Compilers | Options | Inis | Version
//! ```

use std::process::ExitCode;

use kegenv::cli::global::GlobalOptions;
use kegenv::cli::{self, Command};
use kegenv::cmd::compilers::run_compilers_command;
use kegenv::cmd::config::{run_inis_command, run_options_command};
use kegenv::cmd::env::run_env_command;
use kegenv::config::Config;
use kegenv::config::loader::ConfigLoader;
use kegenv::logging::init_logging;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Optional config file picked up from the working directory.
const LOCAL_CONFIG: &str = "kegenv.toml";

fn main() -> ExitCode {
    let cli = cli::parse();

    let command = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            return ExitCode::SUCCESS;
        }
        Some(command) => command,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            return ExitCode::FAILURE;
        }
    };

    let loader = build_config_loader(&cli.global);
    let loaded_files = loader.format_loaded_files();
    let config = match load_config(loader, &cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(&config.global.log_config()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        Command::Options => {
            run_options_command(&config);
            Ok(())
        }
        Command::Inis => {
            run_inis_command(&loaded_files);
            Ok(())
        }
        Command::Compilers => {
            run_compilers_command(config.build.compiler);
            Ok(())
        }
        Command::Env(args) => run_env_command(args, &config),
        Command::Version => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new().add_toml_file_optional(LOCAL_CONFIG);
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader.with_env_prefix("KEGENV")
}

fn load_config(loader: ConfigLoader, global: &GlobalOptions) -> kegenv::error::Result<Config> {
    loader
        .add_overrides(global.to_config_overrides())?
        .build()
}
