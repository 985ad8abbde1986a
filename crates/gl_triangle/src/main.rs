//! Opens the triangle window and maps startup failures to an exit code.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use std::process::ExitCode;

use gl_triangle::{Config, dialog};

fn main() -> ExitCode {
    // Log to stderr; `RUST_LOG=debug` for the whole handshake.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let title = config.title.clone();
    let error_dialog = config.error_dialog;

    match gl_triangle::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            if error_dialog {
                dialog::show_error(&title, &err.to_string());
            }
            ExitCode::from(err.exit_code())
        }
    }
}
