#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use snapid::runtime::{init_logging, resolve_config};

fn main() {
    let result = if std::env::args_os().count() <= 1 {
        init_logging("info");
        resolve_config(None, None)
            .map_err(|error| error.to_string())
            .and_then(snapid::ui::run)
    } else {
        snapid::run_cli()
    };

    if let Err(error) = result {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
