use std::env;
use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use matchbook::{batch, menu, Book};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let mut book = Book::new();

    match env::args().nth(1) {
        Some(path) => match batch::run_file(Path::new(&path), &mut book) {
            Ok(summary) => {
                println!("Batch complete: {path}");
                println!("  Commands processed: {}", summary.commands);
                println!("  Trades executed:    {}", summary.trades);
                println!("  Final book size:    {} orders", summary.resting);
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: cannot open {path}: {err}");
                ExitCode::FAILURE
            }
        },
        None => match menu::run(&mut book) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        },
    }
}
