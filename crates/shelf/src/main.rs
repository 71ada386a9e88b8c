//! # shelf
//!
//! Command-line client for the `shelfapp` category engine. The binary is thin:
//! everything lives in `src/cli/`, and this file only runs it and turns an
//! error into exit code 1.
//!
//! ```text
//! shelf category add "Lebensmittel"
//! shelf category add "Milchprodukte" --parent <id>
//! shelf rule add milch --operator contains --value milch --category <id>
//! shelf purchase "Bio-Milch 1L" --category <id>
//! shelf suggest "Frische Milch"
//! shelf export --format csv --output categories.csv
//! ```

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
