mod cli;

use colored::Colorize;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}
