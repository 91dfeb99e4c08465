use std::process;

use clap::Parser;

use json_pattern::cli::Args;

fn main() {
    let args = Args::parse();
    match json_pattern::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    }
}
