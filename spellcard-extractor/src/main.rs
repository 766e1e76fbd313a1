use clap::Parser;

use spellcard_extractor::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose, cli.quiet);
    if let Err(e) = cli::run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
