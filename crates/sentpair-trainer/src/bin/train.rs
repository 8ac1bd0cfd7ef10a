use clap::Parser;
use sentpair_trainer::cli::{run, Cli};

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Training failed: {:#}", e);
        std::process::exit(1);
    }
}
