use clap::Parser;

use edgeplane_cli::cli::Cli;
use edgeplane_cli::output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = edgeplane_cli::run(Cli::parse()).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
