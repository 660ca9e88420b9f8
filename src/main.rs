mod cli;

use clap::Parser;
use cli::Cli;
use colored::Colorize;

#[tokio::main]
async fn main() {
    reqchain::logger::init_logger();

    let cli = Cli::parse();
    if let Err(err) = cli::run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
