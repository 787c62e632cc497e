use clap::Parser;
use env_logger::Env;

use group_launcher::cli::Cli;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(err) = group_launcher::run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
