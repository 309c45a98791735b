mod cli;

use std::env;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();

    let options = match cli::parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", cli::USAGE);
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&options) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
