use clap::Parser;
use log::{debug, LevelFilter};

mod args;
mod election;

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
    debug!("args: {:?}", args);

    let res = election::run_election(&args.config, args.out.clone(), args.reference.clone());

    if let Err(e) = res {
        eprintln!("An error occured: {}", e);
        std::process::exit(1);
    }
}
