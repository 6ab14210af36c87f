use clap::Parser;
use colkern::cli::run;
use colkern::conf::Config;
use colkern::core::{CliArgs, setup_logging};
use log::info;

fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = CliArgs::parse();
    info!(args = args; "colkern started");
    let config = Config::load(args.config.as_deref())?;
    let output = run(&args, &config)?;
    println!("{output}");
    Ok(())
}
