use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Marks CSV to load on start-up, skipping the upload button
    #[clap(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[clap(short, long)]
    pub verbose: bool,
}

pub fn get_args() -> Args {
    Args::parse()
}
