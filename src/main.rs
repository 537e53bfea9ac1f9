use std::{env, io};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::app::App;

mod app;
mod cli;
mod error;
mod figure;
mod figure_widget;
mod pdf;
mod scene;
mod stats;
mod table;
mod utils;

fn main() -> anyhow::Result<()> {
    let args = cli::get_args();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let export_dir = env::current_dir().context("unable to determine the working directory")?;
    let mut app = App::new(export_dir);

    if let Some(path) = args.csv.as_deref() {
        app.load_csv(path);
    }

    app.run()
}
