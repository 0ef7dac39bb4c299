mod app;
mod calendar;
mod cli;
mod constants;
mod domain;
mod storage;
mod view;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::constants::ENV_VARS;

fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_VARS.log).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    init_tracing();
    cli::run_cli();
}
