#![windows_subsystem = "windows"]

use anyhow::Result;
use log::warn;

use pinsnap::config::Config;

fn main() -> Result<()> {
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if let Err(e) = &loaded {
        warn!("{}; using default settings", e);
    }

    pinsnap::ui::run(config)
}
