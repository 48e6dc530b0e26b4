//! talentdir: back-office REST service for the talent directory.

use std::path::PathBuf;

use clap::Parser;

use talentdir_lib::state::load_config;

#[derive(Parser)]
#[command(name = "talentdir")]
#[command(about = "Back-office directory service for companies, people and productions")]
struct Cli {
    /// Path to the JSON config file (default: ~/.talentdir/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config file)
    #[arg(long, env = "TALENTDIR_BIND")]
    bind: Option<String>,

    /// SQLite database file (overrides config file)
    #[arg(long, env = "TALENTDIR_DB")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    // Apply CLI overrides
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
    }
    if let Some(db) = cli.db {
        config.database_path = Some(db);
    }

    if let Err(e) = talentdir_lib::run(config).await {
        log::error!("{e}");
        std::process::exit(1);
    }
}
