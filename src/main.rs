use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::process::exit;
use tracing::{error, info};
use zip_backup::backup::backup_config::BackupConfig;

/// Create a timestamped ZIP backup of the files and folders listed in a config file
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (only one file allowed)
    #[arg(short, long)]
    config: PathBuf,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let res = BackupConfig::load(&args.config).and_then(|bc| bc.run_once(Local::now()));

    match res {
        Ok(archive_path) => info!("Created backup file: {:?}", archive_path),
        Err(e) => {
            error!("{e}");
            exit(1);
        }
    }
}
