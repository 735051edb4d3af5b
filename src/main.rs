//! Prints the block device of the partition the firmware booted from.
//!
//! `BootCurrent` → `Boot####` → device path → hard drive node → partition
//! identifier → `/dev/disk/by-partuuid` lookup.

mod boot;
mod config;
mod device_path;
mod efivar;
mod error;
mod hard_drive;
mod logger;
mod partition;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::{ArgAction, Parser};
use log::debug;

use crate::config::Config;
use crate::efivar::VariableStore;
use crate::partition::DiskDirectory;

/// Find the EFI boot partition and print its device name.
#[derive(Parser, Debug)]
#[command(name = "detect-efi-boot-partition", version, about)]
struct Cli {
    /// Don't show error messages.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log decoding steps to standard error; repeat for more detail.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// JSON file overriding the efivarfs and /dev/disk locations.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.quiet, cli.verbose));

    match run(&cli) {
        Ok(device) => {
            println!("{}", device.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            if !cli.quiet {
                eprintln!("{err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf> {
    let config = Config::load(cli.config.as_deref())?;
    debug!("config: {}", serde_json::to_string(&config)?);

    let store = VariableStore::new(config.efivars_dir());
    if !store.is_present() {
        bail!("No EFI variables available");
    }
    let lookup = DiskDirectory::new(config.disk_dir());
    Ok(boot::detect_boot_partition(&store, &lookup)?)
}
