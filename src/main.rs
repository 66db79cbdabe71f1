mod cifs;
mod config;
mod daemon;
mod error;
mod models;
mod mount_point;
mod mount_table;
mod reconciler;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use cifs::find_mount_cifs;
use reconciler::Reconciler;
use std::process;
use ui::cli::{Args, Commands, resolve_settings};
use ui::output;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            log::error!("{:#}", e);
            process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<i32> {
    let settings = resolve_settings(&args).context("Failed to load settings")?;

    if args.command.needs_mount_helper() {
        match find_mount_cifs(&settings.mount_command) {
            Some(path) => log::debug!("using mount helper '{}'", path.display()),
            None => anyhow::bail!(
                "'{}' is not installed or not found in PATH. Please install cifs-utils to proceed.",
                settings.mount_command
            ),
        }
    }

    let reconciler = Reconciler::new(settings, &args.config);

    match args.command {
        Commands::Run { .. } => {
            let interval = reconciler.settings().check_interval;
            smol::block_on(daemon::run_periodic(&reconciler, interval));
            Ok(0)
        }
        Commands::Sync => {
            let report = smol::block_on(reconciler.update_mounts()).with_context(|| {
                format!("Failed to reconcile mounts from '{}'", args.config.display())
            })?;
            output::print_report(&report);
            Ok(if report.is_success() { 0 } else { 1 })
        }
        Commands::List => {
            let mounts = reconciler.list_mounts().context("Failed to read mount table")?;
            output::print_mounts(&mounts);
            Ok(0)
        }
        Commands::UmountAll => {
            let report = smol::block_on(reconciler.umount_all())
                .context("Failed to read mount table")?;
            output::print_report(&report);
            Ok(if report.is_success() { 0 } else { 1 })
        }
        Commands::MountPoint {
            server,
            share,
            username,
        } => {
            let mount_point =
                reconciler
                    .naming()
                    .make_mount_point(&server, &share, username.as_deref());
            println!("{}", mount_point.display());
            Ok(0)
        }
    }
}
