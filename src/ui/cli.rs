//! Command-line interface module.
//!
//! This module handles CLI argument parsing and turns the parsed flags into
//! the effective `Settings` (defaults, then config file, then flags).

use crate::config::{self, Settings};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/smbctl/shares.json";

/// Keeps SMB/CIFS network shares mounted according to a config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Share list (.json or .csv)
    #[arg(short = 'c', long = "config", env = "SMBCTL_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Directory holding the managed mount points
    #[arg(long = "mount-root", env = "SMBCTL_MOUNT_ROOT")]
    pub mount_root: Option<PathBuf>,

    /// Mount table to read
    #[arg(long = "mounts-file")]
    pub mounts_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Reconcile mounts periodically until killed
    Run {
        /// Seconds between two checks
        #[arg(short = 'i', long = "interval", env = "SMBCTL_INTERVAL")]
        interval: Option<u64>,
    },
    /// Reconcile mounts once and print a report
    Sync,
    /// List managed mounts currently in the mount table
    List,
    /// Unmount every managed mount
    UmountAll,
    /// Print the mount point a share would be mounted at
    MountPoint {
        server: String,
        share: String,
        username: Option<String>,
    },
}

impl Commands {
    pub fn needs_mount_helper(&self) -> bool {
        matches!(self, Commands::Run { .. } | Commands::Sync)
    }
}

/// Resolves the effective settings for this invocation.
///
/// A missing config file only matters to commands that read shares, so
/// settings fall back to defaults plus flags when it doesn't exist.
pub fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::default();

    if args.config.exists() {
        settings.apply(config::load_settings_overrides(&args.config)?);
    }

    if let Some(ref mount_root) = args.mount_root {
        settings.mount_root = mount_root.clone();
    }
    if let Some(ref mounts_file) = args.mounts_file {
        settings.mounts_file = mounts_file.clone();
    }
    if let Commands::Run {
        interval: Some(secs),
    } = args.command
    {
        settings.check_interval = Duration::from_secs(secs);
    }

    settings.validate()?;
    settings.resolve_mount_root()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_run_with_interval() {
        let args = Args::parse_from(["smbctl", "-c", "/tmp/s.json", "run", "--interval", "30"]);

        assert_eq!(args.config, PathBuf::from("/tmp/s.json"));
        assert_eq!(args.command, Commands::Run { interval: Some(30) });
        assert!(args.command.needs_mount_helper());
    }

    #[test]
    fn parses_mount_point_command() {
        let args = Args::parse_from(["smbctl", "mount-point", "nas", "cams"]);

        assert_eq!(
            args.command,
            Commands::MountPoint {
                server: "nas".into(),
                share: "cams".into(),
                username: None,
            }
        );
        assert!(!args.command.needs_mount_helper());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("smbctl.json");
        fs::write(
            &config_path,
            r#"{"settings": {"mount_root": "/srv/smb", "check_interval_secs": 120}}"#,
        )
        .unwrap();

        let flag_root = dir.path().join("smb");
        fs::create_dir(&flag_root).unwrap();

        let config_arg = config_path.to_string_lossy().to_string();
        let root_arg = flag_root.to_string_lossy().to_string();
        let args = Args::parse_from([
            "smbctl",
            "--config",
            config_arg.as_str(),
            "--mount-root",
            root_arg.as_str(),
            "run",
        ]);
        let settings = resolve_settings(&args).unwrap();

        assert_eq!(settings.mount_root, fs::canonicalize(&flag_root).unwrap());
        assert_eq!(settings.check_interval, Duration::from_secs(120));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_mount_root_flag_is_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let root_arg = link.to_string_lossy().to_string();
        let args = Args::parse_from([
            "smbctl",
            "--config",
            "/nonexistent/smbctl.json",
            "--mount-root",
            root_arg.as_str(),
            "list",
        ]);
        let settings = resolve_settings(&args).unwrap();

        assert_eq!(settings.mount_root, fs::canonicalize(&real).unwrap());
    }

    #[test]
    fn missing_config_uses_defaults() {
        let args = Args::parse_from(["smbctl", "--config", "/nonexistent/smbctl.json", "list"]);

        assert_eq!(resolve_settings(&args).unwrap(), Settings::default());
    }
}
