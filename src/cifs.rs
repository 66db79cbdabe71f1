//! Wrappers around the `mount.cifs` and `umount` utilities.
//!
//! Commands are spawned directly (no shell), so server and share names are
//! passed as plain arguments. Passwords travel in the helper's environment.

use crate::config::Settings;
use crate::error::{Result, SmbError};
use crate::models::share::{Mount, NetworkShare};
use crate::mount_point::MountNaming;
use chrono::Utc;
use std::{
    fs,
    path::{Path, PathBuf},
};

const PASSWD_ENV: &str = "PASSWD";

/// Locates the CIFS mount helper.
///
/// # Returns
/// The helper's path, or `None` when it isn't an executable on `PATH` (or,
/// for a command containing a `/`, at that exact path).
pub fn find_mount_cifs(mount_command: &str) -> Option<PathBuf> {
    which::which(mount_command).ok()
}

/// Builds the `-o` option string for a share.
///
/// Shares without a username are mounted as `guest`. The password never goes
/// in here: it is handed to the helper through `PASSWD` so that commas in it
/// survive and it stays out of the process command line.
pub fn mount_options(share: &NetworkShare) -> String {
    match &share.username {
        Some(username) => format!("username={}", username),
        None => String::from("guest"),
    }
}

/// Mounts a share at its managed mount point and checks it is writable.
///
/// # Returns
/// The mount point the share was mounted at.
///
/// # Errors
/// - the mount point can't be created
/// - the mount helper can't be spawned or exits non-zero
/// - the mounted directory is not writable
pub async fn mount(
    share: &NetworkShare,
    settings: &Settings,
    naming: &MountNaming,
) -> Result<PathBuf> {
    let mount_point =
        naming.make_mount_point(&share.server, &share.share, share.username.as_deref());
    log::debug!(
        "mounting \"{}\" at \"{}\"",
        share.source(),
        mount_point.display()
    );

    log::debug!(
        "making sure mount point \"{}\" exists",
        mount_point.display()
    );
    if !mount_point.exists() {
        fs::create_dir_all(&mount_point)?;
    }

    let mut command = smol::process::Command::new(&settings.mount_command);
    command
        .arg(share.source())
        .arg(&mount_point)
        .arg("-o")
        .arg(mount_options(share));

    // An unset PASSWD makes mount.cifs prompt on the terminal.
    match &share.username {
        Some(_) => command.env(PASSWD_ENV, share.password.as_deref().unwrap_or_default()),
        None => command.env_remove(PASSWD_ENV),
    };

    let status = command
        .status()
        .await
        .map_err(|source| SmbError::Spawn {
            command: settings.mount_command.clone(),
            source,
        })?;

    if !status.success() {
        return Err(SmbError::MountFailed {
            share: share.source(),
            mount_point,
        });
    }

    check_writable(&mount_point, naming.prefix())?;
    Ok(mount_point)
}

/// Unmounts a managed mount.
pub async fn umount(mount: &Mount, settings: &Settings) -> Result<()> {
    log::debug!(
        "unmounting \"{}\" from \"{}\"",
        mount.source(),
        mount.mount_point.display()
    );

    let status = smol::process::Command::new(&settings.umount_command)
        .arg(&mount.mount_point)
        .status()
        .await
        .map_err(|source| SmbError::Spawn {
            command: settings.umount_command.clone(),
            source,
        })?;

    if !status.success() {
        return Err(SmbError::UnmountFailed {
            share: mount.source(),
            mount_point: mount.mount_point.clone(),
        });
    }

    Ok(())
}

/// Creates and removes a scratch directory inside `mount_point`.
pub fn check_writable(mount_point: &Path, prefix: &str) -> Result<()> {
    let scratch = mount_point.join(format!(".{}{}", prefix, Utc::now().timestamp()));

    let result = fs::create_dir(&scratch).and_then(|_| fs::remove_dir(&scratch));
    match result {
        Ok(()) => {
            log::debug!("directory at \"{}\" is writable", mount_point.display());
            Ok(())
        }
        Err(e) => {
            log::debug!(
                "write check in \"{}\" failed: {}",
                mount_point.display(),
                e
            );
            Err(SmbError::NotWritable(mount_point.to_path_buf()))
        }
    }
}

/// Builds a share whose `//server/share` source is the path of a shell
/// script written into `dir`. With `sh` as the mount command, mounting the
/// share runs that script with the helper's arguments and environment.
#[cfg(all(test, unix))]
pub(crate) fn script_share(
    dir: &Path,
    body: &str,
    username: Option<&str>,
    password: Option<&str>,
) -> NetworkShare {
    let script = dir.join("mount-helper.sh");
    fs::write(&script, body).unwrap();

    let script = script.to_string_lossy().to_string();
    let (server, share) = script
        .trim_start_matches('/')
        .split_once('/')
        .expect("script lives below a top-level directory");
    NetworkShare::new(server, share, username, password)
}
