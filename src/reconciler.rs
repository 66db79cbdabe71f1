use crate::cifs;
use crate::config::{self, Settings};
use crate::error::Result;
use crate::models::share::{Mount, NetworkShare, ShareKey};
use crate::mount_point::MountNaming;
use crate::mount_table::list_mounts;
use chrono::{DateTime, Utc};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

/// What a pass has to do to bring the mount table in line with the config.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MountPlan<'a> {
    pub keep: Vec<&'a NetworkShare>,
    pub to_mount: Vec<&'a NetworkShare>,
    pub to_unmount: Vec<&'a Mount>,
}

/// One failed mount or unmount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub key: ShareKey,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub checked_at: DateTime<Utc>,
    pub kept: Vec<ShareKey>,
    pub mounted: Vec<PathBuf>,
    pub unmounted: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl ReconcileReport {
    fn new() -> Self {
        ReconcileReport {
            checked_at: Utc::now(),
            kept: Vec::new(),
            mounted: Vec::new(),
            unmounted: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Splits desired shares and observed mounts into keep / mount / unmount.
///
/// Input order is preserved in every list.
pub fn plan<'a>(desired: &'a [NetworkShare], observed: &'a [Mount]) -> MountPlan<'a> {
    let observed_keys: HashSet<ShareKey> = observed.iter().map(Mount::key).collect();
    let desired_keys: HashSet<ShareKey> = desired.iter().map(NetworkShare::key).collect();

    let mut plan = MountPlan::default();
    for share in desired {
        if observed_keys.contains(&share.key()) {
            plan.keep.push(share);
        } else {
            plan.to_mount.push(share);
        }
    }

    plan.to_unmount = observed
        .iter()
        .filter(|mount| !desired_keys.contains(&mount.key()))
        .collect();

    plan
}

pub struct Reconciler {
    settings: Settings,
    naming: MountNaming,
    config_path: PathBuf,
}

impl Reconciler {
    pub fn new(settings: Settings, config_path: &Path) -> Self {
        let naming = MountNaming::from_settings(&settings);
        Reconciler {
            settings,
            naming,
            config_path: config_path.to_path_buf(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn naming(&self) -> &MountNaming {
        &self.naming
    }

    pub fn list_mounts(&self) -> Result<Vec<Mount>> {
        list_mounts(&self.settings.mounts_file, &self.naming)
    }

    /// Runs one reconciliation pass against the current config file.
    ///
    /// # Errors
    /// Only when the config or the mount table can't be read. Individual
    /// mount and unmount failures end up in the report instead.
    pub async fn update_mounts(&self) -> Result<ReconcileReport> {
        let shares = config::load_shares(&self.config_path)?;
        self.reconcile(&shares).await
    }

    pub async fn reconcile(&self, shares: &[NetworkShare]) -> Result<ReconcileReport> {
        let mounts = self.list_mounts()?;
        let plan = plan(shares, &mounts);
        let mut report = ReconcileReport::new();

        log::debug!(
            "{} share(s) configured, {} managed mount(s) found: {} to mount, {} to unmount",
            shares.len(),
            mounts.len(),
            plan.to_mount.len(),
            plan.to_unmount.len()
        );

        report.kept = plan.keep.iter().map(|s| s.key()).collect();

        for share in plan.to_mount {
            match cifs::mount(share, &self.settings, &self.naming).await {
                Ok(mount_point) => {
                    log::info!(
                        "mounted \"{}\" at \"{}\"",
                        share.source(),
                        mount_point.display()
                    );
                    report.mounted.push(mount_point);
                }
                Err(e) => {
                    log::error!("{}", e);
                    report.failures.push(Failure {
                        key: share.key(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        for mount in plan.to_unmount {
            self.unmount_into(mount, &mut report).await;
        }

        Ok(report)
    }

    /// Unmounts every managed mount in the mount table.
    pub async fn umount_all(&self) -> Result<ReconcileReport> {
        let mounts = self.list_mounts()?;
        let mut report = ReconcileReport::new();

        for mount in &mounts {
            self.unmount_into(mount, &mut report).await;
        }

        Ok(report)
    }

    async fn unmount_into(&self, mount: &Mount, report: &mut ReconcileReport) {
        match cifs::umount(mount, &self.settings).await {
            Ok(()) => {
                log::info!(
                    "unmounted \"{}\" from \"{}\"",
                    mount.source(),
                    mount.mount_point.display()
                );
                report.unmounted.push(mount.mount_point.clone());
            }
            Err(e) => {
                log::error!("{}", e);
                report.failures.push(Failure {
                    key: mount.key(),
                    reason: e.to_string(),
                });
            }
        }
    }
}
