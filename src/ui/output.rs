//! Output and reporting functions.
//!
//! This module handles console output for the interactive commands and the
//! one-line pass summaries the daemon writes to the log.

use crate::models::share::Mount;
use crate::reconciler::ReconcileReport;

/// Prints the managed mounts found in the mount table.
///
/// # Arguments
/// * `mounts` - Managed CIFS mounts, as returned by the mount table parser
pub fn print_mounts(mounts: &[Mount]) {
    if mounts.is_empty() {
        println!("✅ No managed smb mounts found");
        return;
    }

    println!("🔎 Found {} managed smb mount(s):", mounts.len());
    for mount in mounts {
        match &mount.username {
            Some(username) => println!(
                "\t- {} at {} (user {})",
                mount.source(),
                mount.mount_point.display(),
                username
            ),
            None => println!(
                "\t- {} at {} (guest)",
                mount.source(),
                mount.mount_point.display()
            ),
        }
    }
}

/// Prints the complete report of a reconciliation or unmount pass.
///
/// # Arguments
/// * `report` - Outcome of the pass
pub fn print_report(report: &ReconcileReport) {
    println!(
        "\n🔚 Check completed at {}",
        report.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if !report.kept.is_empty() {
        println!("✅ Already mounted: {}", report.kept.len());
        for key in &report.kept {
            println!("\t- {}", key);
        }
    }

    if !report.mounted.is_empty() {
        println!("⏫ Mounted: {}", report.mounted.len());
        for mount_point in &report.mounted {
            println!("\t- {}", mount_point.display());
        }
    }

    if !report.unmounted.is_empty() {
        println!("⏬ Unmounted: {}", report.unmounted.len());
        for mount_point in &report.unmounted {
            println!("\t- {}", mount_point.display());
        }
    }

    if report.failures.is_empty() {
        println!("✅ No failures");
    } else {
        println!("❗ Failures: {}", report.failures.len());
        for failure in &report.failures {
            println!("\t- {}: {}", failure.key, failure.reason);
        }
    }
}

/// Logs a one-line summary of a daemon pass.
pub fn log_pass_summary(report: &ReconcileReport) {
    let summary = format!(
        "smb mount check: {} kept, {} mounted, {} unmounted, {} failed",
        report.kept.len(),
        report.mounted.len(),
        report.unmounted.len(),
        report.failures.len()
    );

    if report.is_success() {
        log::info!("{}", summary);
    } else {
        log::warn!("{}", summary);
    }
}
