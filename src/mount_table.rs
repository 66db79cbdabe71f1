//! Parser for the kernel mount table (`/proc/mounts` format).

use crate::error::Result;
use crate::models::share::Mount;
use crate::mount_point::MountNaming;
use regex::Regex;
use std::{fs, path::Path, path::PathBuf};

const CIFS_FSTYPE: &str = "cifs";

/// Reads the mount table and returns the managed CIFS mounts.
pub fn list_mounts(mounts_file: &Path, naming: &MountNaming) -> Result<Vec<Mount>> {
    log::debug!("listing smb mounts in '{}'...", mounts_file.display());

    let content = fs::read_to_string(mounts_file)?;
    Ok(parse_mounts(&content, naming))
}

/// Extracts the managed CIFS mounts from mount table contents.
///
/// Lines that are blank, too short, not `cifs`, outside the managed
/// mount point namespace, or with a source that isn't `//server/share`
/// are skipped.
pub fn parse_mounts(content: &str, naming: &MountNaming) -> Vec<Mount> {
    let source_re = Regex::new(r"^//([^/]+)/(.+)$").expect("Invalid regex pattern");
    let username_re = Regex::new(r"(?:^|,)username=([^,]+)").expect("Invalid regex pattern");

    let mut mounts = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let (target, mount_point, fstype, opts) = (parts[0], parts[1], parts[2], parts[3]);

        if fstype != CIFS_FSTYPE {
            continue;
        }

        let mount_point = PathBuf::from(unescape(mount_point));
        if !naming.is_managed_mount(&mount_point) {
            continue;
        }

        let target = unescape(target);
        let Some(captures) = source_re.captures(&target) else {
            continue;
        };
        let server = captures[1].to_string();
        let share = captures[2].to_string();

        let username = username_re
            .captures(opts)
            .map(|c| unescape(&c[1]));

        log::debug!(
            "found smb mount \"//{}/{}\" at \"{}\"",
            server,
            share,
            mount_point.display()
        );

        mounts.push(Mount {
            server,
            share,
            username,
            mount_point,
        });
    }

    mounts
}

/// Decodes the octal escapes (`\040`, `\011`, `\012`, `\134`) the kernel
/// uses for whitespace and backslashes in mount table fields.
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_escape(&bytes[i + 1..i + 4]) {
            let value = (bytes[i + 1] - b'0') as u32 * 64
                + (bytes[i + 2] - b'0') as u32 * 8
                + (bytes[i + 3] - b'0') as u32;
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_escape(digits: &[u8]) -> bool {
    digits.len() == 3 && digits.iter().all(|d| (b'0'..=b'7').contains(d))
}
