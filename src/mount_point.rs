//! Deterministic mount point paths for managed shares.
//!
//! Every managed share is mounted at `<root>/<prefix><server>_<share>[_<user>]`.
//! Only paths of that shape are ever unmounted by smbctl, which keeps
//! hand-made mounts out of reach of the reconciler.

use crate::config::Settings;
use regex::Regex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct MountNaming {
    root: PathBuf,
    prefix: String,
    managed_re: Regex,
    unsafe_chars_re: Regex,
}

impl MountNaming {
    pub fn new(root: &Path, prefix: &str) -> Self {
        let root_str = root.to_string_lossy();
        let root_str = root_str.trim_end_matches('/');
        let pattern = format!(
            r"^{}/{}\w+$",
            regex::escape(root_str),
            regex::escape(prefix)
        );

        MountNaming {
            root: root.to_path_buf(),
            prefix: prefix.to_string(),
            managed_re: Regex::new(&pattern).expect("escaped mount point pattern is valid"),
            unsafe_chars_re: Regex::new(r"[^a-zA-Z0-9]").expect("Invalid regex pattern"),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        MountNaming::new(&settings.mount_root, &settings.mount_prefix)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds the mount point for a share.
    ///
    /// Every character outside `[a-zA-Z0-9]` becomes `_` and the result is
    /// lowercased.
    ///
    /// # Examples
    /// ```text
    /// ("NAS.local", "Cameras", Some("alice")) -> /media/smbctl_nas_local_cameras_alice
    /// ("nas", "my share", None)               -> /media/smbctl_nas_my_share
    /// ```
    pub fn make_mount_point(&self, server: &str, share: &str, username: Option<&str>) -> PathBuf {
        let server = self.sanitize(server);
        let share = self.sanitize(share);

        let name = match username {
            Some(username) if !username.is_empty() => format!(
                "{}{}_{}_{}",
                self.prefix,
                server,
                share,
                self.sanitize(username)
            ),
            _ => format!("{}{}_{}", self.prefix, server, share),
        };

        self.root.join(name)
    }

    pub fn is_managed_mount(&self, mount_point: &Path) -> bool {
        match mount_point.to_str() {
            Some(path) => self.managed_re.is_match(path),
            None => false,
        }
    }

    fn sanitize(&self, value: &str) -> String {
        self.unsafe_chars_re
            .replace_all(value, "_")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> MountNaming {
        MountNaming::new(Path::new("/media"), "smbctl_")
    }

    #[test]
    fn mount_point_with_username() {
        assert_eq!(
            naming().make_mount_point("NAS.local", "Cameras", Some("alice")),
            PathBuf::from("/media/smbctl_nas_local_cameras_alice")
        );
    }

    #[test]
    fn mount_point_without_username() {
        assert_eq!(
            naming().make_mount_point("192.168.1.10", "my share", None),
            PathBuf::from("/media/smbctl_192_168_1_10_my_share")
        );
        assert_eq!(
            naming().make_mount_point("nas", "cams", Some("")),
            PathBuf::from("/media/smbctl_nas_cams")
        );
    }

    #[test]
    fn usernames_are_sanitized_too() {
        let mount_point = naming().make_mount_point("nas", "cams", Some("John.Doe"));

        assert_eq!(mount_point, PathBuf::from("/media/smbctl_nas_cams_john_doe"));
        assert!(naming().is_managed_mount(&mount_point));
    }

    #[test]
    fn recognises_only_managed_paths() {
        let naming = naming();

        assert!(naming.is_managed_mount(Path::new("/media/smbctl_nas_cams")));
        assert!(!naming.is_managed_mount(Path::new("/media/usb_stick")));
        assert!(!naming.is_managed_mount(Path::new("/media/smbctl_")));
        assert!(!naming.is_managed_mount(Path::new("/media/smbctl_nas/cams")));
        assert!(!naming.is_managed_mount(Path::new("/mnt/smbctl_nas_cams")));
        assert!(!naming.is_managed_mount(Path::new("/media/smbctl_nas cams")));
    }

    #[test]
    fn root_with_trailing_slash_and_regex_chars() {
        let naming = MountNaming::new(Path::new("/srv/mnt.d/"), "smb_");

        assert!(naming.is_managed_mount(Path::new("/srv/mnt.d/smb_nas_cams")));
        assert!(!naming.is_managed_mount(Path::new("/srv/mntxd/smb_nas_cams")));
    }
}
