//! Settings and share list loading.
//!
//! Settings are layered: built-in defaults, then the optional `settings`
//! object of a JSON config file, then CLI flags. The share list lives in the
//! same config file (JSON) or in a flat CSV file, and is re-read on every
//! reconciliation pass.

use crate::error::{Result, SmbError};
use crate::models::share::NetworkShare;
use serde::Deserialize;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_MOUNTS_FILE: &str = "/proc/mounts";
pub const DEFAULT_MOUNT_ROOT: &str = "/media";
pub const DEFAULT_MOUNT_PREFIX: &str = "smbctl_";
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_MOUNT_COMMAND: &str = "mount.cifs";
pub const DEFAULT_UMOUNT_COMMAND: &str = "umount";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mounts_file: PathBuf,
    pub mount_root: PathBuf,
    pub mount_prefix: String,
    pub check_interval: Duration,
    pub mount_command: String,
    pub umount_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            mounts_file: PathBuf::from(DEFAULT_MOUNTS_FILE),
            mount_root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            mount_prefix: String::from(DEFAULT_MOUNT_PREFIX),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            mount_command: String::from(DEFAULT_MOUNT_COMMAND),
            umount_command: String::from(DEFAULT_UMOUNT_COMMAND),
        }
    }
}

/// Optional overrides carried in the `settings` object of a JSON config.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsOverrides {
    pub mounts_file: Option<PathBuf>,
    pub mount_root: Option<PathBuf>,
    pub mount_prefix: Option<String>,
    pub check_interval_secs: Option<u64>,
    pub mount_command: Option<String>,
    pub umount_command: Option<String>,
}

impl Settings {
    pub fn apply(&mut self, overrides: SettingsOverrides) {
        if let Some(v) = overrides.mounts_file {
            self.mounts_file = v;
        }
        if let Some(v) = overrides.mount_root {
            self.mount_root = v;
        }
        if let Some(v) = overrides.mount_prefix {
            self.mount_prefix = v;
        }
        if let Some(v) = overrides.check_interval_secs {
            self.check_interval = Duration::from_secs(v);
        }
        if let Some(v) = overrides.mount_command {
            self.mount_command = v;
        }
        if let Some(v) = overrides.umount_command {
            self.umount_command = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.check_interval.is_zero() {
            return Err(SmbError::InvalidConfig(
                "check interval must be at least one second".into(),
            ));
        }
        if !self.mount_root.is_absolute() {
            return Err(SmbError::InvalidConfig(format!(
                "mount root '{}' must be an absolute path",
                self.mount_root.display()
            )));
        }
        // The prefix is glued in front of \w+ when recognising managed mounts.
        if self.mount_prefix.is_empty()
            || !self
                .mount_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(SmbError::InvalidConfig(format!(
                "mount prefix '{}' must be non-empty and contain only [a-zA-Z0-9_]",
                self.mount_prefix
            )));
        }
        Ok(())
    }

    /// Resolves symlinks in `mount_root`.
    ///
    /// The kernel lists mount points by their resolved path, so a root given
    /// through a symlink would never match the mount table. The longest
    /// existing ancestor is canonicalized and the missing tail re-appended.
    pub fn resolve_mount_root(&mut self) -> Result<()> {
        let mut existing = self.mount_root.as_path();
        let mut tail = Vec::new();

        while !existing.exists() {
            match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    tail.push(name.to_os_string());
                    existing = parent;
                }
                _ => return Ok(()),
            }
        }

        let mut resolved = fs::canonicalize(existing)?;
        for name in tail.iter().rev() {
            resolved.push(name);
        }

        if resolved != self.mount_root {
            log::debug!(
                "mount root '{}' resolves to '{}'",
                self.mount_root.display(),
                resolved.display()
            );
        }
        self.mount_root = resolved;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonConfig {
    #[serde(default)]
    settings: SettingsOverrides,
    #[serde(default)]
    shares: Vec<NetworkShare>,
}

/// Where the share list comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Csv,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ConfigFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(ConfigFormat::Csv),
            _ => Err(SmbError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Reads the `settings` object of a JSON config, if any.
///
/// CSV configs carry no settings, so this returns the empty overrides for
/// them.
pub fn load_settings_overrides(path: &Path) -> Result<SettingsOverrides> {
    match ConfigFormat::from_path(path)? {
        ConfigFormat::Json => {
            let content = fs::read_to_string(path)?;
            let config: JsonConfig = serde_json::from_str(&content)?;
            Ok(config.settings)
        }
        ConfigFormat::Csv => Ok(SettingsOverrides::default()),
    }
}

/// Loads, validates and de-duplicates the share list of a config file.
pub fn load_shares(path: &Path) -> Result<Vec<NetworkShare>> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let shares = match format {
        ConfigFormat::Json => parse_json_shares(&content)?,
        ConfigFormat::Csv => parse_csv_shares(&content)?,
    };

    validate_shares(&shares)?;
    Ok(dedup_shares(shares))
}

pub fn parse_json_shares(content: &str) -> Result<Vec<NetworkShare>> {
    let config: JsonConfig = serde_json::from_str(content)?;
    Ok(config.shares)
}

pub fn parse_csv_shares(content: &str) -> Result<Vec<NetworkShare>> {
    // Fields are trimmed per column by the share deserializers; passwords
    // keep their whitespace.
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let shares = csv_reader
        .deserialize()
        .collect::<std::result::Result<Vec<NetworkShare>, _>>()?;

    Ok(shares)
}

fn validate_shares(shares: &[NetworkShare]) -> Result<()> {
    for (index, share) in shares.iter().enumerate() {
        if share.server.is_empty() || share.share.is_empty() {
            return Err(SmbError::InvalidConfig(format!(
                "share #{} ('{}') needs both a server and a share name",
                index + 1,
                share.source()
            )));
        }
        if share.server.contains('/') {
            return Err(SmbError::InvalidConfig(format!(
                "share #{}: server '{}' must not contain '/'",
                index + 1,
                share.server
            )));
        }
    }
    Ok(())
}

/// Keeps the first share for each identity triple, warning about the rest.
pub fn dedup_shares(shares: Vec<NetworkShare>) -> Vec<NetworkShare> {
    let mut seen = HashSet::new();

    shares
        .into_iter()
        .filter(|share| {
            let key = share.key();
            if seen.insert(key.clone()) {
                true
            } else {
                log::warn!("ignoring duplicate share {} in config", key);
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_json_shares() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "shares.json",
            r#"{
                "shares": [
                    {"server": "nas", "share": "cams", "username": "alice", "password": "pw"},
                    {"server": "backup", "share": "Video Files", "username": ""}
                ]
            }"#,
        );

        let shares = load_shares(&path).unwrap();

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].username.as_deref(), Some("alice"));
        assert_eq!(shares[0].password.as_deref(), Some("pw"));
        assert_eq!(shares[1].share, "Video Files");
        assert_eq!(shares[1].username, None);
    }

    #[test]
    fn loads_csv_shares() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "shares.csv",
            "server,share,username,password\nnas,cams,alice,pw\nbackup,video,,\n",
        );

        let shares = load_shares(&path).unwrap();

        assert_eq!(
            shares,
            vec![
                NetworkShare::new("nas", "cams", Some("alice"), Some("pw")),
                NetworkShare::new("backup", "video", None, None),
            ]
        );
    }

    #[test]
    fn passwords_keep_surrounding_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_config(
            &dir,
            "shares.csv",
            "server , share , username , password\n nas , cams , alice , pw \n",
        );
        let json_path = write_config(
            &dir,
            "shares.json",
            r#"{"shares": [{"server": "nas", "share": "cams", "username": "alice", "password": " pw "}]}"#,
        );

        for path in [csv_path, json_path] {
            let shares = load_shares(&path).unwrap();
            assert_eq!(shares[0].server, "nas");
            assert_eq!(shares[0].share, "cams");
            assert_eq!(shares[0].username.as_deref(), Some("alice"));
            assert_eq!(shares[0].password.as_deref(), Some(" pw "));
        }
    }

    #[test]
    fn duplicates_keep_first_entry() {
        let shares = dedup_shares(vec![
            NetworkShare::new("nas", "cams", Some("alice"), Some("first")),
            NetworkShare::new("nas", "cams", Some("alice"), Some("second")),
            NetworkShare::new("nas", "cams", None, None),
        ]);

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].password.as_deref(), Some("first"));
    }

    #[test]
    fn rejects_share_without_server() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "shares.json", r#"{"shares": [{"server": " ", "share": "cams"}]}"#);

        let err = load_shares(&path).unwrap_err();
        assert!(matches!(err, SmbError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "shares.yaml", "shares: []");

        let err = load_shares(&path).unwrap_err();
        assert!(matches!(err, SmbError::UnsupportedFormat(_)));
    }

    #[test]
    fn json_settings_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "smbctl.json",
            r#"{"settings": {"mount_root": "/mnt", "check_interval_secs": 60}, "shares": []}"#,
        );

        let mut settings = Settings::default();
        settings.apply(load_settings_overrides(&path).unwrap());

        assert_eq!(settings.mount_root, PathBuf::from("/mnt"));
        assert_eq!(settings.check_interval, Duration::from_secs(60));
        assert_eq!(settings.mount_prefix, DEFAULT_MOUNT_PREFIX);
        assert!(settings.validate().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn mount_root_is_resolved_through_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();
        let real = fs::canonicalize(&real).unwrap();

        let mut settings = Settings {
            mount_root: dir.path().join("link"),
            ..Settings::default()
        };
        settings.resolve_mount_root().unwrap();
        assert_eq!(settings.mount_root, real);

        let mut settings = Settings {
            mount_root: dir.path().join("link/shares"),
            ..Settings::default()
        };
        settings.resolve_mount_root().unwrap();
        assert_eq!(settings.mount_root, real.join("shares"));
    }

    #[test]
    fn missing_mount_root_keeps_its_tail() {
        let dir = tempfile::tempdir().unwrap();
        let base = fs::canonicalize(dir.path()).unwrap();

        let mut settings = Settings {
            mount_root: dir.path().join("not/yet/there"),
            ..Settings::default()
        };
        settings.resolve_mount_root().unwrap();

        assert_eq!(settings.mount_root, base.join("not/yet/there"));
    }

    #[test]
    fn validate_rejects_bad_prefix_and_interval() {
        let mut settings = Settings::default();
        settings.mount_prefix = "smb-".into();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.check_interval = Duration::ZERO;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.mount_root = PathBuf::from("media");
        assert!(settings.validate().is_err());
    }
}
