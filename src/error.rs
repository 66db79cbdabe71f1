//! Error type shared by every smbctl operation.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SmbError>;

#[derive(Error, Debug)]
pub enum SmbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse CSV config: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unsupported config format '{}', expected .json or .csv", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to mount smb share \"{share}\" at \"{}\"", .mount_point.display())]
    MountFailed { share: String, mount_point: PathBuf },

    #[error("directory at \"{}\" is not writable", .0.display())]
    NotWritable(PathBuf),

    #[error("failed to unmount smb share \"{share}\" from \"{}\"", .mount_point.display())]
    UnmountFailed { share: String, mount_point: PathBuf },
}
