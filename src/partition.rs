//! Resolving a partition identifier to a block device.
//!
//! The default lookup relies on the symlinks udev maintains under `/dev/disk`
//! (`by-partuuid`, `by-uuid`, ...). A match counts only if the link still
//! resolves to an existing device node.

use std::fmt::Write;
use std::fs;
use std::io;
use std::path::PathBuf;

use log::debug;
#[cfg(test)]
use mockall::automock;

use crate::error::Result;

pub const DEFAULT_DISK_DIR: &str = "/dev/disk";

/// Lookup key for the unique partition identifier.
pub const PARTUUID: &str = "PARTUUID";

#[cfg_attr(test, automock)]
pub trait PartitionLookup {
    /// Returns the device whose `key` attribute equals `value`.
    fn find(&self, key: &str, value: &str) -> Result<Option<PathBuf>>;
}

/// Lookup backed by a udev style `/dev/disk` tree.
#[derive(Debug, Clone)]
pub struct DiskDirectory {
    root: PathBuf,
}

impl DiskDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn subdir(key: &str) -> Option<&'static str> {
        match key {
            PARTUUID => Some("by-partuuid"),
            "PARTLABEL" => Some("by-partlabel"),
            "UUID" => Some("by-uuid"),
            "LABEL" => Some("by-label"),
            _ => None,
        }
    }
}

impl PartitionLookup for DiskDirectory {
    fn find(&self, key: &str, value: &str) -> Result<Option<PathBuf>> {
        let Some(subdir) = Self::subdir(key) else {
            debug!("no device links for key {key}");
            return Ok(None);
        };
        let link = self.root.join(subdir).join(encode_link_name(value));
        match fs::canonicalize(&link) {
            Ok(device) => {
                debug!("{} -> {}", link.display(), device.display());
                Ok(Some(device))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("{} does not resolve", link.display());
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Escapes a value the way udev does for its link names: bytes outside
/// `[0-9A-Za-z#+-.:=@_]` become `\xNN`.
fn encode_link_name(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' | b'#' | b'+' | b'-' | b'.' | b':' | b'=' | b'@' | b'_' => {
                encoded.push(char::from(byte))
            }
            _ => {
                let _ = write!(encoded, "\\x{byte:02x}");
            }
        }
    }
    encoded
}
