//! Builders for firmware variable blobs used across the unit tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::device_path::NODE_HEADER_SIZE;
use crate::hard_drive::PAYLOAD_SIZE;

/// End of entire device path, including its (unread) length field.
pub const END: [u8; 4] = [0x7F, 0xFF, 0x04, 0x00];

pub const GPT_SIGNATURE: [u8; 16] =
    [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x00, 0x11];

/// Attribute word efivarfs reports for boot variables (NV + BS + RT).
pub const BOOT_ATTRIBUTES: [u8; 4] = [0x07, 0x00, 0x00, 0x00];

pub fn raw_node(device_type: u8, sub_type: u8, length: u16, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![device_type, sub_type];
    bytes.extend_from_slice(&length.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

pub fn node(device_type: u8, sub_type: u8, payload: &[u8]) -> Vec<u8> {
    let length = u16::try_from(payload.len()).unwrap() + NODE_HEADER_SIZE;
    raw_node(device_type, sub_type, length, payload)
}

pub fn hard_drive_payload(partition_number: u32, signature: [u8; 16], signature_type: u8) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(usize::from(PAYLOAD_SIZE));
    bytes.extend_from_slice(&partition_number.to_le_bytes());
    bytes.extend_from_slice(&0x800u64.to_le_bytes());
    bytes.extend_from_slice(&0x100000u64.to_le_bytes());
    bytes.extend_from_slice(&signature);
    bytes.push(0x02);
    bytes.push(signature_type);
    bytes
}

pub fn hard_drive_node(partition_number: u32, signature: [u8; 16], signature_type: u8) -> Vec<u8> {
    node(0x04, 0x01, &hard_drive_payload(partition_number, signature, signature_type))
}

pub fn boot_current(index: u16) -> Vec<u8> {
    let mut bytes = BOOT_ATTRIBUTES.to_vec();
    bytes.extend_from_slice(&index.to_le_bytes());
    bytes
}

/// A `Boot####` variable: attributes, load option header, description, path.
pub fn boot_option(description: &str, device_path: &[u8]) -> Vec<u8> {
    let mut bytes = BOOT_ATTRIBUTES.to_vec();
    bytes.extend_from_slice(&1u32.to_le_bytes()); // LOAD_OPTION_ACTIVE
    bytes.extend_from_slice(&u16::try_from(device_path.len()).unwrap().to_le_bytes());
    for unit in description.encode_utf16().chain([0]) {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes.extend_from_slice(device_path);
    bytes
}

/// Directory under the system temp dir, removed on drop.
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(tag: &str) -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let path = std::env::temp_dir().join(format!(
            "efi-boot-partition-{tag}-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}
