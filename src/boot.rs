//! Boot manager variables and the boot partition lookup built on them.
//!
//! `BootCurrent` holds the index of the load option the firmware booted from;
//! `Boot####` holds that load option: attributes, a UCS-2 description and the
//! device path list.

use std::io::Read;
use std::path::PathBuf;

use log::{debug, info};
use uefi::runtime::VariableAttributes;

use crate::device_path::find_hard_drive;
use crate::efivar::{VarReader, VariableName, VariableStore};
use crate::error::{Error, Result};
use crate::hard_drive::HardDrive;
use crate::partition::{PARTUUID, PartitionLookup};

/// Reads the index of the boot option used for the current boot.
pub fn boot_current(store: &VariableStore) -> Result<u16> {
    let mut var = store.open(&VariableName::boot_current())?;
    let attributes = var.read_attributes()?;
    let index = var.read_u16()?;
    debug!("BootCurrent = {index:04X} ({attributes:?})");
    Ok(index)
}

/// Header of an `EFI_LOAD_OPTION`.
#[derive(Debug, Clone)]
pub struct BootOption {
    pub attributes: VariableAttributes,
    pub flags: u32,
    pub file_path_list_length: u16,
    description: Vec<u16>,
}

impl BootOption {
    /// Reads everything up to the device path list, leaving the reader at
    /// its first node.
    pub fn read_header<R: Read>(reader: &mut VarReader<R>) -> Result<Self> {
        let attributes = reader.read_attributes()?;
        let flags = reader.read_u32()?;
        let file_path_list_length = reader.read_u16()?;
        let mut description = Vec::new();
        loop {
            match reader.read_u16()? {
                0 => break,
                unit => description.push(unit),
            }
        }
        Ok(Self { attributes, flags, file_path_list_length, description })
    }

    /// Description for display only; unpaired surrogates are replaced.
    pub fn description(&self) -> String {
        String::from_utf16_lossy(&self.description)
    }
}

/// Reads `Boot####` for `index` and returns its first hard drive node.
pub fn boot_option_hard_drive(store: &VariableStore, index: u16) -> Result<Option<HardDrive>> {
    let name = VariableName::boot_option(index)?;
    let mut var = store.open(&name)?;
    let option = BootOption::read_header(&mut var)?;
    debug!(
        "{}: \"{}\" flags {:#x}, {} bytes of device paths ({:?})",
        name.name(),
        option.description(),
        option.flags,
        option.file_path_list_length,
        option.attributes
    );
    find_hard_drive(&mut var)
}

/// Finds the block device of the partition the firmware booted from.
pub fn detect_boot_partition<L: PartitionLookup + ?Sized>(store: &VariableStore, lookup: &L) -> Result<PathBuf> {
    let index = boot_current(store)?;
    let id = boot_option_hard_drive(store, index)?
        .and_then(|hard_drive| hard_drive.partition_id())
        .ok_or(Error::NoPartitionInDevicePath)?;

    let value = id.to_string();
    info!("Boot{index:04X} booted from partition {value} ({})", id.kind());
    lookup.find(PARTUUID, &value)?.ok_or(Error::PartitionNotFound { key: PARTUUID, value })
}
