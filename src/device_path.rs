//! Walking a device path stored in a load option.
//!
//! Nodes are self-describing: `type: u8, subtype: u8, length: u16` followed by
//! `length - 4` payload bytes. Only the hard drive media node is decoded; every
//! other node is skipped by its declared length.

use std::io::Read;

use log::{debug, trace, warn};
use uefi::proto::device_path::{DeviceSubType, DeviceType};

use crate::efivar::VarReader;
use crate::error::{Error, Result};
use crate::hard_drive::{HardDrive, PAYLOAD_SIZE};

pub const NODE_HEADER_SIZE: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// End of entire device path.
    End,
    HardDrive(HardDrive),
    /// Any node we do not decode, already skipped.
    Other { device_type: DeviceType, sub_type: DeviceSubType, length: u16 },
}

impl Node {
    fn is_end(device_type: DeviceType, sub_type: DeviceSubType) -> bool {
        device_type == DeviceType::END && sub_type == DeviceSubType::END_ENTIRE
    }

    fn is_hard_drive(device_type: DeviceType, sub_type: DeviceSubType) -> bool {
        device_type == DeviceType::MEDIA && sub_type == DeviceSubType::MEDIA_HARD_DRIVE
    }

    /// Reads one node, leaving the reader at the start of the next one.
    ///
    /// The end node's length field is not read.
    pub fn read<R: Read>(reader: &mut VarReader<R>) -> Result<Self> {
        let device_type = DeviceType(reader.read_u8()?);
        let sub_type = DeviceSubType(reader.read_u8()?);
        if Self::is_end(device_type, sub_type) {
            return Ok(Node::End);
        }

        let length = reader.read_u16()?;
        trace!("node type {:#04x} subtype {:#04x} length {length}", device_type.0, sub_type.0);
        if length < NODE_HEADER_SIZE {
            return Err(Error::MalformedDevicePath { length });
        }
        let payload_len = u64::from(length - NODE_HEADER_SIZE);

        if Self::is_hard_drive(device_type, sub_type) {
            if length != NODE_HEADER_SIZE + PAYLOAD_SIZE {
                warn!("hard drive node is {length} bytes, expected {}", NODE_HEADER_SIZE + PAYLOAD_SIZE);
            }
            let mut payload = reader.limit(payload_len);
            let node = HardDrive::read(&mut payload)?;
            let rest = payload.remaining();
            payload.skip(rest)?;
            return Ok(Node::HardDrive(node));
        }

        reader.skip(payload_len)?;
        Ok(Node::Other { device_type, sub_type, length })
    }
}

/// Iterator over the nodes of one device path instance.
///
/// Stops after the end node or after the first error.
pub struct Nodes<'a, R> {
    reader: &'a mut VarReader<R>,
    finished: bool,
}

impl<'a, R: Read> Nodes<'a, R> {
    pub fn new(reader: &'a mut VarReader<R>) -> Self {
        Self { reader, finished: false }
    }
}

impl<R: Read> Iterator for Nodes<'_, R> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match Node::read(self.reader) {
            Ok(Node::End) => {
                self.finished = true;
                None
            }
            Ok(node) => Some(Ok(node)),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Returns the first hard drive node of the path, or `None` if the end node
/// comes first. Nodes after the first hard drive node are not read.
pub fn find_hard_drive<R: Read>(reader: &mut VarReader<R>) -> Result<Option<HardDrive>> {
    for node in Nodes::new(reader) {
        match node? {
            Node::HardDrive(hard_drive) => return Ok(Some(hard_drive)),
            Node::Other { device_type, sub_type, length } => {
                debug!("skipped node type {:#04x} subtype {:#04x} ({length} bytes)", device_type.0, sub_type.0);
            }
            Node::End => break,
        }
    }
    debug!("reached end of device path");
    Ok(None)
}
