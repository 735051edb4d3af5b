//! Hard drive media device path node (type 0x04, subtype 0x01).
//!
//! Payload layout after the 4-byte node header:
//!
//! | offset | size | field            |
//! |--------|------|------------------|
//! | 0      | 4    | partition number |
//! | 4      | 8    | partition start  |
//! | 12     | 8    | partition size   |
//! | 20     | 16   | signature        |
//! | 36     | 1    | MBR type         |
//! | 37     | 1    | signature type   |

use core::fmt::{self, Display};
use std::io::Read;

use log::{debug, warn};
use uefi::Guid;
use uefi::proto::device_path::media::PartitionFormat;

use crate::efivar::VarReader;
use crate::error::Result;

pub const PAYLOAD_SIZE: u16 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionSignature {
    /// 32-bit MBR disk signature.
    Mbr(u32),
    /// GPT unique partition GUID.
    Guid(Guid),
    Unknown { signature_type: u8, signature: [u8; 16] },
}

impl PartitionSignature {
    /// GPT signatures are stored in the mixed-endian EFI_GUID layout, which is
    /// what [`Guid::from_bytes`] expects.
    pub fn decode(signature_type: u8, signature: [u8; 16]) -> Self {
        match PartitionFormat(signature_type) {
            PartitionFormat::MBR => {
                let [a, b, c, d, ..] = signature;
                PartitionSignature::Mbr(u32::from_le_bytes([a, b, c, d]))
            }
            PartitionFormat::GPT => PartitionSignature::Guid(Guid::from_bytes(signature)),
            _ => PartitionSignature::Unknown { signature_type, signature },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardDrive {
    pub partition_number: u32,
    pub partition_start: u64,
    pub partition_size: u64,
    pub signature: PartitionSignature,
}

impl HardDrive {
    pub fn read<R: Read>(reader: &mut VarReader<R>) -> Result<Self> {
        let partition_number = reader.read_u32()?;
        let partition_start = reader.read_u64()?;
        let partition_size = reader.read_u64()?;
        let signature = reader.read_exact::<16>()?;
        let _mbr_type = reader.read_u8()?;
        let signature_type = reader.read_u8()?;

        let node = Self {
            partition_number,
            partition_start,
            partition_size,
            signature: PartitionSignature::decode(signature_type, signature),
        };
        debug!(
            "hard drive node: partition {} start {:#x} size {:#x} {:?}",
            node.partition_number, node.partition_start, node.partition_size, node.signature
        );
        Ok(node)
    }

    /// The identifier the partition is known by, if the signature type is one
    /// we understand.
    pub fn partition_id(&self) -> Option<PartitionId> {
        match self.signature {
            PartitionSignature::Mbr(disk_signature) => {
                Some(PartitionId::Mbr { disk_signature, partition_number: self.partition_number })
            }
            PartitionSignature::Guid(guid) => Some(PartitionId::Gpt(guid)),
            PartitionSignature::Unknown { signature_type, .. } => {
                warn!("hard drive node has unsupported signature type {signature_type}");
                None
            }
        }
    }
}

/// Partition identifier decoded from a hard drive node.
///
/// Formats as `xxxxxxxx-NN` for MBR partitions and as a lowercase
/// 36-character UUID for GPT partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionId {
    Mbr { disk_signature: u32, partition_number: u32 },
    Gpt(Guid),
}

impl PartitionId {
    pub fn kind(&self) -> &'static str {
        match self {
            PartitionId::Mbr { .. } => "MBR-signature",
            PartitionId::Gpt(_) => "PARTUUID",
        }
    }
}

impl Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionId::Mbr { disk_signature, partition_number } => {
                write!(f, "{disk_signature:08x}-{partition_number:02}")
            }
            PartitionId::Gpt(guid) => write!(f, "{guid}"),
        }
    }
}
