//! Sequential access to firmware variables exposed through efivarfs.
//!
//! Every efivarfs file starts with the 4-byte attribute word of the variable,
//! followed by the variable data. Files are consumed front to back exactly once;
//! there is no seeking.

use core::fmt::{self, Display, Write};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use log::{debug, trace};
use uefi::runtime::{VariableAttributes, VariableVendor};

use crate::error::{Error, Result};

pub const DEFAULT_EFIVARS_DIR: &str = "/sys/firmware/efi/efivars";

/// Little-endian field reader over a sequential byte source.
///
/// A read either returns every requested byte or fails with
/// [`Error::TruncatedRead`]; short data is never zero-filled.
pub struct VarReader<R> {
    inner: R,
}

impl<R: Read> VarReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_exact<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|err| Error::from_read(err, N))?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_exact::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_exact().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_exact().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_exact().map(u64::from_le_bytes)
    }

    /// Reads and drops exactly `len` bytes.
    pub fn skip(&mut self, len: u64) -> Result<()> {
        let wanted = usize::try_from(len).unwrap_or(usize::MAX);
        let skipped = io::copy(&mut self.inner.by_ref().take(len), &mut io::sink())
            .map_err(|err| Error::from_read(err, wanted))?;
        if skipped < len {
            return Err(Error::TruncatedRead { wanted });
        }
        Ok(())
    }

    /// Borrows a reader that can consume at most `len` more bytes.
    pub fn limit(&mut self, len: u64) -> VarReader<io::Take<&mut R>> {
        VarReader::new(self.inner.by_ref().take(len))
    }

    /// Reads the attribute word every efivarfs file starts with.
    pub fn read_attributes(&mut self) -> Result<VariableAttributes> {
        self.read_u32().map(VariableAttributes::from_bits_retain)
    }
}

impl<R: Read> VarReader<io::Take<R>> {
    /// Bytes left before the limit is reached.
    pub fn remaining(&self) -> u64 {
        self.inner.limit()
    }
}

/// Name of a variable in the store: `<Name>-<vendor GUID>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableName {
    name: String,
    vendor: VariableVendor,
}

impl VariableName {
    pub fn new(name: impl Into<String>, vendor: VariableVendor) -> Self {
        Self { name: name.into(), vendor }
    }

    pub fn boot_current() -> Self {
        Self::new("BootCurrent", VariableVendor::GLOBAL_VARIABLE)
    }

    /// `Boot####` with the index as four uppercase hex digits.
    pub fn boot_option(index: u16) -> Result<Self> {
        let mut name = String::with_capacity(8);
        write!(name, "Boot{index:04X}")?;
        Ok(Self::new(name, VariableVendor::GLOBAL_VARIABLE))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.vendor.0)
    }
}

/// A directory of firmware variables, one file per variable.
#[derive(Debug, Clone)]
pub struct VariableStore {
    root: PathBuf,
}

impl VariableStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn is_present(&self) -> bool {
        self.root.is_dir()
    }

    pub fn path_of(&self, name: &VariableName) -> PathBuf {
        self.root.join(name.to_string())
    }

    /// Opens a variable for one front-to-back pass. The file is closed when
    /// the returned reader is dropped.
    pub fn open(&self, name: &VariableName) -> Result<VarReader<BufReader<File>>> {
        let path = self.path_of(name);
        trace!("opening {}", path.display());
        let file = File::open(&path)
            .map_err(|source| Error::VariableUnavailable { name: name.to_string(), source })?;
        debug!("opened variable {name}");
        Ok(VarReader::new(BufReader::new(file)))
    }
}
