use core::fmt::{self, Display};
use std::io;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A firmware variable could not be opened.
    VariableUnavailable { name: String, source: io::Error },
    /// The variable ended before a field of `wanted` bytes could be read.
    TruncatedRead { wanted: usize },
    /// A device path node declared a length smaller than its own header.
    MalformedDevicePath { length: u16 },
    /// The device path ended without a usable hard-drive node.
    NoPartitionInDevicePath,
    /// The partition lookup found no live device for the identifier.
    PartitionNotFound { key: &'static str, value: String },
    Format(fmt::Error),
    Io(io::Error),
}

impl Error {
    pub(crate) fn from_read(err: io::Error, wanted: usize) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::TruncatedRead { wanted },
            _ => Error::Io(err),
        }
    }
}

impl From<fmt::Error> for Error {
    fn from(value: fmt::Error) -> Self {
        Error::Format(value)
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Io(value)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::VariableUnavailable { name, .. } => write!(f, "Cannot access EFI variable {name}"),
            Error::TruncatedRead { wanted } => write!(f, "Boundary exceeded (EFI bug?): short read of {wanted} bytes"),
            Error::MalformedDevicePath { length } => {
                write!(f, "Invalid structure (length must not be less than 4, got {length})")
            }
            Error::NoPartitionInDevicePath => write!(f, "Partition not found in device path"),
            Error::PartitionNotFound { key, value } => write!(f, "Partition not found ({key}={value})"),
            Error::Format(_) => write!(f, "Formatting failed (how come this could happen?)"),
            Error::Io(_) => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::VariableUnavailable { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            Error::Format(err) => Some(err),
            _ => None,
        }
    }
}
