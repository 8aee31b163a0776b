//! Error type shared by the device shim, the pager and the attribute tank.
//!
//! Every layer propagates the first failure unchanged; there is no retry and
//! no rollback. `ErrorKind` is the flat taxonomy callers usually branch on.

use std::io;

use thiserror::Error;

/// Result alias for all library operations.
pub type Result<T> = std::result::Result<T, NvmError>;

/// Device operation that failed (for error messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOp {
    Open,
    Read,
    Write,
}

impl std::fmt::Display for DeviceOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceOp::Open => write!(f, "open"),
            DeviceOp::Read => write!(f, "read"),
            DeviceOp::Write => write!(f, "write"),
        }
    }
}

#[derive(Debug, Error)]
pub enum NvmError {
    /// Logical page id at or beyond capacity.
    #[error("page {page_id} out of range (num_pages={num_pages})")]
    OutOfRange { page_id: u64, num_pages: u64 },

    /// Device could not be opened or an I/O call failed.
    #[error("device {op} failed on {device}: {source}")]
    Device {
        op: DeviceOp,
        device: String,
        #[source]
        source: io::Error,
    },

    /// Checksum mismatch with no usable redundant copy.
    #[error("page {page_id} is corrupted (mirror checked: {mirror_checked})")]
    Corruption { page_id: u64, mirror_checked: bool },

    /// Replacement policy found no slot to reuse.
    #[error("no evictable cache slot")]
    NoEvictableSlot,

    #[error("attribute id {id} out of range (max {max})")]
    AttrIdOutOfRange { id: u32, max: u32 },

    #[error("output buffer too small: need {need} B, got {got} B")]
    BufferTooSmall { need: usize, got: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Flat result taxonomy (success is `Ok`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    OutOfRange,
    DeviceFail,
    Corruption,
    NoEvictableSlot,
    InvalidArgument,
}

impl NvmError {
    pub(crate) fn device(op: DeviceOp, device: impl Into<String>, source: io::Error) -> Self {
        Self::Device {
            op,
            device: device.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::Device { .. } => ErrorKind::DeviceFail,
            Self::Corruption { .. } => ErrorKind::Corruption,
            Self::NoEvictableSlot => ErrorKind::NoEvictableSlot,
            Self::AttrIdOutOfRange { .. } | Self::BufferTooSmall { .. } | Self::Config(_) => {
                ErrorKind::InvalidArgument
            }
        }
    }

    /// Stable numeric code (0 is reserved for success). Used as CLI exit code.
    pub fn code(&self) -> u8 {
        match self.kind() {
            ErrorKind::OutOfRange => 1,
            ErrorKind::DeviceFail => 2,
            ErrorKind::Corruption => 3,
            ErrorKind::NoEvictableSlot => 4,
            ErrorKind::InvalidArgument => 5,
        }
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption { .. })
    }
}
