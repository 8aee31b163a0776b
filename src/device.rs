//! device: byte-addressable device shim consumed by the pager.
//!
//! The handle is not held open: every read_at/write_at opens the file,
//! seeks, performs I/O and closes it on drop. Reads beyond the current end
//! of the file zero-fill the remainder (sparse / extendable device).
//! Concurrent access from several handles needs external synchronization.

use log::debug;
use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{DeviceOp, NvmError, Result};

/// Raw device interface: positioned reads and writes of whole buffers.
pub trait BlockDevice {
    /// Fill `buf` from byte `offset`. Bytes past the device end read as zero.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Write all of `data` at byte `offset`, extending the device if needed.
    fn write_at(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Human-readable device name (for errors/logs).
    fn name(&self) -> String;
}

/// File-backed device, reopened on every call.
#[derive(Debug, Clone)]
pub struct FileDevice {
    path: PathBuf,
}

impl FileDevice {
    /// Refer to an existing device file. Nothing is opened here.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Provision the device file (created empty if missing), then refer to it.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| NvmError::device(DeviceOp::Open, path.display().to_string(), e))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn err(&self, op: DeviceOp, e: io::Error) -> NvmError {
        NvmError::device(op, self.path.display().to_string(), e)
    }
}

impl BlockDevice for FileDevice {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut f = OpenOptions::new()
            .read(true)
            .open(&self.path)
            .map_err(|e| self.err(DeviceOp::Open, e))?;
        f.seek(SeekFrom::Start(offset))
            .map_err(|e| self.err(DeviceOp::Read, e))?;

        // Короткое чтение у хвоста файла: остаток заполняем нулями.
        let mut filled = 0usize;
        while filled < buf.len() {
            match f.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.err(DeviceOp::Read, e)),
            }
        }
        if filled < buf.len() {
            debug!(
                "device {}: short read at off={} ({} of {} B), zero-filling",
                self.path.display(),
                offset,
                filled,
                buf.len()
            );
            buf[filled..].fill(0);
        }
        Ok(())
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mut f = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|e| self.err(DeviceOp::Open, e))?;
        f.seek(SeekFrom::Start(offset))
            .map_err(|e| self.err(DeviceOp::Write, e))?;
        f.write_all(data)
            .map_err(|e| self.err(DeviceOp::Write, e))?;
        Ok(())
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}
