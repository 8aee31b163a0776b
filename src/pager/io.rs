//! pager/io: fault-in, write-back and the public read/write/flush paths.
//!
//! Fault-in (cache miss):
//! 1) policy picks a victim slot (NoEvictableSlot if none);
//! 2) a dirty victim is written back: checksum, primary, then mirror;
//!    the first failing device write aborts the fault-in;
//! 3) the requested primary page is read and its trailer verified;
//! 4) on mismatch: no redundancy -> Corruption; otherwise read the mirror,
//!    verify it, adopt it and rewrite the primary (self-healing).
//!    A bad mirror too -> Corruption.
//!
//! Writes only touch cache slots and mark them dirty; durability comes from
//! flush(), which writes every dirty slot (primary + mirror) and does not
//! clear the dirty flags, so repeated flushes rewrite identical bytes.

use log::{debug, error, warn};

use crate::device::BlockDevice;
use crate::error::{NvmError, Result};
use crate::metrics::{
    record_cache_eviction, record_cache_hit, record_cache_miss, record_checksum_failure,
    record_flush, record_mirror_repair, record_unrecoverable, record_writeback,
};
use crate::page::{page_update_checksum, page_verify_checksum};

use super::core::Pager;

impl<D: BlockDevice> Pager<D> {
    /// Read `len` bytes starting at (`page_id`, `offset`), spanning pages as needed.
    pub fn read(&mut self, page_id: u64, len: usize, offset: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.read_into(page_id, &mut out, offset)?;
        Ok(out)
    }

    /// Fill `out` starting at (`page_id`, `offset`).
    pub fn read_into(&mut self, page_id: u64, out: &mut [u8], offset: usize) -> Result<()> {
        if out.is_empty() {
            return Ok(());
        }
        let (mut pid, mut off) = self.check_span(page_id, offset, out.len())?;

        let mut cursor = 0usize;
        while cursor < out.len() {
            let c = self.ensure_resident(pid)?;
            let n = (out.len() - cursor).min(self.data_page_size - off);
            out[cursor..cursor + n].copy_from_slice(&self.cache[c].mem[off..off + n]);
            cursor += n;
            pid += 1;
            // данные непрерывны: следующая страница читается с нуля
            off = 0;
        }
        Ok(())
    }

    /// Copy `data` into the cache starting at (`page_id`, `offset`), marking slots dirty.
    /// Not durable until flush().
    pub fn write(&mut self, page_id: u64, data: &[u8], offset: usize) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let (mut pid, mut off) = self.check_span(page_id, offset, data.len())?;

        let mut cursor = 0usize;
        while cursor < data.len() {
            let c = self.ensure_resident(pid)?;
            let n = (data.len() - cursor).min(self.data_page_size - off);
            let slot = &mut self.cache[c];
            slot.mem[off..off + n].copy_from_slice(&data[cursor..cursor + n]);
            slot.updated = true;
            cursor += n;
            pid += 1;
            off = 0;
        }
        Ok(())
    }

    /// Commit every dirty slot to the device (primary, then mirror).
    /// Stops at the first failure. Dirty flags are left set.
    pub fn flush(&mut self) -> Result<()> {
        let mut written = 0u64;
        for i in 0..self.cache.len() {
            if self.cache[i].updated && self.cache[i].page_id.is_some() {
                self.write_back(i)?;
                written += 1;
            }
        }
        self.stats.flush_writes += written;
        record_flush(written);
        debug!("flush: {} dirty page(s) written", written);
        Ok(())
    }

    // ---------------- internal helpers ----------------

    /// Normalise (page, offset) and make sure the whole span fits into capacity.
    /// Returns the normalised start.
    fn check_span(&self, page_id: u64, offset: usize, len: usize) -> Result<(u64, usize)> {
        let dps = self.data_page_size as u64;
        let out_of_range = |pid: u64| NvmError::OutOfRange {
            page_id: pid,
            num_pages: self.num_pages,
        };

        let start = page_id
            .checked_add(offset as u64 / dps)
            .ok_or_else(|| out_of_range(page_id))?;
        let off = (offset as u64 % dps) as usize;
        if start >= self.num_pages {
            return Err(out_of_range(start));
        }
        let last = start
            .checked_add((off as u64 + len as u64 - 1) / dps)
            .ok_or_else(|| out_of_range(u64::MAX))?;
        if last >= self.num_pages {
            return Err(out_of_range(self.num_pages));
        }
        Ok((start, off))
    }

    /// Slot index holding `page_id`, faulting it in on a miss.
    pub(crate) fn ensure_resident(&mut self, page_id: u64) -> Result<usize> {
        if page_id >= self.num_pages {
            return Err(NvmError::OutOfRange {
                page_id,
                num_pages: self.num_pages,
            });
        }
        if let Some(c) = self.get_page_from_cache(page_id) {
            self.stats.hits += 1;
            record_cache_hit();
            self.policy.on_access(c);
            return Ok(c);
        }
        self.stats.misses += 1;
        record_cache_miss();
        self.swap_page(page_id)
    }

    /// Bring `page_id` into a victim slot.
    fn swap_page(&mut self, page_id: u64) -> Result<usize> {
        let c = self
            .policy
            .choose_victim(&self.cache)
            .ok_or(NvmError::NoEvictableSlot)?;

        if let Some(old) = self.cache[c].page_id {
            if self.cache[c].updated {
                self.write_back(c)?;
                self.stats.writebacks += 1;
                record_writeback();
            }
            self.stats.evictions += 1;
            record_cache_eviction();
            debug!("swap: slot {} evicts page {} for page {}", c, old, page_id);
        }

        self.load_page(c, page_id)?;
        let slot = &mut self.cache[c];
        slot.page_id = Some(page_id);
        slot.updated = false;
        self.policy.on_access(c);
        Ok(c)
    }

    /// Recompute checksum and write slot `c` to its primary and (if enabled) mirror location.
    pub(crate) fn write_back(&mut self, c: usize) -> Result<()> {
        let pid = match self.cache[c].page_id {
            Some(p) => p,
            None => return Ok(()),
        };
        let primary = self.primary_offset(pid);
        let mirror = if self.with_redundancy {
            Some(self.mirror_offset_bytes(pid))
        } else {
            None
        };

        let slot = &mut self.cache[c];
        page_update_checksum(&mut slot.mem);
        self.dev.write_at(primary, &slot.mem)?;
        if let Some(m) = mirror {
            self.dev.write_at(m, &slot.mem)?;
        }
        Ok(())
    }

    /// Read + verify `page_id` into slot `c`, falling back to the mirror.
    fn load_page(&mut self, c: usize, page_id: u64) -> Result<()> {
        let primary = self.primary_offset(page_id);
        let mirror = if self.with_redundancy {
            Some(self.mirror_offset_bytes(page_id))
        } else {
            None
        };

        let slot = &mut self.cache[c];
        // Буфер сейчас будет перезаписан: слот пуст до успешной загрузки.
        slot.vacate();
        slot.mem.fill(0);
        self.dev.read_at(primary, &mut slot.mem)?;
        if page_verify_checksum(&slot.mem) {
            return Ok(());
        }

        record_checksum_failure();
        let Some(mirror) = mirror else {
            record_unrecoverable();
            error!("page {}: checksum mismatch, no redundancy", page_id);
            return Err(NvmError::Corruption {
                page_id,
                mirror_checked: false,
            });
        };

        warn!("page {}: checksum mismatch on primary, trying mirror", page_id);
        slot.mem.fill(0);
        self.dev.read_at(mirror, &mut slot.mem)?;
        if !page_verify_checksum(&slot.mem) {
            record_unrecoverable();
            error!("page {}: primary and mirror both corrupted", page_id);
            return Err(NvmError::Corruption {
                page_id,
                mirror_checked: true,
            });
        }

        // Self-healing: mirror copy goes back to the primary location.
        self.dev.write_at(primary, &slot.mem)?;
        self.stats.repairs += 1;
        record_mirror_repair();
        warn!("page {}: primary repaired from mirror", page_id);
        Ok(())
    }
}
