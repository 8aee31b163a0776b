//! tank/core: AttrTank: bump-allocated attribute storage on top of Pager.
//!
//! Политика:
//! - Открытие читает образ метаданных с логической страницы 0. Нет маркера -
//!   первая инициализация: курсор сразу за регионом метаданных, таблица пуста,
//!   образ пишется целиком и flush'ится.
//! - set: если записанная длина меньше новой: под значение выделяется новый
//!   регион в позиции курсора, курсор сдвигается, старый регион брошен навсегда.
//!   Иначе регион переиспользуется как есть: запись в таблице не меняется,
//!   get отдаёт прежнюю длину, хвост старого значения остаётся на устройстве.
//!   Затем запись значения и немедленный flush (без батчинга).
//! - Метаданные, записанные до ошибки, не откатываются.

use log::{debug, info};

use crate::config::TankConfig;
use crate::consts::{MAX_ATTRIBUTES, META_SIZE};
use crate::device::{BlockDevice, FileDevice};
use crate::error::{NvmError, Result};
use crate::metrics::record_attr_set;
use crate::pager::Pager;

use super::meta::{AttrInfo, TankMeta};

pub struct AttrTank<D: BlockDevice = FileDevice> {
    meta: TankMeta,
    pager: Pager<D>,
}

impl AttrTank<FileDevice> {
    /// Open (or initialise) the tank on the configured device file.
    pub fn open(cfg: &TankConfig) -> Result<Self> {
        let dev = FileDevice::create(&cfg.device)?;
        Self::with_device(dev, cfg)
    }

    /// Open with env-derived configuration (NVM_DEVICE etc).
    pub fn open_default() -> Result<Self> {
        Self::open(&TankConfig::from_env())
    }
}

impl<D: BlockDevice> AttrTank<D> {
    pub fn with_device(dev: D, cfg: &TankConfig) -> Result<Self> {
        let mut pager = Pager::with_config(dev, &cfg.pager)?;

        let mut img = vec![0u8; META_SIZE];
        pager.read_into(0, &mut img, 0)?;

        let meta = match TankMeta::decode(&img) {
            Some(m) => {
                debug!(
                    "tank open: {} attribute(s), cursor=({}, {})",
                    m.iter_set().count(),
                    m.current_page,
                    m.current_offset
                );
                m
            }
            None => {
                let m = TankMeta::fresh(TankMeta::first_free_page(pager.page_size()));
                pager.write(0, &m.encode(), 0)?;
                pager.flush()?;
                info!(
                    "tank init on {}: metadata {} B, first data page {}",
                    pager.device().name(),
                    META_SIZE,
                    m.current_page
                );
                m
            }
        };

        Ok(Self { meta, pager })
    }

    /// Store `value` under `id`.
    pub fn set_attribute(&mut self, id: u16, value: &[u8]) -> Result<()> {
        let idx = check_id(id)?;
        let len = value.len() as u64;
        let cur = self.meta.map[idx];

        let mut allocated = false;
        if cur.len < len {
            // Новый регион по курсору; прежний (если был) больше не адресуется.
            self.meta.map[idx] = AttrInfo {
                len,
                page: self.meta.current_page,
                offset: self.meta.current_offset,
            };
            self.meta.advance(len, self.pager.page_size());
            self.persist_entry(idx)?;
            allocated = true;
            debug!(
                "attr {}: allocated {} B at ({}, {}), cursor=({}, {})",
                id,
                len,
                self.meta.map[idx].page,
                self.meta.map[idx].offset,
                self.meta.current_page,
                self.meta.current_offset
            );
        }

        let info = self.meta.map[idx];
        self.pager.write(info.page, value, info.offset as usize)?;
        // TODO: batch commits across several set_attribute calls to cut write cycles
        self.pager.flush()?;
        record_attr_set(allocated);
        Ok(())
    }

    /// Bytes stored under `id` (empty if never set).
    pub fn get_attribute(&mut self, id: u16) -> Result<Vec<u8>> {
        let idx = check_id(id)?;
        let info = self.meta.map[idx];
        if !info.is_set() {
            return Ok(Vec::new());
        }
        self.pager.read(info.page, info.len as usize, info.offset as usize)
    }

    /// Copy the value of `id` into `out`, returning its length.
    pub fn get_attribute_into(&mut self, id: u16, out: &mut [u8]) -> Result<usize> {
        let idx = check_id(id)?;
        let info = self.meta.map[idx];
        let len = info.len as usize;
        if out.len() < len {
            return Err(NvmError::BufferTooSmall {
                need: len,
                got: out.len(),
            });
        }
        self.pager
            .read_into(info.page, &mut out[..len], info.offset as usize)?;
        Ok(len)
    }

    /// Recorded length of `id` (0 = unset).
    pub fn attribute_len(&self, id: u16) -> Result<usize> {
        let idx = check_id(id)?;
        Ok(self.meta.map[idx].len as usize)
    }

    /// Bump cursor as (page, offset).
    pub fn cursor(&self) -> (u64, u64) {
        (self.meta.current_page, self.meta.current_offset)
    }

    /// Bytes still available to the bump allocator.
    pub fn free_bytes(&self) -> u64 {
        let dps = self.pager.page_size() as u64;
        let used = self.meta.current_page * dps + self.meta.current_offset;
        self.pager.capacity_bytes().saturating_sub(used)
    }

    pub fn meta(&self) -> &TankMeta {
        &self.meta
    }

    pub fn pager(&self) -> &Pager<D> {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager<D> {
        &mut self.pager
    }

    // ---------------- internal helpers ----------------

    /// Re-sync header and one table entry into the metadata region.
    fn persist_entry(&mut self, idx: usize) -> Result<()> {
        let hdr = self.meta.encode_header();
        self.pager.write(0, &hdr, 0)?;
        let entry = self.meta.encode_entry_at(idx);
        self.pager.write(0, &entry, TankMeta::entry_offset(idx))
    }
}

#[inline]
fn check_id(id: u16) -> Result<usize> {
    let idx = id as usize;
    if idx >= MAX_ATTRIBUTES {
        return Err(NvmError::AttrIdOutOfRange {
            id: id as u32,
            max: (MAX_ATTRIBUTES - 1) as u32,
        });
    }
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_bounds() {
        assert_eq!(check_id(0).unwrap(), 0);
        assert_eq!(check_id(255).unwrap(), 255);
        let err = check_id(256).unwrap_err();
        assert!(matches!(err, NvmError::AttrIdOutOfRange { id: 256, max: 255 }));
    }
}
