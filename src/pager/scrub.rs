//! pager/scrub: полный проход целостности по всем логическим страницам.
//!
//! Семантика:
//! - Сначала flush(): грязные слоты попадают на устройство, иначе сравнивать нечего.
//! - Для каждого page_id ∈ [0 .. num_pages) читаем raw primary (и mirror при
//!   redundancy) напрямую с устройства, мимо кэша, и проверяем трейлеры.
//! - primary bad + mirror ok  → primary перезаписывается копией mirror;
//! - primary ok  + mirror bad → mirror перезаписывается копией primary;
//! - оба bad (или bad без redundancy) → page_id попадает в `unrecoverable`.
//! - Ошибки устройства прерывают проход.

use log::{info, warn};
use serde::Serialize;

use crate::device::BlockDevice;
use crate::error::Result;
use crate::metrics::{record_checksum_failure, record_mirror_repair, record_unrecoverable};
use crate::page::page_verify_checksum;

use super::core::Pager;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrubReport {
    pub pages_checked: u64,
    pub primary_repaired: u64,
    pub mirror_repaired: u64,
    pub unrecoverable: Vec<u64>,
}

impl ScrubReport {
    pub fn is_clean(&self) -> bool {
        self.primary_repaired == 0 && self.mirror_repaired == 0 && self.unrecoverable.is_empty()
    }
}

impl<D: BlockDevice> Pager<D> {
    /// Verify (and where possible repair) every logical page on the device.
    pub fn scrub(&mut self) -> Result<ScrubReport> {
        self.flush()?;

        let mut report = ScrubReport::default();
        let mut primary = vec![0u8; self.raw_page_size];
        let mut mirror = vec![0u8; self.raw_page_size];

        for pid in 0..self.num_pages {
            report.pages_checked += 1;

            primary.fill(0);
            self.dev.read_at(self.primary_offset(pid), &mut primary)?;
            let ok_p = page_verify_checksum(&primary);

            if !self.with_redundancy {
                if !ok_p {
                    record_checksum_failure();
                    record_unrecoverable();
                    warn!("scrub: page {} corrupted (no redundancy)", pid);
                    report.unrecoverable.push(pid);
                }
                continue;
            }

            mirror.fill(0);
            let moff = self.mirror_offset_bytes(pid);
            self.dev.read_at(moff, &mut mirror)?;
            let ok_m = page_verify_checksum(&mirror);

            match (ok_p, ok_m) {
                (true, true) => {}
                (false, true) => {
                    record_checksum_failure();
                    self.dev.write_at(self.primary_offset(pid), &mirror)?;
                    self.stats.repairs += 1;
                    record_mirror_repair();
                    warn!("scrub: page {} primary repaired from mirror", pid);
                    report.primary_repaired += 1;
                }
                (true, false) => {
                    record_checksum_failure();
                    self.dev.write_at(moff, &primary)?;
                    self.stats.repairs += 1;
                    warn!("scrub: page {} mirror rewritten from primary", pid);
                    report.mirror_repaired += 1;
                }
                (false, false) => {
                    record_checksum_failure();
                    record_unrecoverable();
                    warn!("scrub: page {} primary and mirror corrupted", pid);
                    report.unrecoverable.push(pid);
                }
            }
        }

        info!(
            "scrub: checked={}, primary_repaired={}, mirror_repaired={}, unrecoverable={}",
            report.pages_checked,
            report.primary_repaired,
            report.mirror_repaired,
            report.unrecoverable.len()
        );
        Ok(report)
    }
}
