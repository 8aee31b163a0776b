//! nvmtank: paged NVM storage engine and attribute store.
//!
//! Layers (leaves first):
//! - device: byte-addressable device shim (reopened per call);
//! - page  : raw page framing with a 1-byte additive checksum;
//! - pager : logical paging, write-back cache, mirror recovery, scrub;
//! - tank  : attribute store (bump allocator) built on the pager.

// Базовые модули
pub mod consts;
pub mod error;
pub mod config;
pub mod metrics;

pub mod device;
pub mod page;
pub mod pager;
pub mod tank;

// One-shot attribute API
pub mod api;

// Удобные реэкспорты
pub use api::{nvm_get_attribute, nvm_set_attribute};
pub use config::{PagerConfig, TankConfig};
pub use device::{BlockDevice, FileDevice};
pub use error::{ErrorKind, NvmError, Result};
pub use pager::{EvictionKind, EvictionPolicy, Pager, PagerStats, ScrubReport};
pub use tank::{AttrInfo, AttrTank, TankMeta};
