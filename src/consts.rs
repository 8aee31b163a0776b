//! Общие константы форматов (device defaults, page framing, tank metadata).

// -------- Device defaults (attribute tank) --------
pub const DEFAULT_DEVICE: &str = "ATTR_TANK.dat";
pub const DEFAULT_PAGE_SIZE: usize = 1024;
pub const DEFAULT_NUM_PAGES: u64 = 50;
pub const DEFAULT_CACHE_SIZE: usize = 2;

// -------- Page framing --------
// Raw page: [data bytes][checksum u8]. Checksum = additive sum mod 256 of data bytes.
pub const CHECKSUM_SIZE: usize = 1;

// -------- Tank metadata (page 0..) --------
pub const MAX_ATTRIBUTES: usize = 256;
/// Маркер инициализации, хранится как 5 байт ("CODE" + NUL).
pub const META_MAGIC: &[u8; 5] = b"CODE\0";
/// [magic5][pad3][current_page u64][current_offset u64]
pub const META_HDR_SIZE: usize = 24;
/// [len u64][page u64][offset u64]
pub const META_ENTRY_SIZE: usize = 24;
pub const META_SIZE: usize = META_HDR_SIZE + MAX_ATTRIBUTES * META_ENTRY_SIZE;

// Offsets inside the metadata header
pub const META_OFF_MAGIC: usize = 0;
pub const META_OFF_CUR_PAGE: usize = 8;
pub const META_OFF_CUR_OFFSET: usize = 16;

// -------- Env --------
pub const ENV_DEVICE: &str = "NVM_DEVICE";
pub const ENV_PAGE_SIZE: &str = "NVM_PAGE_SIZE";
pub const ENV_NUM_PAGES: &str = "NVM_NUM_PAGES";
pub const ENV_CACHE_SIZE: &str = "NVM_CACHE_SIZE";
pub const ENV_REDUNDANCY: &str = "NVM_REDUNDANCY";
pub const ENV_EVICTION: &str = "NVM_EVICTION";
