//! tank: attribute key-value store (id 0..=255 -> byte blob) over the pager.
//!
//! - meta.rs: fixed-size metadata image (marker, bump cursor, id table).
//! - core.rs: AttrTank: open/init, set/get, bump allocation.

pub mod meta;
pub mod core;

pub use self::core::AttrTank;
pub use meta::{AttrInfo, TankMeta};
