//! api: one-shot attribute calls.
//!
//! Each call opens a fresh AttrTank from `TankConfig::from_env()` (device
//! NVM_DEVICE, default "ATTR_TANK.dat"), performs a single get/set and drops
//! the tank. State persists only through the device.

use crate::config::TankConfig;
use crate::error::Result;
use crate::tank::AttrTank;

/// Read attribute `id` from the default tank.
pub fn nvm_get_attribute(id: u16) -> Result<Vec<u8>> {
    let mut tank = AttrTank::open(&TankConfig::from_env())?;
    tank.get_attribute(id)
}

/// Write attribute `id` to the default tank (flushed before returning).
pub fn nvm_set_attribute(id: u16, value: &[u8]) -> Result<()> {
    let mut tank = AttrTank::open(&TankConfig::from_env())?;
    tank.set_attribute(id, value)
}
