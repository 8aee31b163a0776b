use anyhow::Result;

use nvmtank::{AttrTank, TankConfig};

use super::util::parse_value;

pub fn exec(cfg: TankConfig, id: u16, value: String) -> Result<()> {
    let bytes = parse_value(&value)?;
    let mut tank = AttrTank::open(&cfg)?;
    let before = tank.cursor();
    tank.set_attribute(id, &bytes)?;
    let info = tank.meta().map[id as usize];
    println!(
        "attr {}: wrote {} B at page {} offset {} ({}, recorded len {})",
        id,
        bytes.len(),
        info.page,
        info.offset,
        if before != tank.cursor() { "new region" } else { "region reused" },
        info.len
    );
    Ok(())
}
