use anyhow::Result;

use nvmtank::page::checksum8;
use nvmtank::{AttrTank, TankConfig};

use super::util::region_lines;

pub fn exec(cfg: TankConfig, page: u64) -> Result<()> {
    let mut tank = AttrTank::open(&cfg)?;
    let pager = tank.pager_mut();
    let ps = pager.page_size();
    let data = pager.read(page, ps, 0)?;
    println!("page {}: {} B data, checksum {:02x}", page, ps, checksum8(&data));
    for line in region_lines(&data, page, 0, ps) {
        println!("{}", line);
    }
    Ok(())
}
