use anyhow::{Context, Result};
use std::path::PathBuf;

use nvmtank::{AttrTank, TankConfig};

use super::util::{printable, region_lines};

pub fn exec(cfg: TankConfig, id: u16, out: Option<PathBuf>) -> Result<()> {
    let mut tank = AttrTank::open(&cfg)?;
    if tank.attribute_len(id)? == 0 {
        println!("attr {}: unset", id);
        return Ok(());
    }

    let info = tank.meta().map[id as usize];
    let value = tank.get_attribute(id)?;
    println!(
        "attr {}: {} B at page {} offset {}",
        id, info.len, info.page, info.offset
    );

    if let Some(path) = out {
        std::fs::write(&path, &value)
            .with_context(|| format!("write attr {} to {}", id, path.display()))?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    if let Some(text) = printable(&value) {
        println!("text: {}", text);
    }
    let ps = tank.pager().page_size();
    for line in region_lines(&value, info.page, info.offset as usize, ps) {
        println!("{}", line);
    }
    Ok(())
}
