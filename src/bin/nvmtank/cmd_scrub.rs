use anyhow::Result;

use nvmtank::{AttrTank, TankConfig};

pub fn exec(cfg: TankConfig, json: bool) -> Result<()> {
    let mut tank = AttrTank::open(&cfg)?;
    let report = tank.pager_mut().scrub()?;

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("pages checked:     {}", report.pages_checked);
        println!("primary repaired:  {}", report.primary_repaired);
        println!("mirror repaired:   {}", report.mirror_repaired);
        if report.unrecoverable.is_empty() {
            println!("unrecoverable:     none");
        } else {
            println!("unrecoverable:     {:?}", report.unrecoverable);
        }
    }

    if !report.unrecoverable.is_empty() {
        anyhow::bail!("{} unrecoverable page(s)", report.unrecoverable.len());
    }
    Ok(())
}
