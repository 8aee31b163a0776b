use anyhow::Result;
use serde::Serialize;

use nvmtank::{metrics, AttrInfo, AttrTank, TankConfig};

#[derive(Serialize)]
struct AttrRow {
    id: usize,
    #[serde(flatten)]
    info: AttrInfo,
}

#[derive(Serialize)]
struct Status {
    device: String,
    raw_page_size: usize,
    page_size: usize,
    logical_pages: u64,
    mirror_offset: u64,
    redundancy: bool,
    cache_size: usize,
    eviction: &'static str,
    cursor_page: u64,
    cursor_offset: u64,
    free_bytes: u64,
    attributes: Vec<AttrRow>,
    metrics: metrics::MetricsSnapshot,
}

pub fn exec(cfg: TankConfig, json: bool) -> Result<()> {
    let tank = AttrTank::open(&cfg)?;
    let pager = tank.pager();
    let (cursor_page, cursor_offset) = tank.cursor();

    let st = Status {
        device: cfg.device.display().to_string(),
        raw_page_size: pager.raw_page_size(),
        page_size: pager.page_size(),
        logical_pages: pager.num_pages(),
        mirror_offset: pager.mirror_offset(),
        redundancy: pager.redundancy(),
        cache_size: pager.cache_size(),
        eviction: pager.eviction_policy(),
        cursor_page,
        cursor_offset,
        free_bytes: tank.free_bytes(),
        attributes: tank
            .meta()
            .iter_set()
            .map(|(id, info)| AttrRow { id, info: *info })
            .collect(),
        metrics: metrics::snapshot(),
    };

    if json {
        println!("{}", serde_json::to_string(&st)?);
        return Ok(());
    }

    println!("device:        {}", st.device);
    println!(
        "geometry:      raw_page_size={} page_size={} logical_pages={} mirror_offset={}",
        st.raw_page_size, st.page_size, st.logical_pages, st.mirror_offset
    );
    println!(
        "cache:         slots={} eviction={} redundancy={}",
        st.cache_size, st.eviction, st.redundancy
    );
    println!(
        "cursor:        page={} offset={} free={} B",
        st.cursor_page, st.cursor_offset, st.free_bytes
    );
    println!("attributes:    {}", st.attributes.len());
    for r in &st.attributes {
        println!(
            "  [{:>3}] len={} page={} offset={}",
            r.id, r.info.len, r.info.page, r.info.offset
        );
    }
    Ok(())
}
