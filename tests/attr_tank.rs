use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use nvmtank::consts::META_SIZE;
use nvmtank::{AttrTank, ErrorKind, NvmError, PagerConfig, TankConfig};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("nvmtest-{prefix}-{pid}-{t}-{id}"))
}

fn tank_config(prefix: &str) -> Result<TankConfig> {
    let root = unique_root(prefix);
    fs::create_dir_all(&root)?;
    Ok(TankConfig::new(root.join("ATTR_TANK.dat")))
}

#[test]
fn first_open_initialises_metadata() -> Result<()> {
    let cfg = tank_config("init")?;
    let tank = AttrTank::open(&cfg)?;
    assert_eq!(tank.cursor(), (7, 0));
    assert_eq!(tank.meta().iter_set().count(), 0);
    assert_eq!(tank.pager().num_pages(), 25);
    assert_eq!(tank.free_bytes(), (25 - 7) * 1023);

    let raw = fs::read(&cfg.device)?;
    assert_eq!(&raw[..5], b"CODE\0");
    assert!(raw.len() >= 7 * 1024);
    assert!(META_SIZE > 6 * 1023);
    Ok(())
}

#[test]
fn attributes_are_isolated() -> Result<()> {
    let cfg = tank_config("isolation")?;
    let mut tank = AttrTank::open(&cfg)?;
    for id in 0..4u16 {
        tank.set_attribute(id, &vec![id as u8 + 0xA0; 10 + id as usize])?;
    }
    for id in 0..4u16 {
        assert_eq!(tank.get_attribute(id)?, vec![id as u8 + 0xA0; 10 + id as usize]);
    }
    assert_eq!(tank.get_attribute(4)?, Vec::<u8>::new());
    assert_eq!(tank.cursor(), (7, 10 + 11 + 12 + 13));
    Ok(())
}

#[test]
fn growth_allocates_and_shrink_reuses() -> Result<()> {
    let cfg = tank_config("growth")?;
    let mut tank = AttrTank::open(&cfg)?;

    tank.set_attribute(5, b"short")?;
    let info = tank.meta().map[5];
    assert_eq!((info.page, info.offset, info.len), (7, 0, 5));

    tank.set_attribute(5, b"a much longer value")?;
    let grown = tank.meta().map[5];
    assert_eq!((grown.page, grown.offset, grown.len), (7, 5, 19));
    assert_eq!(tank.cursor(), (7, 5 + 19));
    assert_eq!(tank.get_attribute(5)?, b"a much longer value");

    // Короче: регион и записанная длина не меняются, хвост остаётся.
    tank.set_attribute(5, b"tiny")?;
    assert_eq!(tank.meta().map[5], grown);
    assert_eq!(tank.cursor(), (7, 24));
    assert_eq!(tank.get_attribute(5)?, b"tinych longer value");

    // Снова длиннее, но в пределах записанной длины: без новой аллокации.
    tank.set_attribute(5, b"ABCDEFGHIJ")?;
    assert_eq!(tank.meta().map[5], grown);
    assert_eq!(tank.cursor(), (7, 24));
    assert_eq!(tank.get_attribute(5)?, b"ABCDEFGHIJger value");

    // Пустое значение не превращает id в "unset".
    tank.set_attribute(5, b"")?;
    assert_eq!(tank.attribute_len(5)?, 19);
    Ok(())
}

#[test]
fn shrunk_value_keeps_recorded_length_across_reopen() -> Result<()> {
    let cfg = tank_config("shrink-reopen")?;
    {
        let mut tank = AttrTank::open(&cfg)?;
        tank.set_attribute(5, b"0123456789")?;
        tank.set_attribute(5, b"abc")?;
    }
    let mut tank = AttrTank::open(&cfg)?;
    assert_eq!(tank.meta().map[5].len, 10);
    assert_eq!(tank.get_attribute(5)?, b"abc3456789");
    assert_eq!(tank.cursor(), (7, 10));

    tank.set_attribute(5, b"ABCDE")?;
    assert_eq!(tank.cursor(), (7, 10));
    assert_eq!((tank.meta().map[5].page, tank.meta().map[5].offset), (7, 0));
    assert_eq!(tank.get_attribute(5)?, b"ABCDE56789");
    Ok(())
}

#[test]
fn values_persist_across_reopen() -> Result<()> {
    let cfg = tank_config("reopen")?;
    {
        let mut tank = AttrTank::open(&cfg)?;
        tank.set_attribute(10, &[0xBC])?;
        tank.set_attribute(11, &vec![0x5A; 3000])?;
    }
    let mut tank = AttrTank::open(&cfg)?;
    assert_eq!(tank.get_attribute(10)?, vec![0xBC]);
    assert_eq!(tank.get_attribute(11)?, vec![0x5A; 3000]);
    assert_eq!(tank.cursor(), (9, 3001 - 2 * 1023));
    Ok(())
}

#[test]
fn id_out_of_range_is_rejected() -> Result<()> {
    let cfg = tank_config("badid")?;
    let mut tank = AttrTank::open(&cfg)?;
    let err = tank.set_attribute(256, b"x").unwrap_err();
    assert!(matches!(err, NvmError::AttrIdOutOfRange { id: 256, max: 255 }));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(tank.get_attribute(300).is_err());
    assert_eq!(tank.cursor(), (7, 0));
    Ok(())
}

#[test]
fn get_into_checks_buffer_size() -> Result<()> {
    let cfg = tank_config("into")?;
    let mut tank = AttrTank::open(&cfg)?;
    tank.set_attribute(1, b"hello")?;

    let mut small = [0u8; 3];
    let err = tank.get_attribute_into(1, &mut small).unwrap_err();
    assert!(matches!(err, NvmError::BufferTooSmall { need: 5, got: 3 }));

    let mut buf = [0u8; 8];
    assert_eq!(tank.get_attribute_into(1, &mut buf)?, 5);
    assert_eq!(&buf[..5], b"hello");
    assert_eq!(tank.get_attribute_into(2, &mut buf)?, 0);
    Ok(())
}

#[test]
fn allocation_past_capacity_fails() -> Result<()> {
    let cfg = tank_config("full")?;
    let mut tank = AttrTank::open(&cfg)?;
    let free = tank.free_bytes() as usize;
    let err = tank.set_attribute(0, &vec![1u8; free + 1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    Ok(())
}

#[test]
fn works_without_redundancy() -> Result<()> {
    let mut cfg = tank_config("noredund")?;
    cfg.pager = PagerConfig::default().with_redundancy(false);
    {
        let mut tank = AttrTank::open(&cfg)?;
        assert_eq!(tank.pager().num_pages(), 50);
        tank.set_attribute(200, b"plain")?;
    }
    let mut tank = AttrTank::open(&cfg)?;
    assert_eq!(tank.get_attribute(200)?, b"plain");
    Ok(())
}

#[test]
fn random_values_roundtrip() -> Result<()> {
    let cfg = tank_config("random")?;
    let mut rng = oorandom::Rand64::new(0x5EED_1234);
    let mut expected: Vec<Option<Vec<u8>>> = vec![None; 32];
    {
        let mut tank = AttrTank::open(&cfg)?;
        for _ in 0..64 {
            let id = rng.rand_range(0..32) as usize;
            let len = rng.rand_range(1..200) as usize;
            let v: Vec<u8> = (0..len).map(|_| rng.rand_u64() as u8).collect();
            if tank.free_bytes() < len as u64 {
                break;
            }
            tank.set_attribute(id as u16, &v)?;
            // Не длиннее записанного: регион прежний, хвост старого значения сохраняется.
            let stored = match expected[id].take() {
                Some(mut old) if old.len() >= v.len() => {
                    old[..v.len()].copy_from_slice(&v);
                    old
                }
                _ => v,
            };
            expected[id] = Some(stored);
        }
    }
    let mut tank = AttrTank::open(&cfg)?;
    for (id, v) in expected.iter().enumerate() {
        let got = tank.get_attribute(id as u16)?;
        match v {
            Some(v) => assert_eq!(&got, v, "attr {id}"),
            None => assert!(got.is_empty(), "attr {id}"),
        }
    }
    Ok(())
}
