// src/tank/meta.rs: метаданные attribute tank (логическая страница 0..)
//
// Формат (LE), фиксированный размер META_SIZE = 6168 байт:
// [magic5 = "CODE\0"][pad3]
// u64 current_page   : курсор bump-аллокатора: страница
// u64 current_offset : курсор: смещение внутри страницы
// 256 × { u64 len, u64 page, u64 offset }: таблица attr_id -> регион
//
// Образ занимает 1 + META_SIZE / page_size() первых логических страниц;
// первая свободная страница для данных идёт сразу за ним.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::consts::{
    MAX_ATTRIBUTES, META_ENTRY_SIZE, META_HDR_SIZE, META_MAGIC, META_OFF_CUR_OFFSET,
    META_OFF_CUR_PAGE, META_OFF_MAGIC, META_SIZE,
};

/// Where an attribute's bytes live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttrInfo {
    pub len: u64,
    pub page: u64,
    pub offset: u64,
}

impl AttrInfo {
    #[inline]
    pub fn is_set(&self) -> bool {
        self.len > 0
    }
}

/// In-memory mirror of the metadata region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TankMeta {
    pub current_page: u64,
    pub current_offset: u64,
    pub map: [AttrInfo; MAX_ATTRIBUTES],
}

impl TankMeta {
    /// Fresh metadata: empty table, cursor at `first_free_page`.
    pub fn fresh(first_free_page: u64) -> Self {
        Self {
            current_page: first_free_page,
            current_offset: 0,
            map: [AttrInfo::default(); MAX_ATTRIBUTES],
        }
    }

    /// First logical page after the metadata region for a given data page size.
    #[inline]
    pub fn first_free_page(data_page_size: usize) -> u64 {
        1 + (META_SIZE / data_page_size) as u64
    }

    /// Serialize into a fixed-size image.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; META_SIZE];
        buf[..META_HDR_SIZE].copy_from_slice(&self.encode_header());
        for (i, e) in self.map.iter().enumerate() {
            let off = Self::entry_offset(i);
            buf[off..off + META_ENTRY_SIZE].copy_from_slice(&encode_entry(e));
        }
        buf
    }

    /// Parse an image. None if the magic marker is absent (uninitialised device).
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < META_SIZE {
            return None;
        }
        if &buf[META_OFF_MAGIC..META_OFF_MAGIC + META_MAGIC.len()] != META_MAGIC {
            return None;
        }
        let mut m = Self::fresh(0);
        m.current_page = LittleEndian::read_u64(&buf[META_OFF_CUR_PAGE..META_OFF_CUR_PAGE + 8]);
        m.current_offset =
            LittleEndian::read_u64(&buf[META_OFF_CUR_OFFSET..META_OFF_CUR_OFFSET + 8]);
        for (i, e) in m.map.iter_mut().enumerate() {
            let off = Self::entry_offset(i);
            *e = decode_entry(&buf[off..off + META_ENTRY_SIZE]);
        }
        Some(m)
    }

    /// Header bytes: magic + cursor.
    pub fn encode_header(&self) -> [u8; META_HDR_SIZE] {
        let mut h = [0u8; META_HDR_SIZE];
        h[META_OFF_MAGIC..META_OFF_MAGIC + META_MAGIC.len()].copy_from_slice(META_MAGIC);
        LittleEndian::write_u64(&mut h[META_OFF_CUR_PAGE..META_OFF_CUR_PAGE + 8], self.current_page);
        LittleEndian::write_u64(
            &mut h[META_OFF_CUR_OFFSET..META_OFF_CUR_OFFSET + 8],
            self.current_offset,
        );
        h
    }

    /// Bytes of one table entry.
    pub fn encode_entry_at(&self, idx: usize) -> [u8; META_ENTRY_SIZE] {
        encode_entry(&self.map[idx])
    }

    /// Byte offset of table entry `idx` inside the image.
    #[inline]
    pub fn entry_offset(idx: usize) -> usize {
        META_HDR_SIZE + idx * META_ENTRY_SIZE
    }

    /// Advance the bump cursor by `len` bytes, wrapping into following pages.
    pub fn advance(&mut self, len: u64, data_page_size: usize) {
        let dps = data_page_size as u64;
        let abs = self.current_page * dps + self.current_offset + len;
        self.current_page = abs / dps;
        self.current_offset = abs % dps;
    }

    /// Iterate over set attributes.
    pub fn iter_set(&self) -> impl Iterator<Item = (usize, &AttrInfo)> {
        self.map.iter().enumerate().filter(|(_, e)| e.is_set())
    }
}

fn encode_entry(e: &AttrInfo) -> [u8; META_ENTRY_SIZE] {
    let mut b = [0u8; META_ENTRY_SIZE];
    LittleEndian::write_u64(&mut b[0..8], e.len);
    LittleEndian::write_u64(&mut b[8..16], e.page);
    LittleEndian::write_u64(&mut b[16..24], e.offset);
    b
}

fn decode_entry(b: &[u8]) -> AttrInfo {
    AttrInfo {
        len: LittleEndian::read_u64(&b[0..8]),
        page: LittleEndian::read_u64(&b[8..16]),
        offset: LittleEndian::read_u64(&b[16..24]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_size_and_first_free_page() {
        assert_eq!(META_SIZE, 6168);
        // 1023 usable bytes per page -> metadata covers pages 0..=6
        assert_eq!(TankMeta::first_free_page(1023), 7);
        assert_eq!(TankMeta::fresh(7).encode().len(), META_SIZE);
    }

    #[test]
    fn zeroed_image_has_no_magic() {
        assert!(TankMeta::decode(&vec![0u8; META_SIZE]).is_none());
        assert!(TankMeta::decode(&[0u8; 8]).is_none());
    }

    #[test]
    fn decode_restores_cursor_and_entries() {
        let mut m = TankMeta::fresh(7);
        m.map[10] = AttrInfo { len: 1, page: 7, offset: 0 };
        m.map[255] = AttrInfo { len: 40, page: 9, offset: 1000 };
        m.advance(41, 1023);
        let img = m.encode();
        assert_eq!(&img[0..5], b"CODE\0");
        let back = TankMeta::decode(&img).expect("magic present");
        assert_eq!(back, m);
        assert_eq!(back.iter_set().map(|(i, _)| i).collect::<Vec<_>>(), vec![10, 255]);
    }

    #[test]
    fn header_and_entry_slices_match_full_image() {
        let mut m = TankMeta::fresh(3);
        m.map[2] = AttrInfo { len: 5, page: 3, offset: 11 };
        let img = m.encode();
        assert_eq!(&img[..META_HDR_SIZE], &m.encode_header()[..]);
        let off = TankMeta::entry_offset(2);
        assert_eq!(&img[off..off + META_ENTRY_SIZE], &m.encode_entry_at(2)[..]);
    }

    #[test]
    fn cursor_wraps_into_next_pages() {
        let mut m = TankMeta::fresh(7);
        m.current_offset = 1020;
        m.advance(5, 1023);
        assert_eq!((m.current_page, m.current_offset), (8, 2));
        m.advance(2046, 1023);
        assert_eq!((m.current_page, m.current_offset), (10, 2));
    }
}
