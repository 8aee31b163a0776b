//! page/checksum: однобайтовый трейлер страницы.
//!
//! Raw page = [data: page_size - 1 bytes][checksum: 1 byte].
//! checksum = additive 8-bit sum (mod 256) of the data bytes only; the
//! trailer byte itself never contributes. An all-zero page is valid
//! (sum 0, trailer 0), so never-written regions of a sparse device read clean.

use crate::consts::CHECKSUM_SIZE;

/// Additive 8-bit sum of `bytes` (wrapping).
#[inline]
pub fn checksum8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Length of the data region of a raw page buffer.
#[inline]
pub fn data_len(raw: &[u8]) -> usize {
    raw.len().saturating_sub(CHECKSUM_SIZE)
}

/// Recompute the trailer over the data region and store it.
pub fn page_update_checksum(raw: &mut [u8]) {
    let n = data_len(raw);
    if raw.len() < CHECKSUM_SIZE {
        return;
    }
    raw[n] = checksum8(&raw[..n]);
}

/// Stored trailer byte.
#[inline]
pub fn page_stored_checksum(raw: &[u8]) -> Option<u8> {
    raw.last().copied()
}

/// true = trailer matches the data region.
pub fn page_verify_checksum(raw: &[u8]) -> bool {
    match page_stored_checksum(raw) {
        Some(stored) => checksum8(&raw[..data_len(raw)]) == stored,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_wraps_mod_256() {
        assert_eq!(checksum8(&[]), 0);
        assert_eq!(checksum8(&[1, 2, 3]), 6);
        assert_eq!(checksum8(&[0xFF, 0x02]), 0x01);
        assert_eq!(checksum8(&[0x80; 4]), 0x00);
    }

    #[test]
    fn zero_page_is_valid() {
        let raw = vec![0u8; 16];
        assert!(page_verify_checksum(&raw));
    }

    #[test]
    fn update_then_flip_data_is_detected() {
        let mut raw = vec![0u8; 8];
        raw[..4].copy_from_slice(b"CODE");
        page_update_checksum(&mut raw);
        assert_eq!(raw[7], checksum8(b"CODE"));
        assert!(page_verify_checksum(&raw));

        raw[0] = b'B';
        assert!(!page_verify_checksum(&raw));
    }

    #[test]
    fn trailer_excluded_from_sum() {
        let mut raw = vec![5u8; 4];
        page_update_checksum(&mut raw);
        assert_eq!(raw[3], 15);
        // Пересчёт не должен зависеть от текущего значения трейлера
        raw[3] = 0xAA;
        page_update_checksum(&mut raw);
        assert_eq!(raw[3], 15);
    }
}
