//! Value parsing and page-addressed dumps for the CLI.

use anyhow::{bail, Context, Result};

/// Parse `--value`: `hex:<digits>` (byte pairs may be split by ' ', ':' or '_')
/// or plain UTF-8 text.
pub fn parse_value(arg: &str) -> Result<Vec<u8>> {
    match arg.strip_prefix("hex:") {
        Some(hx) => parse_hex(hx),
        None => Ok(arg.as_bytes().to_vec()),
    }
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let digits: String = s.chars().filter(|c| !matches!(c, ' ' | ':' | '_')).collect();
    if !digits.is_ascii() {
        bail!("hex value contains non-ASCII characters");
    }
    if digits.len() % 2 != 0 {
        bail!("hex value has an odd number of digits ({})", digits.len());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = &digits[i..i + 2];
            u8::from_str_radix(pair, 16).with_context(|| format!("bad hex byte '{}'", pair))
        })
        .collect()
}

/// Text form of a value when every char is printable.
pub fn printable(bytes: &[u8]) -> Option<&str> {
    let s = std::str::from_utf8(bytes).ok()?;
    if s.chars().all(|c| !c.is_control() || c == '\n' || c == '\t') {
        Some(s)
    } else {
        None
    }
}

/// Hex lines of `bytes` stored from logical (`page`, `offset`), 16 bytes per
/// line and never across a page boundary. Each line starts with `page+offset`.
pub fn region_lines(bytes: &[u8], page: u64, offset: usize, page_size: usize) -> Vec<String> {
    let mut page = page + (offset / page_size) as u64;
    let mut off = offset % page_size;
    let mut rest = bytes;
    let mut out = Vec::new();
    while !rest.is_empty() {
        let n = rest.len().min(16).min(page_size - off);
        let (chunk, tail) = rest.split_at(n);
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        out.push(format!("{:>4}+{:<4} {}", page, off, hex.join(" ")));
        rest = tail;
        off += n;
        if off == page_size {
            page += 1;
            off = 0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_forms() {
        assert_eq!(parse_value("abc").unwrap(), b"abc".to_vec());
        assert_eq!(parse_value("hex:bc").unwrap(), vec![0xBC]);
        assert_eq!(parse_value("hex:de:ad_be ef").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(parse_value("hex:abc").is_err());
        assert!(parse_value("hex:zz").is_err());
        assert!(parse_value("hex:éé").is_err());
    }

    #[test]
    fn printable_rejects_control_bytes() {
        assert_eq!(printable(b"ABAB"), Some("ABAB"));
        assert_eq!(printable(b"ABAB\0"), None);
        assert_eq!(printable(&[0xFF]), None);
    }

    #[test]
    fn region_lines_split_at_page_boundary() {
        // 7 data bytes per page, value starts at (2, 5)
        let lines = region_lines(&[1, 2, 3, 4, 5], 2, 5, 7);
        assert_eq!(lines, vec!["   2+5    01 02", "   3+0    03 04 05"]);

        // offset past the page is carried
        let lines = region_lines(&[0xAA], 0, 9, 7);
        assert_eq!(lines, vec!["   1+2    aa"]);

        assert_eq!(region_lines(&[0u8; 20], 0, 0, 1023).len(), 2);
    }
}
