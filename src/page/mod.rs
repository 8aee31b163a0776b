//! page: raw page framing: data region followed by a 1-byte checksum trailer.
//!
//! - checksum.rs: additive 8-bit sum, update/verify helpers.

pub mod checksum;

pub use checksum::{
    checksum8, data_len, page_stored_checksum, page_update_checksum, page_verify_checksum,
};
