//! Lightweight global metrics.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Page cache (hits/misses/evictions)
//! - Write-back and flush device writes
//! - Integrity (checksum failures, mirror repairs, unrecoverable pages)
//! - Attribute tank (sets, allocations)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Page cache -----
static PAGE_CACHE_HITS: AtomicU64 = AtomicU64::new(0);
static PAGE_CACHE_MISSES: AtomicU64 = AtomicU64::new(0);
static PAGE_CACHE_EVICTIONS: AtomicU64 = AtomicU64::new(0);

// ----- Device writes -----
static WRITEBACK_PAGES: AtomicU64 = AtomicU64::new(0);
static FLUSH_CALLS: AtomicU64 = AtomicU64::new(0);
static FLUSH_PAGES: AtomicU64 = AtomicU64::new(0);

// ----- Integrity -----
static CHECKSUM_FAILURES: AtomicU64 = AtomicU64::new(0);
static MIRROR_REPAIRS: AtomicU64 = AtomicU64::new(0);
static UNRECOVERABLE_PAGES: AtomicU64 = AtomicU64::new(0);

// ----- Attribute tank -----
static ATTR_SETS: AtomicU64 = AtomicU64::new(0);
static ATTR_ALLOCATIONS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    pub page_cache_hits: u64,
    pub page_cache_misses: u64,
    pub page_cache_evictions: u64,

    pub writeback_pages: u64,
    pub flush_calls: u64,
    pub flush_pages: u64,

    pub checksum_failures: u64,
    pub mirror_repairs: u64,
    pub unrecoverable_pages: u64,

    pub attr_sets: u64,
    pub attr_allocations: u64,
}

impl MetricsSnapshot {
    pub fn cache_hit_ratio(&self) -> f64 {
        let total = self.page_cache_hits + self.page_cache_misses;
        if total == 0 {
            0.0
        } else {
            self.page_cache_hits as f64 / total as f64
        }
    }
}

// ----- Recorders (Page cache) -----
pub fn record_cache_hit() {
    PAGE_CACHE_HITS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_cache_miss() {
    PAGE_CACHE_MISSES.fetch_add(1, Ordering::Relaxed);
}
pub fn record_cache_eviction() {
    PAGE_CACHE_EVICTIONS.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Device writes) -----
pub fn record_writeback() {
    WRITEBACK_PAGES.fetch_add(1, Ordering::Relaxed);
}
pub fn record_flush(pages: u64) {
    FLUSH_CALLS.fetch_add(1, Ordering::Relaxed);
    FLUSH_PAGES.fetch_add(pages, Ordering::Relaxed);
}

// ----- Recorders (Integrity) -----
pub fn record_checksum_failure() {
    CHECKSUM_FAILURES.fetch_add(1, Ordering::Relaxed);
}
pub fn record_mirror_repair() {
    MIRROR_REPAIRS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_unrecoverable() {
    UNRECOVERABLE_PAGES.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Attribute tank) -----
pub fn record_attr_set(allocated: bool) {
    ATTR_SETS.fetch_add(1, Ordering::Relaxed);
    if allocated {
        ATTR_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    }
}

/// Snapshot of all counters.
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        page_cache_hits: PAGE_CACHE_HITS.load(Ordering::Relaxed),
        page_cache_misses: PAGE_CACHE_MISSES.load(Ordering::Relaxed),
        page_cache_evictions: PAGE_CACHE_EVICTIONS.load(Ordering::Relaxed),

        writeback_pages: WRITEBACK_PAGES.load(Ordering::Relaxed),
        flush_calls: FLUSH_CALLS.load(Ordering::Relaxed),
        flush_pages: FLUSH_PAGES.load(Ordering::Relaxed),

        checksum_failures: CHECKSUM_FAILURES.load(Ordering::Relaxed),
        mirror_repairs: MIRROR_REPAIRS.load(Ordering::Relaxed),
        unrecoverable_pages: UNRECOVERABLE_PAGES.load(Ordering::Relaxed),

        attr_sets: ATTR_SETS.load(Ordering::Relaxed),
        attr_allocations: ATTR_ALLOCATIONS.load(Ordering::Relaxed),
    }
}

/// Reset all counters (tests/benches).
pub fn reset() {
    PAGE_CACHE_HITS.store(0, Ordering::Relaxed);
    PAGE_CACHE_MISSES.store(0, Ordering::Relaxed);
    PAGE_CACHE_EVICTIONS.store(0, Ordering::Relaxed);

    WRITEBACK_PAGES.store(0, Ordering::Relaxed);
    FLUSH_CALLS.store(0, Ordering::Relaxed);
    FLUSH_PAGES.store(0, Ordering::Relaxed);

    CHECKSUM_FAILURES.store(0, Ordering::Relaxed);
    MIRROR_REPAIRS.store(0, Ordering::Relaxed);
    UNRECOVERABLE_PAGES.store(0, Ordering::Relaxed);

    ATTR_SETS.store(0, Ordering::Relaxed);
    ATTR_ALLOCATIONS.store(0, Ordering::Relaxed);
}
