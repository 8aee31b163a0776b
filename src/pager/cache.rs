//! pager/cache: cache slot arena and pluggable slot replacement.
//!
//! Slots live in a Vec owned by the Pager and sized once at construction.
//! A slot holds one raw page image (data + checksum trailer), the resident
//! logical page id (None = empty), a dirty flag (`updated`) and a pin flag
//! (`keep`). Pinning is reserved: nothing in the pager sets it, so every slot
//! is always evictable.
//!
//! Policies:
//! - FirstFit: first unpinned slot in scan order. With no pins this is always
//!   slot 0, i.e. a fixed victim rather than a usage-aware policy.
//! - Lru: an empty slot if any, otherwise the unpinned slot touched least
//!   recently (stamp per slot, bumped on every hit/load).

/// One cache slot.
#[derive(Debug)]
pub struct CacheSlot {
    pub(crate) keep: bool,
    pub(crate) page_id: Option<u64>,
    pub(crate) updated: bool,
    pub(crate) mem: Box<[u8]>,
}

impl CacheSlot {
    pub(crate) fn new(raw_page_size: usize) -> Self {
        Self {
            keep: false,
            page_id: None,
            updated: false,
            mem: vec![0u8; raw_page_size].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.keep
    }

    #[inline]
    pub fn page_id(&self) -> Option<u64> {
        self.page_id
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.page_id.is_none()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.updated
    }

    /// Forget the resident page (buffer contents are about to be replaced).
    pub(crate) fn vacate(&mut self) {
        self.page_id = None;
        self.updated = false;
    }
}

/// Slot replacement strategy used on cache misses.
pub trait EvictionPolicy {
    fn name(&self) -> &'static str;

    /// Called on every hit and after every successful fault-in.
    fn on_access(&mut self, _slot: usize) {}

    /// Pick the slot to reuse. None means nothing is evictable.
    fn choose_victim(&mut self, slots: &[CacheSlot]) -> Option<usize>;
}

/// First unpinned slot wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstFit;

impl EvictionPolicy for FirstFit {
    fn name(&self) -> &'static str {
        "first-fit"
    }

    fn choose_victim(&mut self, slots: &[CacheSlot]) -> Option<usize> {
        slots.iter().position(|s| !s.is_pinned())
    }
}

/// Least-recently-used over a fixed slot count.
#[derive(Debug, Clone)]
pub struct Lru {
    stamps: Vec<u64>,
    tick: u64,
}

impl Lru {
    pub fn new(slots: usize) -> Self {
        Self {
            stamps: vec![0; slots],
            tick: 0,
        }
    }
}

impl EvictionPolicy for Lru {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn on_access(&mut self, slot: usize) {
        self.tick += 1;
        if let Some(s) = self.stamps.get_mut(slot) {
            *s = self.tick;
        }
    }

    fn choose_victim(&mut self, slots: &[CacheSlot]) -> Option<usize> {
        if let Some(i) = slots.iter().position(|s| s.is_empty() && !s.is_pinned()) {
            return Some(i);
        }
        slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_pinned())
            .min_by_key(|(i, _)| self.stamps.get(*i).copied().unwrap_or(0))
            .map(|(i, _)| i)
    }
}

/// Config-level policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionKind {
    #[default]
    FirstFit,
    Lru,
}

impl EvictionKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-fit" | "firstfit" | "first" => Some(Self::FirstFit),
            "lru" => Some(Self::Lru),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstFit => "first-fit",
            Self::Lru => "lru",
        }
    }

    /// Instantiate the policy for `slots` cache slots.
    pub fn build(&self, slots: usize) -> Box<dyn EvictionPolicy> {
        match self {
            Self::FirstFit => Box::new(FirstFit),
            Self::Lru => Box::new(Lru::new(slots)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(n: usize) -> Vec<CacheSlot> {
        (0..n).map(|_| CacheSlot::new(8)).collect()
    }

    #[test]
    fn first_fit_always_picks_first_unpinned() {
        let mut s = slots(3);
        let mut p = FirstFit;
        assert_eq!(p.choose_victim(&s), Some(0));
        s[0].page_id = Some(4);
        s[1].page_id = Some(5);
        assert_eq!(p.choose_victim(&s), Some(0));
        s[0].keep = true;
        assert_eq!(p.choose_victim(&s), Some(1));
    }

    #[test]
    fn all_pinned_has_no_victim() {
        let mut s = slots(2);
        s.iter_mut().for_each(|x| x.keep = true);
        assert_eq!(FirstFit.choose_victim(&s), None);
        assert_eq!(Lru::new(2).choose_victim(&s), None);
    }

    #[test]
    fn lru_prefers_empty_then_oldest() {
        let mut s = slots(3);
        let mut p = Lru::new(3);

        s[0].page_id = Some(1);
        p.on_access(0);
        assert_eq!(p.choose_victim(&s), Some(1));

        s[1].page_id = Some(2);
        p.on_access(1);
        s[2].page_id = Some(3);
        p.on_access(2);

        // 0 is oldest
        assert_eq!(p.choose_victim(&s), Some(0));
        p.on_access(0);
        assert_eq!(p.choose_victim(&s), Some(1));
    }

    #[test]
    fn kind_parse_roundtrip() {
        assert_eq!(EvictionKind::parse("LRU"), Some(EvictionKind::Lru));
        assert_eq!(EvictionKind::parse(" first-fit "), Some(EvictionKind::FirstFit));
        assert_eq!(EvictionKind::parse("clock"), None);
        assert_eq!(EvictionKind::Lru.build(4).name(), "lru");
    }
}
