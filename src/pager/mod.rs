//! pager: слой управления страницами поверх сырого устройства.
//!
//! Подмодули:
//! - core.rs : структура Pager, конструкторы, геометрия (primary/mirror offsets), счётчики.
//! - cache.rs: слоты кэша и сменная политика вытеснения (FirstFit / Lru).
//! - io.rs   : fault-in с write-back, read/write через границы страниц, flush.
//! - scrub.rs: проход целостности с восстановлением primary/mirror.

pub mod core;
pub mod cache;
pub mod io;
pub mod scrub;

// Re-exports для внешнего API
pub use self::core::{Pager, PagerStats};
pub use cache::{CacheSlot, EvictionKind, EvictionPolicy, FirstFit, Lru};
pub use scrub::ScrubReport;
