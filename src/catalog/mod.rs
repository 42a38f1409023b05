pub mod error;
pub mod memory;
pub mod repository;
pub mod seed;
pub mod storage;
pub mod types;

pub use error::CatalogError;
pub use memory::RangeCatalog;
pub use repository::RangeRepository;
pub use seed::standard_ranges;
pub use storage::{get_catalog_path, load_catalog, save_catalog, CatalogSnapshot};
pub use types::{normalize_type, NewRange, RangeBounds, RangeId, ScoreRange};
