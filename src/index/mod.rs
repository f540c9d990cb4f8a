pub mod builder;
pub mod entry;
pub mod fuzzy;

pub use builder::{begin_build, begin_build_with, BuildStep, IndexerConfig, IndexingProgress};
pub use entry::FileEntry;
pub use fuzzy::FuzzyIndex;
