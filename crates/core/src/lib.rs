pub mod candidate;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod format;
pub mod ranker;
pub mod resolver;
pub mod scraper;
pub mod store;
pub mod text;

pub use candidate::{Candidate, CandidateSet, QualityFlags};
pub use classifier::{MetadataClassifier, ParsedMetadata};
pub use config::{
    load_settings, load_settings_from_str, ConfigError, DebridService, IndexerManagerKind,
    Settings, UserConfig,
};
pub use engine::{cache_fingerprint, Aggregation, Aggregator, EngineError};
pub use ranker::{RankedBucket, SortPolicy};
pub use scraper::{MediaRequest, MediaType, RawResult, ScrapeError};
pub use store::{SqliteStore, StoreError, TorrentStore};
