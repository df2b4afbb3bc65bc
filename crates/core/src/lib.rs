pub mod catalog;
pub mod config;
pub mod index;
pub mod metrics;
pub mod remote;
pub mod search;
pub mod testing;

pub use catalog::{
    load_catalog_file, CatalogEntity, CatalogError, CatalogSnapshot, CatalogStore, EntityKind,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, RemoteBackend,
    SanitizedConfig,
};
pub use index::{FuzzyIndex, IndexError, IndexMatch, IndexOptions};
pub use remote::{
    JellyfinClient, OfflineClient, RawResult, RemoteItemKind, RemoteSearchClient,
    RemoteSearchError, RemoteSearchResponse,
};
pub use search::{
    merge_results, resolve_rows, DebouncedFetcher, FetchEvent, MergedResults, ResultRow,
    SearchController, SearchPhase, SearchResult, SearchSession,
};
