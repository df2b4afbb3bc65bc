//! Remote search abstraction.
//!
//! This module provides a `RemoteSearchClient` trait for querying the media
//! server that owns the full library (Jellyfin), plus an offline backend used
//! when no server is configured.

mod jellyfin;
mod offline;
mod types;

pub use jellyfin::JellyfinClient;
pub use offline::OfflineClient;
pub use types::*;
