use async_trait::async_trait;

use crate::catalog::CatalogEntity;

use super::{RemoteSearchClient, RemoteSearchError, RemoteSearchResponse};

/// Remote backend that never finds anything.
///
/// Used when no search service is configured: the controller still runs its
/// full cycle and local results stay authoritative.
#[derive(Debug, Default, Clone)]
pub struct OfflineClient;

impl OfflineClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RemoteSearchClient for OfflineClient {
    fn name(&self) -> &str {
        "offline"
    }

    async fn search(&self, _term: &str) -> Result<RemoteSearchResponse, RemoteSearchError> {
        Ok(RemoteSearchResponse::default())
    }

    async fn fetch_containers(
        &self,
        _ids: &[String],
    ) -> Result<Vec<CatalogEntity>, RemoteSearchError> {
        Ok(Vec::new())
    }
}
