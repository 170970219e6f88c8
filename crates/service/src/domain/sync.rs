use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::repository::DomainRepository;
use super::snapshot::DomainSnapshot;
use crate::cache::{self, CacheMirror};
use crate::errors::ServiceError;

/// Reconciles a committed domain row into its `domain:<id>` snapshot.
#[derive(Clone)]
pub struct DomainSynchronizer {
    repo: Arc<dyn DomainRepository>,
    cache: Arc<dyn CacheMirror>,
}

impl DomainSynchronizer {
    pub fn new(repo: Arc<dyn DomainRepository>, cache: Arc<dyn CacheMirror>) -> Self {
        Self { repo, cache }
    }

    /// Snapshot of the row as currently stored; `None` if it is gone.
    pub async fn snapshot(&self, id: i32) -> Result<Option<DomainSnapshot>, ServiceError> {
        Ok(self.repo.find_by_id(id).await?.map(|row| DomainSnapshot::from_row(&row)))
    }

    /// Best-effort write of `domain:<id>`; returns whether it landed.
    pub async fn publish(&self, snapshot: &DomainSnapshot) -> bool {
        let key = cache::domain_key(snapshot.id);
        match cache::save_json(self.cache.as_ref(), &key, snapshot, None).await {
            Ok(_) => {
                info!(domain_id = snapshot.id, key = %key, "domain snapshot cached");
                true
            }
            Err(e) => {
                warn!(domain_id = snapshot.id, key = %key, error = %e, "failed to cache domain snapshot");
                false
            }
        }
    }

    /// Re-read and write through. Never fails the caller: every problem is
    /// logged and `None` is returned.
    #[instrument(skip(self), fields(domain_id = id))]
    pub async fn sync(&self, id: i32) -> Option<DomainSnapshot> {
        let snapshot = match self.snapshot(id).await {
            Ok(Some(s)) => s,
            Ok(None) => {
                warn!(domain_id = id, "domain vanished before cache sync");
                return None;
            }
            Err(e) => {
                warn!(domain_id = id, error = %e, "failed to re-read domain for cache sync");
                return None;
            }
        };
        self.publish(&snapshot).await.then_some(snapshot)
    }
}
