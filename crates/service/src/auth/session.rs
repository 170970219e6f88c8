use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use super::domain::{AuthUser, SessionSnapshot};
use super::errors::AuthError;
use crate::cache::{self, CacheMirror};
use crate::domain::snapshot::DomainSnapshot;
use crate::domain::DomainSynchronizer;

/// Assembles the login-time session view from cached domain snapshots.
#[derive(Clone)]
pub struct SessionSynchronizer {
    cache: Arc<dyn CacheMirror>,
    /// Reads ids missing from the cache through the store and re-caches them.
    fallback: Option<DomainSynchronizer>,
    ttl: Option<Duration>,
}

impl SessionSynchronizer {
    pub fn new(cache: Arc<dyn CacheMirror>) -> Self {
        Self { cache, fallback: None, ttl: None }
    }

    pub fn with_db_fallback(mut self, sync: DomainSynchronizer) -> Self {
        self.fallback = Some(sync);
        self
    }

    /// Expiry passed through to the `user:<id>` entry.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    async fn resolve_one(&self, id: i32) -> Vec<DomainSnapshot> {
        let key = cache::domain_key(id);
        match cache::load_many::<DomainSnapshot>(self.cache.as_ref(), &key).await {
            Ok(Some(found)) => return found,
            Ok(None) => warn!(domain_id = id, key = %key, "domain not in cache"),
            Err(e) => warn!(domain_id = id, key = %key, error = %e, "failed to read domain from cache"),
        }
        let Some(sync) = &self.fallback else {
            return Vec::new();
        };
        // the stored row is authoritative; re-caching it is best-effort
        match sync.snapshot(id).await {
            Ok(Some(snapshot)) => {
                sync.publish(&snapshot).await;
                vec![snapshot]
            }
            Ok(None) => {
                warn!(domain_id = id, "domain missing from store");
                Vec::new()
            }
            Err(e) => {
                warn!(domain_id = id, error = %e, "failed to read domain from store");
                Vec::new()
            }
        }
    }

    /// Fails with `DomainsUnavailable` when none of the user's ids resolve.
    #[instrument(skip(self, user), fields(user_id = user.id, domains = user.domains_id.len()))]
    pub async fn assemble(&self, user: &AuthUser) -> Result<SessionSnapshot, AuthError> {
        let mut domain = Vec::new();
        for id in user.domains_id.iter() {
            domain.extend(self.resolve_one(id).await);
        }
        if domain.is_empty() {
            warn!(user_id = user.id, "no resolvable domains for user");
            return Err(AuthError::DomainsUnavailable);
        }
        Ok(SessionSnapshot {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            domain,
        })
    }

    /// Best-effort write of `user:<id>`.
    pub async fn publish(&self, snapshot: &SessionSnapshot) {
        let key = cache::user_key(snapshot.id);
        match cache::save_json(self.cache.as_ref(), &key, snapshot, self.ttl).await {
            Ok(_) => info!(user_id = snapshot.id, key = %key, "session snapshot cached"),
            Err(e) => warn!(user_id = snapshot.id, key = %key, error = %e, "failed to cache session snapshot"),
        }
    }
}
