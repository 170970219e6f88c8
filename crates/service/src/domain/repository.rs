use async_trait::async_trait;
use models::domain::{DomainPatch, Model, NewDomain};

use crate::errors::ServiceError;

/// Credential Store access for domain rows.
#[async_trait]
pub trait DomainRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Model>, ServiceError>;
    async fn name_taken(&self, name: &str, exclude_id: Option<i32>) -> Result<bool, ServiceError>;
    async fn create(&self, input: NewDomain) -> Result<Model, ServiceError>;
    /// Returns affected row count.
    async fn update_fields(&self, id: i32, patch: DomainPatch) -> Result<u64, ServiceError>;
    async fn count(&self) -> Result<u64, ServiceError>;
    /// Newest first.
    async fn page(&self, offset: u64, limit: u64) -> Result<Vec<Model>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockDomainRepository {
        rows: Mutex<BTreeMap<i32, Model>>,
        fail_writes: AtomicBool,
        stale_name_check: AtomicBool,
    }

    impl MockDomainRepository {
        /// Make `create`/`update_fields` fail with a store error.
        pub fn fail_writes(&self, on: bool) {
            self.fail_writes.store(on, Ordering::SeqCst);
        }

        /// Make `name_taken` always answer false, as if another request
        /// inserted the name after the check ran.
        pub fn stale_name_check(&self, on: bool) {
            self.stale_name_check.store(on, Ordering::SeqCst);
        }

        pub fn row(&self, id: i32) -> Option<Model> {
            self.rows.lock().unwrap().get(&id).cloned()
        }

        fn check_writable(&self) -> Result<(), ServiceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("store unavailable".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DomainRepository for MockDomainRepository {
        async fn find_by_id(&self, id: i32) -> Result<Option<Model>, ServiceError> {
            Ok(self.row(id))
        }

        async fn name_taken(&self, name: &str, exclude_id: Option<i32>) -> Result<bool, ServiceError> {
            if self.stale_name_check.load(Ordering::SeqCst) {
                return Ok(false);
            }
            let rows = self.rows.lock().unwrap();
            Ok(rows.values().any(|r| r.name == name && Some(r.id) != exclude_id))
        }

        async fn create(&self, input: NewDomain) -> Result<Model, ServiceError> {
            self.check_writable()?;
            models::domain::validate_name(&input.name)?;
            let mut rows = self.rows.lock().unwrap();
            if rows.values().any(|r| r.name == input.name) {
                return Err(ServiceError::Conflict("duplicate key value violates unique constraint".into()));
            }
            let id = rows.keys().next_back().copied().unwrap_or(0) + 1;
            let now = chrono::Utc::now().into();
            let row = Model {
                id,
                name: input.name,
                logo: input.logo,
                meta_title: input.meta_title,
                meta_desc: input.meta_desc,
                meta_keyword: input.meta_keyword,
                meta_ico: input.meta_ico,
                modul: input.modul,
                status: input.status,
                created_at: now,
                updated_at: now,
            };
            rows.insert(id, row.clone());
            Ok(row)
        }

        async fn update_fields(&self, id: i32, patch: DomainPatch) -> Result<u64, ServiceError> {
            self.check_writable()?;
            let mut rows = self.rows.lock().unwrap();
            if let Some(name) = &patch.name {
                if rows.values().any(|r| &r.name == name && r.id != id) {
                    return Err(ServiceError::Conflict("duplicate key value violates unique constraint".into()));
                }
            }
            let Some(row) = rows.get_mut(&id) else { return Ok(0) };
            if let Some(v) = patch.name { row.name = v; }
            if let Some(v) = patch.logo { row.logo = v; }
            if let Some(v) = patch.meta_title { row.meta_title = v; }
            if let Some(v) = patch.meta_desc { row.meta_desc = v; }
            if let Some(v) = patch.meta_keyword { row.meta_keyword = v; }
            if let Some(v) = patch.meta_ico { row.meta_ico = v; }
            if let Some(v) = patch.modul { row.modul = v; }
            if let Some(v) = patch.status { row.status = v; }
            row.updated_at = chrono::Utc::now().into();
            Ok(1)
        }

        async fn count(&self) -> Result<u64, ServiceError> {
            Ok(self.rows.lock().unwrap().len() as u64)
        }

        async fn page(&self, offset: u64, limit: u64) -> Result<Vec<Model>, ServiceError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.values().rev().skip(offset as usize).take(limit as usize).cloned().collect())
        }
    }
}
