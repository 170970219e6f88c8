use std::sync::Arc;

use models::domain::{DomainPatch, Model, NewDomain};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::modules::ModuleKeys;
use super::repository::DomainRepository;
use super::sync::DomainSynchronizer;
use crate::cache::CacheMirror;
use crate::errors::ServiceError;
use crate::ids::parse_id;
use crate::pagination::{Page, PageMeta, Pagination};
use crate::upload::{ImagePart, ImagePipeline, UploadError};
use crate::validation::Validator;

/// Fields of a new domain as submitted by the create form.
#[derive(Debug, Clone, Default)]
pub struct CreateDomainInput {
    pub name: String,
    pub meta_title: String,
    pub meta_desc: String,
    pub meta_keyword: String,
    pub modul: String,
    pub status: String,
    pub logo: Option<ImagePart>,
    pub meta_ico: Option<ImagePart>,
}

/// One entry of a batch status update. Both fields stay loosely typed so a
/// bad value fails only its own entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusItem {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
}

/// A batch entry as received. Non-objects are kept so their index can be
/// reported.
#[derive(Debug, Clone)]
pub enum StatusEntry {
    Item(StatusItem),
    Malformed,
}

impl<'de> Deserialize<'de> for StatusEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if !raw.is_object() {
            return Ok(StatusEntry::Malformed);
        }
        Ok(serde_json::from_value(raw).map_or(StatusEntry::Malformed, StatusEntry::Item))
    }
}

impl From<StatusItem> for StatusEntry {
    fn from(item: StatusItem) -> Self { StatusEntry::Item(item) }
}

/// Per-item failure of a batch status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Complete,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub updated: usize,
    pub errors: Vec<ItemError>,
}

impl BatchOutcome {
    pub fn status(&self) -> BatchStatus {
        match (self.updated, self.errors.len()) {
            (_, 0) => BatchStatus::Complete,
            (0, _) => BatchStatus::Failed,
            _ => BatchStatus::Partial,
        }
    }

    fn fail(&mut self, index: usize, id: Option<i32>, message: impl Into<String>) {
        self.errors.push(ItemError { index, id, message: message.into() });
    }
}

/// Domain business service. Every committed write is followed by a
/// best-effort cache sync.
#[derive(Clone)]
pub struct DomainService {
    repo: Arc<dyn DomainRepository>,
    sync: DomainSynchronizer,
    uploads: ImagePipeline,
}

impl DomainService {
    pub fn new(repo: Arc<dyn DomainRepository>, cache: Arc<dyn CacheMirror>, uploads: ImagePipeline) -> Self {
        let sync = DomainSynchronizer::new(repo.clone(), cache);
        Self { repo, sync, uploads }
    }

    pub fn synchronizer(&self) -> &DomainSynchronizer { &self.sync }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateDomainInput) -> Result<Model, ServiceError> {
        let mut v = Validator::new();
        v.required("name", &input.name)
            .domain_name("name", &input.name)
            .required("meta_title", &input.meta_title);
        v.finish()?;

        // reject bad files before anything is written
        let mut rejected = Vec::new();
        for part in [&input.logo, &input.meta_ico].into_iter().flatten() {
            if let Err(UploadError::Rejected(errs)) = self.uploads.validate(part) {
                rejected.extend(errs);
            }
        }
        if !rejected.is_empty() {
            return Err(UploadError::Rejected(rejected).into());
        }

        let name = input.name.trim().to_string();
        if self.repo.name_taken(&name, None).await? {
            return Err(ServiceError::Conflict("Domain already exists".into()));
        }

        let logo = match &input.logo {
            Some(part) => self.uploads.process(part).await?,
            None => String::new(),
        };
        let meta_ico = match &input.meta_ico {
            Some(part) => self.uploads.process(part).await?,
            None => String::new(),
        };

        let stored = [logo.clone(), meta_ico.clone()];
        let created = self
            .repo
            .create(NewDomain {
                name,
                logo,
                meta_title: input.meta_title,
                meta_desc: input.meta_desc,
                meta_keyword: input.meta_keyword,
                meta_ico,
                modul: ModuleKeys::parse(&input.modul).to_stored(),
                status: input.status,
            })
            .await;
        let row = match created {
            Ok(row) => row,
            Err(e) => {
                // no row references these files
                for file_name in stored.iter().filter(|f| !f.is_empty()) {
                    self.uploads.discard(file_name).await;
                }
                return Err(match e {
                    ServiceError::Conflict(msg) => {
                        warn!(reason = %msg, "domain name inserted concurrently");
                        ServiceError::Conflict("Domain already exists".into())
                    }
                    other => {
                        error!(error = %other, "failed to create domain");
                        other
                    }
                });
            }
        };
        info!(domain_id = row.id, name = %row.name, "domain_created");

        self.sync.sync(row.id).await;
        Ok(row)
    }

    /// Full update. `name` and `meta_title` are mandatory; every other field
    /// is only written when present.
    #[instrument(skip(self, patch), fields(domain_id = id))]
    pub async fn update_all(&self, id: i32, mut patch: DomainPatch) -> Result<i32, ServiceError> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("domain with id {} not found", id)));
        }

        let name = patch.name.as_deref().unwrap_or_default();
        let title = patch.meta_title.as_deref().unwrap_or_default();
        let mut v = Validator::new();
        v.required("name", name).domain_name("name", name).required("meta_title", title);
        v.finish()?;

        let name = name.trim().to_string();
        if self.repo.name_taken(&name, Some(id)).await? {
            return Err(ServiceError::Conflict("Domain name already exists".into()));
        }
        patch.name = Some(name);
        patch.modul = patch.modul.map(|m| ModuleKeys::parse(&m).to_stored());

        let rows = self.repo.update_fields(id, patch).await.map_err(|e| match e {
            ServiceError::Conflict(msg) => {
                warn!(domain_id = id, reason = %msg, "domain name taken concurrently");
                ServiceError::Conflict("Domain name already exists".into())
            }
            other => {
                error!(domain_id = id, error = %other, "failed to update domain");
                other
            }
        })?;
        if rows == 0 {
            return Err(ServiceError::NotFound("Domain not found or no changes made".into()));
        }
        info!(domain_id = id, "domain_updated");

        self.sync.sync(id).await;
        Ok(id)
    }

    /// Batch status update; each item succeeds or fails on its own.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub async fn update_status(&self, items: &[StatusEntry]) -> Result<BatchOutcome, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::invalid("data", "No data provided"));
        }

        let mut outcome = BatchOutcome::default();
        for (index, entry) in items.iter().enumerate() {
            let StatusEntry::Item(item) = entry else {
                outcome.fail(index, None, "invalid data format");
                continue;
            };
            let id = match item.id.as_ref().map(parse_id) {
                None => {
                    outcome.fail(index, None, "id is required");
                    continue;
                }
                Some(Err(msg)) => {
                    outcome.fail(index, None, msg);
                    continue;
                }
                Some(Ok(id)) => id,
            };
            let status = match item.status.as_ref().and_then(Value::as_str) {
                Some(s) if !s.is_empty() => s.to_string(),
                _ => {
                    outcome.fail(index, Some(id), "status is required and must be string");
                    continue;
                }
            };

            match self.repo.find_by_id(id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    outcome.fail(index, Some(id), format!("domain with id {} not found", id));
                    continue;
                }
                Err(e) => {
                    error!(domain_id = id, error = %e, "failed to read domain");
                    outcome.fail(index, Some(id), "failed to read domain");
                    continue;
                }
            }

            let patch = DomainPatch { status: Some(status), ..Default::default() };
            match self.repo.update_fields(id, patch).await {
                Ok(0) => {
                    outcome.fail(index, Some(id), "domain not found or no changes made");
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(domain_id = id, error = %e, "failed to update domain status");
                    outcome.fail(index, Some(id), "failed to update");
                    continue;
                }
            }

            self.sync.sync(id).await;
            outcome.updated += 1;
        }

        if !outcome.errors.is_empty() {
            warn!(updated = outcome.updated, failed = outcome.errors.len(), "batch status update had failures");
        }
        Ok(outcome)
    }

    pub async fn list(&self, p: Pagination) -> Result<Page<Model>, ServiceError> {
        let p = p.normalized();
        let (offset, limit) = p.offset_limit();
        let total = self.repo.count().await?;
        let data = self.repo.page(offset, limit).await?;
        let meta = PageMeta::new(p, total, data.len());
        Ok(Page { data, meta })
    }

    pub async fn get(&self, id: i32) -> Result<Model, ServiceError> {
        self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("domain"))
    }

    pub async fn exists(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(self.repo.find_by_id(id).await?.is_some())
    }
}
