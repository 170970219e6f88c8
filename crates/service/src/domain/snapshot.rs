use serde::{Deserialize, Deserializer, Serialize};

use super::modules::{ModuleDescriptor, ModuleKeys};

/// Denormalized domain view stored under `domain:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSnapshot {
    pub id: i32,
    pub name: String,
    pub logo: String,
    pub title: String,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub modul: Vec<ModuleDescriptor>,
}

/// Entries written by other producers may carry `"modul": null`.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ModuleDescriptor>, D::Error> {
    Ok(Option::<Vec<ModuleDescriptor>>::deserialize(deserializer)?.unwrap_or_default())
}

impl DomainSnapshot {
    pub fn from_row(row: &models::domain::Model) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            logo: row.logo.clone(),
            title: row.meta_title.clone(),
            status: row.status.clone(),
            modul: ModuleKeys::parse(&row.modul).descriptors(),
        }
    }
}
