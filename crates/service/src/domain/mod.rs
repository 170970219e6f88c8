//! Domain records: CRUD rules, module descriptors and the cache snapshot kept in
//! sync with every committed write.

pub mod modules;
pub mod snapshot;
pub mod repository;
pub mod repo;
pub mod sync;
pub mod service;

pub use service::DomainService;
pub use sync::DomainSynchronizer;
