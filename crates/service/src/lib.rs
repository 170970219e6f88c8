//! Service layer for the CMS backend.
//! - Domain and user workflows on top of the `models` entities.
//! - Cache Mirror kept in sync after every committed write.
//! - Image upload pipeline used by domain creation.

pub mod errors;
pub mod validation;
pub mod ids;
pub mod pagination;
pub mod cache;
pub mod upload;
pub mod domain;
pub mod auth;
#[cfg(test)]
pub mod test_support;
