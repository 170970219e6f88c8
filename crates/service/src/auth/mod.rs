//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and the login-time session snapshot built from the
//! cached domain views.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod session;
pub mod repo;

pub use service::AuthService;
pub use session::SessionSynchronizer;
