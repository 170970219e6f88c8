use serde::{Deserialize, Serialize};

use crate::domain::snapshot::DomainSnapshot;
use crate::ids::IdList;

/// Registration input; absent fields are reported by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(alias = "domain_name")]
    pub domains_id: IdList,
    pub access_right: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Domain user (business view); never carries the credential hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub domains_id: IdList,
    pub access_right: String,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: i32,
    pub password_hash: String,
}

/// Account row to insert; `password_hash` is a PHC string.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub domains_id: IdList,
    pub access_right: String,
}

/// Login-time view stored under `user:<id>` and returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub domain: Vec<DomainSnapshot>,
}

/// Login result (session)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: SessionSnapshot,
    pub token: String,
}

/// JWT claims; `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}
