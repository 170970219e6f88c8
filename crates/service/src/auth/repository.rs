use async_trait::async_trait;

use super::domain::{AuthUser, Credentials, NewAccount};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError>;
    async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: email
        creds: Mutex<HashMap<i32, Credentials>>, // key: user_id
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&account.email) {
                return Err(AuthError::Conflict);
            }
            let id = users.len() as i32 + 1;
            let user = AuthUser {
                id,
                first_name: account.first_name,
                last_name: account.last_name,
                email: account.email.clone(),
                phone: account.phone,
                domains_id: account.domains_id,
                access_right: account.access_right,
            };
            users.insert(account.email, user.clone());
            self.creds
                .lock()
                .unwrap()
                .insert(id, Credentials { user_id: id, password_hash: account.password_hash });
            Ok(user)
        }
    }
}
