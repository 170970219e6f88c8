use sea_orm::{DatabaseConnection, EntityTrait};

use crate::auth::domain::{AuthUser, Credentials, NewAccount};
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;
use crate::ids::IdList;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    let (domains_id, rejected) = IdList::parse_lenient(&u.domains_id);
    if !rejected.is_empty() {
        tracing::warn!(user_id = u.id, rejected = ?rejected, "ignoring malformed domain ids");
    }
    AuthUser {
        id: u.id,
        first_name: u.first_name,
        last_name: u.last_name,
        email: u.email,
        phone: u.phone,
        domains_id,
        access_right: u.access_right,
    }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError> {
        let res = models::user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|u| Credentials { user_id: u.id, password_hash: u.password }))
    }

    async fn create_user(&self, account: NewAccount) -> Result<AuthUser, AuthError> {
        let created = models::user::create(&self.db, models::user::NewUser {
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            password: account.password_hash,
            phone: account.phone,
            domains_id: account.domains_id.to_stored(),
            access_right: account.access_right,
        })
        .await
        .map_err(|e| match e {
            models::errors::ModelError::Validation(msg) => {
                AuthError::Validation(vec![crate::validation::FieldError::new("user", msg)])
            }
            models::errors::ModelError::Conflict(_) => AuthError::Conflict,
            other => AuthError::Repository(other.to_string()),
        })?;
        Ok(to_auth_user(created))
    }
}
