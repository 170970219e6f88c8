use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, NewAccount, RegisterInput};
use super::errors::AuthError;
use super::repository::UserRepository;
use super::session::SessionSynchronizer;
use crate::validation::Validator;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl From<&configs::AuthConfig> for AuthConfig {
    fn from(c: &configs::AuthConfig) -> Self {
        Self { jwt_secret: c.jwt_secret.clone(), token_ttl_hours: c.token_ttl_hours }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    sessions: SessionSynchronizer,
    cfg: AuthConfig,
}

impl<R: UserRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, sessions: SessionSynchronizer, cfg: AuthConfig) -> Self {
        Self { repo, sessions, cfg }
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockUserRepository, SessionSynchronizer};
    /// use service::auth::domain::RegisterInput;
    /// use service::cache::MemoryCacheMirror;
    /// use std::sync::Arc;
    /// let sessions = SessionSynchronizer::new(Arc::new(MemoryCacheMirror::new()));
    /// let svc = AuthService::new(Arc::new(MockUserRepository::default()), sessions, AuthConfig { jwt_secret: "s".into(), token_ttl_hours: 24 });
    /// let input = RegisterInput { first_name: "Test".into(), email: "user@example.com".into(), password: "Secret1".into(), ..Default::default() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        let email = input.email.trim().to_string();
        let mut v = Validator::new();
        v.required("first_name", &input.first_name)
            .min_length("password", &input.password, MIN_PASSWORD_LEN)
            .required("email", &email)
            .email("email", &email);
        v.finish()?;

        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self
            .repo
            .create_user(NewAccount {
                first_name: input.first_name,
                last_name: input.last_name,
                email,
                phone: input.phone,
                password_hash: hash,
                domains_id: input.domains_id,
                access_right: input.access_right,
            })
            .await?;
        info!(user_id = user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Verify credentials, assemble the session snapshot and issue a token.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(input.email.trim())
            .await?
            .ok_or(AuthError::NotFound)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let snapshot = self.sessions.assemble(&user).await?;
        let token = self.issue_token(user.id)?;
        self.sessions.publish(&snapshot).await;
        info!(user_id = user.id, domains = snapshot.domain.len(), "user_logged_in");

        Ok(AuthSession { user: snapshot, token })
    }

    pub fn issue_token(&self, user_id: i32) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        verify_token(&self.cfg.jwt_secret, token)
    }
}

/// HS256 signature and expiry check.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockUserRepository;
    use crate::cache::{CacheMirror, MemoryCacheMirror};
    use crate::ids::IdList;

    fn svc(cache: Arc<MemoryCacheMirror>) -> AuthService<MockUserRepository> {
        AuthService::new(
            Arc::new(MockUserRepository::default()),
            SessionSynchronizer::new(cache),
            AuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 24 },
        )
    }

    fn register_input(email: &str, domains: &str) -> RegisterInput {
        RegisterInput {
            first_name: "Komang".into(),
            last_name: "Ayu".into(),
            email: email.into(),
            phone: "0813".into(),
            password: "Passw0rd".into(),
            domains_id: domains.parse::<IdList>().unwrap(),
            access_right: "editor".into(),
        }
    }

    async fn cache_domain(cache: &MemoryCacheMirror, id: i32) {
        let body = format!(r#"{{"id":{},"name":"d.com","logo":"","title":"T","status":"active","modul":[]}}"#, id);
        cache.set(&format!("domain:{}", id), &body, None).await.unwrap();
    }

    #[tokio::test]
    async fn register_validates_input() {
        let s = svc(Arc::new(MemoryCacheMirror::new()));
        let mut short = register_input("a@example.com", "");
        short.password = "12345".into();
        assert!(matches!(s.register(short).await, Err(AuthError::Validation(_))));
        assert!(matches!(s.register(register_input("Bad@Mail", "")).await, Err(AuthError::Validation(_))));

        s.register(register_input(" dup@example.com ", "")).await.unwrap();
        assert!(matches!(s.register(register_input("dup@example.com", "")).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn login_returns_cached_domains_and_valid_token() {
        let cache = Arc::new(MemoryCacheMirror::new());
        cache_domain(&cache, 3).await;
        cache_domain(&cache, 8).await;
        let s = svc(cache.clone());
        let user = s.register(register_input("ok@example.com", "3,8")).await.unwrap();

        let session = s.login(LoginInput { email: "ok@example.com".into(), password: "Passw0rd".into() }).await.unwrap();
        assert_eq!(session.user.domain.len(), 2);
        let claims = s.verify_token(&session.token).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert!(cache.get(&format!("user:{}", user.id)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn login_failures_are_distinct() {
        let cache = Arc::new(MemoryCacheMirror::new());
        let s = svc(cache.clone());
        s.register(register_input("nod@example.com", "41")).await.unwrap();

        let attempt = |email: &str, password: &str| LoginInput { email: email.into(), password: password.into() };
        assert!(matches!(s.login(attempt("ghost@example.com", "Passw0rd")).await, Err(AuthError::NotFound)));
        assert!(matches!(s.login(attempt("nod@example.com", "wrong-pass")).await, Err(AuthError::Unauthorized)));
        // credentials are fine but domain 41 is not cached
        assert!(matches!(s.login(attempt("nod@example.com", "Passw0rd")).await, Err(AuthError::DomainsUnavailable)));
        assert!(cache.get("user:1").await.unwrap().is_none());
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let s = svc(Arc::new(MemoryCacheMirror::new()));
        let token = s.issue_token(5).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
        assert_eq!(verify_token("test-secret", &token).unwrap().sub, "5");
    }
}
