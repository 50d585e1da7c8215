use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, JwtIdentity};
use crate::database::models::{NewUser, User, UserFilter, UserPatch};
use crate::database::store::EntityStore;
use crate::services::error::ServiceError;

/// Validated email + password pair
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
    pub access_token: String,
}

/// Signup, signin and profile operations
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn EntityStore<User>>,
    identity: Arc<JwtIdentity>,
}

impl UserService {
    pub fn new(store: Arc<dyn EntityStore<User>>, identity: Arc<JwtIdentity>) -> Self {
        Self { store, identity }
    }

    pub async fn signup(&self, credentials: Credentials) -> Result<AccessToken, ServiceError> {
        let password_hash = hash_password(&credentials.password)?;
        let user = self
            .store
            .create(NewUser {
                email: credentials.email,
                password_hash,
                first_name: None,
                last_name: None,
            })
            .await?;

        info!("Registered user {} ({})", user.id, user.email);
        self.token_for(&user)
    }

    /// Unknown email and wrong password fail identically
    pub async fn signin(&self, credentials: Credentials) -> Result<AccessToken, ServiceError> {
        let filter = UserFilter {
            email: Some(credentials.email.clone()),
        };
        let user = self.store.list(&filter).await?.into_iter().next();

        let Some(user) = user else {
            warn!("Signin failed: no user with email {}", credentials.email);
            return Err(credentials_incorrect());
        };

        if !verify_password(&credentials.password, &user.password_hash)? {
            warn!("Signin failed: wrong password for user {}", user.id);
            return Err(credentials_incorrect());
        }

        self.token_for(&user)
    }

    pub async fn me(&self, caller_id: i64) -> Result<User, ServiceError> {
        Ok(self.store.get(caller_id).await?)
    }

    pub async fn edit(&self, caller_id: i64, patch: UserPatch) -> Result<User, ServiceError> {
        Ok(self.store.update(caller_id, patch).await?)
    }

    fn token_for(&self, user: &User) -> Result<AccessToken, ServiceError> {
        Ok(AccessToken {
            access_token: self.identity.issue(user)?,
        })
    }
}

fn credentials_incorrect() -> ServiceError {
    ServiceError::InvalidCredential("Credentials incorrect".to_string())
}
