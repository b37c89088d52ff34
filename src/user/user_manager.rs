use super::user_models::User;
use super::user_store::UserStore;
use crate::error::{ServiceError, ServiceResult};
use std::sync::Arc;
use tracing::info;

/// Login, signup and default-account seeding on top of a [`UserStore`].
pub struct UserManager {
    store: Arc<dyn UserStore>,
}

impl UserManager {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Verifies the credentials and returns the matching user.
    /// Credentials are compared as opaque strings.
    pub fn login(&self, login_id: &str, password: &str) -> ServiceResult<User> {
        let user = self
            .store
            .user_by_login(login_id)?
            .ok_or(ServiceError::BadCredentials)?;
        if user.password != password {
            return Err(ServiceError::BadCredentials);
        }
        Ok(user)
    }

    /// Registers a new user. Login id and password must be non-blank and the
    /// login id must not be taken.
    pub fn signup(&self, login_id: &str, password: &str) -> ServiceResult<User> {
        if login_id.trim().is_empty() || password.trim().is_empty() {
            return Err(ServiceError::InvalidInput("blank login id or password"));
        }
        if self.store.user_by_login(login_id)?.is_some() {
            return Err(ServiceError::DuplicateLogin);
        }
        Ok(self.store.create_user(login_id, password)?)
    }

    /// Creates the default admin/guest accounts on first startup.
    /// A no-op when any user already exists.
    pub fn seed_default_users(&self) -> ServiceResult<()> {
        if self.store.count_users()? > 0 {
            return Ok(());
        }
        self.store.create_user("admin", "admin1234")?;
        self.store.create_user("guest", "1234")?;
        info!("Seeded default users (admin, guest)");
        Ok(())
    }
}
