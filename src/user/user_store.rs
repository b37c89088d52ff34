use super::user_models::User;
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns it with its assigned id.
    /// Returns Err if the login id is already taken or on a database error.
    fn create_user(&self, login_id: &str, password: &str) -> Result<User>;

    /// Returns the user with the given id.
    /// Returns Ok(None) if the user does not exist.
    fn user_by_id(&self, user_id: i64) -> Result<Option<User>>;

    /// Returns the user with the given login id.
    /// Returns Ok(None) if the user does not exist.
    fn user_by_login(&self, login_id: &str) -> Result<Option<User>>;

    /// Returns the total number of registered users.
    fn count_users(&self) -> Result<usize>;
}
