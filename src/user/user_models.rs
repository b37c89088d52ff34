/// A registered user. Passwords are stored and compared as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub login_id: String,
    pub password: String,
}
