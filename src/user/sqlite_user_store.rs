use super::user_models::User;
use super::user_store::UserStore;
use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, DEFAULT_TIMESTAMP};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const USER_TABLE: Table = Table {
    name: "users",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("login_id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("password", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_users_login_id", "login_id")],
};

pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    /// Creates the user table if needed and validates it otherwise.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let conn = conn.lock().unwrap();
            let exists: bool = conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1",
                    params![USER_TABLE.name],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if exists {
                USER_TABLE
                    .validate(&conn)
                    .context("User table validation failed")?;
            } else {
                USER_TABLE
                    .create(&conn)
                    .context("Failed to create user table")?;
            }
        }
        Ok(Self { conn })
    }

    fn map_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            login_id: row.get(1)?,
            password: row.get(2)?,
        })
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, login_id: &str, password: &str) -> Result<User> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (login_id, password) VALUES (?1, ?2)",
            params![login_id, password],
        )
        .with_context(|| format!("Failed to insert user {}", login_id))?;
        let id = conn.last_insert_rowid();
        Ok(User {
            id,
            login_id: login_id.to_string(),
            password: password.to_string(),
        })
    }

    fn user_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                "SELECT id, login_id, password FROM users WHERE id = ?1",
                params![user_id],
                Self::map_user,
            )
            .optional()?;
        Ok(user)
    }

    fn user_by_login(&self, login_id: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                "SELECT id, login_id, password FROM users WHERE login_id = ?1",
                params![login_id],
                Self::map_user,
            )
            .optional()?;
        Ok(user)
    }

    fn count_users(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
