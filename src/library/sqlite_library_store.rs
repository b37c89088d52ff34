use super::models::{Book, GeneratedImage};
use super::store::{BookStore, ImageInsert, ImageStore};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "users",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Restrict,
};

const BOOK_FK: ForeignKey = ForeignKey {
    foreign_table: "book",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const BOOK_TABLE: Table = Table {
    name: "book",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_book_user_id", "user_id")],
};

const GENERATED_IMAGE_TABLE: Table = Table {
    name: "generated_image",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "book_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BOOK_FK)
        ),
        sqlite_column!("image_path", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    // At most one image per book, enforced by the database rather than by
    // lookup-before-insert.
    unique_constraints: &[&["book_id"]],
    indices: &[],
};

const LIBRARY_SCHEMA: VersionedSchema = VersionedSchema {
    version: 1,
    tables: &[BOOK_TABLE, GENERATED_IMAGE_TABLE],
};

/// SQLite-backed store for books and their generated images. Shares the
/// connection with the user store; the user table must exist before this
/// store is constructed, because the book table declares a foreign key on it.
pub struct SqliteLibraryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLibraryStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let locked = conn.lock().unwrap();
            LIBRARY_SCHEMA
                .apply(&locked)
                .context("Failed to initialize library schema")?;
        }
        Ok(Self { conn })
    }

    fn map_book(row: &rusqlite::Row) -> rusqlite::Result<Book> {
        Ok(Book {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
        })
    }

    fn map_image(row: &rusqlite::Row) -> rusqlite::Result<GeneratedImage> {
        Ok(GeneratedImage {
            id: row.get(0)?,
            book_id: row.get(1)?,
            image_path: row.get(2)?,
        })
    }
}

impl BookStore for SqliteLibraryStore {
    fn create_book(&self, owner_id: i64, title: &str, description: &str) -> Result<Book> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO book (user_id, title, description) VALUES (?1, ?2, ?3)",
            params![owner_id, title, description],
        )
        .context("Failed to insert book")?;
        Ok(Book {
            id: conn.last_insert_rowid(),
            owner_id,
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    fn book_by_id(&self, book_id: i64) -> Result<Option<Book>> {
        let conn = self.conn.lock().unwrap();
        let book = conn
            .query_row(
                "SELECT id, user_id, title, description FROM book WHERE id = ?1",
                params![book_id],
                Self::map_book,
            )
            .optional()?;
        Ok(book)
    }

    fn list_books_newest_first(&self) -> Result<Vec<Book>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, user_id, title, description FROM book ORDER BY id DESC")?;
        let books = stmt
            .query_map([], Self::map_book)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    fn update_book(&self, book: &Book) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE book SET title = ?1, description = ?2 WHERE id = ?3",
            params![book.title, book.description, book.id],
        )
        .with_context(|| format!("Failed to update book {}", book.id))?;
        Ok(())
    }

    fn delete_book(&self, book_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM book WHERE id = ?1", params![book_id])?;
        Ok(())
    }
}

impl ImageStore for SqliteLibraryStore {
    fn insert_image_if_absent(&self, book_id: i64, image_path: &str) -> Result<ImageInsert> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO generated_image (book_id, image_path) VALUES (?1, ?2)",
            params![book_id, image_path],
        )?;
        if inserted == 0 {
            return Ok(ImageInsert::AlreadyExists);
        }
        Ok(ImageInsert::Created(GeneratedImage {
            id: conn.last_insert_rowid(),
            book_id,
            image_path: image_path.to_string(),
        }))
    }

    fn image_by_book(&self, book_id: i64) -> Result<Option<GeneratedImage>> {
        let conn = self.conn.lock().unwrap();
        let image = conn
            .query_row(
                "SELECT id, book_id, image_path FROM generated_image WHERE book_id = ?1",
                params![book_id],
                Self::map_image,
            )
            .optional()?;
        Ok(image)
    }

    fn update_image_path(&self, image_id: i64, image_path: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE generated_image SET image_path = ?1 WHERE id = ?2",
            params![image_path, image_id],
        )
        .with_context(|| format!("Failed to update image {}", image_id))?;
        Ok(())
    }

    fn delete_image(&self, image_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM generated_image WHERE id = ?1",
            params![image_id],
        )?;
        Ok(())
    }
}
