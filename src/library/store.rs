use super::models::{Book, GeneratedImage};
use anyhow::Result;

pub trait BookStore: Send + Sync {
    /// Inserts a new book and returns it with its assigned id.
    fn create_book(&self, owner_id: i64, title: &str, description: &str) -> Result<Book>;

    /// Returns the book with the given id.
    /// Returns Ok(None) if the book does not exist.
    fn book_by_id(&self, book_id: i64) -> Result<Option<Book>>;

    /// Returns all books ordered by descending id (newest first).
    fn list_books_newest_first(&self) -> Result<Vec<Book>>;

    /// Persists the title and description of an existing book.
    /// The owner reference is immutable and never written back.
    fn update_book(&self, book: &Book) -> Result<()>;

    /// Removes the book row. Does not touch any image.
    fn delete_book(&self, book_id: i64) -> Result<()>;
}

/// Outcome of an atomic insert-if-absent on the image table.
#[derive(Debug, PartialEq, Eq)]
pub enum ImageInsert {
    Created(GeneratedImage),
    /// A row for that book already existed; nothing was written.
    AlreadyExists,
}

pub trait ImageStore: Send + Sync {
    /// Inserts an image row for the book unless one already exists.
    /// Backed by the unique constraint on `book_id`, so two concurrent
    /// inserts cannot both succeed.
    fn insert_image_if_absent(&self, book_id: i64, image_path: &str) -> Result<ImageInsert>;

    /// Returns the image for the book, at most one by the unique constraint.
    /// Returns Ok(None) if the book has no image.
    fn image_by_book(&self, book_id: i64) -> Result<Option<GeneratedImage>>;

    /// Overwrites the stored relative path of an existing image row.
    fn update_image_path(&self, image_id: i64, image_path: &str) -> Result<()>;

    /// Removes the image row. Does not touch the backing file.
    fn delete_image(&self, image_id: i64) -> Result<()>;
}
