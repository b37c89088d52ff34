mod book_locks;
pub mod models;
mod service;
mod sqlite_library_store;
mod store;

pub use book_locks::BookLocks;
pub use models::{Book, GeneratedImage};
pub use service::{BookService, ImageWritePolicy};
pub use sqlite_library_store::SqliteLibraryStore;
pub use store::{BookStore, ImageInsert, ImageStore};
