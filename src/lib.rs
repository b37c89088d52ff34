//! Bookshelf server library.
//!
//! Users own books; each book may carry at most one generated image, ingested
//! from a caller-supplied URL into local storage. The modules are exposed for
//! the binary and for the end-to-end tests.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod library;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use error::{ServiceError, ServiceResult};
pub use library::{BookService, ImageWritePolicy};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{SqliteUserStore, UserManager, UserStore};
