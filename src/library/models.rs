/// A book record. The owner reference is a plain typed id, resolved through
/// the user store when the full user is needed; ownership is immutable after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
}

/// The generated image attached to a book. The association is unidirectional
/// (image points at its book) and at most one image exists per book, enforced
/// by a unique constraint on `book_id`.
///
/// `image_path` is always a storage-root-relative reference
/// (`/images/<file>`), never an absolute filesystem path or external URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub id: i64,
    pub book_id: i64,
    pub image_path: String,
}
