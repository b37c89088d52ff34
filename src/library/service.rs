use super::book_locks::BookLocks;
use super::models::{Book, GeneratedImage};
use super::store::{BookStore, ImageInsert, ImageStore};
use crate::error::{ServiceError, ServiceResult};
use crate::ingestion::ImageIngestor;
use crate::user::UserStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Who may create and read a book's image.
///
/// Updating is always owner-gated; creation and reads historically were not
/// (any caller with a valid book id could do both), so the choice is explicit
/// here instead of being baked into the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageWritePolicy {
    /// Any caller with a valid book id may create and read the image.
    #[default]
    Open,
    /// Only the book's owner may create and read the image.
    OwnerOnly,
}

/// Orchestration over the user, book and image stores plus the ingestion
/// pipeline. All mutating book/image operations funnel through the single
/// ownership check in [`Self::authorize`].
pub struct BookService {
    users: Arc<dyn UserStore>,
    books: Arc<dyn BookStore>,
    images: Arc<dyn ImageStore>,
    ingestor: ImageIngestor,
    locks: BookLocks,
    image_policy: ImageWritePolicy,
}

impl BookService {
    pub fn new(
        users: Arc<dyn UserStore>,
        books: Arc<dyn BookStore>,
        images: Arc<dyn ImageStore>,
        ingestor: ImageIngestor,
        image_policy: ImageWritePolicy,
    ) -> Self {
        Self {
            users,
            books,
            images,
            ingestor,
            locks: BookLocks::new(),
            image_policy,
        }
    }

    pub fn storage(&self) -> &crate::ingestion::ImageStorage {
        self.ingestor.storage()
    }

    /// The single ownership check: requester id must equal the book's owner
    /// id by value. A missing requester id is rejected before this point.
    fn authorize(book: &Book, requesting_user_id: i64) -> ServiceResult<()> {
        if book.owner_id != requesting_user_id {
            return Err(ServiceError::Unauthorized);
        }
        Ok(())
    }

    fn apply_image_read_policy(
        &self,
        book: &Book,
        requesting_user_id: Option<i64>,
    ) -> ServiceResult<()> {
        match self.image_policy {
            ImageWritePolicy::Open => Ok(()),
            ImageWritePolicy::OwnerOnly => {
                let user_id = requesting_user_id.ok_or(ServiceError::Unauthorized)?;
                Self::authorize(book, user_id)
            }
        }
    }

    pub fn create_book(&self, user_id: i64, title: &str, description: &str) -> ServiceResult<Book> {
        let owner = self
            .users
            .user_by_id(user_id)?
            .ok_or(ServiceError::UserNotFound)?;
        Ok(self.books.create_book(owner.id, title, description)?)
    }

    pub fn find_book(&self, book_id: i64) -> ServiceResult<Book> {
        self.books
            .book_by_id(book_id)?
            .ok_or(ServiceError::BookNotFound)
    }

    pub fn list_books(&self) -> ServiceResult<Vec<Book>> {
        Ok(self.books.list_books_newest_first()?)
    }

    /// Partial update: each field is applied only when supplied and
    /// non-blank; an omitted or blank field leaves the stored value as is.
    pub fn update_book(
        &self,
        book_id: i64,
        user_id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> ServiceResult<()> {
        let mut book = self.find_book(book_id)?;
        Self::authorize(&book, user_id)?;

        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            book.title = title.to_string();
        }
        if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
            book.description = description.to_string();
        }

        self.books.update_book(&book)?;
        Ok(())
    }

    /// Deletes the book and, first, its image (file and row). The image goes
    /// before the book row so a failure cannot leave an image row pointing at
    /// a gone book.
    pub async fn delete_book(&self, book_id: i64, user_id: i64) -> ServiceResult<()> {
        let book = self.find_book(book_id)?;
        Self::authorize(&book, user_id)?;

        self.delete_image_by_book_id(book_id).await?;
        self.books.delete_book(book_id)?;
        debug!(book_id, "Deleted book");
        Ok(())
    }

    /// Ingests the image behind `source_url` and attaches it to the book.
    /// Returns the stored relative reference.
    pub async fn create_image(
        &self,
        source_url: &str,
        book_id: i64,
        requesting_user_id: Option<i64>,
    ) -> ServiceResult<String> {
        let book = self.find_book(book_id)?;
        self.apply_image_read_policy(&book, requesting_user_id)?;

        let lock = self.locks.lock_for(book_id);
        let _guard = lock.lock().await;

        if self.images.image_by_book(book_id)?.is_some() {
            return Err(ServiceError::ImageAlreadyExists);
        }

        let relative_path = self.ingestor.ingest(source_url, book_id).await?;
        match self.images.insert_image_if_absent(book_id, &relative_path) {
            Ok(ImageInsert::Created(_)) => Ok(relative_path),
            Ok(ImageInsert::AlreadyExists) => {
                self.discard_file(&relative_path).await;
                Err(ServiceError::ImageAlreadyExists)
            }
            Err(e) => {
                self.discard_file(&relative_path).await;
                Err(e.into())
            }
        }
    }

    pub fn get_image(
        &self,
        book_id: i64,
        requesting_user_id: Option<i64>,
    ) -> ServiceResult<GeneratedImage> {
        let book = self.find_book(book_id)?;
        self.apply_image_read_policy(&book, requesting_user_id)?;
        self.images
            .image_by_book(book.id)?
            .ok_or(ServiceError::ImageNotFound)
    }

    /// Replaces the book's image: new file written, row path swapped, then
    /// the previous file removed. On any failure before the row update
    /// commits, the new file is discarded instead, so neither path leaves an
    /// orphan behind.
    pub async fn update_image(
        &self,
        book_id: i64,
        source_url: &str,
        user_id: i64,
    ) -> ServiceResult<String> {
        let book = self.find_book(book_id)?;
        Self::authorize(&book, user_id)?;

        let lock = self.locks.lock_for(book_id);
        let _guard = lock.lock().await;

        let image = self
            .images
            .image_by_book(book_id)?
            .ok_or(ServiceError::ImageNotFound)?;

        let new_path = self.ingestor.ingest(source_url, book_id).await?;
        if let Err(e) = self.images.update_image_path(image.id, &new_path) {
            self.discard_file(&new_path).await;
            return Err(e.into());
        }

        self.remove_file_best_effort(&image.image_path).await;
        Ok(new_path)
    }

    /// Removes the book's image, backing file first (best effort), then the
    /// row. A book without an image is a no-op; an unknown book id is not.
    pub async fn delete_image_by_book_id(&self, book_id: i64) -> ServiceResult<()> {
        self.find_book(book_id)?;

        let lock = self.locks.lock_for(book_id);
        let _guard = lock.lock().await;

        let Some(image) = self.images.image_by_book(book_id)? else {
            return Ok(());
        };

        self.remove_file_best_effort(&image.image_path).await;
        self.images.delete_image(image.id)?;
        Ok(())
    }

    /// File deletion failures never block record deletion; they only leave an
    /// orphaned file, which is logged.
    async fn remove_file_best_effort(&self, relative_path: &str) {
        if let Err(e) = self.ingestor.storage().delete(relative_path).await {
            warn!("Failed to delete image file {}: {}", relative_path, e);
        }
    }

    /// Cleanup for a freshly written file whose row never committed.
    async fn discard_file(&self, relative_path: &str) {
        if let Err(e) = self.ingestor.storage().delete(relative_path).await {
            warn!(
                "Failed to discard uncommitted image file {}: {}",
                relative_path, e
            );
        }
    }
}
