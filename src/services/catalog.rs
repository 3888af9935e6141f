//! Catalog management service

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook, UpdateBook},
        listing::{BookListParams, ListQuery, Page},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books with search, sorting and pagination.
    ///
    /// Listing parameters are normalized, never rejected.
    pub async fn list_books(&self, params: &BookListParams) -> AppResult<Page<Book>> {
        self.search(&ListQuery::normalize(params)).await
    }

    /// Run an already normalized listing request
    pub async fn search(&self, query: &ListQuery) -> AppResult<Page<Book>> {
        let (books, total) = self.repository.books_search(query).await?;
        Ok(Page::new(books, total, query))
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books_get_by_id(id).await
    }

    pub async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        let book = self.repository.books_create(data).await?;
        tracing::info!(id = book.id, title = %book.title, "Book created");
        Ok(book)
    }

    /// Partial update: absent fields keep their stored value
    pub async fn update_book(&self, id: i64, data: &UpdateBook) -> AppResult<Book> {
        let book = self.repository.books_update(id, data).await?;
        tracing::info!(id, "Book updated");
        Ok(book)
    }

    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books_delete(id).await?;
        tracing::info!(id, "Book deleted");
        Ok(())
    }
}
