//! Data models for the book catalog

pub mod book;
pub mod listing;

// Re-export commonly used types
pub use book::{Book, BookStats, CreateBook, UpdateBook};
pub use listing::{BookListParams, ListPlan, ListQuery, Page, PageMeta};
