//! Book domain methods on Repository

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookStats, CreateBook, UpdateBook},
        listing::ListQuery,
    },
};

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}

impl Repository {
    /// Count the matching books, then fetch the requested page.
    ///
    /// The two statements run on separate pool checkouts without a shared
    /// transaction, so a concurrent write may land between them.
    pub async fn books_search(&self, query: &ListQuery) -> AppResult<(Vec<Book>, i64)> {
        let plan = query.plan();

        let mut count = sqlx::query_scalar::<_, i64>(&plan.count_sql);
        if let Some(ref pattern) = plan.pattern {
            count = count.bind(pattern).bind(pattern);
        }
        let total = count.fetch_one(&self.pool).await?;

        let mut select = sqlx::query_as::<_, Book>(&plan.page_sql);
        if let Some(ref pattern) = plan.pattern {
            select = select.bind(pattern).bind(pattern);
        }
        let books = select
            .bind(plan.limit)
            .bind(plan.offset)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            total,
            returned = books.len(),
            page = query.page,
            per_page = query.per_page,
            "Book search"
        );

        Ok((books, total))
    }

    /// Get book by ID
    pub async fn books_get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author, publication_year, available FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Insert a book; the store assigns the id
    pub async fn books_create(&self, data: &CreateBook) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, publication_year, available)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, author, publication_year, available
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(data.publication_year)
        .bind(data.available)
        .fetch_one(&self.pool)
        .await?;
        Ok(book)
    }

    /// Update the provided fields in one statement
    pub async fn books_update(&self, id: i64, data: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE(?, title),
                author = COALESCE(?, author),
                publication_year = COALESCE(?, publication_year),
                available = COALESCE(?, available)
            WHERE id = ?
            RETURNING id, title, author, publication_year, available
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(data.publication_year)
        .bind(data.available)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Delete a book
    pub async fn books_delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Counts and publication year range over the whole table
    pub async fn books_stats(&self) -> AppResult<BookStats> {
        let (total, available, year_min, year_max): (i64, i64, Option<i32>, Option<i32>) =
            sqlx::query_as(
                r#"
                SELECT COUNT(*),
                       COALESCE(SUM(CASE WHEN available THEN 1 ELSE 0 END), 0),
                       MIN(publication_year),
                       MAX(publication_year)
                FROM books
                "#,
            )
            .fetch_one(&self.pool)
            .await?;

        Ok(BookStats {
            total,
            available,
            unavailable: total - available,
            year_min,
            year_max,
        })
    }
}
