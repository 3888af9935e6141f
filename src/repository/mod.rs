//! Repository layer for database operations

pub mod books;

use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use crate::{config::DatabaseConfig, error::AppResult};

const CREATE_BOOKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        publication_year INTEGER NOT NULL,
        available BOOLEAN NOT NULL DEFAULT 1
    )
"#;

const SAMPLE_BOOKS: [(&str, &str, i32, bool); 2] = [
    ("Algorithms 101", "Maria Silva", 2010, true),
    ("Databases", "John Souza", 2018, false),
];

/// Main repository struct holding the database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Create the books table if it does not exist yet
    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::query(CREATE_BOOKS_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert the sample books into an empty table. Returns the number inserted.
    pub async fn seed_samples(&self) -> AppResult<u64> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        let mut inserted = 0;
        for (title, author, year, available) in SAMPLE_BOOKS {
            inserted += sqlx::query(
                "INSERT INTO books (title, author, publication_year, available) VALUES (?, ?, ?, ?)",
            )
            .bind(title)
            .bind(author)
            .bind(year)
            .bind(available)
            .execute(&self.pool)
            .await?
            .rows_affected();
        }
        Ok(inserted)
    }

    /// Round-trip a trivial statement
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Open a connection pool for the configured database.
///
/// In-memory databases live as long as their connection, so they get a single
/// connection that is never recycled.
pub async fn connect(config: &DatabaseConfig) -> AppResult<Pool<Sqlite>> {
    let in_memory = config.url.contains(":memory:") || config.url.contains("mode=memory");

    let options = if config.url.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(&config.url)?
    } else {
        SqliteConnectOptions::new().filename(&config.url)
    };
    let options = options.create_if_missing(true);

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    Ok(pool)
}
