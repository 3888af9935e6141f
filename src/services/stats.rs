//! Statistics service

use crate::{error::AppResult, models::book::BookStats, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Availability counts and publication year range
    pub async fn get_stats(&self) -> AppResult<BookStats> {
        self.repository.books_stats().await
    }
}
