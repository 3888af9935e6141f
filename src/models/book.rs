//! Book record model and request types

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book record as stored and exposed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Year of publication (0-9999)
    pub publication_year: i32,
    /// Whether the book can currently be lent
    pub available: bool,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(range(min = 0, max = 9999, message = "Publication year must be between 0 and 9999"))]
    pub publication_year: i32,
    #[serde(default = "default_available")]
    pub available: bool,
}

/// Update book request; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: Option<String>,
    #[validate(range(min = 0, max = 9999, message = "Publication year must be between 0 and 9999"))]
    pub publication_year: Option<i32>,
    pub available: Option<bool>,
}

/// Aggregate counts over the whole table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookStats {
    pub total: i64,
    pub available: i64,
    pub unavailable: i64,
    /// Oldest publication year, null when the table is empty
    pub year_min: Option<i32>,
    /// Newest publication year, null when the table is empty
    pub year_max: Option<i32>,
}

fn default_available() -> bool {
    true
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

fn trimmed_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()))
}
