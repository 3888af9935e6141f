//! Book listing: parameter normalization, query plan and page envelope.
//!
//! Raw listing parameters are untrusted and never rejected. [`ListQuery::normalize`]
//! turns them into bounded values, [`ListQuery::plan`] builds the count and page
//! statements, and [`Page::new`] shapes the rows into the response envelope.
//!
//! Only two things are ever spliced into SQL text: a column name taken from
//! [`SortField`] and a keyword taken from [`SortDirection`]. The search term is
//! always a bound parameter.

use serde::Serialize;
use utoipa::ToSchema;

use super::book::Book;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

const BOOK_COLUMNS: &str = "id, title, author, publication_year, available";

/// Raw listing parameters as received on the query string
#[derive(Debug, Clone, Default)]
pub struct BookListParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

/// Collect decoded query pairs. The first occurrence of a repeated key wins,
/// unknown keys are ignored.
impl FromIterator<(String, String)> for BookListParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "q" => &mut params.q,
                "page" => &mut params.page,
                "perPage" => &mut params.per_page,
                "sortBy" => &mut params.sort_by,
                "sortDir" => &mut params.sort_dir,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

/// Sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    Title,
    Author,
    PublicationYear,
    Available,
}

impl SortField {
    /// Match an API field name against the allow-list
    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "id" => Some(SortField::Id),
            "title" => Some(SortField::Title),
            "author" => Some(SortField::Author),
            "publicationYear" => Some(SortField::PublicationYear),
            "available" => Some(SortField::Available),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::PublicationYear => "publication_year",
            SortField::Available => "available",
        }
    }

    /// API field name
    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::PublicationYear => "publicationYear",
            SortField::Available => "available",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `asc` in any case selects ascending order, everything else descending
    pub fn from_param(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Normalized listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: i64,
    pub per_page: i64,
    pub sort: SortField,
    pub direction: SortDirection,
    /// Trimmed, non-empty search term
    pub search: Option<String>,
}

/// Statements and bind values for one listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPlan {
    pub count_sql: String,
    pub page_sql: String,
    /// `LIKE` pattern bound once for `title` and once for `author`
    pub pattern: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl ListQuery {
    /// Apply the defaulting and clamping rules. Never fails.
    pub fn normalize(params: &BookListParams) -> Self {
        let page = params
            .page
            .as_deref()
            .and_then(parse_lenient)
            .unwrap_or(1)
            .max(1);

        let per_page = params
            .per_page
            .as_deref()
            .and_then(parse_lenient)
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);

        let sort = params
            .sort_by
            .as_deref()
            .and_then(SortField::from_param)
            .unwrap_or_default();

        let direction = params
            .sort_dir
            .as_deref()
            .map(SortDirection::from_param)
            .unwrap_or_default();

        let search = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        Self {
            page,
            per_page,
            sort,
            direction,
            search,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Build the count and page statements sharing one filter predicate
    pub fn plan(&self) -> ListPlan {
        let filter = if self.search.is_some() {
            r"(title LIKE ? ESCAPE '\' OR author LIKE ? ESCAPE '\')"
        } else {
            "1=1"
        };

        let dir = self.direction.as_sql();
        let order_by = match self.sort {
            SortField::Id => format!("id {}", dir),
            field => format!("{} {}, id {}", field.column(), dir, dir),
        };

        ListPlan {
            count_sql: format!("SELECT COUNT(*) FROM books WHERE {}", filter),
            page_sql: format!(
                "SELECT {} FROM books WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
                BOOK_COLUMNS, filter, order_by
            ),
            pattern: self.search.as_deref().map(like_pattern),
            limit: self.per_page,
            offset: self.offset(),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Number of records matching the filter
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize, ToSchema)]
#[aliases(BookPage = Page<Book>)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(items: Vec<T>, total: i64, query: &ListQuery) -> Self {
        Self {
            items,
            meta: PageMeta {
                total,
                page: query.page,
                per_page: query.per_page,
                total_pages: total_pages(total, query.per_page),
            },
        }
    }
}

pub fn total_pages(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        return 1;
    }
    (total + per_page - 1) / per_page
}

/// Parse an integer, saturating on overflow; non-numeric input yields `None`
fn parse_lenient(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

/// Substring pattern with LIKE wildcards in the term matched literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
