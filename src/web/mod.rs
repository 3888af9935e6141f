//! Server-rendered form interface.
//!
//! Every write redirects back to a page and leaves a flash message for it.
//! Bad form input never produces an error page: it becomes a "danger" flash.

pub mod flash;
pub mod pages;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::ListParams,
    error::{AppError, AppResult},
    models::{
        book::{CreateBook, UpdateBook},
        listing::ListQuery,
    },
    AppState,
};

use flash::FlashLevel;

const MSG_REQUIRED: &str = "Fill in title, author and publication year.";
const MSG_INVALID_YEAR: &str = "Invalid publication year.";
const MSG_NOT_FOUND: &str = "Book not found.";

/// Routes of the form interface
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/edit/:id", get(edit_form).post(edit))
        .route("/delete/:id", post(delete))
}

/// Fields posted by the add and edit forms
#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<String>,
    /// Checkbox: present as "on" when ticked
    pub available: Option<String>,
}

impl BookForm {
    /// Validate the form the same way the JSON API validates a new book
    pub fn into_book(self) -> Result<CreateBook, &'static str> {
        let field = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
        let title = field(self.title);
        let author = field(self.author);
        let year = field(self.publication_year);

        if title.is_empty() || author.is_empty() || year.is_empty() {
            return Err(MSG_REQUIRED);
        }
        let publication_year = year.parse::<i32>().map_err(|_| MSG_INVALID_YEAR)?;

        let book = CreateBook {
            title,
            author,
            publication_year,
            available: self.available.as_deref() == Some("on"),
        };
        match book.validate() {
            Ok(()) => Ok(book),
            Err(errors) if errors.field_errors().contains_key("publication_year") => {
                Err(MSG_INVALID_YEAR)
            }
            Err(_) => Err(MSG_REQUIRED),
        }
    }
}

async fn index(
    State(state): State<AppState>,
    ListParams(params): ListParams,
    jar: CookieJar,
) -> AppResult<(CookieJar, Html<String>)> {
    let (jar, message) = flash::take(jar);
    let query = ListQuery::normalize(&params);
    let page = state.services.catalog.search(&query).await?;
    Ok((jar, Html(pages::index(&page, &query, message.as_ref()))))
}

async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<BookForm>,
) -> AppResult<(CookieJar, Redirect)> {
    let jar = match form.into_book() {
        Ok(book) => {
            state.services.catalog.create_book(&book).await?;
            flash::push(jar, FlashLevel::Success, "Book added.")
        }
        Err(message) => flash::push(jar, FlashLevel::Danger, message),
    };
    Ok((jar, Redirect::to("/")))
}

async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> AppResult<Response> {
    match state.services.catalog.get_book(id).await {
        Ok(book) => {
            let (jar, message) = flash::take(jar);
            Ok((jar, Html(pages::edit(&book, message.as_ref()))).into_response())
        }
        Err(AppError::NotFound(_)) => Ok(not_found(jar).into_response()),
        Err(e) => Err(e),
    }
}

async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    jar: CookieJar,
    Form(form): Form<BookForm>,
) -> AppResult<(CookieJar, Redirect)> {
    let book = match form.into_book() {
        Ok(book) => book,
        Err(message) => {
            let jar = flash::push(jar, FlashLevel::Danger, message);
            return Ok((jar, Redirect::to(&format!("/edit/{}", id))));
        }
    };

    let update = UpdateBook {
        title: Some(book.title),
        author: Some(book.author),
        publication_year: Some(book.publication_year),
        available: Some(book.available),
    };
    match state.services.catalog.update_book(id, &update).await {
        Ok(_) => Ok((
            flash::push(jar, FlashLevel::Success, "Book updated."),
            Redirect::to("/"),
        )),
        Err(AppError::NotFound(_)) => Ok(not_found(jar)),
        Err(e) => Err(e),
    }
}

async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    match state.services.catalog.delete_book(id).await {
        Ok(()) => Ok((
            flash::push(jar, FlashLevel::Info, "Book removed."),
            Redirect::to("/"),
        )),
        Err(AppError::NotFound(_)) => Ok(not_found(jar)),
        Err(e) => Err(e),
    }
}

fn not_found(jar: CookieJar) -> (CookieJar, Redirect) {
    (
        flash::push(jar, FlashLevel::Warning, MSG_NOT_FOUND),
        Redirect::to("/"),
    )
}
