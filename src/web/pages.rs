//! HTML rendering for the form interface

use super::flash::Flash;
use crate::models::{
    book::Book,
    listing::{ListQuery, Page, SortDirection, SortField},
};

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 2rem auto; max-width: 60rem; color: #222; }
table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
th, td { border-bottom: 1px solid #ddd; padding: .4rem .6rem; text-align: left; }
form.inline { display: inline; }
fieldset { border: 1px solid #ccc; margin-bottom: 1rem; }
label { display: block; margin: .3rem 0; }
.flash { padding: .6rem 1rem; border-radius: 4px; margin-bottom: 1rem; }
.flash-success { background: #d1e7dd; }
.flash-danger { background: #f8d7da; }
.flash-info { background: #cff4fc; }
.flash-warning { background: #fff3cd; }
.pager a, .pager span { margin-right: .5rem; }
"#;

/// Escape text for HTML element content and quoted attribute values
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encode a query string value
fn encode_query_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let flash = flash
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<h1>{title}</h1>
{flash}
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

fn list_href(query: &ListQuery, page: i64, sort: SortField, direction: SortDirection) -> String {
    let mut href = format!(
        "/?page={}&perPage={}&sortBy={}&sortDir={}",
        page,
        query.per_page,
        sort.as_param(),
        direction.as_param()
    );
    if let Some(ref q) = query.search {
        href.push_str("&q=");
        href.push_str(&encode_query_value(q));
    }
    href
}

fn sort_header(query: &ListQuery, field: SortField, label: &str) -> String {
    let (direction, marker) = match (query.sort == field, query.direction) {
        (true, SortDirection::Asc) => (SortDirection::Desc, " &#9650;"),
        (true, SortDirection::Desc) => (SortDirection::Asc, " &#9660;"),
        (false, _) => (SortDirection::Asc, ""),
    };
    format!(
        r#"<th><a href="{}">{}</a>{}</th>"#,
        escape(&list_href(query, 1, field, direction)),
        label,
        marker
    )
}

/// Listing page with the creation form, search box and pager
pub fn index(page: &Page<Book>, query: &ListQuery, flash: Option<&Flash>) -> String {
    let mut body = String::new();

    body.push_str(
        r#"<fieldset>
<legend>Add a book</legend>
<form method="post" action="/">
<label>Title <input name="title" required></label>
<label>Author <input name="author" required></label>
<label>Publication year <input name="publication_year" type="number" min="0" max="9999" required></label>
<label><input name="available" type="checkbox" checked> Available</label>
<button type="submit">Add</button>
</form>
</fieldset>
"#,
    );

    body.push_str(&format!(
        r#"<form method="get" action="/">
<input name="q" value="{}" placeholder="Search title or author">
<input type="hidden" name="perPage" value="{}">
<button type="submit">Search</button>
</form>
"#,
        escape(query.search.as_deref().unwrap_or_default()),
        query.per_page
    ));

    if page.items.is_empty() {
        body.push_str("<p>No books found.</p>\n");
    } else {
        body.push_str("<table>\n<thead><tr>");
        body.push_str(&sort_header(query, SortField::Id, "ID"));
        body.push_str(&sort_header(query, SortField::Title, "Title"));
        body.push_str(&sort_header(query, SortField::Author, "Author"));
        body.push_str(&sort_header(query, SortField::PublicationYear, "Year"));
        body.push_str(&sort_header(query, SortField::Available, "Available"));
        body.push_str("<th></th></tr></thead>\n<tbody>\n");

        for book in &page.items {
            body.push_str(&format!(
                r#"<tr><td>{id}</td><td>{title}</td><td>{author}</td><td>{year}</td><td>{available}</td><td><a href="/edit/{id}">Edit</a> <form class="inline" method="post" action="/delete/{id}"><button type="submit">Delete</button></form></td></tr>
"#,
                id = book.id,
                title = escape(&book.title),
                author = escape(&book.author),
                year = book.publication_year,
                available = if book.available { "Yes" } else { "No" },
            ));
        }
        body.push_str("</tbody>\n</table>\n");
    }

    let meta = &page.meta;
    body.push_str(r#"<p class="pager">"#);
    if meta.page > 1 {
        body.push_str(&format!(
            r#"<a href="{}">&laquo; Previous</a>"#,
            escape(&list_href(query, meta.page - 1, query.sort, query.direction))
        ));
    }
    body.push_str(&format!(
        "<span>Page {} of {} ({} books)</span>",
        meta.page,
        meta.total_pages.max(1),
        meta.total
    ));
    if meta.page < meta.total_pages {
        body.push_str(&format!(
            r#"<a href="{}">Next &raquo;</a>"#,
            escape(&list_href(query, meta.page + 1, query.sort, query.direction))
        ));
    }
    body.push_str("</p>\n");

    layout("Library", flash, &body)
}

/// Edit form pre-filled with the stored values
pub fn edit(book: &Book, flash: Option<&Flash>) -> String {
    let body = format!(
        r#"<form method="post" action="/edit/{id}">
<label>Title <input name="title" value="{title}" required></label>
<label>Author <input name="author" value="{author}" required></label>
<label>Publication year <input name="publication_year" type="number" min="0" max="9999" value="{year}" required></label>
<label><input name="available" type="checkbox"{checked}> Available</label>
<button type="submit">Save</button>
<a href="/">Cancel</a>
</form>
"#,
        id = book.id,
        title = escape(&book.title),
        author = escape(&book.author),
        year = book.publication_year,
        checked = if book.available { " checked" } else { "" },
    );

    layout(&format!("Edit book #{}", book.id), flash, &body)
}
