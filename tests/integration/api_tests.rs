//! API integration tests

mod common;

use book_catalog_server::config::AppConfig;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

use common::{spawn_default_server, spawn_server, TestServer};

async fn create(server: &TestServer, body: Value) -> Value {
    let response = server
        .client
        .post(server.url("/books"))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse response")
}

async fn get_json(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let response = server
        .client
        .get(server.url(path))
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    (status, response.json().await.expect("Failed to parse response"))
}

async fn seed_two(server: &TestServer) {
    create(
        server,
        json!({ "title": "Algorithms 101", "author": "M. Silva", "publicationYear": 2010 }),
    )
    .await;
    create(
        server,
        json!({ "title": "Databases", "author": "J. Souza", "publicationYear": 2018, "available": false }),
    )
    .await;
}

fn flash_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("flash="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

#[tokio::test]
async fn test_health_check() {
    let server = spawn_default_server().await;

    let (status, body) = get_json(&server, "/health").await;
    assert!(status.is_success());
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&server, "/ready").await;
    assert!(status.is_success());
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_then_get_roundtrip() {
    let server = spawn_default_server().await;

    let created = create(
        &server,
        json!({
            "title": "Algorithms 101",
            "author": "M. Silva",
            "publicationYear": 2010,
            "available": true
        }),
    )
    .await;
    let id = created["id"].as_i64().expect("No book ID");

    let (status, fetched) = get_json(&server, &format!("/books/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(
        fetched,
        json!({
            "id": id,
            "title": "Algorithms 101",
            "author": "M. Silva",
            "publicationYear": 2010,
            "available": true
        })
    );
}

#[tokio::test]
async fn test_get_missing_book() {
    let server = spawn_default_server().await;

    let (status, body) = get_json(&server, "/books/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book 42 not found");
    assert_eq!(body["error"], "NoSuchBook");
}

#[tokio::test]
async fn test_delete_twice() {
    let server = spawn_default_server().await;
    seed_two(&server).await;

    let response = server
        .client
        .delete(server.url("/books/1"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = get_json(&server, "/books/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = server
        .client
        .delete(server.url("/books/1"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_past_the_end() {
    let server = spawn_default_server().await;
    seed_two(&server).await;

    let (status, body) = get_json(&server, "/books?page=5&perPage=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["meta"]["page"], 5);
    assert_eq!(body["meta"]["totalPages"], 1);
}

#[tokio::test]
async fn test_search_filter() {
    let server = spawn_default_server().await;
    seed_two(&server).await;

    let (status, body) = get_json(&server, "/books?q=algo").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().expect("items is an array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Algorithms 101");
    assert_eq!(body["meta"]["total"], 1);

    let (_, body) = get_json(&server, "/books?q=souza").await;
    assert_eq!(body["items"][0]["title"], "Databases");
}

#[tokio::test]
async fn test_malformed_listing_params_are_normalized() {
    let server = spawn_default_server().await;
    seed_two(&server).await;

    let (status, body) = get_json(
        &server,
        "/books?page=-3&perPage=100000000000000000000000&sortBy=price&sortDir=sideways",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["perPage"], 100);
    assert_eq!(body["items"][0]["id"], 2);
    assert_eq!(body["items"][1]["id"], 1);

    let (status, body) = get_json(&server, "/books?page=abc&perPage=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["perPage"], 10);
}

#[tokio::test]
async fn test_repeated_listing_keys_keep_first_value() {
    let server = spawn_default_server().await;
    seed_two(&server).await;

    let (status, body) = get_json(
        &server,
        "/books?page=2&page=1&perPage=1&perPage=50&sortBy=title&sortBy=id&sortDir=asc&sortDir=desc",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["page"], 2);
    assert_eq!(body["meta"]["perPage"], 1);
    assert_eq!(body["meta"]["totalPages"], 2);
    assert_eq!(body["items"][0]["title"], "Databases");

    let response = server
        .client
        .get(server.url("/?page=1&page=2&q=algo&q=souza"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.expect("Failed to read body");
    assert!(html.contains("<td>Algorithms 101</td>"));
    assert!(!html.contains("<td>Databases</td>"));
}

#[tokio::test]
async fn test_malformed_book_id_is_json_error() {
    let server = spawn_default_server().await;

    let (status, body) = get_json(&server, "/books/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["code"], 18);

    let response = server
        .client
        .delete(server.url("/books/abc"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sort_by_title_ascending() {
    let server = spawn_default_server().await;
    create(
        &server,
        json!({ "title": "Zen", "author": "A", "publicationYear": 1 }),
    )
    .await;
    seed_two(&server).await;

    let (_, body) = get_json(&server, "/books?sortBy=title&sortDir=Asc").await;
    let titles: Vec<&str> = body["items"]
        .as_array()
        .expect("items is an array")
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Algorithms 101", "Databases", "Zen"]);
}

#[tokio::test]
async fn test_partial_update() {
    let server = spawn_default_server().await;
    seed_two(&server).await;

    let response = server
        .client
        .put(server.url("/books/1"))
        .json(&json!({ "available": false }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let (_, book) = get_json(&server, "/books/1").await;
    assert_eq!(book["available"], false);
    assert_eq!(book["title"], "Algorithms 101");
    assert_eq!(book["author"], "M. Silva");
    assert_eq!(book["publicationYear"], 2010);
}

#[tokio::test]
async fn test_update_missing_book() {
    let server = spawn_default_server().await;

    let response = server
        .client
        .put(server.url("/books/9"))
        .json(&json!({ "title": "Nothing" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_rejects_invalid_fields() {
    let server = spawn_default_server().await;

    let response = server
        .client
        .post(server.url("/books"))
        .json(&json!({ "title": "   ", "author": "X", "publicationYear": 20000 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["details"]["title"].is_array());
    assert!(body["details"]["publicationYear"].is_array());
    assert!(body["details"].get("author").is_none());

    let (_, stats) = get_json(&server, "/stats").await;
    assert_eq!(stats["total"], 0);
}

#[tokio::test]
async fn test_create_rejects_non_numeric_year() {
    let server = spawn_default_server().await;

    let response = server
        .client
        .post(server.url("/books"))
        .json(&json!({ "title": "T", "author": "A", "publicationYear": "nineteen" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_stats() {
    let server = spawn_default_server().await;

    let (status, body) = get_json(&server, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "total": 0, "available": 0, "unavailable": 0, "yearMin": null, "yearMax": null })
    );

    seed_two(&server).await;
    let (_, body) = get_json(&server, "/stats").await;
    assert_eq!(
        body,
        json!({ "total": 2, "available": 1, "unavailable": 1, "yearMin": 2010, "yearMax": 2018 })
    );
}

#[tokio::test]
async fn test_writes_require_secret_when_configured() {
    let mut config = AppConfig::default();
    config.auth.api_secret = Some("s3cret".to_string());
    let server = spawn_server(config).await;
    let book = json!({ "title": "T", "author": "A", "publicationYear": 2000 });

    let response = server
        .client
        .post(server.url("/books"))
        .json(&book)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server
        .client
        .post(server.url("/books"))
        .header("x-api-key", "wrong")
        .json(&book)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server
        .client
        .post(server.url("/books"))
        .header("x-api-key", "s3cret")
        .json(&book)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = server
        .client
        .delete(server.url("/books/1"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Reads are never gated
    let (status, body) = get_json(&server, "/books/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "T");
}

#[tokio::test]
async fn test_form_create_sets_flash_and_lists_book() {
    let server = spawn_default_server().await;

    let response = server
        .client
        .post(server.url("/"))
        .form(&[
            ("title", "  Dom Casmurro "),
            ("author", "Machado de Assis"),
            ("publication_year", "1899"),
            ("available", "on"),
        ])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    let cookie = flash_cookie(&response).expect("No flash cookie");

    let response = server
        .client
        .get(server.url("/"))
        .header(header::COOKIE, cookie)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.expect("Failed to read body");
    assert!(html.contains("Book added."));
    assert!(html.contains("<td>Dom Casmurro</td>"));

    let (_, book) = get_json(&server, "/books/1").await;
    assert_eq!(book["available"], true);
    assert_eq!(book["publicationYear"], 1899);
}

#[tokio::test]
async fn test_form_rejects_invalid_year() {
    let server = spawn_default_server().await;

    let response = server
        .client
        .post(server.url("/"))
        .form(&[("title", "T"), ("author", "A"), ("publication_year", "soon")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = flash_cookie(&response).expect("No flash cookie");

    let html = server
        .client
        .get(server.url("/"))
        .header(header::COOKIE, cookie)
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read body");
    assert!(html.contains(r#"<div class="flash flash-danger">Invalid publication year.</div>"#));

    let (_, stats) = get_json(&server, "/stats").await;
    assert_eq!(stats["total"], 0);
}

#[tokio::test]
async fn test_form_edit_and_delete() {
    let server = spawn_default_server().await;
    seed_two(&server).await;

    let response = server
        .client
        .get(server.url("/edit/2"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.expect("Failed to read body");
    assert!(html.contains(r#"value="Databases""#));

    let response = server
        .client
        .post(server.url("/edit/2"))
        .form(&[
            ("title", "Databases, 2nd ed."),
            ("author", "J. Souza"),
            ("publication_year", "2021"),
            ("available", "on"),
        ])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let (_, book) = get_json(&server, "/books/2").await;
    assert_eq!(book["title"], "Databases, 2nd ed.");
    assert_eq!(book["publicationYear"], 2021);
    assert_eq!(book["available"], true);

    let response = server
        .client
        .post(server.url("/edit/2"))
        .form(&[("title", ""), ("author", "J. Souza"), ("publication_year", "2021")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.headers()[header::LOCATION], "/edit/2");

    let response = server
        .client
        .post(server.url("/delete/2"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let (status, _) = get_json(&server, "/books/2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = server
        .client
        .get(server.url("/edit/2"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(flash_cookie(&response).is_some());
}

#[tokio::test]
async fn test_form_interface_can_be_disabled() {
    let mut config = AppConfig::default();
    config.web.enabled = false;
    let server = spawn_server(config).await;

    let response = server
        .client
        .get(server.url("/"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
