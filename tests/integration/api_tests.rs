//! API integration tests
//!
//! Each test starts the real router on an ephemeral port and talks to it
//! over HTTP, either directly with reqwest or through `RemoteStore`.

use std::sync::Arc;

use bookdesk::{
    api,
    error::ErrorKind,
    models::book::{BookDraft, BookPatch, BookStatus},
    models::image::is_well_formed,
    repository::{LocalStore, RecordStore, RemoteStore},
    services::{BookCache, BookForm, Dashboard, GenreFilter, NoticeLevel},
    AppConfig, AppState,
};
use reqwest::Client;
use serde_json::{json, Value};

/// Serve a fresh in-memory store; returns the base URL
async fn spawn_server() -> String {
    let state = AppState {
        store: Arc::new(LocalStore::in_memory()),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    format!("http://{}", addr)
}

fn draft(title: &str, author: &str, genre: Option<&str>) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        author: author.to_string(),
        genre: genre.map(str::to_string),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_health_check() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_crud_over_http() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base))
        .json(&json!({ "title": "Dune", "author": "Herbert", "genre": "SciFi" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.expect("Failed to parse response");
    let id = created["id"].as_str().expect("No id in response").to_string();

    let response = client
        .put(format!("{}/books/{}", base, id))
        .json(&json!({ "status": "Issued" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["status"], "Issued");
    assert_eq!(updated["title"], "Dune");

    let response = client
        .delete(format!("{}/books/{}", base, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/books/{}", base, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_remote_store_round_trip() {
    let base = spawn_server().await;
    let store = RemoteStore::new(&base).expect("Invalid base URL");

    let created = store
        .create(&draft("Dune", "Herbert", None))
        .await
        .expect("Create failed");
    let image = created.image_url.clone().expect("No image reference");
    assert!(is_well_formed(&image));
    assert!(image.contains("Dune"));

    let fetched = store.get(&created.id).await.expect("Get failed");
    assert_eq!(fetched, created);

    let patch = BookPatch {
        genre: Some(Some("SciFi".into())),
        ..Default::default()
    };
    let updated = store.update(&created.id, &patch).await.expect("Update failed");
    assert_eq!(updated.id, created.id);
    assert!(updated.image_url.as_deref().is_some_and(|u| u.contains("SciFi")));

    store.delete(&created.id).await.expect("Delete failed");
    assert!(store.list().await.expect("List failed").is_empty());
}

#[tokio::test]
async fn test_remote_store_error_kinds() {
    let base = spawn_server().await;
    let store = RemoteStore::new(&base).expect("Invalid base URL");

    let err = store.get("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = store
        .update("missing", &BookPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = store.create(&draft("Dune", " ", None)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("Author is required"));
}

#[tokio::test]
async fn test_unreachable_service_is_io_failure() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);

    let store: Arc<dyn RecordStore> =
        Arc::new(RemoteStore::new(&format!("http://{}", addr)).expect("Invalid base URL"));
    let cache = BookCache::new(store);
    let mut notices = cache.notices();

    let err = cache.query().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);

    let err = cache.create(draft("Dune", "Herbert", None)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IoFailure);
    let notice = notices.try_recv().expect("No notice sent");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Failed to add book. Please try again.");
}

#[tokio::test]
async fn test_dashboard_against_server() {
    let base = spawn_server().await;
    let config = AppConfig {
        api: bookdesk::config::ApiConfig { base_url: base },
        ..AppConfig::default()
    };
    let mut dashboard = Dashboard::connect(&config).expect("Failed to connect");

    for i in 0..6 {
        let mut form = BookForm::new();
        form.set_title(format!("Fantasy {}", i));
        form.set_author("Author");
        form.set_genre("Fantasy");
        dashboard.save(&mut form, None).await.expect("Save failed");
    }
    for i in 0..4 {
        let mut form = BookForm::new();
        form.set_title(format!("SciFi {}", i));
        form.set_author("Author");
        form.set_genre("SciFi");
        form.set_status(BookStatus::Issued);
        dashboard.save(&mut form, None).await.expect("Save failed");
    }

    let page = dashboard.view().await.expect("View failed");
    assert_eq!(page.total_matches, 10);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.books.len(), 8);

    dashboard.next_page().await.expect("Paging failed");
    assert_eq!(dashboard.view().await.expect("View failed").books.len(), 2);

    dashboard.set_genre(GenreFilter::Genre("SciFi".into()));
    let page = dashboard.view().await.expect("View failed");
    assert_eq!(page.page, 1);
    assert_eq!(page.books.len(), 4);
    assert!(page.books.iter().all(|b| b.status == BookStatus::Issued));

    let victim = page.books[0].id.clone();
    dashboard.delete(&victim).await.expect("Delete failed");
    let page = dashboard.view().await.expect("View failed");
    assert_eq!(page.total_matches, 3);
    assert!(page.books.iter().all(|b| b.id != victim));
}
