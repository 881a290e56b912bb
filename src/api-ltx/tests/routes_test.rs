//! Integration tests for the API routes, backed by an in-memory artifact store.
//!
//! - GET /llms.txt, GET /llms-full.txt - Serve generated artifacts
//! - POST /api/generate - Regenerate everything
//! - POST /api/publish - Publish webhook
//! - DELETE /api/cache - Clear stored artifacts
//! - GET /api/artifacts - List hash records
//! - GET /health

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use indoc::indoc;
use serde_json::{Value, json};
use tower::ServiceExt;

use api_ltx::routes::router;
use core_ltx::content::{ContentTree, Domain, PageSpec, PropertyBag, keys};
use core_ltx::{ContentSnapshot, Generator, LlmsConfig, Site};
use data_model_ltx::ArtifactStore;
use worker_ltx::GenerationService;

const CONSOLIDATED: &str = indoc! {r#"
    [[languages]]
    id = "en"
    uri_segment = ""
"#};

const PER_LANGUAGE: &str = indoc! {r#"
    consolidate_languages = false

    [[languages]]
    id = "en"

    [[languages]]
    id = "de"
"#};

fn site(id: &str, host: &str, title: &str) -> Site {
    let root = PageSpec::new(&format!("{id}-root"), id, "Homepage")
        .variant("en", PropertyBag::new().with(keys::TITLE, title))
        .variant("de", PropertyBag::new().with(keys::TITLE, format!("{title} DE")))
        .child(
            PageSpec::new(&format!("{id}-about"), "about", "Page")
                .variant("en", PropertyBag::new().with(keys::TITLE, "About"))
                .variant("de", PropertyBag::new().with(keys::TITLE, "Über uns")),
        );
    Site {
        id: id.to_string(),
        name: title.to_string(),
        domains: vec![Domain::new(host)],
        tree: ContentTree::from(root),
    }
}

fn sites() -> Vec<Site> {
    vec![site("acme", "acme.test", "Acme"), site("blog", "blog.acme.test", "Blog")]
}

fn test_router(config: &str, sites: Vec<Site>) -> Router {
    let generator = Generator::new(LlmsConfig::from_toml_str(config).unwrap());
    let service = GenerationService::from_snapshot(generator, ContentSnapshot { sites }, ArtifactStore::in_memory());
    router(Arc::new(service))
}

fn get(uri: &str, host: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_router(CONSOLIDATED, sites());
    let response = app.oneshot(get("/health", "acme.test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "healthy");
}

//
// GET /llms.txt + /llms-full.txt
//

#[tokio::test]
async fn test_llms_txt_is_generated_on_first_request() {
    let app = test_router(CONSOLIDATED, sites());

    let response = app.clone().oneshot(get("/llms.txt", "acme.test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/markdown; charset=utf-8"
    );
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "public, max-age=3600");
    let body = body_text(response).await;
    assert!(body.starts_with("# Acme\n"));
    assert!(body.contains("- [About](https://acme.test/about)"));

    // Both artifacts for both dimensions of the site were stored.
    let response = app.oneshot(get("/api/artifacts", "acme.test")).await.unwrap();
    let items = body_json(response).await["items"].as_array().unwrap().clone();
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|i| i["site_id"] == "acme"));
}

#[tokio::test]
async fn test_site_is_chosen_by_host() {
    let app = test_router(CONSOLIDATED, sites());

    let blog = body_text(app.clone().oneshot(get("/llms.txt", "blog.acme.test:443")).await.unwrap()).await;
    assert!(blog.starts_with("# Blog\n"));

    // Unknown hosts fall back to the first site.
    let fallback = body_text(app.oneshot(get("/llms.txt", "elsewhere.test")).await.unwrap()).await;
    assert!(fallback.starts_with("# Acme\n"));
}

#[tokio::test]
async fn test_llms_full_txt() {
    let app = test_router(CONSOLIDATED, sites());
    let response = app.oneshot(get("/llms-full.txt", "acme.test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("### About\n\nURL: https://acme.test/about\n\n---\n"));
    assert!(!body.contains("Generated at"));
}

#[tokio::test]
async fn test_language_from_accept_language_header() {
    let app = test_router(PER_LANGUAGE, sites());
    let request = Request::builder()
        .uri("/llms.txt")
        .header(header::HOST, "acme.test")
        .header(header::ACCEPT_LANGUAGE, "de-DE,de;q=0.9,en;q=0.5")
        .body(Body::empty())
        .unwrap();
    let body = body_text(app.clone().oneshot(request).await.unwrap()).await;
    assert!(body.starts_with("# Acme DE\n"));
    assert!(body.contains("[Über uns](https://acme.test/de/about)"));

    let english = body_text(app.oneshot(get("/llms.txt", "acme.test")).await.unwrap()).await;
    assert!(english.starts_with("# Acme\n"));
}

#[tokio::test]
async fn test_llms_txt_without_sites() {
    let app = test_router(CONSOLIDATED, vec![]);
    let response = app.oneshot(get("/llms.txt", "acme.test")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "no_site"}));
}

#[tokio::test]
async fn test_force_regenerates() {
    let app = test_router(CONSOLIDATED, sites());
    let first = app.clone().oneshot(get("/llms-full.txt", "acme.test")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let forced = app.oneshot(get("/llms-full.txt?force=true", "acme.test")).await.unwrap();
    assert_eq!(forced.status(), StatusCode::OK);
}

//
// Admin
//

#[tokio::test]
async fn test_generate_all() {
    let app = test_router(CONSOLIDATED, sites());
    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/generate", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["sites"], json!(["acme", "blog"]));
    assert_eq!(report["artifacts"].as_array().unwrap().len(), 8);
    assert_eq!(report["artifacts"][0]["key"], "acme-all-index");
    assert_eq!(report["artifacts"][0]["dimension"], "all");

    let response = app
        .oneshot(json_request(Method::DELETE, "/api/cache", json!(null)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"cleared": 8}));
}

#[tokio::test]
async fn test_generate_with_host_override() {
    let app = test_router(CONSOLIDATED, sites());
    app.clone()
        .oneshot(json_request(Method::POST, "/api/generate", json!({"host": "http://localhost:3000"})))
        .await
        .unwrap();
    let body = body_text(app.oneshot(get("/llms.txt", "acme.test")).await.unwrap()).await;
    assert!(body.contains("- [About](http://localhost:3000/about)"));
}

#[tokio::test]
async fn test_generate_without_sites() {
    let app = test_router(CONSOLIDATED, vec![]);
    let response = app
        .oneshot(json_request(Method::POST, "/api/generate", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "no_sites"}));
}

#[tokio::test]
async fn test_publish_webhook() {
    let app = test_router(CONSOLIDATED, sites());
    app.clone()
        .oneshot(json_request(Method::POST, "/api/generate", json!({})))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/publish", json!({"site": "acme", "workspace": "user-jane"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(
        body_json(response).await,
        json!({"status": "ignored", "site": "acme", "workspace": "user-jane"})
    );

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/publish", json!({"site": "acme"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "regenerated");
    assert_eq!(body["site"], "acme");
    assert_eq!(body["invalidated"], 4);
    assert_eq!(body["artifacts"].as_array().unwrap().len(), 4);

    let response = app
        .oneshot(json_request(Method::POST, "/api/publish", json!({"site": " "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": "missing_site"}));
}
