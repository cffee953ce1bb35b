pub mod health;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::state::AppState;
use crate::{budget, export, generation, layout, storage};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation
        .route(
            "/api/v1/documents/generate",
            post(generation::handlers::handle_generate),
        )
        // Stored documents
        .route(
            "/api/v1/documents",
            get(storage::handlers::handle_list_documents),
        )
        .route(
            "/api/v1/documents/delete",
            post(storage::handlers::handle_delete_documents),
        )
        .route(
            "/api/v1/documents/:id",
            get(storage::handlers::handle_get_document)
                .patch(storage::handlers::handle_rename_document),
        )
        // Pagination & budget
        .route(
            "/api/v1/documents/:id/toc",
            get(layout::handlers::handle_get_toc),
        )
        .route(
            "/api/v1/documents/:id/estimate",
            post(budget::handlers::handle_estimate),
        )
        // Export
        .route(
            "/api/v1/documents/:id/export/pdf",
            post(export::handlers::handle_export_pdf),
        )
        .route(
            "/api/v1/documents/:id/export/doc",
            post(export::handlers::handle_export_doc),
        )
        .with_state(state)
}

/// Any origin when none are configured, otherwise exactly the listed ones.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::content::{ContentModel, Cover, DocumentKind, Language, Section};
    use crate::export::{ExportPipeline, ExportSettings, PageGeometry, SvgRenderer};
    use crate::generation::{
        GeminiGenerationService, GenerationError, GenerationRequest, GenerationService,
    };
    use crate::llm_client::LlmClient;
    use crate::storage::{DocumentStore, InMemoryDocumentStore};

    /// Returns the same document for every request, stamped with the requester's kind.
    struct FixedGenerator(ContentModel);

    #[async_trait]
    impl GenerationService for FixedGenerator {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<ContentModel, GenerationError> {
            let mut model = self.0.clone();
            model.kind = request.kind;
            Ok(model)
        }
    }

    fn make_model() -> ContentModel {
        ContentModel {
            title: "Urban Water Supply".to_string(),
            kind: DocumentKind::Presentation,
            language: Language::En,
            cover: Some(Cover {
                title: "Urban Water Supply".to_string(),
                subtitle: Some("Challenges in growing cities".to_string()),
                author: "Ada Mbeki".to_string(),
                supervisor: Some("Dr. Ngo".to_string()),
                date: None,
                institution: Some("Université de Douala".to_string()),
                institution_logo: None,
                jurisdiction_symbol: None,
                level: Some("Licence 2".to_string()),
            }),
            introduction: "Water is scarce.".to_string(),
            sections: ["Sources", "Networks", "Pricing"]
                .iter()
                .map(|h| Section {
                    heading: h.to_string(),
                    body: format!("All about {h}."),
                    visual_hint: None,
                    is_color_recommended: *h == "Networks",
                })
                .collect(),
            conclusion: "Act now.".to_string(),
            bibliography: vec![],
            qa: vec![],
            speech: None,
            estimated_pages: 7,
            recommendation: None,
        }
    }

    fn make_state(generator: Arc<dyn GenerationService>) -> (AppState, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::default());
        let renderer = SvgRenderer::with_fontdb(
            PageGeometry::new(0.25),
            Arc::new(usvg::fontdb::Database::new()),
        );
        let state = AppState {
            store: store.clone(),
            generator,
            exporter: Arc::new(ExportPipeline::new(
                Arc::new(renderer),
                ExportSettings::default(),
            )),
            archive: None,
            config: Config::default(),
        };
        (state, store)
    }

    fn make_router() -> (Router, Arc<InMemoryDocumentStore>) {
        let (state, store) = make_state(Arc::new(FixedGenerator(make_model())));
        (build_router(state), store)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn seed(store: &InMemoryDocumentStore) -> Uuid {
        store.save(&make_model(), "owner-1").await.unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_only_configured_origins() {
        let (router, _) = make_router();
        let router = router.layer(cors_layer(&["https://folio.example".to_string()]).unwrap());

        for (origin, allowed) in [("https://folio.example", true), ("https://evil.example", false)] {
            let request = Request::builder()
                .uri("/health")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(
                response
                    .headers()
                    .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN),
                allowed,
                "{origin}"
            );
        }

        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = make_router();
        let (status, body) = send(&router, empty_request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "folio-api");
    }

    #[tokio::test]
    async fn test_generate_saves_and_estimates() {
        let (router, store) = make_router();
        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/v1/documents/generate",
                json!({
                    "owner_id": "owner-1",
                    "author_name": "Ada Mbeki",
                    "topic": "Urban water supply",
                    "prices": {"currency": "XAF", "black_white": "25", "color": "100"},
                    "budget": "100"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_slice(&body).unwrap();
        let id: Uuid = serde_json::from_value(body["document_id"].clone()).unwrap();
        assert_eq!(store.get(id).await.unwrap().title, "Urban Water Supply");

        // 6 black-and-white pages at 25 plus one colour page at 100.
        assert_eq!(body["estimate"]["pages"], 7);
        assert_eq!(body["estimate"]["over_budget"], true);

        let toc = body["toc"].as_array().unwrap();
        assert_eq!(toc.len(), 5);
        assert_eq!(toc[0]["page_number"], 1);
    }

    #[tokio::test]
    async fn test_generate_without_key_is_missing_credential() {
        let llm = LlmClient::with_base_url("http://127.0.0.1:9").unwrap();
        let (state, store) = make_state(Arc::new(GeminiGenerationService::new(llm, None)));
        let router = build_router(state);

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/v1/documents/generate",
                json!({"owner_id": "o", "author_name": "A", "topic": "T"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
        assert!(store.list("o").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_topic() {
        let (router, _) = make_router();
        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/v1/documents/generate",
                json!({"owner_id": "o", "author_name": "A", "topic": "  "}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_list_requires_owner() {
        let (router, store) = make_router();
        seed(&store).await;

        let (status, body) = send(
            &router,
            empty_request(Method::GET, "/api/v1/documents?owner_id=owner-1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["documents"].as_array().unwrap().len(), 1);
        assert_eq!(body["documents"][0]["kind"], "presentation");

        let (status, _) = send(
            &router,
            empty_request(Method::GET, "/api/v1/documents?owner_id="),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let (router, _) = make_router();
        let uri = format!("/api/v1/documents/{}/toc", Uuid::new_v4());
        let (status, body) = send(&router, empty_request(Method::GET, &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_toc_numbers_are_contiguous_from_one() {
        let (router, store) = make_router();
        let id = seed(&store).await;

        let uri = format!("/api/v1/documents/{id}/toc");
        let (status, body) = send(&router, empty_request(Method::GET, &uri)).await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_slice(&body).unwrap();
        let pages: Vec<u64> = body["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["page_number"].as_u64().unwrap())
            .collect();
        assert_eq!(pages, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_estimate_against_new_budget() {
        let (router, store) = make_router();
        let id = seed(&store).await;

        let uri = format!("/api/v1/documents/{id}/estimate");
        let (status, body) = send(
            &router,
            json_request(Method::POST, &uri, json!({"budget": "250"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["over_budget"], false);

        let (status, _) = send(
            &router,
            json_request(Method::POST, &uri, json!({"budget": "-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                &uri,
                json!({
                    "prices": {"currency": "XAF", "black_white": "79228162514264337593543950335", "color": "100"},
                    "budget": "250"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_export_pdf_has_one_page_per_block() {
        let (router, store) = make_router();
        let id = seed(&store).await;

        let uri = format!("/api/v1/documents/{id}/export/pdf");
        let response = router
            .clone()
            .oneshot(empty_request(Method::POST, &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"folio-urban-water-supply.pdf\""
        );
        assert_eq!(response.headers()["x-page-count"], "7");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let pdf = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(pdf.get_pages().len(), 7);
    }

    #[tokio::test]
    async fn test_export_doc_matches_pdf_page_count() {
        let (router, store) = make_router();
        let id = seed(&store).await;

        let uri = format!("/api/v1/documents/{id}/export/doc");
        let (status, body) = send(&router, empty_request(Method::POST, &uri)).await;
        assert_eq!(status, StatusCode::OK);

        let html = String::from_utf8(body).unwrap();
        assert_eq!(html.matches("class=\"page ").count(), 7);
        assert!(html.contains("Urban Water Supply"));
    }

    #[tokio::test]
    async fn test_export_with_corrupt_logo_fails_on_cover() {
        let (router, store) = make_router();
        let id = seed(&store).await;

        let boundary = "folio-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"logo\"; filename=\"logo.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             not-an-image\r\n\
             --{boundary}--\r\n"
        );

        for format in ["pdf", "doc"] {
            let request = Request::builder()
                .method(Method::POST)
                .uri(format!("/api/v1/documents/{id}/export/{format}"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body.clone()))
                .unwrap();

            let (status, response) = send(&router, request).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{format}");
            let response: Value = serde_json::from_slice(&response).unwrap();
            assert_eq!(response["error"]["code"], "RASTERIZATION_FAILED");
        }
    }

    #[tokio::test]
    async fn test_rename_then_delete() {
        let (router, store) = make_router();
        let id = seed(&store).await;
        let uri = format!("/api/v1/documents/{id}");

        let (status, body) = send(
            &router,
            json_request(Method::PATCH, &uri, json!({"title": "Water in Douala"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["title"], "Water in Douala");

        let (status, _) = send(
            &router,
            json_request(Method::PATCH, &uri, json!({"title": " "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/api/v1/documents/delete",
                json!({"ids": [id, Uuid::new_v4()]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["deleted"], 1);

        let (status, _) = send(&router, empty_request(Method::GET, &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
