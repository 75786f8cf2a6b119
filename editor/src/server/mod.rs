//! Development REST server implementing the export definition contract.
//!
//! Backed by an in-memory [`DevStore`]; nothing survives a restart.
//!
//! # API Endpoints
//!
//! | Method | Path                            | Description                 |
//! |--------|---------------------------------|-----------------------------|
//! | GET    | `/health`                       | Health check                |
//! | GET    | `/api/forms`                    | Form snapshots              |
//! | GET    | `/api/export-definitions`       | All definitions             |
//! | POST   | `/api/export-definitions`       | Create a definition         |
//! | GET    | `/api/export-definitions/{id}`  | One definition              |
//! | PUT    | `/api/export-definitions/{id}`  | Update a definition         |
//! | GET    | `/api/logs`                     | SSE stream of log entries   |

pub mod store;

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use crate::config::{EXPORT_DEFINITION_PATH, FORM_DATA_PATH};
use crate::logs::{log_info, log_warning, LOG_BROADCASTER};
use crate::models::{ExportDefinitionPayload, ExportDefinitionResource, FormSnapshot};

pub use store::{DevStore, StoredDefinition};

type SharedStore = Arc<RwLock<DevStore>>;
type ApiError = (StatusCode, Json<Value>);

/// Router over `store`, ready to be served.
pub fn router(store: DevStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let definition_item = format!("{}/{{id}}", EXPORT_DEFINITION_PATH);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route(FORM_DATA_PATH, get(list_forms))
        .route(
            EXPORT_DEFINITION_PATH,
            get(list_definitions).post(create_definition),
        )
        .route(&definition_item, get(get_definition).put(update_definition))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(Arc::new(RwLock::new(store)))
}

/// Start the HTTP server
pub async fn start_server(port: u16, store: DevStore) -> Result<(), Box<dyn std::error::Error>> {
    let forms = store.forms.len();
    let definitions = store.definitions.len();
    let app = router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Export definition dev server on http://localhost:{}", port);
    println!("   GET      {}", FORM_DATA_PATH);
    println!("   GET/POST {}", EXPORT_DEFINITION_PATH);
    println!("   GET/PUT  {}/{{id}}", EXPORT_DEFINITION_PATH);
    println!("   GET      /api/logs (SSE)");
    println!("   Seeded with {} form(s), {} definition(s)", forms, definitions);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "formexport",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_forms(State(store): State<SharedStore>) -> Json<Vec<FormSnapshot>> {
    Json(store.read().await.forms.clone())
}

async fn list_definitions(State(store): State<SharedStore>) -> Json<Vec<StoredDefinition>> {
    Json(store.read().await.definitions.clone())
}

async fn get_definition(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<ExportDefinitionResource>, ApiError> {
    store
        .read()
        .await
        .get(&id)
        .cloned()
        .map(|stored| Json(stored.into()))
        .ok_or_else(|| not_found(&id))
}

async fn create_definition(
    State(store): State<SharedStore>,
    Json(payload): Json<ExportDefinitionPayload>,
) -> (StatusCode, Json<StoredDefinition>) {
    let stored = store.write().await.create(payload);
    log_info(format!(
        "Created export definition {} ({} field(s))",
        stored.identity,
        stored.definition.len()
    ));
    (StatusCode::CREATED, Json(stored))
}

async fn update_definition(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    Json(payload): Json<ExportDefinitionPayload>,
) -> Result<Json<StoredDefinition>, ApiError> {
    let stored = store
        .write()
        .await
        .update(&id, payload)
        .ok_or_else(|| not_found(&id))?;
    log_info(format!(
        "Updated export definition {} ({} field(s))",
        stored.identity,
        stored.definition.len()
    ));
    Ok(Json(stored))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn not_found(id: &str) -> ApiError {
    log_warning(format!("Unknown export definition {}", id));
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("Export definition not found: {}", id) })),
    )
}
