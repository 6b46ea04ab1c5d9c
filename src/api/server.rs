//! HTTP server for the overload calculator.
//!
//! Provides REST endpoints for spreadsheet upload and processed-workbook
//! download.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/process`    | Upload one roster, download the workbook |
//! | POST   | `/api/batch`      | Upload several rosters, JSON report      |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |

use axum::{
    extract::Multipart,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, BatchResponse};
use crate::export::{batch_workbook_bytes, workbook_bytes};
use crate::transform::pipeline::{process_batch, process_bytes, NamedInput};

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/process", post(process_upload))
        .route("/api/batch", post(batch_upload))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Overcalc server running on http://localhost:{}", port);
    println!("   POST /api/process - Upload one roster, download XLSX");
    println!("   POST /api/batch   - Upload several rosters, JSON report");
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "overcalc",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "process": "POST /api/process",
            "batch": "POST /api/batch",
            "logs": "GET /api/logs (SSE)"
        }
    }))
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

/// Read every `file` field of a multipart upload.
async fn collect_uploads(
    multipart: &mut Multipart,
) -> Result<Vec<NamedInput>, (StatusCode, Json<Value>)> {
    let mut inputs = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response(&format!("Multipart error: {}", e))),
        )
    })? {
        if field.name().unwrap_or("") != "file" {
            continue;
        }

        let name = field
            .file_name()
            .unwrap_or("upload.csv")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(error_response(&format!("Read error: {}", e))),
                )
            })?
            .to_vec();

        inputs.push(NamedInput { name, bytes });
    }

    if inputs.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(error_response("No file provided")),
        ));
    }

    Ok(inputs)
}

/// Single-file upload: process and return the workbook as an attachment.
async fn process_upload(
    mut multipart: Multipart,
) -> Result<(HeaderMap, Vec<u8>), (StatusCode, Json<Value>)> {
    let mut inputs = collect_uploads(&mut multipart).await?;
    let input = inputs.remove(0);

    println!("\n📄 NEW UPLOAD: {} ({} bytes)", input.name, input.bytes.len());

    let table = process_bytes(&input.name, &input.bytes).map_err(|e| {
        eprintln!("✗ Process error: {}", e);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(error_response(&e.to_string())),
        )
    })?;

    let bytes = workbook_bytes(&table).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&e.to_string())),
        )
    })?;

    let download_name = format!("Processed_{}", stem_of(&input.name));
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ),
    );
    if let Ok(value) = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}.xlsx\"",
        download_name
    )) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, bytes))
}

/// Batch upload: process every file independently, return a JSON report
/// with the combined workbook embedded.
async fn batch_upload(
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, (StatusCode, Json<Value>)> {
    let inputs = collect_uploads(&mut multipart).await?;

    println!("\n📄 NEW BATCH: {} file(s)", inputs.len());

    let outcome = process_batch(inputs);

    let successes: Vec<_> = outcome.successes().collect();
    let workbook = if successes.is_empty() {
        None
    } else {
        Some(batch_workbook_bytes(&successes).map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response(&e.to_string())),
            )
        })?)
    };

    let response = BatchResponse::from_outcome(&outcome, workbook);

    println!(
        "📊 BATCH DONE: {} ok, {} failed",
        response.metadata.processed_files, response.metadata.failed_files
    );

    Ok(Json(response))
}

/// File name without its extension, for the download attachment name.
fn stem_of(name: &str) -> &str {
    name.rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(name)
}
