//! HTTP server for the Promoview dashboards.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                               |
//! |--------|-------------------|-------------------------------------------|
//! | GET    | `/health`         | Health check                              |
//! | POST   | `/api/upload`     | Upload a CSV, summarize, start a session  |
//! | GET    | `/api/summary`    | Summary of the current session            |
//! | GET    | `/api/charts`     | Chart series of the current session       |
//! | GET    | `/api/logs`       | SSE stream for real-time logs             |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, waiting_response, ChartsResponse, UploadResponse};
use crate::config::{ServerConfig, SSE_KEEP_ALIVE_SECS};
use crate::error::{PipelineError, ServerError};
use crate::models::Variant;
use crate::session::SessionStore;
use crate::transform::pipeline::{summarize_bytes, PipelineOptions};

/// State shared by every handler.
#[derive(Clone, Default)]
pub struct AppState {
    pub sessions: SessionStore,
}

type ApiError = (StatusCode, Json<Value>);

/// Build the router (without binding a socket).
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload_csv))
        .route("/api/summary", get(current_summary))
        .route("/api/charts", get(current_charts))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState::default(), &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 Promoview server running on http://localhost:{}", config.port);
    println!("   POST /api/upload  - Upload CSV file");
    println!("   GET  /api/summary - Current summary");
    println!("   GET  /api/charts  - Current chart series");
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "promoview",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "summary": "GET /api/summary",
            "charts": "GET /api/charts",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip what they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEP_ALIVE_SECS))
            .text("keep-alive"),
    )
}

/// Upload CSV endpoint
async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut variant = Variant::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(ServerError::BadRequest(format!("Multipart error: {}", e))))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(ServerError::BadRequest(format!("Read error: {}", e))))?;
                file_data = Some(bytes.to_vec());
            }
            "variant" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| api_error(ServerError::BadRequest(format!("Read error: {}", e))))?;
                variant = text
                    .parse()
                    .map_err(|e: String| api_error(ServerError::BadRequest(e)))?;
            }
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| api_error(ServerError::BadRequest("No file provided".into())))?;

    log_info(format!(
        "📄 New upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let options = PipelineOptions {
        variant,
        ..Default::default()
    };

    let result = tokio::task::spawn_blocking(move || summarize_bytes(&bytes, options))
        .await
        .map_err(|e| api_error(ServerError::Internal(e.to_string())))?
        .map_err(|e| api_error(ServerError::Pipeline(e)))?;

    let session = state.sessions.replace(result, file_name).await;

    Ok(Json(UploadResponse::from(session.as_ref())))
}

/// Summary of the current session, or the waiting state
async fn current_summary(State(state): State<AppState>) -> Response {
    match state.sessions.current().await {
        Some(session) => Json(UploadResponse::from(session.as_ref())).into_response(),
        None => Json(waiting_response()).into_response(),
    }
}

/// Chart series of the current session, or the waiting state
async fn current_charts(State(state): State<AppState>) -> Response {
    match state.sessions.current().await {
        Some(session) => Json(ChartsResponse::from(session.as_ref())).into_response(),
        None => Json(waiting_response()).into_response(),
    }
}

/// Map an error to its HTTP status and JSON body.
fn api_error(err: ServerError) -> ApiError {
    let (status, kind) = match &err {
        ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        ServerError::Pipeline(e) => {
            let kind = match e {
                PipelineError::Csv(_) => "csv",
                PipelineError::Schema(_) => "schema",
                PipelineError::Parse(_) => "parse",
                PipelineError::EmptyInput => "empty_input",
                PipelineError::Overflow { .. } => "overflow",
                PipelineError::Validation(_) => "validation",
                PipelineError::Io(_) => "io",
            };
            let status = if e.is_input_error() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, kind)
        }
    };

    log_error(err.to_string());
    (status, Json(error_response(kind, &err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "promoview-test-boundary";

    const CSV: &str = "cod_canal,des_categoria_material,cod_ciclo,vlr_desconto_real,\
        vlr_rbv_tabela_so_tt,vlr_rbv_real_so_tt,vlr_preco_base,vlr_preco_venda,\
        vlr_preco_tabela,vlr_desconto_real2\n\
        A,X,\"2,024\",10,200,100,,,,\n\
        B,X,202401,5,50,50,,,,\n";

    /// A multipart form: `(name, file name, content)` per field.
    fn multipart_body(fields: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, content) in fields {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, file_name
                    ));
                    body.push_str("Content-Type: text/csv\r\n");
                }
                None => {
                    body.push_str(&format!("Content-Disposition: form-data; name=\"{}\"\r\n", name));
                }
            }
            body.push_str("\r\n");
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    async fn upload(state: &AppState, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        let response = router(state.clone(), &ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_upload_stores_session() {
        let state = AppState::default();

        let (status, body) = upload(&state, multipart_body(&[("file", Some("promo.csv"), CSV)])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["fileName"], "promo.csv");
        assert_eq!(body["metadata"]["variant"], "extended");
        assert_eq!(body["summary"][0]["cod_ciclo"], "2024");
        assert_eq!(body["yearTotals"][0]["ano"], "2024");

        let session = state.sessions.current().await.unwrap();
        assert_eq!(body["jobId"], session.job_id.as_str());
        assert_eq!(session.result.summary.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_basic_variant() {
        let state = AppState::default();
        let form = multipart_body(&[("variant", None, "basic"), ("file", Some("promo.csv"), CSV)]);

        let (status, body) = upload(&state, form).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["variant"], "basic");
        assert_eq!(body["summary"][0]["cod_ciclo"], "2,024");
        assert_eq!(body["yearTotals"], json!([]));

        let session = state.sessions.current().await.unwrap();
        assert_eq!(session.charts.len(), 3);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_bad_request() {
        let state = AppState::default();

        let (status, body) = upload(&state, multipart_body(&[("variant", None, "basic")])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "bad_request");
        assert!(state.sessions.current().await.is_none());
    }

    #[tokio::test]
    async fn test_upload_unknown_variant_is_bad_request() {
        let state = AppState::default();
        let form = multipart_body(&[("variant", None, "full"), ("file", Some("promo.csv"), CSV)]);

        let (status, _) = upload(&state, form).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_missing_columns_is_unprocessable() {
        let state = AppState::default();
        let form = multipart_body(&[("file", Some("bad.csv"), "cod_canal,cod_ciclo\nA,202401\n")]);

        let (status, body) = upload(&state, form).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "schema");
        assert!(state.sessions.current().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_session() {
        let state = AppState::default();

        let (status, _) = upload(&state, multipart_body(&[("file", Some("promo.csv"), CSV)])).await;
        assert_eq!(status, StatusCode::OK);
        let first = state.sessions.current().await.unwrap();

        let form = multipart_body(&[("file", Some("bad.csv"), "cod_canal\nA\n")]);
        let (status, _) = upload(&state, form).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let current = state.sessions.current().await.unwrap();
        assert_eq!(current.job_id, first.job_id);
    }

    #[test]
    fn test_input_errors_are_unprocessable() {
        let err = ServerError::Pipeline(PipelineError::Schema(SchemaError {
            missing: vec!["cod_canal".into()],
        }));
        let (status, Json(body)) = api_error(err);

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "schema");
        assert!(body["error"].as_str().unwrap().contains("cod_canal"));
    }

    #[test]
    fn test_empty_input_kind() {
        let (status, Json(body)) = api_error(ServerError::Pipeline(PipelineError::EmptyInput));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "empty_input");
    }

    #[test]
    fn test_bad_request_and_internal() {
        let (status, _) = api_error(ServerError::BadRequest("No file provided".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = api_error(ServerError::Internal("join error".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_waiting_before_upload() {
        let state = AppState::default();

        let response = current_summary(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = current_charts(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["service"], "promoview");
    }

    #[test]
    fn test_router_builds() {
        let _router = router(AppState::default(), &ServerConfig::default());
    }
}
