//! HTTP front end for the analysis service (hyper 0.14).
//!
//! Routes, trailing slash optional:
//! - `POST /api/tasks/analyze/`
//! - `GET  /api/tasks/suggest/?limit=&strategy=`

use anyhow::{Context, Result};
use hyper::body::HttpBody;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{AnalysisService, ApiError, SuggestQuery};

const ANALYZE_PATH: &str = "/api/tasks/analyze";
const SUGGEST_PATH: &str = "/api/tasks/suggest";

/// Largest analyze body accepted before validation.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Bind `addr` and return the bound address plus the server future, which
/// resolves once `shutdown` completes and in-flight requests drain.
pub fn bind(
    addr: SocketAddr,
    service: Arc<AnalysisService>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = Result<()>> + Send + 'static)> {
    let make_svc = make_service_fn(move |_conn: &AddrStream| {
        let service = service.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| handle(service.clone(), req)))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("bind {addr}"))?
        .serve(make_svc);
    let local = server.local_addr();
    let running = server.with_graceful_shutdown(shutdown);

    Ok((local, async move { running.await.context("http server") }))
}

async fn handle(
    service: Arc<AnalysisService>,
    req: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().trim_end_matches('/').to_string();

    let response = match (&method, path.as_str()) {
        (&Method::POST, ANALYZE_PATH) => analyze(&service, req).await,
        (&Method::GET, SUGGEST_PATH) => {
            let query = suggest_query(req.uri().query());
            respond(service.suggest(&query))
        }
        (_, ANALYZE_PATH | SUGGEST_PATH) => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &json!({ "detail": format!("Method \"{method}\" not allowed.") }),
        ),
        _ => json_response(StatusCode::NOT_FOUND, &json!({ "detail": "Not found." })),
    };

    tracing::info!(
        %method,
        path = %display_path(&path),
        status = response.status().as_u16(),
        "request"
    );
    Ok(response)
}

async fn analyze(service: &AnalysisService, req: Request<Body>) -> Response<Body> {
    let bytes = match read_body(req).await {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    let body: Value = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => return error_response(&ApiError::BadRequest(format!("JSON parse error - {e}"))),
    };
    respond(service.analyze(&body))
}

async fn read_body(req: Request<Body>) -> Result<Vec<u8>, ApiError> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > MAX_BODY_BYTES) {
        return Err(too_large());
    }

    let mut body = req.into_body();
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(|e| ApiError::BadRequest(format!("could not read body: {e}")))?;
        if buf.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(too_large());
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

fn too_large() -> ApiError {
    ApiError::PayloadTooLarge(format!("Request body exceeds {MAX_BODY_BYTES} bytes."))
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> Response<Body> {
    match result {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &ApiError) -> Response<Body> {
    if let ApiError::Internal(e) = err {
        tracing::error!(error = %e, "request failed");
    }
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, &err.body())
}

fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Body> {
    let (status, bytes) = match serde_json::to_vec(body) {
        Ok(bytes) => (status, bytes),
        Err(e) => {
            tracing::error!(error = %e, "serialize response");
            let fallback = br#"{"detail":"Internal server error."}"#.to_vec();
            (StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
    };
    let mut resp = Response::new(Body::from(bytes));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}

fn suggest_query(query: Option<&str>) -> SuggestQuery {
    let mut out = SuggestQuery::default();
    for (key, value) in form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
        match key.as_ref() {
            "strategy" => out.strategy = Some(value.into_owned()),
            "limit" => out.limit = Some(value.into_owned()),
            _ => {}
        }
    }
    out
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}
