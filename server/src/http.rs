use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri,
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION},
    },
    response::{IntoResponse, Response},
};
use platform_api::{ALLOW_HEADERS, ALLOW_ORIGIN, ApiError, ApiResult};
use platform_db::Connect;
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug, info};

use crate::{
    handlers,
    routing::{Operation, Route, reads_body},
};

#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn Connect>,
    pub body_limit: usize,
}

impl AppState {
    pub fn new(connector: Arc<dyn Connect>, body_limit: usize) -> Self {
        Self {
            connector,
            body_limit,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "employees function listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

/// Every request lands in [`dispatch`]; there is no 404, unmatched paths
/// list employees.
pub fn build_router(state: AppState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");
    Router::new()
        .fallback(dispatch)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static(ALLOW_ORIGIN),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOW_HEADERS),
                )),
        )
        .with_state(state)
}

async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> ApiResult<Response> {
    match Route::resolve(&method, uri.path()) {
        Route::Preflight => Ok(StatusCode::OK.into_response()),
        Route::Backend(operation) => run(&state, operation, &method, &headers, body).await,
    }
}

async fn run(
    state: &AppState,
    operation: Operation,
    method: &Method,
    headers: &HeaderMap,
    body: Body,
) -> ApiResult<Response> {
    let store = state.connector.connect(headers.get(AUTHORIZATION))?;
    let payload = if reads_body(method) {
        read_payload(body, state.body_limit).await?
    } else {
        None
    };

    debug!(?operation, "dispatching employees request");
    let store = store.as_ref();
    match operation {
        Operation::List => handlers::list_employees(store).await,
        Operation::Fetch(id) => handlers::get_employee(store, &id).await,
        Operation::Create => handlers::create_employee(store, payload).await,
        Operation::Update(id) => handlers::update_employee(store, &id, payload).await,
        Operation::Delete(id) => handlers::delete_employee(store, &id).await,
    }
}

/// Parse the body as JSON and take its `employees` field, if any. A `null`
/// document is an error; any other non-object simply has no such field.
async fn read_payload(body: Body, limit: usize) -> ApiResult<Option<Value>> {
    let bytes = axum::body::to_bytes(body, limit).await?;
    let mut document: Value = serde_json::from_slice(&bytes)?;
    if document.is_null() {
        return Err(ApiError::NullBody);
    }
    Ok(document.get_mut("employees").map(Value::take))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
