//! HTTP surface of the registry.
//!
//! | route              | body              | reply                               |
//! |--------------------|-------------------|-------------------------------------|
//! | `GET /ping`        |                   | `{"message":"pong"}`                |
//! | `POST /register`   | `{"name": ..}`    | `{"message","id","port"}`           |
//! | `POST /unregister` | `{"id": ..}`      | `{"message","id","serviceName"}`    |
//! | `GET /list`        |                   | `{"services": {name: {id: {..}}}}`  |

use crate::core::registry::RegistryService;
use crate::core::{IdGenerator, PortSource, RegistrySnapshot};
use crate::utils::error::{RegistryError, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct UnregisterRequest {
    #[serde(default, alias = "uuid")]
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnregisterResponse {
    pub message: String,
    pub id: String,
    pub service_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub services: RegistrySnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}

impl RegistryError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::Validation { .. } => StatusCode::BAD_REQUEST,
            RegistryError::NotFound { .. } => StatusCode::NOT_FOUND,
            RegistryError::Conflict(_)
            | RegistryError::Allocation(_)
            | RegistryError::RegistrationFailed { .. }
            | RegistryError::Config { .. }
            | RegistryError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Request failed: {}", self);
        } else {
            tracing::debug!(kind = self.kind(), "Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn bad_body(rejection: JsonRejection) -> RegistryError {
    RegistryError::validation("body", rejection.body_text())
}

pub fn router<P, G>(service: Arc<RegistryService<P, G>>) -> Router
where
    P: PortSource + 'static,
    G: IdGenerator + 'static,
{
    Router::new()
        .route("/ping", get(ping))
        .route("/list", get(list::<P, G>))
        .route("/register", post(register::<P, G>))
        .route("/unregister", post(unregister::<P, G>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serves `service` on `listener` until `shutdown` resolves.
pub async fn serve<P, G, F>(
    listener: tokio::net::TcpListener,
    service: Arc<RegistryService<P, G>>,
    shutdown: F,
) -> Result<()>
where
    P: PortSource + 'static,
    G: IdGenerator + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn ping() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "pong" }))
}

async fn list<P: PortSource, G: IdGenerator>(
    State(service): State<Arc<RegistryService<P, G>>>,
) -> Json<ListResponse> {
    tracing::debug!("Listing registry");
    Json(ListResponse {
        services: service.list(),
    })
}

async fn register<P: PortSource, G: IdGenerator>(
    State(service): State<Arc<RegistryService<P, G>>>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> std::result::Result<Json<RegisterResponse>, RegistryError> {
    let Json(req) = body.map_err(bad_body)?;
    tracing::debug!(name = %req.name, "Register request");

    let registration = service.register(&req.name)?;
    Ok(Json(RegisterResponse {
        message: "Microservice registered".to_string(),
        id: registration.id,
        port: registration.port,
    }))
}

async fn unregister<P: PortSource, G: IdGenerator>(
    State(service): State<Arc<RegistryService<P, G>>>,
    body: std::result::Result<Json<UnregisterRequest>, JsonRejection>,
) -> std::result::Result<Json<UnregisterResponse>, RegistryError> {
    let Json(req) = body.map_err(bad_body)?;
    tracing::debug!(id = %req.id, "Unregister request");

    let service_name = service.unregister(&req.id)?;
    Ok(Json(UnregisterResponse {
        message: "Instance deregistered".to_string(),
        id: req.id,
        service_name,
    }))
}
