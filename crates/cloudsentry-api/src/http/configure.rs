//! Configuration handlers.
//!
//! Both endpoints accept `application/json` or `multipart/form-data`. In the
//! multipart form the `config` field carries the JSON request and every file
//! field is a credential stored under the upload directory, keyed by its field
//! name (`key_<resource id>`). Credential paths named inside the JSON request
//! are dropped; only files stored by this server are used.

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    Json,
    body::{Body, to_bytes},
    extract::{FromRequest, Multipart, State},
    http::{Request, header::CONTENT_TYPE},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use cloudsentry_core::ProgressReporter;
use cloudsentry_protocols::ConfigurationResult;
use futures::Stream;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on a JSON request body.
pub const MAX_JSON_BYTES: usize = 2 * 1024 * 1024;

/// Multipart field holding the JSON request.
pub const CONFIG_FIELD: &str = "config";

/// Request fields that would name credential files on the server's disk.
pub const CLIENT_CREDENTIAL_FIELDS: [&str; 2] = ["uploadedCredentials", "uploaded_keys"];

/// Decoded request body plus any stored credential files.
pub struct Payload {
    pub value: Value,
    pub uploaded: HashMap<String, PathBuf>,
}

/// Success body of `POST /api/configure`.
#[derive(Debug, Serialize)]
pub struct ConfigureResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub result: ConfigurationResult,
}

/// POST /api/configure
pub async fn configure(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> Result<Response, ApiError> {
    let payload = read_payload(&state.upload_dir, request).await?;
    let result = state
        .orchestrator
        .configure_value(&payload.value, payload.uploaded, &ProgressReporter::disabled())
        .await?;

    Ok(Json(ConfigureResponse {
        message: "Monitoring configured successfully",
        result,
    })
    .into_response())
}

/// POST /api/configure/stream
///
/// Emits `progress` events while the run is in flight, then exactly one
/// `result` or `error` event.
pub async fn configure_stream(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let payload = read_payload(&state.upload_dir, request).await?;
    let (progress, mut events) = ProgressReporter::channel();
    let orchestrator = state.orchestrator.clone();
    let run = tokio::spawn(async move {
        orchestrator
            .configure_value(&payload.value, payload.uploaded, &progress)
            .await
    });

    let stream = async_stream::stream! {
        while let Some(event) = events.recv().await {
            yield Ok::<_, Infallible>(sse_event("progress", &event));
        }
        let last = match run.await {
            Ok(Ok(result)) => sse_event("result", &result),
            Ok(Err(e)) => sse_event("error", &json!({ "error": e.to_string() })),
            Err(e) => sse_event("error", &json!({ "error": format!("configuration task failed: {}", e) })),
        };
        yield Ok::<_, Infallible>(last);
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn sse_event<T: Serialize>(name: &str, data: &T) -> Event {
    let data = serde_json::to_string(data).unwrap_or_else(|e| {
        json!({ "error": format!("failed to encode event: {}", e) }).to_string()
    });
    Event::default().event(name).data(data)
}

/// Read a JSON or multipart body.
pub async fn read_payload(upload_dir: &Path, request: Request<Body>) -> Result<Payload, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        return read_multipart(upload_dir, multipart).await;
    }

    let bytes = to_bytes(request.into_body(), MAX_JSON_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read body: {}", e)))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("No data provided".to_string()));
    }
    let mut value = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))?;
    drop_client_credentials(&mut value);
    Ok(Payload {
        value,
        uploaded: HashMap::new(),
    })
}

async fn read_multipart(upload_dir: &Path, mut multipart: Multipart) -> Result<Payload, ApiError> {
    let mut config = None;
    let mut uploaded = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == CONFIG_FIELD {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            config = Some(text);
            continue;
        }
        if field.file_name().is_none() || name.is_empty() {
            debug!(field = %name, "Ignoring non-file form field");
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        tokio::fs::create_dir_all(upload_dir).await?;
        let path = upload_dir.join(sanitize_file_name(&name));
        tokio::fs::write(&path, &data).await?;
        info!(field = %name, path = %path.display(), "Stored uploaded credential");
        uploaded.insert(name, path);
    }

    let Some(config) = config.filter(|c| !c.trim().is_empty()) else {
        return Err(ApiError::BadRequest("Missing configuration data".to_string()));
    };
    let mut value = serde_json::from_str(&config)
        .map_err(|e| ApiError::BadRequest(format!("Invalid configuration JSON: {}", e)))?;
    drop_client_credentials(&mut value);
    Ok(Payload { value, uploaded })
}

/// Remove client-named credential paths from a request body.
pub fn drop_client_credentials(value: &mut Value) {
    let Some(obj) = value.as_object_mut() else {
        return;
    };
    for field in CLIENT_CREDENTIAL_FIELDS {
        if obj.remove(field).is_some() {
            warn!(field, "Ignoring client-supplied credential paths");
        }
    }
}

/// Restrict an upload name to a single safe path component.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[path = "configure_tests.rs"]
mod tests;
