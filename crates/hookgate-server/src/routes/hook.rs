use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use hookgate_core::config::RepoMap;
use hookgate_core::event::{EventKind, PushEvent};
use hookgate_core::signature::{self, Algorithm};
use std::net::{IpAddr, SocketAddr};
use tracing::Instrument;

use crate::error::AppError;
use crate::state::AppState;
use crate::{actions, meta};

const EVENT_HEADER: &str = "X-GitHub-Event";
const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

/// Successful replies. The JSON bodies are fixed strings so every client
/// sees byte-identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Pong,
    WrongEvent,
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let json = [(header::CONTENT_TYPE, "application/json")];
        match self {
            Reply::Ok => (StatusCode::OK, "OK").into_response(),
            Reply::Pong => (StatusCode::OK, json, r#"{"msg": "Hi!"}"#).into_response(),
            Reply::WrongEvent => {
                (StatusCode::OK, json, r#"{"msg": "wrong event type"}"#).into_response()
            }
        }
    }
}

/// GET /: health check.
pub async fn health() -> Reply {
    Reply::Ok
}

/// POST /: receive one webhook delivery.
pub async fn receive(
    State(app): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery = header_str(&headers, DELIVERY_HEADER).unwrap_or("-").to_string();
    let span = tracing::info_span!("delivery", id = %delivery, remote = %remote.ip());

    match gate(&app, remote.ip(), &headers, &body).instrument(span).await {
        Ok(reply) => reply.into_response(),
        Err(err) => {
            tracing::warn!(
                delivery = %delivery,
                remote = %remote.ip(),
                status = err.status().as_u16(),
                error = %format!("{:#}", err.0),
                "delivery rejected"
            );
            err.into_response_with(app.settings.debug)
        }
    }
}

/// The ordered checks. Each step either rejects or falls through.
async fn gate(
    app: &AppState,
    remote: IpAddr,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<Reply, AppError> {
    let trusted = meta::trusted_networks(&app.http, &app.settings).await?;
    trusted.check(remote)?;

    match EventKind::from_header(header_str(headers, EVENT_HEADER)) {
        EventKind::Ping => {
            tracing::info!("ping received");
            return Ok(Reply::Pong);
        }
        EventKind::Other(kind) => {
            tracing::info!(event = %kind, "ignoring unsupported event");
            return Ok(Reply::WrongEvent);
        }
        EventKind::Push => {}
    }

    let repos_path = app.settings.repos_path.clone();
    let repos = tokio::task::spawn_blocking(move || RepoMap::load(&repos_path))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let event = PushEvent::from_slice(body)?;

    let Some((key, record)) = repos.resolve(&event) else {
        tracing::info!(
            repository = %format!("{}/{}", event.owner, event.name),
            git_ref = %event.r#ref,
            "no matching repository record"
        );
        return Ok(Reply::Ok);
    };
    let Some(work_dir) = record.work_dir() else {
        tracing::info!(record = %key, "record has no path; nothing to run");
        return Ok(Reply::Ok);
    };

    if let Some(secret) = record.secret() {
        signature::verify(
            Algorithm::Sha1,
            secret,
            body,
            header_str(headers, signature::SHA1_HEADER),
        )?;
        if let Some(value) = header_str(headers, signature::SHA256_HEADER) {
            signature::verify(Algorithm::Sha256, secret, body, Some(value))?;
        }
    }

    tracing::info!(
        record = %key,
        path = %work_dir.display(),
        actions = record.actions().len(),
        "push accepted"
    );
    actions::run_actions(record.actions(), work_dir).await;

    Ok(Reply::Ok)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
