use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hookgate_core::HookError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for rejected deliveries.
///
/// Origin and signature rejections are bare 403s in every mode. Everything
/// else carries a JSON `{"error": ...}` body: a generic reason by default,
/// the full error chain when the gate runs with debug enabled.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<HookError>() {
            Some(e) if e.is_forbidden() => StatusCode::FORBIDDEN,
            Some(HookError::MalformedPayload(_)) => StatusCode::BAD_REQUEST,
            Some(HookError::NetworkLookup(_)) | Some(HookError::InvalidNetworkBlock(_)) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the response, including the error chain when `verbose`.
    /// 403 bodies stay empty either way.
    pub fn into_response_with(self, verbose: bool) -> Response {
        let status = self.status();
        if status == StatusCode::FORBIDDEN {
            return status.into_response();
        }
        let message = if verbose {
            format!("{:#}", self.0)
        } else {
            status
                .canonical_reason()
                .unwrap_or("error")
                .to_ascii_lowercase()
        };
        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
