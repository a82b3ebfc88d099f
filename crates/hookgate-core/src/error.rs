use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("request origin {0} is not in any trusted network block")]
    UntrustedOrigin(String),

    #[error("invalid network block '{0}'")]
    InvalidNetworkBlock(String),

    #[error("trusted network lookup failed: {0}")]
    NetworkLookup(String),

    #[error("missing {0} header")]
    MissingSignature(&'static str),

    #[error("malformed {header} header: {reason}")]
    MalformedSignature {
        header: &'static str,
        reason: String,
    },

    #[error("signature mismatch in {0} header")]
    SignatureMismatch(&'static str),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("repository config {path}: {reason}")]
    InvalidRepoConfig { path: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HookError {
    /// True for the errors that must reject a delivery with 403.
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            HookError::UntrustedOrigin(_)
                | HookError::MissingSignature(_)
                | HookError::MalformedSignature { .. }
                | HookError::SignatureMismatch(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HookError>;
