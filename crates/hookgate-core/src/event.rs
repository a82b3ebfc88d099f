use crate::error::{HookError, Result};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static BRANCH_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^refs/heads/(?P<branch>.*)").expect("branch ref regex is valid"));

/// Delivery kind, taken from the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Ping,
    Push,
    Other(String),
}

impl EventKind {
    /// A missing header is treated like any other unsupported event.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some("ping") => EventKind::Ping,
            Some("push") => EventKind::Push,
            Some(other) => EventKind::Other(other.to_string()),
            None => EventKind::Other(String::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawPush {
    repository: Option<RawRepository>,
    #[serde(rename = "ref")]
    r#ref: Option<String>,
}

#[derive(Deserialize)]
struct RawRepository {
    name: Option<String>,
    owner: Option<RawOwner>,
}

#[derive(Deserialize)]
struct RawOwner {
    name: Option<String>,
    login: Option<String>,
}

// ---------------------------------------------------------------------------
// PushEvent
// ---------------------------------------------------------------------------

/// The fields of a push payload the gate needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    pub owner: String,
    pub name: String,
    pub r#ref: String,
}

impl PushEvent {
    /// Parse a raw push body. Requires `repository.name`,
    /// `repository.owner.name` (or `login`) and `ref`.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let raw: RawPush = serde_json::from_slice(body)
            .map_err(|e| HookError::MalformedPayload(e.to_string()))?;

        let repository = raw
            .repository
            .ok_or_else(|| HookError::MalformedPayload("missing repository".into()))?;
        let name = repository
            .name
            .ok_or_else(|| HookError::MalformedPayload("missing repository.name".into()))?;
        let owner = repository
            .owner
            .and_then(|o| o.name.or(o.login))
            .ok_or_else(|| HookError::MalformedPayload("missing repository.owner.name".into()))?;
        let r#ref = raw
            .r#ref
            .ok_or_else(|| HookError::MalformedPayload("missing ref".into()))?;

        Ok(Self { owner, name, r#ref })
    }

    /// Branch name when `ref` has the form `refs/heads/<branch>`.
    pub fn branch(&self) -> Option<&str> {
        BRANCH_REF_RE
            .captures(&self.r#ref)
            .and_then(|c| c.name("branch"))
            .map(|m| m.as_str())
    }

    /// Store keys to try, most specific first. Empty for non-branch refs.
    pub fn lookup_keys(&self) -> Vec<String> {
        match self.branch() {
            Some(branch) => vec![
                format!("{}/{}/branch:{}", self.owner, self.name, branch),
                format!("{}/{}", self.owner, self.name),
            ],
            None => Vec::new(),
        }
    }
}
