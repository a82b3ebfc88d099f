use crate::error::{HookError, Result};
use crate::event::PushEvent;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Environment variable that overrides the repository store location.
pub const REPOS_PATH_ENV: &str = "GITHUB_WEBHOOK_REPOS_JSON";

/// Store location used when [`REPOS_PATH_ENV`] is unset.
pub const DEFAULT_REPOS_PATH: &str = "repos.json";

static RECORD_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^/\s]+/[^/\s]+(/branch:\S+)?$").expect("record key regex is valid")
});

// ---------------------------------------------------------------------------
// ActionCommand
// ---------------------------------------------------------------------------

/// One configured post-receive command.
///
/// An argv array runs the first element with the rest as arguments. A bare
/// string names a single executable run with no arguments; it is not split
/// or passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionCommand {
    Argv(Vec<String>),
    Program(String),
}

impl ActionCommand {
    pub fn program(&self) -> Option<&str> {
        match self {
            ActionCommand::Argv(argv) => argv.first().map(String::as_str),
            ActionCommand::Program(p) => Some(p.as_str()).filter(|p| !p.is_empty()),
        }
    }

    pub fn args(&self) -> &[String] {
        match self {
            ActionCommand::Argv(argv) if !argv.is_empty() => &argv[1..],
            _ => &[],
        }
    }

    /// Human-readable rendering used in logs and `config list`.
    pub fn display(&self) -> String {
        match self {
            ActionCommand::Argv(argv) => argv.join(" "),
            ActionCommand::Program(p) => p.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// RepoRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Vec<ActionCommand>>,
}

impl RepoRecord {
    /// Working directory for actions; `None` means the record is unconfigured.
    pub fn work_dir(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(Path::new)
    }

    /// Shared secret, if signature verification is required.
    pub fn secret(&self) -> Option<&[u8]> {
        self.key
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(str::as_bytes)
    }

    pub fn actions(&self) -> &[ActionCommand] {
        self.action.as_deref().unwrap_or(&[])
    }

    /// True for a record with no fields set, e.g. `{}` or all-null.
    pub fn is_empty(&self) -> bool {
        *self == RepoRecord::default()
    }
}

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub record: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RepoMap
// ---------------------------------------------------------------------------

/// The repository store: record key → record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoMap {
    pub records: BTreeMap<String, RepoRecord>,
}

impl RepoMap {
    /// Read and parse the store at `path`. Called once per delivery; nothing
    /// is cached between calls.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| HookError::InvalidRepoConfig {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_slice(&data).map_err(|e| HookError::InvalidRepoConfig {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn get(&self, key: &str) -> Option<&RepoRecord> {
        self.records.get(key)
    }

    /// Resolve the record for a push: branch-specific key first, then the
    /// plain `owner/name` key. Non-branch refs resolve to nothing. An empty
    /// record (`{}`) counts as absent, so an empty branch record falls back.
    pub fn resolve(&self, event: &PushEvent) -> Option<(String, &RepoRecord)> {
        event.lookup_keys().into_iter().find_map(|key| {
            self.records
                .get(&key)
                .filter(|record| !record.is_empty())
                .map(|record| (key, record))
        })
    }

    /// Check the store for mistakes an operator would want to hear about.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut push = |level: WarnLevel, record: &str, message: String| {
            warnings.push(ConfigWarning {
                level,
                record: record.to_string(),
                message,
            });
        };

        for (key, record) in &self.records {
            if !RECORD_KEY_RE.is_match(key) {
                push(
                    WarnLevel::Error,
                    key,
                    "key must be 'owner/name' or 'owner/name/branch:<branch>'".into(),
                );
            }

            let Some(dir) = record.work_dir() else {
                push(
                    WarnLevel::Warning,
                    key,
                    "no path configured; deliveries will be accepted without running actions"
                        .into(),
                );
                continue;
            };
            if !dir.is_dir() {
                push(
                    WarnLevel::Warning,
                    key,
                    format!("path '{}' is not a directory", dir.display()),
                );
            }

            if record.secret().is_none() {
                push(
                    WarnLevel::Warning,
                    key,
                    "no key configured; payload signatures will not be verified".into(),
                );
            }

            if record.actions().is_empty() {
                push(WarnLevel::Warning, key, "no actions configured".into());
            }
            for (i, action) in record.actions().iter().enumerate() {
                if action.program().is_none() {
                    push(WarnLevel::Error, key, format!("action #{} is empty", i + 1));
                }
            }
        }

        warnings
    }
}

/// Resolve the store location: explicit value, then the environment
/// override, then the default.
pub fn repos_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    match std::env::var_os(REPOS_PATH_ENV) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(DEFAULT_REPOS_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: serde_json::Value) -> RepoMap {
        RepoMap::from_slice(value.to_string().as_bytes()).unwrap()
    }

    fn push(r#ref: &str) -> PushEvent {
        PushEvent {
            owner: "acme".into(),
            name: "widgets".into(),
            r#ref: r#ref.into(),
        }
    }

    #[test]
    fn parses_argv_and_program_actions() {
        let repos = map(json!({
            "acme/widgets": {
                "path": "/srv/widgets",
                "key": "s3cret",
                "action": [["git", "pull", "origin", "main"], "/srv/deploy.sh"]
            }
        }));
        let record = repos.get("acme/widgets").unwrap();
        let actions = record.actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].program(), Some("git"));
        assert_eq!(actions[0].args(), ["pull", "origin", "main"]);
        assert_eq!(actions[1].program(), Some("/srv/deploy.sh"));
        assert!(actions[1].args().is_empty());
        assert_eq!(record.secret(), Some(&b"s3cret"[..]));
    }

    #[test]
    fn null_fields_are_treated_as_absent() {
        let repos = map(json!({ "acme/widgets": { "path": null, "key": null, "action": null } }));
        let record = repos.get("acme/widgets").unwrap();
        assert!(record.work_dir().is_none());
        assert!(record.secret().is_none());
        assert!(record.actions().is_empty());
    }

    #[test]
    fn empty_path_and_key_count_as_unset() {
        let record = RepoRecord {
            path: Some(String::new()),
            key: Some(String::new()),
            action: None,
        };
        assert!(record.work_dir().is_none());
        assert!(record.secret().is_none());
    }

    #[test]
    fn branch_record_wins_over_plain_record() {
        let repos = map(json!({
            "acme/widgets": { "path": "/srv/any" },
            "acme/widgets/branch:main": { "path": "/srv/main" }
        }));
        let (key, record) = repos.resolve(&push("refs/heads/main")).unwrap();
        assert_eq!(key, "acme/widgets/branch:main");
        assert_eq!(record.work_dir(), Some(Path::new("/srv/main")));
    }

    #[test]
    fn falls_back_to_plain_record() {
        let repos = map(json!({
            "acme/widgets": { "path": "/srv/any" },
            "acme/widgets/branch:main": { "path": "/srv/main" }
        }));
        let (key, _) = repos.resolve(&push("refs/heads/develop")).unwrap();
        assert_eq!(key, "acme/widgets");
    }

    #[test]
    fn empty_branch_record_falls_back_to_plain_record() {
        let repos = map(json!({
            "acme/widgets": { "path": "/srv/any" },
            "acme/widgets/branch:main": {}
        }));
        let (key, record) = repos.resolve(&push("refs/heads/main")).unwrap();
        assert_eq!(key, "acme/widgets");
        assert_eq!(record.work_dir(), Some(Path::new("/srv/any")));
    }

    #[test]
    fn empty_plain_record_resolves_to_nothing() {
        let repos = map(json!({ "acme/widgets": { "path": null } }));
        assert!(repos.resolve(&push("refs/heads/main")).is_none());
    }

    #[test]
    fn branch_record_with_only_a_key_still_wins() {
        let repos = map(json!({
            "acme/widgets": { "path": "/srv/any" },
            "acme/widgets/branch:main": { "key": "k" }
        }));
        let (key, record) = repos.resolve(&push("refs/heads/main")).unwrap();
        assert_eq!(key, "acme/widgets/branch:main");
        assert!(record.work_dir().is_none());
    }

    #[test]
    fn tag_refs_resolve_to_nothing() {
        let repos = map(json!({ "acme/widgets": { "path": "/srv/any" } }));
        assert!(repos.resolve(&push("refs/tags/v1.0")).is_none());
    }

    #[test]
    fn unknown_repository_resolves_to_nothing() {
        let repos = map(json!({ "other/repo": { "path": "/srv/any" } }));
        assert!(repos.resolve(&push("refs/heads/main")).is_none());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = RepoMap::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, HookError::InvalidRepoConfig { .. }));
    }

    #[test]
    fn load_reports_invalid_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("repos.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = RepoMap::load(&path).unwrap_err();
        assert!(err.to_string().contains("repos.json"));
    }

    #[test]
    fn validate_flags_bad_keys_and_empty_actions() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap();
        let repos = map(json!({
            "widgets": { "path": path, "key": "k", "action": [["true"]] },
            "acme/widgets": { "path": path, "key": "k", "action": [[]] },
            "acme/gadgets": {}
        }));
        let warnings = repos.validate();

        let errors: Vec<_> = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.record.as_str())
            .collect();
        assert_eq!(errors, ["acme/widgets", "widgets"]);
        assert!(warnings
            .iter()
            .any(|w| w.record == "acme/gadgets" && w.level == WarnLevel::Warning));
    }

    #[test]
    fn validate_accepts_complete_record() {
        let dir = tempfile::TempDir::new().unwrap();
        let repos = map(json!({
            "acme/widgets/branch:main": {
                "path": dir.path().to_str().unwrap(),
                "key": "k",
                "action": [["git", "pull"]]
            }
        }));
        assert!(repos.validate().is_empty());
    }

    #[test]
    fn repos_path_prefers_explicit_value() {
        let p = repos_path(Some(Path::new("/etc/hookgate/repos.json")));
        assert_eq!(p, PathBuf::from("/etc/hookgate/repos.json"));
    }
}
