use hookgate_core::config::ActionCommand;
use std::path::Path;
use std::time::Instant;
use tokio::process::Command;

/// Result of one configured action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Exited {
        command: String,
        exit_code: i32,
        duration_seconds: f64,
    },
    SpawnFailed {
        command: String,
        message: String,
    },
}

impl ActionOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, ActionOutcome::Exited { exit_code: 0, .. })
    }
}

/// Run `actions` one after another in `cwd`, waiting for each to exit
/// before starting the next. Output goes to the server's own stdio. A
/// failing action is logged and the sequence continues.
pub async fn run_actions(actions: &[ActionCommand], cwd: &Path) -> Vec<ActionOutcome> {
    let mut outcomes = Vec::with_capacity(actions.len());
    for action in actions {
        let outcome = run_one(action, cwd).await;
        match &outcome {
            ActionOutcome::Exited {
                command,
                exit_code: 0,
                duration_seconds,
            } => tracing::info!(%command, duration_seconds, "action finished"),
            ActionOutcome::Exited {
                command,
                exit_code,
                duration_seconds,
            } => tracing::warn!(%command, exit_code, duration_seconds, "action failed"),
            ActionOutcome::SpawnFailed { command, message } => {
                tracing::warn!(%command, error = %message, "action could not be started")
            }
        }
        outcomes.push(outcome);
    }
    outcomes
}

async fn run_one(action: &ActionCommand, cwd: &Path) -> ActionOutcome {
    let command = action.display();
    let Some(program) = action.program() else {
        return ActionOutcome::SpawnFailed {
            command,
            message: "empty command".into(),
        };
    };

    let start = Instant::now();
    let status = Command::new(program)
        .args(action.args())
        .current_dir(cwd)
        .stdin(std::process::Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) => ActionOutcome::Exited {
            command,
            exit_code: status.code().unwrap_or(-1),
            duration_seconds: start.elapsed().as_secs_f64(),
        },
        Err(e) => ActionOutcome::SpawnFailed {
            message: format!("failed to spawn '{program}': {e}"),
            command,
        },
    }
}
