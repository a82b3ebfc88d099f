use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use hookgate_core::config::{RepoMap, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// List configured repository records
    List,

    /// Validate the repository store for common mistakes
    Validate,
}

pub fn run(repos: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::List => list(repos, json),
        ConfigSubcommand::Validate => validate(repos, json),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(repos: &Path, json: bool) -> anyhow::Result<()> {
    let map = RepoMap::load(repos).context("failed to load repository store")?;

    if json {
        // Keys are secrets; report only whether one is set.
        let value: serde_json::Map<String, serde_json::Value> = map
            .records
            .iter()
            .map(|(key, record)| {
                let actions: Vec<String> = record.actions().iter().map(|a| a.display()).collect();
                (
                    key.clone(),
                    serde_json::json!({
                        "path": record.path,
                        "signed": record.secret().is_some(),
                        "actions": actions,
                    }),
                )
            })
            .collect();
        return print_json(&value);
    }

    if map.records.is_empty() {
        println!("No repositories configured in {}.", repos.display());
        return Ok(());
    }

    let rows = map
        .records
        .iter()
        .map(|(key, record)| {
            vec![
                key.clone(),
                record
                    .work_dir()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".into()),
                if record.secret().is_some() { "yes" } else { "no" }.to_string(),
                record.actions().len().to_string(),
            ]
        })
        .collect();
    print_table(&["RECORD", "PATH", "SIGNED", "ACTIONS"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(repos: &Path, json: bool) -> anyhow::Result<()> {
    let map = RepoMap::load(repos).context("failed to load repository store")?;
    let warnings = map.validate();

    if json {
        let value = serde_json::json!({
            "records": map.records.len(),
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!(
            "{} is valid ({} records). No warnings.",
            repos.display(),
            map.records.len()
        );
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}: {}", w.record, w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("repository store validation found errors");
    }
    Ok(())
}
