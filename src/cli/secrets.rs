//! Secret CLI commands
//!
//! Read, write, delete and restore single secrets, plus the export and web UI
//! helpers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

use super::output::{print_table_header, relative_age, render, truncate, OutputFormat};
use crate::kv::{path, DeleteIntent, ReadOutcome, SecretPayload, VersionMetadata};
use crate::startup::Explorer;

/// Map the `--mode` argument to a delete intent.
pub fn parse_delete_mode(mode: &str) -> Result<DeleteIntent> {
    match mode {
        "delete" => Ok(DeleteIntent::DeleteCurrentVersion),
        "destroy" => Ok(DeleteIntent::DestroyCurrentVersion),
        "destroy-all" => Ok(DeleteIntent::DestroyAllVersions),
        other => anyhow::bail!("Unknown delete mode '{}'. Use delete, destroy or destroy-all.", other),
    }
}

/// Ask for confirmation on stdin; `yes` skips the prompt.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    println!("{} (y/N)", prompt);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).context("Failed to read user input")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

pub async fn read_secret(explorer: &Explorer, path: &str, as_json: bool, format: OutputFormat) -> Result<()> {
    let outcome = explorer
        .secrets()
        .read_current_version(path)
        .await
        .with_context(|| format!("Failed to read secret '{}'", path))?;

    if as_json && format == OutputFormat::Table {
        match outcome.payload() {
            Some(payload) => println!("{}", payload.to_pretty_json()?),
            None => print_refusal(&outcome),
        }
        return Ok(());
    }

    render(&outcome, format, |outcome| match outcome {
        ReadOutcome::Secret { payload, metadata } => {
            print_payload_table(payload);
            print_current_version(metadata);
        }
        ReadOutcome::Refused { .. } => print_refusal(outcome),
    })
}

fn print_refusal(outcome: &ReadOutcome) {
    if let Some(reason) = outcome.refusal() {
        println!("{}", reason.to_string().red());
    }
    print_current_version(outcome.metadata());
}

fn print_payload_table(payload: &SecretPayload) {
    if payload.is_empty() {
        println!("Secret has no fields");
        return;
    }
    let width = payload.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0).min(40);
    println!();
    for (key, value) in payload.iter() {
        println!("{:<width$}  {}", key.bold(), value.display(), width = width);
    }
}

fn print_current_version(metadata: &VersionMetadata) {
    println!();
    println!("{}", version_line(metadata, Utc::now()));
}

// Vault prunes old versions past `max_versions`, so the history length says
// nothing about the version number.
fn version_line(metadata: &VersionMetadata, now: DateTime<Utc>) -> String {
    let current = &metadata.current;
    format!("Version {}, created {}", current.version, relative_age(current.created_time, now))
}

pub async fn show_versions(explorer: &Explorer, path: &str, format: OutputFormat) -> Result<()> {
    let metadata = explorer
        .secrets()
        .read_metadata(path)
        .await
        .with_context(|| format!("Failed to read metadata of '{}'", path))?;

    render(&metadata, format, print_versions_table)
}

fn print_versions_table(metadata: &VersionMetadata) {
    let now = Utc::now();
    print_table_header(&[("Version", 9), ("Created", 28), ("State", 12)]);

    for version in &metadata.versions {
        let state = if version.destroyed {
            "destroyed".red().to_string()
        } else if version.deleted {
            "deleted".yellow().to_string()
        } else {
            "active".green().to_string()
        };
        let marker = if version.version == metadata.current.version { "*" } else { " " };
        println!(
            "{:<9} {:<28} {}",
            format!("{}{}", version.version, marker),
            truncate(
                &format!(
                    "{} ({})",
                    version.created_time.format("%Y-%m-%d %H:%M"),
                    relative_age(version.created_time, now)
                ),
                28
            ),
            state
        );
    }
    println!();
}

pub async fn write_secret(
    explorer: &Explorer,
    path: &str,
    data: Option<String>,
    file: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let json = match (data, file) {
        (Some(data), None) => data,
        (None, Some(file)) => std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read file: {}", file.display()))?,
        _ => anyhow::bail!("Provide exactly one of --data or --file"),
    };
    let payload = SecretPayload::from_json_str(&json).context("Failed to parse secret data")?;

    let written = explorer
        .secrets()
        .write_new_version(path, &payload)
        .await
        .with_context(|| format!("Failed to write secret '{}'", path))?;

    render(&written, format, |written| {
        println!("{}", format!("Secret '{}' saved as version {}", path::secret_path(path), written.version).green())
    })
}

pub async fn delete_secret(
    explorer: &Explorer,
    path: &str,
    mode: &str,
    version: Option<u64>,
    yes: bool,
) -> Result<()> {
    let intent = parse_delete_mode(mode)?;

    // Destroying targets the current version unless one is given
    let version = match (intent, version) {
        (DeleteIntent::DestroyCurrentVersion, None) => {
            Some(explorer.secrets().read_metadata(path).await?.current.version)
        }
        (_, version) => version,
    };

    println!("{}", intent.warning().yellow());
    if !confirm(&format!("Are you sure you want to {} '{}'?", intent.operation(), path), yes)? {
        println!("Cancelled");
        return Ok(());
    }

    explorer
        .secrets()
        .apply_delete(path, intent, version)
        .await
        .with_context(|| format!("Failed to {} '{}'", intent.operation(), path))?;

    println!("{}", format!("Secret '{}': {} done", path::secret_path(path), intent.operation()).green());
    Ok(())
}

pub async fn undelete_secret(explorer: &Explorer, path: &str, version: Option<u64>) -> Result<()> {
    let version = match version {
        Some(version) => Some(version),
        None => Some(explorer.secrets().read_metadata(path).await?.current.version),
    };

    explorer
        .secrets()
        .undelete(path, version)
        .await
        .with_context(|| format!("Failed to undelete '{}'", path))?;

    println!("{}", format!("Secret '{}' restored", path::secret_path(path)).green());
    Ok(())
}

/// Write the current version as pretty JSON into `dir` (downloads by default).
pub async fn export_secret(explorer: &Explorer, path: &str, dir: Option<PathBuf>) -> Result<PathBuf> {
    let outcome = explorer
        .secrets()
        .read_current_version(path)
        .await
        .with_context(|| format!("Failed to read secret '{}'", path))?;

    let Some(payload) = outcome.payload() else {
        let reason = outcome.refusal().map(|r| r.to_string()).unwrap_or_default();
        anyhow::bail!("Cannot export '{}': {}", path, reason);
    };

    let dir = match dir {
        Some(dir) => dir,
        None => dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
    };
    let target = export_target(&dir, path);
    std::fs::write(&target, payload.to_pretty_json()?)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!("{}", format!("Secret saved to {}", target.display()).green());
    Ok(target)
}

pub fn export_target(dir: &Path, path: &str) -> PathBuf {
    dir.join(path::export_file_name(path))
}

/// Print the web UI link of a secret or folder.
pub fn print_ui_url(explorer: &Explorer, path: Option<&str>) -> Result<()> {
    let namespace = explorer.credentials().namespace()?;
    let url = path::ui_url(
        &explorer.config().url,
        &explorer.config().kv_mount,
        path,
        namespace.as_deref(),
    )?;
    println!("{}", url);
    Ok(())
}
