//! Tree CLI commands: folder listing and recursive destroy.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::output::{print_table_header, render, OutputFormat};
use super::secrets::confirm;
use crate::kv::{filter_technical, path, DestroyReport, TreeEntry};
use crate::startup::Explorer;

pub async fn list_tree(explorer: &Explorer, path: Option<&str>, all: bool, format: OutputFormat) -> Result<()> {
    let folder = path::folder_path(path.unwrap_or(""));
    let entries = explorer
        .tree()
        .list_children(&folder)
        .await
        .with_context(|| format!("Failed to list '{}'", folder))?;
    let entries = filter_technical(entries, &explorer.config().technical_paths(), all);

    render(&entries, format, |entries| print_entries(&folder, entries))
}

fn print_entries(folder: &str, entries: &[TreeEntry]) {
    if entries.is_empty() {
        println!("Nothing under '{}'", folder);
        return;
    }
    println!("{}", folder.bold());
    for entry in entries {
        if entry.is_folder {
            println!("  {}", entry.label.blue());
        } else {
            println!("  {}", entry.label);
        }
    }
}

pub async fn destroy_tree(explorer: &Explorer, path: &str, yes: bool, format: OutputFormat) -> Result<()> {
    let folder = path::folder_path(path);
    if folder == path::SEPARATOR.to_string() && !yes {
        println!("{}", "This destroys every secret of the mount.".red());
    }
    println!(
        "{}",
        "All secret versions and metadata under this folder are permanently destroyed and cannot be recovered."
            .yellow()
    );
    if !confirm(&format!("Are you sure you want to destroy everything under '{}'?", folder), yes)? {
        println!("Cancelled");
        return Ok(());
    }

    let report = explorer
        .tree()
        .destroy_recursively(&folder)
        .await
        .with_context(|| format!("Failed to destroy '{}'", folder))?;

    render(&report, format, print_report)?;

    if !report.is_complete() {
        anyhow::bail!("{} secret(s) under '{}' could not be destroyed", report.failures.len(), folder);
    }
    Ok(())
}

fn print_report(report: &DestroyReport) {
    println!("{}", format!("{} secret(s) destroyed", report.destroyed).green());
    if report.failures.is_empty() {
        return;
    }

    print_table_header(&[("Key", 40), ("Operation", 12), ("Error", 40)]);
    for failure in &report.failures {
        println!("{:<40} {:<12} {}", failure.key, failure.operation, failure.message.red());
    }
    println!();
}
