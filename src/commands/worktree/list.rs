use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};

use crate::config::Config;
use crate::orchestrator::{list_all_projects, WorktreeListing};
use crate::registry::Registry;

use super::context::open_orchestrator;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// List registered worktrees with their health
pub fn list(quiet: bool, all: bool, json: bool) -> Result<()> {
    let listings = if all {
        let registry = Registry::new(Config::from_env()?);
        list_all_projects(&registry).context("Failed to read worktree registry")?
    } else {
        open_orchestrator()?
            .list_worktrees()
            .context("Failed to read worktree registry")?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
    } else if quiet {
        for listing in &listings {
            println!("{}", listing.name);
        }
    } else if listings.is_empty() {
        println!("(no worktrees registered)");
    } else {
        print_table(&listings, all);
    }

    let stale = listings.iter().filter(|l| l.prunable).count();
    if stale > 0 {
        let noun = if stale == 1 { "entry is" } else { "entries are" };
        eprintln!(
            "{} {stale} stale {noun} prunable; run `berth worktree prune`",
            "warning:".yellow().bold()
        );
    }
    Ok(())
}

fn print_table(listings: &[WorktreeListing], with_project: bool) {
    let rows: Vec<[String; 6]> = listings
        .iter()
        .map(|l| {
            [
                l.project.clone(),
                l.name.clone(),
                l.branch.clone(),
                l.head.clone().unwrap_or_else(|| "-".to_string()),
                l.modified
                    .map(|t| t.format(TIME_FORMAT).to_string())
                    .unwrap_or_else(|| "-".to_string()),
                l.status.clone(),
            ]
        })
        .collect();

    let header = ["PROJECT", "NAME", "BRANCH", "HEAD", "MODIFIED", "STATUS"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let first = usize::from(!with_project);

    let mut line = String::new();
    for (i, title) in header.iter().enumerate().skip(first) {
        line.push_str(&format!("{:<w$}  ", title, w = widths[i]));
    }
    line.push_str("PATH");
    println!("{}", line.bold());

    for (row, listing) in rows.iter().zip(listings) {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate().skip(first) {
            let padded = format!("{:<w$}", cell, w = widths[i]);
            let styled = match i {
                1 => padded.cyan(),
                5 => status_color(&listing.status, padded),
                _ => padded.normal(),
            };
            line.push_str(&format!("{styled}  "));
        }
        line.push_str(&listing.path.display().to_string());
        println!("{line}");
    }
}

fn status_color(status: &str, padded: String) -> ColoredString {
    if status == "healthy" {
        padded.green()
    } else if status.starts_with("error") {
        padded.red()
    } else {
        padded.yellow()
    }
}
