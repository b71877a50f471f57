//! Implementation of `fsem list`.
//!
//! Read-only scan of the lock namespace: lock groups, their holder entries
//! with ages (from the mtime liveness signal), any modify token currently
//! in flight, and leftover staging trees from crashed attempts.

use crate::cli::ListArgs;
use crate::error::{FsemError, Result};
use crate::namespace;
use crate::semaphore::{STAGE_PREFIX, TOKEN_FILE, TokenMetadata};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// One holder entry as seen on disk.
#[derive(Debug)]
pub(crate) struct HolderInfo {
    pub id: String,
    pub last_alive: Option<DateTime<Utc>>,
}

/// One lock group as seen on disk.
#[derive(Debug)]
pub(crate) struct GroupInfo {
    pub name: String,
    pub holders: Vec<HolderInfo>,
    pub token: Option<TokenMetadata>,
}

pub fn cmd_list(args: ListArgs) -> Result<()> {
    let namespace = namespace::resolve(args.lock_dir.as_deref())?;
    let (groups, stray_staging) = scan(&namespace)?;

    if groups.is_empty() && stray_staging == 0 {
        println!("No lock groups in {}.", namespace.display());
        return Ok(());
    }

    println!("Lock groups in {} ({}):", namespace.display(), groups.len());
    println!();

    for group in &groups {
        println!("  {} ({} holder(s)):", group.name, group.holders.len());
        for holder in &group.holders {
            match holder.last_alive {
                Some(ts) => println!("    {}  (last alive {} ago)", holder.id, fmt_age(ts)),
                None => println!("    {}", holder.id),
            }
        }
        if let Some(token) = &group.token {
            println!(
                "    modify token held by pid {} ({}) since {} ago",
                token.pid,
                token.owner,
                fmt_age(token.created_at)
            );
        }
        println!();
    }

    if stray_staging > 0 {
        println!(
            "Note: {} staging tree(s) left behind by crashed attempts.",
            stray_staging
        );
    }

    Ok(())
}

/// Scan the namespace. Returns the lock groups (sorted by name) and the
/// count of leftover staging trees.
pub(crate) fn scan(namespace: &Path) -> Result<(Vec<GroupInfo>, usize)> {
    let entries = fs::read_dir(namespace).map_err(|e| {
        FsemError::IoError(format!(
            "failed to read lock directory '{}': {}",
            namespace.display(),
            e
        ))
    })?;

    let mut groups = Vec::new();
    let mut stray_staging = 0usize;

    for entry in entries {
        let entry = entry.map_err(|e| {
            FsemError::IoError(format!("failed to read lock directory entry: {}", e))
        })?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !entry.path().is_dir() {
            continue;
        }
        if name.starts_with(STAGE_PREFIX) {
            stray_staging += 1;
            continue;
        }

        groups.push(read_group(&entry.path(), name));
    }

    groups.sort_by(|a, b| a.name.cmp(&b.name));
    Ok((groups, stray_staging))
}

fn read_group(group_dir: &Path, name: String) -> GroupInfo {
    let mut holders = Vec::new();
    if let Ok(entries) = fs::read_dir(group_dir.join(&name)) {
        for entry in entries.flatten() {
            let last_alive = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Utc>::from);
            holders.push(HolderInfo {
                id: entry.file_name().to_string_lossy().to_string(),
                last_alive,
            });
        }
    }
    holders.sort_by(|a, b| a.id.cmp(&b.id));

    // Skip token files we cannot parse rather than failing the whole scan.
    let token = TokenMetadata::from_file(group_dir.join(TOKEN_FILE)).ok();

    GroupInfo {
        name,
        holders,
        token,
    }
}

/// Format how long ago a timestamp was, coarsely.
fn fmt_age(ts: DateTime<Utc>) -> String {
    let age = Utc::now().signed_duration_since(ts);
    let minutes = age.num_minutes();
    let hours = age.num_hours();
    let days = age.num_days();

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}
