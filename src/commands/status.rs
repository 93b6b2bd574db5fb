use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{ExtractRunSummary, TranscriptInventoryManifest};

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let inventory_path = manifest_dir.join("transcript_inventory.json");
    let db_path = args.cache_root.join("textbook_index.sqlite");

    info!(cache_root = %args.cache_root.display(), "status requested");

    if inventory_path.exists() {
        let raw = fs::read(&inventory_path)
            .with_context(|| format!("failed to read {}", inventory_path.display()))?;
        let inventory: TranscriptInventoryManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", inventory_path.display()))?;

        info!(
            generated_at = %inventory.generated_at,
            transcript_count = inventory.transcript_count,
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    match latest_extract_manifest(&manifest_dir)? {
        Some(path) => {
            let raw = fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let summary: ExtractRunSummary = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            let counts = summary.counts.unwrap_or_default();

            info!(
                path = %path.display(),
                run_id = %summary.run_id.unwrap_or_default(),
                status = %summary.status.unwrap_or_default(),
                started_at = %summary.started_at.unwrap_or_default(),
                updated_at = %summary.updated_at.unwrap_or_default(),
                processed_chapters = counts.processed_chapter_count.unwrap_or_default(),
                topics_upserted = counts.topics_upserted.unwrap_or_default(),
                questions_inserted = counts.questions_inserted.unwrap_or_default(),
                headings_missing = counts.headings_missing_total.unwrap_or_default(),
                "loaded latest extract run manifest"
            );
        }
        None => {
            warn!(dir = %manifest_dir.display(), "no extract run manifest found");
        }
    }

    if db_path.exists() {
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let chapters_count = query_count(&conn, "SELECT COUNT(*) FROM chapters").unwrap_or(0);
        let topics_count = query_count(&conn, "SELECT COUNT(*) FROM topics").unwrap_or(0);
        let questions_count = query_count(&conn, "SELECT COUNT(*) FROM questions").unwrap_or(0);

        info!(
            path = %db_path.display(),
            chapters = chapters_count,
            topics = topics_count,
            questions = questions_count,
            "database status"
        );
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    Ok(())
}

fn latest_extract_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.starts_with("extract_run_") && name.ends_with(".json") {
            candidates.push(path);
        }
    }

    candidates.sort();
    Ok(candidates.pop())
}

fn query_count(conn: &Connection, sql: &str) -> Result<i64> {
    let count = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
