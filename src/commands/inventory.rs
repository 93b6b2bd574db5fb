use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::InventoryArgs;
use crate::model::{TranscriptEntry, TranscriptInventoryManifest};
use crate::util::{normalize_chapter_key, now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.transcripts_dir)?;

    if args.dry_run {
        info!(
            transcript_count = manifest.transcript_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args.manifest_path.unwrap_or_else(|| {
        args.cache_root
            .join("manifests")
            .join("transcript_inventory.json")
    });

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(
        transcript_count = manifest.transcript_count,
        "inventory completed"
    );

    Ok(())
}

pub fn build_manifest(transcripts_dir: &Path) -> Result<TranscriptInventoryManifest> {
    let mut transcript_paths = discover_transcripts(transcripts_dir)?;
    transcript_paths.sort();

    if transcript_paths.is_empty() {
        bail!("no transcripts found in {}", transcripts_dir.display());
    }

    let mut seen_chapters: HashMap<String, String> = HashMap::new();
    let mut transcripts = Vec::with_capacity(transcript_paths.len());

    for path in transcript_paths {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        let chapter_key = chapter_key_for(&path)?;
        if let Some(previous) = seen_chapters.insert(chapter_key.clone(), filename.clone()) {
            bail!(
                "transcripts {} and {} both map to chapter key {}",
                previous,
                filename,
                chapter_key
            );
        }

        let sha256 = sha256_file(&path)?;

        transcripts.push(TranscriptEntry {
            filename,
            chapter_key,
            sha256,
        });
    }

    transcripts.sort_by(|a, b| {
        a.chapter_key
            .cmp(&b.chapter_key)
            .then(a.filename.cmp(&b.filename))
    });

    Ok(TranscriptInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: transcripts_dir.display().to_string(),
        transcript_count: transcripts.len(),
        transcripts,
    })
}

fn discover_transcripts(transcripts_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut transcripts = Vec::new();

    let entries = fs::read_dir(transcripts_dir)
        .with_context(|| format!("failed to read {}", transcripts_dir.display()))?;

    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in {}", transcripts_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_transcript = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);

        if is_transcript {
            transcripts.push(path);
        }
    }

    Ok(transcripts)
}

fn chapter_key_for(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("invalid UTF-8 file stem: {}", path.display()))?;

    let chapter_key = normalize_chapter_key(stem);
    if chapter_key.is_empty() {
        bail!(
            "transcript filename yields an empty chapter key: {}",
            path.display()
        );
    }

    Ok(chapter_key)
}
