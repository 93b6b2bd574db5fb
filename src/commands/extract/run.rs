use super::*;

pub fn run(args: ExtractArgs) -> Result<()> {
    if !(0.0..=1.0).contains(&args.body_fraction) {
        bail!(
            "--body-fraction must be within 0.0..=1.0, got {}",
            args.body_fraction
        );
    }
    if args.exercises_marker.trim().is_empty() {
        bail!("--exercises-marker must not be empty");
    }

    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let inventory_manifest_path = args
        .inventory_manifest_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join("transcript_inventory.json"));
    let extract_manifest_path = args.extract_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "extract_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });
    let chapter_reports_path = manifest_dir.join(format!(
        "extract_chapter_reports_{}.json",
        utc_compact_string(started_ts)
    ));
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| cache_root.join("textbook_index.sqlite"));

    info!(cache_root = %cache_root.display(), run_id = %run_id, "starting extract");

    let inventory = load_or_refresh_inventory(
        &args.transcripts_dir,
        &inventory_manifest_path,
        args.refresh_inventory,
    )?;

    let reference = load_heading_reference(&args.reference_path)?;
    info!(
        path = %args.reference_path.display(),
        chapters = reference.chapters.len(),
        rows = reference.row_count,
        "loaded heading reference"
    );

    let tool_versions = collect_tool_versions()?;

    let mut connection = Connection::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;

    let target_chapters: HashSet<String> = args
        .target_chapters
        .iter()
        .map(|value| normalize_chapter_key(value))
        .collect();

    let options = ExtractionOptions {
        body_fraction: args.body_fraction,
        exercises_marker: args.exercises_marker.clone(),
    };

    let mut warnings = Vec::new();
    if reference.duplicate_count > 0 {
        warnings.push(format!(
            "heading reference contained {} duplicate chapter/number rows; first occurrences kept",
            reference.duplicate_count
        ));
    }
    if reference.skipped_row_count > 0 {
        warnings.push(format!(
            "heading reference contained {} rows without a usable chapter key or heading number",
            reference.skipped_row_count
        ));
    }

    let mut chapter_reports = Vec::new();
    let mut processed_chapter_count = 0_usize;
    let mut skipped_no_reference_count = 0_usize;
    let mut skipped_empty_text_count = 0_usize;
    let mut headings_expected_total = 0_usize;
    let mut headings_located_primary_total = 0_usize;
    let mut headings_recovered_total = 0_usize;
    let mut headings_missing_total = 0_usize;
    let mut topics_upserted = 0_usize;
    let mut questions_inserted = 0_usize;

    for entry in &inventory.transcripts {
        if !target_chapters.is_empty() && !target_chapters.contains(&entry.chapter_key) {
            continue;
        }

        let Some(headings) = reference.chapters.get(&entry.chapter_key) else {
            skipped_no_reference_count += 1;
            warn!(
                chapter = %entry.chapter_key,
                file = %entry.filename,
                "no heading reference rows for chapter; skipping"
            );
            warnings.push(format!(
                "chapter {}: no heading reference rows; transcript skipped",
                entry.chapter_key
            ));
            continue;
        };

        let transcript_path = args.transcripts_dir.join(&entry.filename);
        let raw_text = fs::read_to_string(&transcript_path)
            .with_context(|| format!("failed to read {}", transcript_path.display()))?;

        let extractor = ChapterExtractor::new(headings, &options)?;
        let extraction = extractor.extract(&raw_text);

        if extraction.normalized_char_count == 0 {
            skipped_empty_text_count += 1;
            warn!(
                chapter = %entry.chapter_key,
                file = %entry.filename,
                "transcript normalized to empty text; skipping"
            );
            warnings.push(format!(
                "chapter {}: transcript normalized to empty text; skipped",
                entry.chapter_key
            ));
            continue;
        }

        let stats = replace_chapter_rows(&mut connection, entry, &extraction, headings.len())?;

        if !extraction.missing_numbers.is_empty() {
            warnings.push(format!(
                "chapter {}: reference headings not located: {}",
                entry.chapter_key,
                extraction.missing_numbers.join(", ")
            ));
        }

        let located_primary_count = extraction.topics.len() - extraction.recovered_numbers.len();
        processed_chapter_count += 1;
        headings_expected_total += headings.len();
        headings_located_primary_total += located_primary_count;
        headings_recovered_total += extraction.recovered_numbers.len();
        headings_missing_total += extraction.missing_numbers.len();
        topics_upserted += stats.topics_upserted;
        questions_inserted += stats.questions_inserted;

        info!(
            chapter = %entry.chapter_key,
            expected = headings.len(),
            located = located_primary_count,
            recovered = extraction.recovered_numbers.len(),
            missing = extraction.missing_numbers.len(),
            questions = stats.questions_inserted,
            "extracted chapter"
        );

        chapter_reports.push(ChapterReport {
            chapter_key: entry.chapter_key.clone(),
            transcript_filename: entry.filename.clone(),
            normalized_char_count: extraction.normalized_char_count,
            expected_heading_count: headings.len(),
            located_primary_count,
            recovered_count: extraction.recovered_numbers.len(),
            missing_count: extraction.missing_numbers.len(),
            recovered_numbers: extraction.recovered_numbers.clone(),
            missing_numbers: extraction.missing_numbers.clone(),
            topics_upserted: stats.topics_upserted,
            questions_inserted: stats.questions_inserted,
        });
    }

    let chapters_total = count_rows(&connection, "SELECT COUNT(*) FROM chapters")?;
    let topics_total = count_rows(&connection, "SELECT COUNT(*) FROM topics")?;
    let questions_total = count_rows(&connection, "SELECT COUNT(*) FROM questions")?;
    let updated_at = now_utc_string();

    let reports_manifest = ChapterReportsManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        generated_at: updated_at.clone(),
        chapters: chapter_reports,
    };
    write_json_pretty(&chapter_reports_path, &reports_manifest)?;

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        status: "completed".to_string(),
        started_at,
        updated_at,
        command: render_extract_command(&args),
        tool_versions,
        paths: ExtractPaths {
            cache_root: cache_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            inventory_manifest_path: inventory_manifest_path.display().to_string(),
            reference_path: args.reference_path.display().to_string(),
            db_path: db_path.display().to_string(),
            chapter_reports_path: chapter_reports_path.display().to_string(),
        },
        counts: ExtractCounts {
            transcript_count: inventory.transcript_count,
            processed_chapter_count,
            skipped_no_reference_count,
            skipped_empty_text_count,
            reference_chapter_count: reference.chapters.len(),
            reference_row_count: reference.row_count,
            reference_duplicate_count: reference.duplicate_count,
            headings_expected_total,
            headings_located_primary_total,
            headings_recovered_total,
            headings_missing_total,
            topics_upserted,
            questions_inserted,
            chapters_total,
            topics_total,
            questions_total,
        },
        source_hashes: inventory.transcripts,
        warnings,
        notes: vec![
            "Extract command completed using local manifests and sqlite store.".to_string(),
            "Topic rows are upserted per chapter; question rows are replaced per chapter."
                .to_string(),
        ],
    };

    write_json_pretty(&extract_manifest_path, &manifest)?;

    info!(path = %extract_manifest_path.display(), "wrote extract run manifest");
    info!(
        chapters = processed_chapter_count,
        topics = topics_total,
        questions = questions_total,
        "extract completed"
    );

    Ok(())
}

fn load_or_refresh_inventory(
    transcripts_dir: &Path,
    inventory_manifest_path: &Path,
    refresh_inventory: bool,
) -> Result<TranscriptInventoryManifest> {
    if refresh_inventory || !inventory_manifest_path.exists() {
        let manifest = inventory::build_manifest(transcripts_dir)?;
        write_json_pretty(inventory_manifest_path, &manifest)?;
        info!(
            path = %inventory_manifest_path.display(),
            transcript_count = manifest.transcript_count,
            "refreshed inventory manifest"
        );
        return Ok(manifest);
    }

    let raw = fs::read(inventory_manifest_path)
        .with_context(|| format!("failed to read {}", inventory_manifest_path.display()))?;
    let manifest: TranscriptInventoryManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", inventory_manifest_path.display()))?;

    info!(
        path = %inventory_manifest_path.display(),
        transcript_count = manifest.transcript_count,
        "loaded existing inventory manifest"
    );

    Ok(manifest)
}

fn collect_tool_versions() -> Result<ToolVersions> {
    Ok(ToolVersions {
        rustc: command_version("rustc", &["--version"])?,
        cargo: command_version("cargo", &["--version"])?,
    })
}

fn command_version(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {} {}", program, args.join(" ")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("{} {} failed: {}", program, args.join(" "), stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    let version_line = source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or("unknown");

    Ok(version_line.to_string())
}

pub fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec![
        "textbook-extract".to_string(),
        "extract".to_string(),
        "--cache-root".to_string(),
        args.cache_root.display().to_string(),
        "--transcripts-dir".to_string(),
        args.transcripts_dir.display().to_string(),
        "--reference-path".to_string(),
        args.reference_path.display().to_string(),
    ];

    if let Some(path) = &args.inventory_manifest_path {
        command.push("--inventory-manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.extract_manifest_path {
        command.push("--extract-manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.db_path {
        command.push("--db-path".to_string());
        command.push(path.display().to_string());
    }
    if args.refresh_inventory {
        command.push("--refresh-inventory".to_string());
    }
    for chapter in &args.target_chapters {
        command.push("--target-chapter".to_string());
        command.push(chapter.clone());
    }
    if (args.body_fraction - 0.8).abs() > f64::EPSILON {
        command.push("--body-fraction".to_string());
        command.push(args.body_fraction.to_string());
    }
    if args.exercises_marker != "EXERCISES" {
        command.push("--exercises-marker".to_string());
        command.push(args.exercises_marker.clone());
    }

    command.join(" ")
}
