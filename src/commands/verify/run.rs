use super::*;

pub fn run(args: VerifyArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| args.cache_root.join("textbook_index.sqlite"));
    let report_path = args
        .report_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join("verify_report.json"));

    info!(db = %db_path.display(), "starting verify");

    let plan = load_heading_reference(&args.reference_path)?;
    info!(
        path = %args.reference_path.display(),
        chapters = plan.chapters.len(),
        rows = plan.row_count,
        "loaded heading reference"
    );

    let connection = Connection::open_with_flags(
        &db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database read-only: {}", db_path.display()))?;

    let coverage = collect_chapter_coverage(&connection, &plan)?;
    let checks = build_coverage_checks(&coverage);
    let summary = summarize_checks(&checks);

    let issues = checks
        .iter()
        .filter(|check| check.result == "failed")
        .map(|check| format!("{} failed", check.name))
        .collect::<Vec<String>>();

    let mut recommendations = Vec::new();
    if checks
        .iter()
        .any(|check| check.check_id == "V-002" && check.result == "failed")
    {
        recommendations.push(
            "Review heading reference rows for chapters with missing topics and rerun extract."
                .to_string(),
        );
    }
    if checks
        .iter()
        .any(|check| check.check_id == "V-004" && check.result == "failed")
    {
        recommendations.push(
            "Check the exercises marker spelling for chapters without extracted questions."
                .to_string(),
        );
    }

    for chapter in &coverage {
        if !chapter.missing_numbers.is_empty() {
            warn!(
                chapter = %chapter.chapter_key,
                missing = %chapter.missing_numbers.join(", "),
                "chapter is missing stored topics"
            );
        }
    }

    let report = VerifyReport {
        manifest_version: 1,
        generated_at: now_utc_string(),
        db_path: db_path.display().to_string(),
        reference_path: args.reference_path.display().to_string(),
        summary,
        chapters: coverage,
        checks,
        issues,
        recommendations,
    };

    write_json_pretty(&report_path, &report)?;

    info!(
        report = %report_path.display(),
        passed = report.summary.passed,
        failed = report.summary.failed,
        pending = report.summary.pending,
        "verify completed"
    );

    Ok(())
}
