use super::*;

#[derive(Debug, Clone, Serialize)]
pub struct ChapterCoverage {
    pub chapter_key: String,
    pub expected_heading_count: usize,
    pub stored_topic_count: usize,
    pub empty_body_count: usize,
    pub question_count: usize,
    pub missing_numbers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityCheck {
    pub check_id: String,
    pub name: String,
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct QualitySummary {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
}

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub db_path: String,
    pub reference_path: String,
    pub summary: QualitySummary,
    pub chapters: Vec<ChapterCoverage>,
    pub checks: Vec<QualityCheck>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

pub fn collect_chapter_coverage(
    connection: &Connection,
    plan: &HeadingReferencePlan,
) -> Result<Vec<ChapterCoverage>> {
    let mut chapter_keys: Vec<&String> = plan.chapters.keys().collect();
    chapter_keys.sort();

    let mut topic_statement = connection
        .prepare("SELECT heading_number, LENGTH(TRIM(body_text)) FROM topics WHERE chapter_key = ?1")
        .context("failed to prepare topic coverage query")?;
    let mut question_statement = connection
        .prepare("SELECT COUNT(*) FROM questions WHERE chapter_key = ?1")
        .context("failed to prepare question coverage query")?;

    let mut coverage = Vec::with_capacity(chapter_keys.len());
    for chapter_key in chapter_keys {
        let expected = &plan.chapters[chapter_key];

        let rows = topic_statement
            .query_map(params![chapter_key], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .with_context(|| format!("failed to query topics for chapter {chapter_key}"))?;

        let mut stored_numbers = HashSet::new();
        let mut empty_body_count = 0_usize;
        for row in rows {
            let (heading_number, trimmed_length) =
                row.with_context(|| format!("failed to read topic row for chapter {chapter_key}"))?;
            if trimmed_length == 0 {
                empty_body_count += 1;
            }
            stored_numbers.insert(heading_number);
        }

        let stored_topic_count = expected
            .iter()
            .filter(|heading| stored_numbers.contains(&heading.number))
            .count();
        let missing_numbers: Vec<String> = expected
            .iter()
            .filter(|heading| !stored_numbers.contains(&heading.number))
            .map(|heading| heading.number.clone())
            .collect();

        let question_count: i64 = question_statement
            .query_row(params![chapter_key], |row| row.get(0))
            .with_context(|| format!("failed to count questions for chapter {chapter_key}"))?;

        coverage.push(ChapterCoverage {
            chapter_key: chapter_key.clone(),
            expected_heading_count: expected.len(),
            stored_topic_count,
            empty_body_count,
            question_count: question_count as usize,
            missing_numbers,
        });
    }

    Ok(coverage)
}

pub fn build_coverage_checks(coverage: &[ChapterCoverage]) -> Vec<QualityCheck> {
    let chapter_total = coverage.len();
    let chapters_with_topics = coverage
        .iter()
        .filter(|chapter| chapter.stored_topic_count > 0)
        .count();

    let chapter_presence = if chapter_total == 0 {
        None
    } else {
        Some(chapters_with_topics as f64 / chapter_total as f64)
    };

    let expected_total: usize = coverage
        .iter()
        .map(|chapter| chapter.expected_heading_count)
        .sum();
    let stored_total: usize = coverage
        .iter()
        .map(|chapter| chapter.stored_topic_count)
        .sum();
    let topic_coverage = if expected_total == 0 {
        None
    } else {
        Some(stored_total as f64 / expected_total as f64)
    };

    let empty_total: usize = coverage
        .iter()
        .map(|chapter| chapter.empty_body_count)
        .sum();
    let empty_body_ratio = if stored_total == 0 {
        None
    } else {
        Some(empty_total as f64 / stored_total as f64)
    };

    let chapters_with_questions = coverage
        .iter()
        .filter(|chapter| chapter.stored_topic_count > 0 && chapter.question_count > 0)
        .count();
    let question_coverage = if chapters_with_topics == 0 {
        None
    } else {
        Some(chapters_with_questions as f64 / chapters_with_topics as f64)
    };

    vec![
        QualityCheck {
            check_id: "V-001".to_string(),
            name: "Reference chapters with stored topics".to_string(),
            result: evaluate_min_threshold(chapter_presence, CHAPTER_PRESENCE_MIN).to_string(),
        },
        QualityCheck {
            check_id: "V-002".to_string(),
            name: "Expected topic coverage".to_string(),
            result: evaluate_min_threshold(topic_coverage, TOPIC_COVERAGE_MIN).to_string(),
        },
        QualityCheck {
            check_id: "V-003".to_string(),
            name: "Empty topic body ratio".to_string(),
            result: evaluate_max_threshold(empty_body_ratio, EMPTY_BODY_RATIO_MAX).to_string(),
        },
        QualityCheck {
            check_id: "V-004".to_string(),
            name: "Chapters with extracted questions".to_string(),
            result: evaluate_min_threshold(question_coverage, QUESTION_CHAPTER_COVERAGE_MIN)
                .to_string(),
        },
    ]
}

pub fn evaluate_min_threshold(value: Option<f64>, min_allowed: f64) -> &'static str {
    match value {
        Some(actual) if actual >= min_allowed => "pass",
        Some(_) => "failed",
        None => "pending",
    }
}

pub fn evaluate_max_threshold(value: Option<f64>, max_allowed: f64) -> &'static str {
    match value {
        Some(actual) if actual <= max_allowed => "pass",
        Some(_) => "failed",
        None => "pending",
    }
}

pub fn summarize_checks(checks: &[QualityCheck]) -> QualitySummary {
    let passed = checks.iter().filter(|check| check.result == "pass").count();
    let failed = checks
        .iter()
        .filter(|check| check.result == "failed")
        .count();
    let pending = checks
        .iter()
        .filter(|check| check.result == "pending")
        .count();

    QualitySummary {
        total_checks: checks.len(),
        passed,
        failed,
        pending,
    }
}
