use super::*;

pub struct HeadingReferencePlan {
    pub chapters: HashMap<String, Vec<ChapterHeading>>,
    pub row_count: usize,
    pub duplicate_count: usize,
    pub skipped_row_count: usize,
}

pub fn load_heading_reference(reference_path: &Path) -> Result<HeadingReferencePlan> {
    let raw = fs::read(reference_path)
        .with_context(|| format!("failed to read {}", reference_path.display()))?;
    let manifest: HeadingReferenceManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", reference_path.display()))?;

    Ok(build_reference_plan(&manifest))
}

pub fn build_reference_plan(manifest: &HeadingReferenceManifest) -> HeadingReferencePlan {
    let mut chapters: HashMap<String, Vec<ChapterHeading>> = HashMap::new();
    let mut duplicate_count = 0_usize;
    let mut skipped_row_count = 0_usize;

    for row in &manifest.headings {
        let chapter_key = normalize_chapter_key(&row.chapter);
        let canonical = canonical_heading_number(&row.number);

        if chapter_key.is_empty() || canonical.is_empty() {
            skipped_row_count += 1;
            warn!(
                chapter = %row.chapter,
                number = %row.number,
                "skipping reference row without a usable chapter key or heading number"
            );
            continue;
        }

        let headings = chapters.entry(chapter_key).or_default();
        if headings.iter().any(|heading| heading.number == canonical) {
            duplicate_count += 1;
            warn!(
                chapter = %row.chapter,
                number = %canonical,
                "duplicate reference heading; keeping the first occurrence"
            );
            continue;
        }

        headings.push(ChapterHeading {
            number: canonical,
            title: row.title.trim().to_string(),
        });
    }

    HeadingReferencePlan {
        chapters,
        row_count: manifest.headings.len(),
        duplicate_count,
        skipped_row_count,
    }
}
