use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub filename: String,
    pub chapter_key: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub transcript_count: usize,
    pub transcripts: Vec<TranscriptEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingReferenceRow {
    pub chapter: String,
    pub number: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingReferenceManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub headings: Vec<HeadingReferenceRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolVersions {
    pub rustc: String,
    pub cargo: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractPaths {
    pub cache_root: String,
    pub manifest_dir: String,
    pub inventory_manifest_path: String,
    pub reference_path: String,
    pub db_path: String,
    pub chapter_reports_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractCounts {
    pub transcript_count: usize,
    pub processed_chapter_count: usize,
    pub skipped_no_reference_count: usize,
    pub skipped_empty_text_count: usize,
    pub reference_chapter_count: usize,
    pub reference_row_count: usize,
    pub reference_duplicate_count: usize,
    pub headings_expected_total: usize,
    pub headings_located_primary_total: usize,
    pub headings_recovered_total: usize,
    pub headings_missing_total: usize,
    pub topics_upserted: usize,
    pub questions_inserted: usize,
    pub chapters_total: i64,
    pub topics_total: i64,
    pub questions_total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterReport {
    pub chapter_key: String,
    pub transcript_filename: String,
    pub normalized_char_count: usize,
    pub expected_heading_count: usize,
    pub located_primary_count: usize,
    pub recovered_count: usize,
    pub missing_count: usize,
    pub recovered_numbers: Vec<String>,
    pub missing_numbers: Vec<String>,
    pub topics_upserted: usize,
    pub questions_inserted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterReportsManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub chapters: Vec<ChapterReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub tool_versions: ToolVersions,
    pub paths: ExtractPaths,
    pub counts: ExtractCounts,
    pub source_hashes: Vec<TranscriptEntry>,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractRunSummary {
    pub run_id: Option<String>,
    pub status: Option<String>,
    pub started_at: Option<String>,
    pub updated_at: Option<String>,
    pub counts: Option<ExtractRunSummaryCounts>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractRunSummaryCounts {
    pub processed_chapter_count: Option<usize>,
    pub topics_upserted: Option<usize>,
    pub questions_inserted: Option<usize>,
    pub headings_missing_total: Option<usize>,
}
