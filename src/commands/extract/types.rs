use super::*;

#[derive(Debug, Clone)]
pub struct ChapterHeading {
    pub number: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSegment {
    pub heading_number: String,
    pub heading_title: String,
    pub body: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedQuestion {
    pub number: String,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChapterExtraction {
    pub topics: Vec<TopicSegment>,
    pub questions: Vec<ExtractedQuestion>,
    pub recovered_numbers: Vec<String>,
    pub missing_numbers: Vec<String>,
    pub normalized_char_count: usize,
}

#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub body_fraction: f64,
    pub exercises_marker: String,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            body_fraction: 0.8,
            exercises_marker: "EXERCISES".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ChapterInsertStats {
    pub topics_upserted: usize,
    pub questions_inserted: usize,
}
