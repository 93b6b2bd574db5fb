use std::path::PathBuf;

use super::*;

use super::reference_table::build_reference_plan;
use crate::model::HeadingReferenceRow;

#[test]
fn normalize_collapses_whitespace_runs_and_blank_lines() {
    let raw = "  Work   and \t energy  \n\n   \n are  related ";
    assert_eq!(normalize_transcript(raw), "Work and energy\nare related");
}

#[test]
fn normalize_rejoins_words_split_by_line_wrap_hyphens() {
    assert_eq!(
        normalize_transcript("fric-\ntion acts on the block"),
        "friction acts on the block"
    );
    assert_eq!(normalize_transcript("fric- \ntion"), "friction");
}

#[test]
fn normalize_returns_empty_for_whitespace_only_input() {
    assert_eq!(normalize_transcript("   \n\t \n\n"), "");
    assert_eq!(normalize_transcript(""), "");
}

#[test]
fn normalize_is_idempotent() {
    let samples = [
        "  Work   and \t energy  \n\n   \n are  related ",
        "fric- \ntion acts",
        "a--\n\nb",
        "x-\n-\ny",
        "2.4   Sound\n\n waves ",
        "",
    ];

    for sample in samples {
        let once = normalize_transcript(sample);
        assert_eq!(normalize_transcript(&once), once, "input: {sample:?}");
    }
}

#[test]
fn canonical_heading_number_maps_delimiters_to_dots() {
    assert_eq!(canonical_heading_number("2.4"), "2.4");
    assert_eq!(canonical_heading_number("2-4"), "2.4");
    assert_eq!(canonical_heading_number("2 4"), "2.4");
    assert_eq!(canonical_heading_number("2.4."), "2.4");
    assert_eq!(canonical_heading_number(" 2 . 4 "), "2.4");
    assert_eq!(canonical_heading_number("1..2"), "1.2");
    assert_eq!(canonical_heading_number("12.4"), "12.4");
    assert_eq!(canonical_heading_number(""), "");
    assert_eq!(canonical_heading_number("--"), "");
}

#[test]
fn heading_matcher_accepts_delimiter_variants() {
    for rendering in ["2.4", "2-4", "2 4", "2.4."] {
        let text = format!("{rendering} Sound travels in air.\nWave body text continues.");
        let locations = locate(&text, &["2.4"]);
        assert_eq!(
            locations.get("2.4"),
            Some(&0),
            "rendering: {rendering}"
        );
        assert_eq!(locations.len(), 1);
    }
}

#[test]
fn heading_matcher_rejects_longer_numerals() {
    assert!(locate("12.4 Gravitation holds planets.\nBody text.", &["2.4"]).is_empty());
    assert!(locate("2.45 is a measurement value.\nBody text.", &["2.4"]).is_empty());
    assert!(locate("1.23 metres is the answer.\nBody text.", &["1"]).is_empty());
}

#[test]
fn heading_matcher_does_not_claim_deeper_heading_lines() {
    assert!(locate("2.4.1 Echoes and reflection.\nBody text.", &["2.4"]).is_empty());
}

#[test]
fn heading_matcher_prefers_deepest_expected_number() {
    let locations = locate(
        "2.4.1 Echoes and reflection\nBody follows with more text here.",
        &["2", "2.4", "2.4.1"],
    );
    assert_eq!(locations.get("2.4.1"), Some(&0));
    assert_eq!(locations.len(), 1);
}

#[test]
fn heading_matcher_accepts_line_end_boundaries() {
    let matcher = matcher_for(&["2.4"]);
    assert!(matcher.line_anchored().is_match("2.4\nBody line follows."));
    assert!(matcher.line_anchored().is_match("Body line first.\n2.4"));
    assert!(matcher.line_anchored().is_match("Body line first.\n2.4."));
    assert!(!matcher.line_anchored().is_match("Body line first.\n2.45"));
}

#[test]
fn scoped_matcher_requires_clean_left_context() {
    let matcher = matcher_for(&["2.4"]);
    assert!(matcher.scoped().is_match("noise 2.4 Sound"));
    assert!(!matcher.scoped().is_match("12.4 Sound"));
    assert!(!matcher.scoped().is_match("page 12.4 Sound"));
    assert!(!matcher.scoped().is_match("3.2.4 Sound"));
}

#[test]
fn primary_pass_keeps_first_occurrence() {
    let text = "3.2 Waves\nWave body text.\n3.2 Waves repeated mention follows.\nTrailing filler content to keep the cutoff far away from both occurrences.";
    let locations = locate(text, &["3.2"]);
    assert_eq!(locations.get("3.2"), Some(&0));
    assert_eq!(locations.len(), 1);
}

#[test]
fn primary_pass_excludes_matches_past_body_cutoff() {
    let text = format!("{}9.9 Answers", "x\n".repeat(50));
    let expected = number_set(&["9.9"]);
    let matcher = HeadingMatcher::build(&expected)
        .expect("matcher should build")
        .expect("matcher should exist");

    let within_body = locate_primary_headings(&text, &matcher, &expected, 1.0);
    assert_eq!(within_body.get("9.9"), Some(&100));

    let excluded = locate_primary_headings(&text, &matcher, &expected, 0.8);
    assert!(excluded.is_empty());
}

#[test]
fn segment_topics_produces_contiguous_ordered_spans() {
    let text = "1 Intro\nSome text.\n1.1 Basics\nMore text.\n1.2 Advanced\nFinal text.";
    let mut locations = HashMap::new();
    locations.insert("1.2".to_string(), 41);
    locations.insert("1".to_string(), 0);
    locations.insert("1.1".to_string(), 19);
    let titles = HashMap::from([("1".to_string(), "Intro".to_string())]);

    let segments = segment_topics(text, &locations, &titles);
    assert_eq!(segments.len(), 3);

    let numbers: Vec<&str> = segments
        .iter()
        .map(|segment| segment.heading_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["1", "1.1", "1.2"]);

    for pair in segments.windows(2) {
        assert_eq!(pair[0].end_offset, pair[1].start_offset);
    }
    assert_eq!(segments[0].start_offset, 0);
    assert_eq!(segments[2].end_offset, text.len());

    assert_eq!(segments[0].heading_title, "Intro");
    assert_eq!(segments[1].heading_title, "");
}

#[test]
fn extracts_three_contiguous_topics_in_document_order() {
    let extractor = extractor_for(&[("1", "Intro"), ("1.1", "Basics"), ("1.2", "Advanced")]);
    let text = "1 Intro\nSome text.\n1.1 Basics\nMore text.\n1.2 Advanced\nFinal text.";

    let extraction = extractor.extract(text);
    assert!(extraction.missing_numbers.is_empty());
    assert!(extraction.recovered_numbers.is_empty());
    assert_eq!(extraction.topics.len(), 3);

    let first = &extraction.topics[0];
    assert_eq!(first.heading_number, "1");
    assert_eq!(first.heading_title, "Intro");
    assert_eq!((first.start_offset, first.end_offset), (0, 19));
    assert_eq!(first.body, "1 Intro\nSome text.\n");

    let second = &extraction.topics[1];
    assert_eq!(second.heading_number, "1.1");
    assert_eq!((second.start_offset, second.end_offset), (19, 41));
    assert_eq!(second.body, "1.1 Basics\nMore text.\n");

    let third = &extraction.topics[2];
    assert_eq!(third.heading_number, "1.2");
    assert_eq!((third.start_offset, third.end_offset), (41, 65));
    assert_eq!(third.body, "1.2 Advanced\nFinal text.");
}

#[test]
fn unlocatable_reference_number_is_reported_missing() {
    let extractor = extractor_for(&[
        ("1", "Intro"),
        ("1.1", "Basics"),
        ("1.1.1", "Ghost"),
        ("1.2", "Advanced"),
    ]);
    let text = "1 Intro\nSome text.\n1.1 Basics\nMore text.\n1.2 Advanced\nFinal text.";

    let extraction = extractor.extract(text);
    assert_eq!(extraction.missing_numbers, vec!["1.1.1".to_string()]);
    assert!(extraction.recovered_numbers.is_empty());

    let numbers: Vec<&str> = extraction
        .topics
        .iter()
        .map(|topic| topic.heading_number.as_str())
        .collect();
    assert_eq!(numbers, vec!["1", "1.1", "1.2"]);
    assert_eq!(extraction.topics[2].end_offset, text.len());
}

#[test]
fn recovery_locates_heading_inside_parent_span() {
    let extractor = extractor_for(&[("2", "Motion"), ("2.4", "Sound"), ("2.5", "Light")]);
    let text = "2 Motion\nIntro text here.\nnoise 2.4 Sound waves travel fast.\nMore on sound.\n2.5 Light\nLight body follows here.";

    let extraction = extractor.extract(text);
    assert_eq!(extraction.recovered_numbers, vec!["2.4".to_string()]);
    assert!(extraction.missing_numbers.is_empty());
    assert_eq!(extraction.topics.len(), 3);

    let parent = &extraction.topics[0];
    assert_eq!(parent.heading_number, "2");
    assert_eq!((parent.start_offset, parent.end_offset), (0, 32));

    let recovered = &extraction.topics[1];
    assert_eq!(recovered.heading_number, "2.4");
    assert_eq!((recovered.start_offset, recovered.end_offset), (32, 76));
    assert!(recovered.body.starts_with("2.4 Sound waves"));

    let sibling = &extraction.topics[2];
    assert_eq!(sibling.heading_number, "2.5");
    assert_eq!((sibling.start_offset, sibling.end_offset), (76, text.len()));
}

#[test]
fn recovery_first_parent_claims_a_missing_number() {
    let extractor = extractor_for(&[("2", "Alpha"), ("2.4", "Claimed"), ("3", "Beta")]);
    let text = "2 Alpha\nmention 2.4 here first.\n3 Beta\nmention 2.4 again later.";

    let extraction = extractor.extract(text);
    assert_eq!(extraction.recovered_numbers, vec!["2.4".to_string()]);

    let recovered = &extraction.topics[1];
    assert_eq!(recovered.heading_number, "2.4");
    assert_eq!((recovered.start_offset, recovered.end_offset), (16, 32));
    assert_eq!(recovered.body, "2.4 here first.\n");
}

#[test]
fn recovery_leaves_truly_absent_numbers_missing() {
    let extractor = extractor_for(&[("2", "Alpha"), ("2.9", "Nowhere")]);
    let text = "2 Alpha\nBody without the other number anywhere in sight.";

    let extraction = extractor.extract(text);
    assert_eq!(extraction.topics.len(), 1);
    assert_eq!(extraction.missing_numbers, vec!["2.9".to_string()]);
    assert!(extraction.recovered_numbers.is_empty());
}

#[test]
fn extracts_numbered_questions_after_exercises_marker() {
    let extractor = extractor_for(&[("1", "Force")]);
    let text = "1 Force\nBody about force and motion.\nEXERCISES\n1.1 What is the unit of force?\n1.2 Define mass.";

    let extraction = extractor.extract(text);
    assert_eq!(extraction.topics.len(), 1);
    assert_eq!(extraction.questions.len(), 2);
    assert_eq!(extraction.questions[0].number, "1.1");
    assert_eq!(extraction.questions[0].text, "What is the unit of force?");
    assert_eq!(extraction.questions[1].number, "1.2");
    assert_eq!(extraction.questions[1].text, "Define mass.");
}

#[test]
fn question_extraction_handles_single_depth_and_trailing_dots() {
    let questions = question_extractor()
        .extract("EXERCISES\n1. Define speed.\n2.1. State the law.\nnot a question line");

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].number, "1");
    assert_eq!(questions[0].text, "Define speed.");
    assert_eq!(questions[1].number, "2.1");
    assert_eq!(questions[1].text, "State the law.\nnot a question line");
}

#[test]
fn question_extraction_is_anchored_to_line_starts() {
    let questions = question_extractor().extract("EXERCISES\n1.1 Compare speeds as in 1.2 below.");

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].number, "1.1");
    assert_eq!(questions[0].text, "Compare speeds as in 1.2 below.");
}

#[test]
fn question_extraction_keeps_duplicate_renderings() {
    let questions = question_extractor().extract("EXERCISES\n1.1 First body.\n1.1 First body.");

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].number, "1.1");
    assert_eq!(questions[1].number, "1.1");
    assert_eq!(questions[0].text, questions[1].text);
}

#[test]
fn question_marker_is_case_insensitive() {
    let questions = question_extractor().extract("Revision exercises\n1.1 Only one?");

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].number, "1.1");
    assert_eq!(questions[0].text, "Only one?");
}

#[test]
fn missing_marker_yields_no_questions() {
    let questions = question_extractor().extract("No marker present here.\n1.1 Question-shaped line.");
    assert!(questions.is_empty());
}

#[test]
fn extractor_normalizes_before_locating() {
    let extractor = extractor_for(&[("1", "Intro")]);

    let extraction = extractor.extract("1   Intro\nSome  text.");
    assert_eq!(extraction.topics.len(), 1);
    assert_eq!(extraction.topics[0].body, "1 Intro\nSome text.");
    assert_eq!(extraction.topics[0].end_offset, 18);
    assert_eq!(extraction.normalized_char_count, 18);
}

#[test]
fn extractor_reports_all_numbers_missing_for_empty_input() {
    let extractor = extractor_for(&[("1", "Intro"), ("1.1", "Basics")]);

    let extraction = extractor.extract("   \n\t \n");
    assert!(extraction.topics.is_empty());
    assert!(extraction.questions.is_empty());
    assert_eq!(
        extraction.missing_numbers,
        vec!["1".to_string(), "1.1".to_string()]
    );
    assert_eq!(extraction.normalized_char_count, 0);
}

#[test]
fn extractor_without_reference_rows_still_extracts_questions() {
    let extractor = extractor_for(&[]);

    let extraction = extractor.extract("Some text.\nEXERCISES\n1.1 Only question here?");
    assert!(extraction.topics.is_empty());
    assert!(extraction.missing_numbers.is_empty());
    assert_eq!(extraction.questions.len(), 1);
}

#[test]
fn build_reference_plan_skips_bad_rows_and_keeps_first_duplicate() {
    let manifest = HeadingReferenceManifest {
        manifest_version: 1,
        generated_at: "2026-01-01T00:00:00Z".to_string(),
        headings: vec![
            reference_row("Chapter 2", "2.4", "Sound"),
            reference_row("Chapter 2", "2-4", "Sound duplicate"),
            reference_row("Chapter 2", "", "No number"),
            reference_row("", "2.5", "No chapter"),
            reference_row("Chapter 3", "3.1.", " Gravitation "),
        ],
    };

    let plan = build_reference_plan(&manifest);
    assert_eq!(plan.row_count, 5);
    assert_eq!(plan.duplicate_count, 1);
    assert_eq!(plan.skipped_row_count, 2);

    let chapter_two = plan
        .chapters
        .get("chapter-2")
        .expect("chapter 2 should exist");
    assert_eq!(chapter_two.len(), 1);
    assert_eq!(chapter_two[0].number, "2.4");
    assert_eq!(chapter_two[0].title, "Sound");

    let chapter_three = plan
        .chapters
        .get("chapter-3")
        .expect("chapter 3 should exist");
    assert_eq!(chapter_three[0].number, "3.1");
    assert_eq!(chapter_three[0].title, "Gravitation");
}

#[test]
fn replace_chapter_rows_upserts_topics_and_replaces_questions() {
    let mut connection = Connection::open_in_memory().expect("in-memory DB should open");
    ensure_schema(&connection).expect("schema should apply");

    let entry = TranscriptEntry {
        filename: "chapter-2.txt".to_string(),
        chapter_key: "chapter-2".to_string(),
        sha256: "abc123".to_string(),
    };

    let first = ChapterExtraction {
        topics: vec![
            TopicSegment {
                heading_number: "2".to_string(),
                heading_title: "Motion".to_string(),
                body: "2 Motion\nIntro.\n".to_string(),
                start_offset: 0,
                end_offset: 16,
            },
            TopicSegment {
                heading_number: "2.4".to_string(),
                heading_title: "Sound".to_string(),
                body: "2.4 Sound\nBody.".to_string(),
                start_offset: 16,
                end_offset: 31,
            },
        ],
        questions: vec![
            ExtractedQuestion {
                number: "2.1".to_string(),
                text: "Define speed.".to_string(),
            },
            ExtractedQuestion {
                number: "2.2".to_string(),
                text: "State the law.".to_string(),
            },
        ],
        recovered_numbers: vec!["2.4".to_string()],
        missing_numbers: Vec::new(),
        normalized_char_count: 31,
    };

    let stats =
        replace_chapter_rows(&mut connection, &entry, &first, 2).expect("first write succeeds");
    assert_eq!(stats.topics_upserted, 2);
    assert_eq!(stats.questions_inserted, 2);

    let second = ChapterExtraction {
        questions: vec![ExtractedQuestion {
            number: "2.1".to_string(),
            text: "Define velocity.".to_string(),
        }],
        ..first.clone()
    };
    let stats =
        replace_chapter_rows(&mut connection, &entry, &second, 2).expect("second write succeeds");
    assert_eq!(stats.topics_upserted, 2);
    assert_eq!(stats.questions_inserted, 1);

    let chapters = count_rows(&connection, "SELECT COUNT(*) FROM chapters").expect("chapter count");
    let topics = count_rows(&connection, "SELECT COUNT(*) FROM topics").expect("topic count");
    let questions = count_rows(&connection, "SELECT COUNT(*) FROM questions").expect("question count");
    assert_eq!(chapters, 1);
    assert_eq!(topics, 2);
    assert_eq!(questions, 1);

    let recovered: i64 = connection
        .query_row(
            "SELECT recovered FROM topics WHERE chapter_key = 'chapter-2' AND heading_number = '2.4'",
            [],
            |row| row.get(0),
        )
        .expect("recovered flag should load");
    assert_eq!(recovered, 1);

    let question_text: String = connection
        .query_row(
            "SELECT question_text FROM questions WHERE chapter_key = 'chapter-2'",
            [],
            |row| row.get(0),
        )
        .expect("question row should load");
    assert_eq!(question_text, "Define velocity.");
}

#[test]
fn render_extract_command_includes_optional_flags() {
    let args = ExtractArgs {
        cache_root: PathBuf::from(".cache/textbook-extract"),
        transcripts_dir: PathBuf::from("ocr_cache"),
        reference_path: PathBuf::from("heading_reference.json"),
        inventory_manifest_path: None,
        extract_manifest_path: None,
        db_path: None,
        refresh_inventory: true,
        target_chapters: vec!["Chapter 2".to_string()],
        body_fraction: 0.6,
        exercises_marker: "PROBLEMS".to_string(),
    };

    let command = run::render_extract_command(&args);
    assert!(command.contains("--refresh-inventory"));
    assert!(command.contains("--target-chapter Chapter 2"));
    assert!(command.contains("--body-fraction 0.6"));
    assert!(command.contains("--exercises-marker PROBLEMS"));
}

fn number_set(numbers: &[&str]) -> BTreeSet<String> {
    numbers.iter().map(|number| number.to_string()).collect()
}

fn matcher_for(numbers: &[&str]) -> HeadingMatcher {
    HeadingMatcher::build(&number_set(numbers))
        .expect("matcher should build")
        .expect("matcher should exist")
}

fn locate(text: &str, numbers: &[&str]) -> HashMap<String, usize> {
    let expected = number_set(numbers);
    let matcher = HeadingMatcher::build(&expected)
        .expect("matcher should build")
        .expect("matcher should exist");
    locate_primary_headings(text, &matcher, &expected, 0.8)
}

fn extractor_for(rows: &[(&str, &str)]) -> ChapterExtractor {
    let headings: Vec<ChapterHeading> = rows
        .iter()
        .map(|(number, title)| ChapterHeading {
            number: number.to_string(),
            title: title.to_string(),
        })
        .collect();
    ChapterExtractor::new(&headings, &ExtractionOptions::default()).expect("extractor should build")
}

fn question_extractor() -> QuestionExtractor {
    QuestionExtractor::new("EXERCISES").expect("question extractor should build")
}

fn reference_row(chapter: &str, number: &str, title: &str) -> HeadingReferenceRow {
    HeadingReferenceRow {
        chapter: chapter.to_string(),
        number: number.to_string(),
        title: title.to_string(),
    }
}
