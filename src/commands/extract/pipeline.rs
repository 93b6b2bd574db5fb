use super::*;

pub struct ChapterExtractor {
    matcher: Option<HeadingMatcher>,
    expected_numbers: BTreeSet<String>,
    titles: HashMap<String, String>,
    question_extractor: QuestionExtractor,
    body_fraction: f64,
}

impl ChapterExtractor {
    pub fn new(headings: &[ChapterHeading], options: &ExtractionOptions) -> Result<Self> {
        let mut expected_numbers = BTreeSet::new();
        let mut titles = HashMap::new();

        for heading in headings {
            let canonical = canonical_heading_number(&heading.number);
            if canonical.is_empty() {
                continue;
            }
            if expected_numbers.insert(canonical.clone()) {
                titles.insert(canonical, heading.title.clone());
            }
        }

        let matcher = HeadingMatcher::build(&expected_numbers)?;
        let question_extractor = QuestionExtractor::new(&options.exercises_marker)?;

        Ok(Self {
            matcher,
            expected_numbers,
            titles,
            question_extractor,
            body_fraction: options.body_fraction,
        })
    }

    pub fn extract(&self, raw_text: &str) -> ChapterExtraction {
        let text = normalize_transcript(raw_text);
        if text.is_empty() {
            return ChapterExtraction {
                missing_numbers: self.expected_numbers.iter().cloned().collect(),
                ..ChapterExtraction::default()
            };
        }

        let questions = self.question_extractor.extract(&text);

        let Some(matcher) = &self.matcher else {
            return ChapterExtraction {
                questions,
                normalized_char_count: text.chars().count(),
                ..ChapterExtraction::default()
            };
        };

        let primary =
            locate_primary_headings(&text, matcher, &self.expected_numbers, self.body_fraction);
        let missing_after_primary = missing_heading_numbers(&self.expected_numbers, &primary);
        let primary_segments = segment_topics(&text, &primary, &self.titles);

        let recovered = if missing_after_primary.is_empty() {
            HashMap::new()
        } else {
            recover_missing_locations(&text, &primary_segments, &missing_after_primary, matcher)
        };

        let mut recovered_numbers: Vec<String> = recovered.keys().cloned().collect();
        recovered_numbers.sort();

        let topics = if recovered.is_empty() {
            primary_segments
        } else {
            let mut all_locations = primary.clone();
            all_locations.extend(recovered);
            segment_topics(&text, &all_locations, &self.titles)
        };

        let located: HashMap<String, usize> = topics
            .iter()
            .map(|topic| (topic.heading_number.clone(), topic.start_offset))
            .collect();
        let missing_numbers: Vec<String> = missing_heading_numbers(&self.expected_numbers, &located)
            .into_iter()
            .collect();

        ChapterExtraction {
            topics,
            questions,
            recovered_numbers,
            missing_numbers,
            normalized_char_count: text.chars().count(),
        }
    }
}
