use super::*;

pub fn recover_missing_locations(
    text: &str,
    primary_segments: &[TopicSegment],
    missing_numbers: &BTreeSet<String>,
    matcher: &HeadingMatcher,
) -> HashMap<String, usize> {
    let mut recovered: HashMap<String, usize> = HashMap::new();

    for segment in primary_segments {
        if recovered.len() == missing_numbers.len() {
            break;
        }

        let span = &text[segment.start_offset..segment.end_offset];
        for captures in matcher.scoped().captures_iter(span) {
            let Some(numeral) = captures.get(1) else {
                continue;
            };
            if numeral.start() == 0 {
                continue;
            }

            let canonical = canonical_heading_number(numeral.as_str());
            if !missing_numbers.contains(&canonical) || recovered.contains_key(&canonical) {
                continue;
            }

            recovered.insert(canonical, segment.start_offset + numeral.start());
        }
    }

    recovered
}
