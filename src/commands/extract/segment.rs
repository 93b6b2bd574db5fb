use super::*;

pub fn segment_topics(
    text: &str,
    locations: &HashMap<String, usize>,
    titles: &HashMap<String, String>,
) -> Vec<TopicSegment> {
    let mut ordered: Vec<(&String, usize)> = locations
        .iter()
        .map(|(number, offset)| (number, *offset))
        .collect();
    ordered.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let mut segments = Vec::with_capacity(ordered.len());
    for (index, (number, offset)) in ordered.iter().enumerate() {
        let end_offset = ordered
            .get(index + 1)
            .map(|(_, next_offset)| *next_offset)
            .unwrap_or(text.len());
        let heading_title = titles.get(*number).cloned().unwrap_or_default();

        segments.push(TopicSegment {
            heading_number: (*number).clone(),
            heading_title,
            body: text[*offset..end_offset].to_string(),
            start_offset: *offset,
            end_offset,
        });
    }

    segments
}
