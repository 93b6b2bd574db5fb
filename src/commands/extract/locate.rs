use super::*;

pub fn body_cutoff(text_len: usize, body_fraction: f64) -> usize {
    (text_len as f64 * body_fraction).floor() as usize
}

pub fn locate_primary_headings(
    text: &str,
    matcher: &HeadingMatcher,
    expected_numbers: &BTreeSet<String>,
    body_fraction: f64,
) -> HashMap<String, usize> {
    let cutoff = body_cutoff(text.len(), body_fraction);
    let mut locations: HashMap<String, usize> = HashMap::new();

    for captures in matcher.line_anchored().captures_iter(text) {
        let Some(numeral) = captures.get(1) else {
            continue;
        };
        if numeral.start() >= cutoff {
            continue;
        }

        let canonical = canonical_heading_number(numeral.as_str());
        if !expected_numbers.contains(&canonical) {
            continue;
        }

        locations.entry(canonical).or_insert(numeral.start());
    }

    locations
}

pub fn missing_heading_numbers(
    expected_numbers: &BTreeSet<String>,
    locations: &HashMap<String, usize>,
) -> BTreeSet<String> {
    expected_numbers
        .iter()
        .filter(|number| !locations.contains_key(*number))
        .cloned()
        .collect()
}
