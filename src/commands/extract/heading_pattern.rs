use super::*;

const HEADING_BOUNDARY: &str = r"(?:[.\-]\s|[.\-]$|\s|$)";

pub fn canonical_heading_number(raw: &str) -> String {
    let mut canonical = String::with_capacity(raw.len());

    for character in raw.trim().chars() {
        if character.is_ascii_digit() {
            canonical.push(character);
        } else if !canonical.is_empty() && !canonical.ends_with('.') {
            canonical.push('.');
        }
    }

    while canonical.ends_with('.') {
        canonical.pop();
    }

    canonical
}

pub struct HeadingMatcher {
    line_anchored: Regex,
    scoped: Regex,
}

impl HeadingMatcher {
    pub fn build(expected_numbers: &BTreeSet<String>) -> Result<Option<Self>> {
        let alternation = number_alternation(expected_numbers);
        if alternation.is_empty() {
            return Ok(None);
        }

        let line_anchored = Regex::new(&format!("(?mi)^({alternation}){HEADING_BOUNDARY}"))
            .context("failed to compile line-anchored heading regex")?;
        let scoped = Regex::new(&format!(
            "(?mi)(?:^|[^0-9.])({alternation}){HEADING_BOUNDARY}"
        ))
        .context("failed to compile scoped heading regex")?;

        Ok(Some(Self {
            line_anchored,
            scoped,
        }))
    }

    pub fn line_anchored(&self) -> &Regex {
        &self.line_anchored
    }

    pub fn scoped(&self) -> &Regex {
        &self.scoped
    }
}

fn number_alternation(expected_numbers: &BTreeSet<String>) -> String {
    let mut numbers: Vec<&String> = expected_numbers
        .iter()
        .filter(|number| !number.is_empty())
        .collect();
    numbers.sort_by(|a, b| {
        component_count(b)
            .cmp(&component_count(a))
            .then_with(|| a.cmp(b))
    });

    numbers
        .iter()
        .map(|number| number_variant(number))
        .collect::<Vec<String>>()
        .join("|")
}

fn component_count(number: &str) -> usize {
    number.split('.').count()
}

fn number_variant(number: &str) -> String {
    number.split('.').collect::<Vec<&str>>().join(r"[.\- ]")
}
