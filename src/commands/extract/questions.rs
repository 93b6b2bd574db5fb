use super::*;

pub struct QuestionExtractor {
    marker: Regex,
    question_start: Regex,
}

impl QuestionExtractor {
    pub fn new(marker_literal: &str) -> Result<Self> {
        let marker = Regex::new(&format!("(?i){}", regex::escape(marker_literal)))
            .context("failed to compile exercises marker regex")?;
        let question_start = Regex::new(r"(?m)^(\d+\.\d+\.?|\d+\.)\s+")
            .context("failed to compile question start regex")?;

        Ok(Self {
            marker,
            question_start,
        })
    }

    pub fn extract(&self, text: &str) -> Vec<ExtractedQuestion> {
        let Some(marker_match) = self.marker.find(text) else {
            return Vec::new();
        };
        let section = &text[marker_match.end()..];

        let starts: Vec<(usize, usize, String)> = self
            .question_start
            .captures_iter(section)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let token = captures.get(1)?;
                Some((
                    whole.start(),
                    whole.end(),
                    token.as_str().trim_end_matches('.').to_string(),
                ))
            })
            .collect();

        let mut questions = Vec::with_capacity(starts.len());
        for (index, (_, body_start, number)) in starts.iter().enumerate() {
            let hard_end = starts
                .get(index + 1)
                .map(|(next_start, _, _)| *next_start)
                .unwrap_or(section.len());

            let body = &section[*body_start..hard_end];
            let body = match body.find("\n\n") {
                Some(cut) => &body[..cut],
                None => body,
            };

            questions.push(ExtractedQuestion {
                number: number.clone(),
                text: body.trim().to_string(),
            });
        }

        questions
    }
}
