use super::*;

pub fn normalize_transcript(raw_text: &str) -> String {
    let collapsed = collapse_whitespace(raw_text);
    remove_hyphen_line_wraps(&collapsed)
}

fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<&str>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<String>>()
        .join("\n")
}

fn remove_hyphen_line_wraps(text: &str) -> String {
    text.replace("-\n", "")
}
