//! Text normalization helpers shared by the miner, classifier and evidence
//! collector.

use once_cell::sync::Lazy;
use regex::Regex;

/// Bullet prefixes stripped from lines and entity values
const BULLETS: &[char] = &['\u{2022}', '-', '\u{2014}', '*', '\u{00B7}'];
/// Characters trimmed from both ends after bullet removal
const EDGE_NOISE: &[char] = &['\u{00B7}', '\u{2022}', '-', '\u{2014}', '*', ',', ' '];

/// Headings that are never entities
const SECTION_HEADINGS: &[&str] = &[
    "summary",
    "experience",
    "work experience",
    "education",
    "projects",
    "skills",
    "technologies",
    "frameworks",
    "tools",
    "certifications",
    "awards",
    "publications",
];

static WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static INLINE_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("valid inline whitespace regex"));

pub fn is_bullet(c: char) -> bool {
    BULLETS.contains(&c)
}

/// Remove leading bullets, collapse whitespace and trim edge noise
pub fn strip_bullets_and_noise(s: &str) -> String {
    let mut rest = s.trim();
    loop {
        let next = rest.trim_start_matches(BULLETS).trim_start();
        if next.len() == rest.len() {
            break;
        }
        rest = next;
    }
    let collapsed = WS.replace_all(rest, " ");
    collapsed.trim_matches(EDGE_NOISE).to_string()
}

/// Collapse runs of spaces and tabs, then trim
pub fn clean_ws(s: &str) -> String {
    INLINE_WS.replace_all(s, " ").trim().to_string()
}

/// First `max` characters of `s`
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Whether a value is a resume section heading rather than an entity
pub fn looks_like_section_heading(s: &str) -> bool {
    let trimmed = s.trim();
    let bare = trimmed.trim_matches(|c| c == ':' || c == ' ').to_lowercase();
    if SECTION_HEADINGS.contains(&bare.as_str()) {
        return true;
    }
    trimmed.chars().count() <= 24 && trimmed.ends_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bullets_and_noise() {
        assert_eq!(strip_bullets_and_noise("  • - Built   a\tpipeline ,"), "Built a pipeline");
        assert_eq!(strip_bullets_and_noise("** Python"), "Python");
        assert_eq!(strip_bullets_and_noise("•"), "");
    }

    #[test]
    fn test_clean_ws_keeps_newlines_out() {
        assert_eq!(clean_ws("  Led \t the   team "), "Led the team");
    }

    #[test]
    fn test_truncate_chars_is_char_aware() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_section_headings() {
        assert!(looks_like_section_heading("Skills"));
        assert!(looks_like_section_heading("WORK EXPERIENCE:"));
        assert!(looks_like_section_heading("Languages:"));
        assert!(!looks_like_section_heading("Acme Corp"));
        assert!(!looks_like_section_heading("A very long line that ends with a colon:"));
    }
}
