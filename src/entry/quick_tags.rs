//! Structured metadata embedded at the top of an entry's content.
//!
//! An entry body may open with a block of lines such as
//!
//! ```text
//! Location: Lisbon
//! Mood: rested
//! Tags: travel, #family
//!
//! The actual text starts here.
//! ```
//!
//! The block is order-insensitive but anchored to the top: scanning stops at
//! the first blank line, the first line that is not one of the known keys, or
//! a key seen twice. Anything after that point is content, even if it looks
//! like metadata.

/// The four optional free-text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuickTags {
    pub location: Option<String>,
    pub weather: Option<String>,
    pub mood: Option<String>,
    pub plans: Option<String>,
}

impl QuickTags {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.weather.is_none() && self.mood.is_none() && self.plans.is_none()
    }
}

/// Structured fields plus the remaining free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContent {
    pub quick_tags: QuickTags,
    /// Entry tags in their original spelling and order, unique by lowercase.
    pub tags: Vec<String>,
    /// Content with the metadata block and its trailing blank lines removed.
    pub content: String,
}

impl ParsedContent {
    /// True when the entry carries `tag`, compared case-insensitively.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag_key(tag);
        self.tags.iter().any(|t| tag_key(t) == wanted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Location,
    Weather,
    Mood,
    Plans,
    Tags,
}

impl Key {
    const ALL: [Key; 5] = [Key::Location, Key::Weather, Key::Mood, Key::Plans, Key::Tags];

    fn label(self) -> &'static str {
        match self {
            Key::Location => "Location",
            Key::Weather => "Weather",
            Key::Mood => "Mood",
            Key::Plans => "Plans",
            Key::Tags => "Tags",
        }
    }
}

/// Recognizes `Key: value` with a non-empty value.
fn match_line(line: &str) -> Option<(Key, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (label, value) = line.split_once(':')?;
    let key = Key::ALL.into_iter().find(|k| k.label() == label)?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parses the metadata block off the top of `body`.
///
/// # Examples
///
/// ```
/// use daybook::entry::quick_tags::extract;
///
/// let parsed = extract("Tags: work, ideas\n\nWent for a walk.");
/// assert_eq!(parsed.tags, vec!["work", "ideas"]);
/// assert_eq!(parsed.content, "Went for a walk.");
///
/// // Not at the top, so not metadata.
/// let parsed = extract("Hello\nMood: fine");
/// assert!(parsed.quick_tags.mood.is_none());
/// assert_eq!(parsed.content, "Hello\nMood: fine");
/// ```
pub fn extract(body: &str) -> ParsedContent {
    let lines: Vec<&str> = body.split('\n').collect();

    let mut parsed = ParsedContent::default();
    let mut seen: Vec<Key> = Vec::new();
    let mut consumed = 0;

    for line in &lines {
        let Some((key, value)) = match_line(line) else {
            break;
        };
        if seen.contains(&key) {
            break;
        }
        seen.push(key);

        let value = value.to_string();
        match key {
            Key::Location => parsed.quick_tags.location = Some(value),
            Key::Weather => parsed.quick_tags.weather = Some(value),
            Key::Mood => parsed.quick_tags.mood = Some(value),
            Key::Plans => parsed.quick_tags.plans = Some(value),
            Key::Tags => parsed.tags = normalize_tags(&value),
        }
        consumed += 1;
    }

    if consumed == 0 {
        parsed.content = body.to_string();
        return parsed;
    }

    while consumed < lines.len() && lines[consumed].trim().is_empty() {
        consumed += 1;
    }
    parsed.content = lines[consumed..].join("\n");
    parsed
}

/// Writes structured fields back in front of the content.
///
/// Fields appear in the fixed order Location, Weather, Mood, Plans, Tags,
/// followed by one blank line and the content. Feeding the result to
/// [`extract`] gives back the same fields and content.
///
/// # Examples
///
/// ```
/// use daybook::entry::quick_tags::{format, ParsedContent, QuickTags};
///
/// let parsed = ParsedContent {
///     quick_tags: QuickTags { mood: Some("calm".into()), ..Default::default() },
///     tags: vec!["work".into()],
///     content: "Notes.".into(),
/// };
/// assert_eq!(format(&parsed), "Mood: calm\nTags: work\n\nNotes.");
/// ```
pub fn format(parsed: &ParsedContent) -> String {
    let q = &parsed.quick_tags;
    let mut lines: Vec<String> = Vec::new();

    for (key, value) in [
        (Key::Location, &q.location),
        (Key::Weather, &q.weather),
        (Key::Mood, &q.mood),
        (Key::Plans, &q.plans),
    ] {
        if let Some(value) = value.as_deref().map(single_line).filter(|v| !v.is_empty()) {
            lines.push(format!("{}: {}", key.label(), value));
        }
    }

    let tags = normalize_tags(&parsed.tags.join(","));
    if !tags.is_empty() {
        lines.push(format!("{}: {}", Key::Tags.label(), tags.join(", ")));
    }

    if lines.is_empty() {
        let first = parsed.content.split('\n').next().unwrap_or_default();
        if match_line(first).is_none() {
            return parsed.content.clone();
        }
        // Content that opens like metadata needs a block in front to stay content.
        lines.push(format!("{}: ,", Key::Tags.label()));
    }

    let mut out = lines.join("\n");
    if !parsed.content.is_empty() {
        out.push_str("\n\n");
        out.push_str(&parsed.content);
    }
    out
}

/// Splits a `Tags:` value into clean tags.
///
/// Tokens are trimmed, leading `#` removed, empties dropped and repeats
/// (ignoring case) dropped; the first spelling and order are kept.
///
/// # Examples
///
/// ```
/// use daybook::entry::quick_tags::normalize_tags;
///
/// assert_eq!(normalize_tags(" #Work, ideas,, work ,#"), vec!["Work", "ideas"]);
/// ```
pub fn normalize_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in raw.split(',') {
        let tag = strip_tag_prefix(token);
        if tag.is_empty() {
            continue;
        }
        let key = tag_key(tag);
        if tags.iter().any(|t| tag_key(t) == key) {
            continue;
        }
        tags.push(tag.to_string());
    }
    tags
}

/// Comparison key for entry tags.
pub fn tag_key(tag: &str) -> String {
    strip_tag_prefix(tag).to_lowercase()
}

fn strip_tag_prefix(token: &str) -> &str {
    token
        .trim_start_matches(|c: char| c == '#' || c.is_whitespace())
        .trim_end()
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_keys_in_any_order() {
        let body = "Plans: dinner\nTags: a, b\nWeather: rain\nLocation: Porto\nMood: ok\nText";
        let parsed = extract(body);
        assert_eq!(
            parsed.quick_tags,
            QuickTags {
                location: Some("Porto".into()),
                weather: Some("rain".into()),
                mood: Some("ok".into()),
                plans: Some("dinner".into()),
            }
        );
        assert_eq!(parsed.tags, vec!["a", "b"]);
        assert_eq!(parsed.content, "Text");
    }

    #[test]
    fn test_scan_stops_at_first_non_matching_line() {
        let parsed = extract("Mood: happy\nDear diary,\nLocation: home");
        assert_eq!(parsed.quick_tags.mood.as_deref(), Some("happy"));
        assert!(parsed.quick_tags.location.is_none());
        assert_eq!(parsed.content, "Dear diary,\nLocation: home");
    }

    #[test]
    fn test_scan_stops_at_blank_line() {
        let parsed = extract("Mood: happy\n\nLocation: home\nrest");
        assert_eq!(parsed.quick_tags.mood.as_deref(), Some("happy"));
        assert!(parsed.quick_tags.location.is_none());
        assert_eq!(parsed.content, "Location: home\nrest");
    }

    #[test]
    fn test_repeated_key_ends_block() {
        let parsed = extract("Mood: a\nMood: b\ntext");
        assert_eq!(parsed.quick_tags.mood.as_deref(), Some("a"));
        assert_eq!(parsed.content, "Mood: b\ntext");
    }

    #[test]
    fn test_leading_blank_line_means_no_metadata() {
        let body = "\nMood: a\ntext";
        let parsed = extract(body);
        assert!(parsed.quick_tags.is_empty());
        assert_eq!(parsed.content, body);
    }

    #[test]
    fn test_keys_are_case_sensitive_and_need_values() {
        assert!(extract("mood: a").quick_tags.mood.is_none());
        assert!(extract("Mood:").quick_tags.mood.is_none());
        assert!(extract("Mood:    ").quick_tags.mood.is_none());
        assert!(extract("Mood - a").quick_tags.mood.is_none());
        assert_eq!(extract("Mood:a").quick_tags.mood.as_deref(), Some("a"));
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        let parsed = extract("Plans: meet at 10:30\n");
        assert_eq!(parsed.quick_tags.plans.as_deref(), Some("meet at 10:30"));
        assert_eq!(parsed.content, "");
    }

    #[test]
    fn test_all_trailing_blank_lines_stripped() {
        let parsed = extract("Tags: x\n\n \n\t\nBody\n\nmore");
        assert_eq!(parsed.content, "Body\n\nmore");
    }

    #[test]
    fn test_crlf_metadata_lines() {
        let parsed = extract("Mood: calm\r\nTags: a\r\n\r\nBody");
        assert_eq!(parsed.quick_tags.mood.as_deref(), Some("calm"));
        assert_eq!(parsed.tags, vec!["a"]);
        assert_eq!(parsed.content, "Body");
    }

    #[test]
    fn test_tags_only_metadata_with_empty_tokens() {
        let parsed = extract("Tags: , ,#\nBody");
        assert!(parsed.tags.is_empty());
        assert_eq!(parsed.content, "Body");
    }

    #[test]
    fn test_normalize_tags() {
        assert_eq!(normalize_tags("work, ideas"), vec!["work", "ideas"]);
        assert_eq!(normalize_tags("#a,##b, # c "), vec!["a", "b", "c"]);
        assert_eq!(normalize_tags("# #b, #\t# c#"), vec!["b", "c#"]);
        assert_eq!(normalize_tags("Rust, rust, RUST"), vec!["Rust"]);
        assert!(normalize_tags("").is_empty());
    }

    #[test]
    fn test_has_tag_ignores_case() {
        let parsed = extract("Tags: Work\n");
        assert!(parsed.has_tag("work"));
        assert!(parsed.has_tag("#WORK"));
        assert!(!parsed.has_tag("wor"));
    }

    #[test]
    fn test_extract_format_extract_is_stable() {
        let bodies = [
            "Tags: work, ideas\n\nWent for a walk.",
            "Plans: x\nMood: y\nLocation: z\nWeather: w\nTags: #a,b\ntext",
            "Location: A\n\nMood: B",
            "Location: A\nLocation: B",
            "Tags: a\n\n",
            "Tags: ,\nhello",
            "Tags: ,\n\nMood: x\ntext",
            "Tags: # #b\n\nbody",
            "Mood: y\n\nTags: z\nmore",
            "no metadata at all\nTags: late",
            "\n\nleading blanks",
            "Mood:   spaced   out   \nrest",
            "Weather: windy\r\nPlans: none\r\n\r\nbody\r\n",
            "",
        ];

        for body in bodies {
            let first = extract(body);
            let second = extract(&format(&first));
            assert_eq!(first.quick_tags, second.quick_tags, "quick tags for {body:?}");
            assert_eq!(first.tags, second.tags, "tags for {body:?}");
            assert_eq!(first.content, second.content, "content for {body:?}");
        }
    }

    #[test]
    fn test_format_without_fields_is_content() {
        let parsed = ParsedContent {
            content: "just text".into(),
            ..Default::default()
        };
        assert_eq!(format(&parsed), "just text");
    }

    #[test]
    fn test_format_keeps_metadata_like_content_as_content() {
        let parsed = ParsedContent {
            content: "Mood: x\ntext".into(),
            ..Default::default()
        };
        let body = format(&parsed);
        assert_eq!(body, "Tags: ,\n\nMood: x\ntext");

        let reparsed = extract(&body);
        assert!(reparsed.quick_tags.is_empty());
        assert!(reparsed.tags.is_empty());
        assert_eq!(reparsed.content, "Mood: x\ntext");
    }
}
