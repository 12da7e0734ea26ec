//! The on-disk text format of an entry.
//!
//! ```text
//! <title>
//! <JSON array of image filenames>
//! <content, any number of lines>
//! ```
//!
//! Only the first two newlines are structural. Decoding never fails: a
//! missing or malformed image line becomes an empty list and a missing body
//! becomes an empty string.

use serde_json::Value;
use tracing::debug;

/// The three stored parts of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    pub images: Vec<String>,
    pub body: String,
}

impl Record {
    pub fn new(title: impl Into<String>, images: Vec<String>, body: impl Into<String>) -> Self {
        Record {
            title: title.into(),
            images,
            body: body.into(),
        }
    }

    /// Serializes the record into the stored blob.
    pub fn encode(&self) -> String {
        encode(&self.title, &self.images, &self.body)
    }

    /// Parses a stored blob, degrading malformed parts to empty values.
    pub fn decode(blob: &str) -> Self {
        decode(blob)
    }
}

/// Joins title, image list and body into one blob.
///
/// # Examples
///
/// ```
/// use daybook::entry::record;
///
/// let blob = record::encode("Morning", &["a.jpg".to_string()], "Went out.\nCame back.");
/// assert_eq!(blob, "Morning\n[\"a.jpg\"]\nWent out.\nCame back.");
/// ```
pub fn encode(title: &str, images: &[String], body: &str) -> String {
    // A Vec<String> always serializes.
    let images_json = serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string());
    format!("{title}\n{images_json}\n{body}")
}

/// Splits a blob on its first two newlines.
///
/// # Examples
///
/// ```
/// use daybook::entry::record;
///
/// let rec = record::decode("Only a title");
/// assert_eq!(rec.title, "Only a title");
/// assert!(rec.images.is_empty());
/// assert_eq!(rec.body, "");
///
/// let rec = record::decode("T\nnot json\nbody");
/// assert!(rec.images.is_empty());
/// assert_eq!(rec.body, "body");
/// ```
pub fn decode(blob: &str) -> Record {
    let mut parts = blob.splitn(3, '\n');

    let title = parts.next().unwrap_or_default();
    let images = parts.next().map(decode_images).unwrap_or_default();
    let body = parts.next().unwrap_or_default();

    Record {
        title: strip_cr(title).to_string(),
        images,
        body: body.to_string(),
    }
}

fn decode_images(line: &str) -> Vec<String> {
    let line = strip_cr(line).trim();
    if line.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(line) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                other => {
                    debug!("Dropping non-string image reference: {}", other);
                    None
                }
            })
            .collect(),
        Ok(other) => {
            debug!("Image line is not a list ({}), using empty list", other);
            Vec::new()
        }
        Err(e) => {
            debug!("Malformed image line, using empty list: {}", e);
            Vec::new()
        }
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let cases = [
            ("Morning", names(&[]), "Tags: work, ideas\n\nWent for a walk."),
            ("Trip", names(&["a.jpg", "b b.png"]), ""),
            ("Quotes \"and\" unicode é", names(&["x\"y.gif"]), "line1\n\nline3\n"),
            ("", names(&[]), "\n\nleading newlines in body"),
        ];

        for (title, images, body) in cases {
            let decoded = decode(&encode(title, &images, body));
            assert_eq!(decoded, Record::new(title, images.clone(), body));
        }
    }

    #[test]
    fn test_body_newlines_are_not_structural() {
        let blob = "Title\n[]\nfirst\nsecond\nthird";
        let rec = decode(blob);
        assert_eq!(rec.body, "first\nsecond\nthird");
    }

    #[test]
    fn test_missing_parts_degrade() {
        assert_eq!(decode(""), Record::default());
        assert_eq!(decode("Title"), Record::new("Title", vec![], ""));
        assert_eq!(decode("Title\n[\"a.jpg\"]"), Record::new("Title", names(&["a.jpg"]), ""));
    }

    #[test]
    fn test_malformed_image_line_yields_empty_list() {
        for line in ["{\"a\":1}", "\"a.jpg\"", "[\"a.jpg\"", "null", "42", "a.jpg"] {
            let rec = decode(&format!("T\n{line}\nbody"));
            assert!(rec.images.is_empty(), "line {line:?} should give no images");
            assert_eq!(rec.body, "body");
        }
    }

    #[test]
    fn test_non_string_items_are_dropped() {
        let rec = decode("T\n[\"a.jpg\", 3, null, \"b.jpg\"]\n");
        assert_eq!(rec.images, names(&["a.jpg", "b.jpg"]));
    }

    #[test]
    fn test_crlf_header_lines() {
        let rec = decode("Title\r\n[\"a.jpg\"]\r\nbody\r\nmore");
        assert_eq!(rec.title, "Title");
        assert_eq!(rec.images, names(&["a.jpg"]));
        assert_eq!(rec.body, "body\r\nmore");
    }
}
