//! Source-side landmarks: lines that start a heading.

use std::sync::LazyLock;

use regex::Regex;

/// A line starting with one or more `#`, optionally inside a block quote.
static LANDMARK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:> ?)?#+").expect("landmark pattern is valid"));

/// A run of source text between two landmark boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// The segment text, including its trailing newline if any.
    pub text: &'a str,
    /// Heading title when the segment starts on a landmark line.
    pub landmark: Option<String>,
}

/// Split `text` immediately before every landmark line.
///
/// Text before the first landmark forms the leading segment. A document
/// that opens with a landmark has no empty leading segment; its first
/// segment is the landmark itself. Concatenating the segments reproduces
/// `text` exactly.
pub fn split_segments(text: &str) -> Vec<Segment<'_>> {
    let mut starts: Vec<usize> = LANDMARK
        .find_iter(text)
        .map(|m| m.start())
        .filter(|&start| start > 0)
        .collect();
    starts.push(text.len());

    let mut segments = Vec::with_capacity(starts.len());
    let mut from = 0;
    for to in starts {
        let piece = &text[from..to];
        segments.push(Segment {
            text: piece,
            landmark: landmark_title(piece),
        });
        from = to;
    }
    segments
}

/// Whether `text` begins on a landmark line.
pub fn starts_with_landmark(text: &str) -> bool {
    LANDMARK.find(text).is_some_and(|m| m.start() == 0)
}

/// The heading title of a segment that starts on a landmark line.
fn landmark_title(segment: &str) -> Option<String> {
    let found = LANDMARK.find(segment).filter(|m| m.start() == 0)?;
    let line = segment[found.end()..].lines().next().unwrap_or_default();
    let title = line.trim().trim_end_matches('#').trim_end();
    Some(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(segments: &[Segment<'a>]) -> Vec<&'a str> {
        segments.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_split_keeps_leading_text_as_own_segment() {
        let segments = split_segments("intro\n# A\nbody1\n# B\nbody2");
        assert_eq!(texts(&segments), vec!["intro\n", "# A\nbody1\n", "# B\nbody2"]);
        assert_eq!(segments[0].landmark, None);
        assert_eq!(segments[1].landmark.as_deref(), Some("A"));
        assert_eq!(segments[2].landmark.as_deref(), Some("B"));
    }

    #[test]
    fn test_split_without_empty_leading_segment() {
        let segments = split_segments("# A\nbody\n## B\n");
        assert_eq!(texts(&segments), vec!["# A\nbody\n", "## B\n"]);
        assert!(starts_with_landmark("# A\nbody\n## B\n"));
    }

    #[test]
    fn test_no_landmarks_is_single_segment() {
        let segments = split_segments("just text\nmore text");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].landmark, None);
    }

    #[test]
    fn test_empty_text_is_single_empty_segment() {
        let segments = split_segments("");
        assert_eq!(texts(&segments), vec![""]);
    }

    #[test]
    fn test_blockquoted_heading_is_landmark() {
        let segments = split_segments("a\n> # Quoted\n>## Tight\n");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].landmark.as_deref(), Some("Quoted"));
        assert_eq!(segments[2].landmark.as_deref(), Some("Tight"));
    }

    #[test]
    fn test_mid_line_hash_is_not_landmark() {
        let segments = split_segments("see issue #12\nand more");
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_closing_hashes_are_stripped_from_title() {
        let segments = split_segments("## Title ##\n");
        assert_eq!(segments[0].landmark.as_deref(), Some("Title"));
    }

    #[test]
    fn test_segments_concatenate_to_source() {
        let text = "x\n# a\n\n> # b\ny\n### c";
        let joined: String = split_segments(text).iter().map(|s| s.text).collect();
        assert_eq!(joined, text);
    }
}
