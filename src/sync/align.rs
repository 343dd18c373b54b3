//! Pairing source landmarks with rendered headings.
//!
//! Both lists are derived independently: the source side by pattern, the
//! render side from the renderer's output. A `#` line inside a fenced code
//! block is a landmark to the pattern but not a heading to the renderer, so
//! trusting positions alone can shift every later anchor.

use super::coords::CoordinateSequence;
use super::pane::RenderedHeading;
use super::source::SourceLayout;

/// How source landmarks are matched to rendered headings.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Landmark *i* is heading *i*. Differing counts disable mapping.
    Positional,
    /// Match by heading text in document order, dropping unmatched entries
    /// from both sides.
    #[default]
    Text,
}

impl Alignment {
    /// Build the source and render sequences for one extraction.
    ///
    /// `trailing` is the render pane's total scroll height, used as the end
    /// sentinel.
    pub fn align(
        self,
        source: &SourceLayout,
        headings: &[RenderedHeading],
        trailing: f64,
    ) -> (CoordinateSequence, CoordinateSequence) {
        match self {
            Self::Positional => {
                let mut render = Vec::with_capacity(headings.len() + 2);
                render.push(0.0);
                render.extend(headings.iter().map(|h| h.offset));
                render.push(trailing);
                (source.coordinates.clone(), CoordinateSequence::new(render))
            }
            Self::Text => align_by_text(source, headings, trailing),
        }
    }
}

fn align_by_text(
    source: &SourceLayout,
    headings: &[RenderedHeading],
    trailing: f64,
) -> (CoordinateSequence, CoordinateSequence) {
    let offsets = source.coordinates.as_slice();
    let source_end = offsets.last().copied().unwrap_or(0.0);
    let keys: Vec<String> = source.landmarks.iter().map(|t| title_key(t)).collect();

    let mut xs = vec![0.0];
    let mut ys = vec![0.0];
    let mut cursor = 0;
    for heading in headings {
        let key = title_key(&heading.title);
        let Some(found) = keys[cursor..].iter().position(|k| *k == key) else {
            continue;
        };
        let landmark = cursor + found;
        // Landmark k starts at source offset k + 1; index 0 is the start sentinel.
        if let Some(&x) = offsets.get(landmark + 1) {
            xs.push(x);
            ys.push(heading.offset);
        }
        cursor = landmark + 1;
    }
    xs.push(source_end);
    ys.push(trailing);

    (CoordinateSequence::new(xs), CoordinateSequence::new(ys))
}

/// Lower-cased alphanumeric content, so a source title carrying emphasis or
/// code markers matches the plain text the renderer produces.
fn title_key(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(title: &str, offset: f64) -> RenderedHeading {
        RenderedHeading {
            level: 1,
            title: title.to_string(),
            offset,
        }
    }

    fn layout(coords: Vec<f64>, landmarks: &[&str]) -> SourceLayout {
        SourceLayout {
            coordinates: coords.into(),
            landmarks: landmarks.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_positional_wraps_headings_in_sentinels() {
        let source = layout(vec![0.0, 3.0, 7.0, 10.0], &["A", "B"]);
        let headings = [heading("A", 5.0), heading("B", 12.0)];
        let (xs, ys) = Alignment::Positional.align(&source, &headings, 40.0);
        assert_eq!(xs.as_slice(), &[0.0, 3.0, 7.0, 10.0]);
        assert_eq!(ys.as_slice(), &[0.0, 5.0, 12.0, 40.0]);
    }

    #[test]
    fn test_positional_mismatch_keeps_lengths_apart() {
        let source = layout(vec![0.0, 3.0, 7.0, 10.0], &["A", "B"]);
        let (xs, ys) = Alignment::Positional.align(&source, &[heading("A", 5.0)], 40.0);
        assert_ne!(xs.len(), ys.len());
    }

    #[test]
    fn test_text_matches_positional_when_titles_agree() {
        let source = layout(vec![0.0, 3.0, 7.0, 10.0], &["A", "B"]);
        let headings = [heading("A", 5.0), heading("B", 12.0)];
        assert_eq!(
            Alignment::Text.align(&source, &headings, 40.0),
            Alignment::Positional.align(&source, &headings, 40.0)
        );
    }

    #[test]
    fn test_text_skips_source_only_landmarks() {
        // "#!/bin/sh" inside a code block is a landmark but never a heading.
        let source = layout(vec![0.0, 2.0, 5.0, 9.0, 12.0], &["Setup", "!/bin/sh", "Usage"]);
        let headings = [heading("Setup", 4.0), heading("Usage", 20.0)];
        let (xs, ys) = Alignment::Text.align(&source, &headings, 50.0);
        assert_eq!(xs.as_slice(), &[0.0, 2.0, 9.0, 12.0]);
        assert_eq!(ys.as_slice(), &[0.0, 4.0, 20.0, 50.0]);
    }

    #[test]
    fn test_text_skips_render_only_headings() {
        let source = layout(vec![0.0, 2.0, 12.0], &["Only"]);
        let headings = [heading("Generated", 1.0), heading("Only", 6.0)];
        let (xs, ys) = Alignment::Text.align(&source, &headings, 30.0);
        assert_eq!(xs.as_slice(), &[0.0, 2.0, 12.0]);
        assert_eq!(ys.as_slice(), &[0.0, 6.0, 30.0]);
    }

    #[test]
    fn test_text_ignores_inline_markup() {
        let source = layout(vec![0.0, 0.0, 8.0], &["**Intro** to `x`"]);
        let (xs, ys) = Alignment::Text.align(&source, &[heading("Intro to x", 0.0)], 16.0);
        assert_eq!(xs.len(), 3);
        assert_eq!(ys.len(), 3);
    }

    #[test]
    fn test_text_with_no_headings_keeps_sentinels() {
        let source = layout(vec![0.0, 4.0, 8.0], &["A"]);
        let (xs, ys) = Alignment::Text.align(&source, &[], 16.0);
        assert_eq!(xs.as_slice(), &[0.0, 8.0]);
        assert_eq!(ys.as_slice(), &[0.0, 16.0]);
    }
}
