//! Markdown document layout for the preview pane.
//!
//! This module handles:
//! - Parsing markdown with comrak
//! - Recording headings, images and `<details>` blocks by row
//! - Laying text out as styled rows at a given width

mod parser;
mod types;

pub use parser::parse_with_layout;
pub use types::{
    DisclosureRef, Document, HeadingRef, ImageRef, InlineSpan, InlineStyle, LineType,
    RenderedLine,
};

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    proptest! {
        #[test]
        fn headings_point_at_heading_rows(
            titles in prop::collection::vec("[a-z]{1,12}", 1..8),
            width in 20u16..120,
        ) {
            let md: String = titles
                .iter()
                .map(|t| format!("# {t}\n\nsome body text for {t}\n\n"))
                .collect();
            let doc = parse_with_layout(&md, width, &HashMap::new()).unwrap();
            prop_assert_eq!(doc.headings().len(), titles.len());
            let mut last = None;
            for heading in doc.headings() {
                let line = doc.line_at(heading.line).unwrap();
                prop_assert_eq!(line.line_type(), &LineType::Heading(1));
                prop_assert!(last.is_none_or(|prev| prev < heading.line));
                last = Some(heading.line);
            }
        }

        #[test]
        fn rows_never_exceed_width(text in "[a-z ]{0,200}", width in 12u16..80) {
            let doc = parse_with_layout(&text, width, &HashMap::new()).unwrap();
            for i in 0..doc.line_count() {
                let content = doc.line_at(i).unwrap().content();
                prop_assert!(
                    unicode_width::UnicodeWidthStr::width(content) <= usize::from(width)
                        || !content.contains(' ')
                );
            }
        }
    }
}
