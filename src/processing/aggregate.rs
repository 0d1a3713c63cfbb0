//! Aggregation of part summaries into the annotated summary document.
//!
//! The part marker is the contract between the aggregator and the section parser: a blank line,
//! then `Part <n>:` on its own line, then the part content. [`PartMarker`] owns both directions
//! of that format so neither side re-derives it.

use std::fmt;

use super::types::PartSummary;

/// Separator placed before every part marker.
pub(crate) const MARKER_SEPARATOR: &str = "\n\n";
const MARKER_LABEL: &str = "Part ";

/// Typed `Part <n>:` delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartMarker {
    /// 1-based part index.
    pub index: usize,
}

impl PartMarker {
    /// Recognise a marker at the very start of `text`.
    ///
    /// Returns the marker and the number of bytes it occupies. Only `Part ` followed by ASCII
    /// digits and a colon qualifies.
    pub(crate) fn parse_prefix(text: &str) -> Option<(Self, usize)> {
        let rest = text.strip_prefix(MARKER_LABEL)?;
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 || rest.as_bytes().get(digits) != Some(&b':') {
            return None;
        }
        let index = rest[..digits].parse().ok()?;
        Some((Self { index }, MARKER_LABEL.len() + digits + 1))
    }
}

impl fmt::Display for PartMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{MARKER_LABEL}{}:", self.index)
    }
}

/// Marker-delimited concatenation of every part summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedSummary(String);

impl AnnotatedSummary {
    /// Borrow the annotated text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the annotated text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for AnnotatedSummary {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for AnnotatedSummary {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl AsRef<str> for AnnotatedSummary {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Concatenate part summaries in order, each preceded by its marker.
///
/// Marker indices come from slice position, not from `PartSummary::index`. Content is kept as
/// the summarizer wrote it, except that blank lines directly above a line that reads as a marker
/// are dropped, so summary content can never open a new part.
pub fn aggregate(parts: &[PartSummary]) -> AnnotatedSummary {
    let mut annotated = String::new();
    for (position, part) in parts.iter().enumerate() {
        annotated.push_str(MARKER_SEPARATOR);
        annotated.push_str(&PartMarker { index: position + 1 }.to_string());
        annotated.push('\n');
        annotated.push_str(&unseat_markers(part.text.trim()));
    }
    AnnotatedSummary(annotated)
}

fn unseat_markers(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        if PartMarker::parse_prefix(line).is_some() {
            while kept.last().is_some_and(|previous| previous.trim().is_empty()) {
                kept.pop();
            }
        }
        kept.push(line);
    }
    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(index: usize, text: &str) -> PartSummary {
        PartSummary {
            index,
            text: text.to_string(),
        }
    }

    #[test]
    fn aggregate_prefixes_each_part_with_marker() {
        let annotated = aggregate(&[part(1, "  First summary. "), part(2, "Second.\n")]);
        assert_eq!(
            annotated.as_str(),
            "\n\nPart 1:\nFirst summary.\n\nPart 2:\nSecond."
        );
    }

    #[test]
    fn aggregate_of_nothing_is_empty() {
        assert_eq!(aggregate(&[]).as_str(), "");
    }

    #[test]
    fn content_cannot_forge_a_marker() {
        let annotated = aggregate(&[part(1, "Intro line.\n\nPart 7:\nnot a part")]);
        assert_eq!(
            annotated.as_str(),
            "\n\nPart 1:\nIntro line.\nPart 7:\nnot a part"
        );
    }

    #[test]
    fn paragraphs_pass_through_unchanged() {
        let annotated = aggregate(&[part(1, "Para one.\n\nPara two.\r\n\r\nPara three.")]);
        assert_eq!(
            annotated.as_str(),
            "\n\nPart 1:\nPara one.\n\nPara two.\r\n\r\nPara three."
        );
    }

    #[test]
    fn marker_lines_without_blank_lines_are_left_alone() {
        let annotated = aggregate(&[part(1, "Intro.\nPart 3: inline mention\n\nOutro.")]);
        assert_eq!(
            annotated.as_str(),
            "\n\nPart 1:\nIntro.\nPart 3: inline mention\n\nOutro."
        );
    }

    #[test]
    fn marker_index_follows_position() {
        let annotated = aggregate(&[part(5, "First."), part(9, "Second.")]);
        assert_eq!(annotated.as_str(), "\n\nPart 1:\nFirst.\n\nPart 2:\nSecond.");
    }

    #[test]
    fn marker_prefix_requires_digits_and_colon() {
        assert_eq!(
            PartMarker::parse_prefix("Part 12:\nrest"),
            Some((PartMarker { index: 12 }, 8))
        );
        assert_eq!(PartMarker::parse_prefix("Part x:"), None);
        assert_eq!(PartMarker::parse_prefix("Part 3 no colon"), None);
        assert_eq!(PartMarker::parse_prefix("Partial 1:"), None);
    }

    #[test]
    fn marker_displays_its_index() {
        assert_eq!(PartMarker { index: 4 }.to_string(), "Part 4:");
    }
}
