//! Section parser for annotated summaries.
//!
//! Parsing never fails. Text without markers degrades to a single "Document Summary" section,
//! text before the first marker becomes an "Overview", and every marker opens one section.
//!
//! Titles come from a colon heuristic: when a part contains a colon, the text before the first
//! colon becomes the title. Prose such as `Result: success` is therefore read as a title. That
//! behavior is kept as-is.

use super::aggregate::{MARKER_SEPARATOR, PartMarker};
use super::chunking::SENTENCE_DELIMITER;
use super::types::Section;

const OVERVIEW_TITLE: &str = "Overview";
const DOCUMENT_TITLE: &str = "Document Summary";

/// Parse an annotated summary into ordered sections.
pub fn parse_sections(annotated: &str) -> Vec<Section> {
    let (preamble, parts) = split_parts(annotated);

    if parts.is_empty() {
        return vec![Section {
            id: 1,
            title: DOCUMENT_TITLE.to_string(),
            points: non_empty_lines(annotated),
        }];
    }

    let mut sections = Vec::with_capacity(parts.len() + 1);
    if !preamble.trim().is_empty() {
        sections.push(Section {
            id: 0,
            title: OVERVIEW_TITLE.to_string(),
            points: non_empty_lines(preamble),
        });
    }

    sections.extend(
        parts
            .into_iter()
            .enumerate()
            .map(|(offset, piece)| parse_part(offset + 1, piece)),
    );
    sections
}

/// Split text into the preamble and the content following each recognised marker.
fn split_parts(text: &str) -> (&str, Vec<&str>) {
    // (marker start, content start)
    let mut boundaries: Vec<(usize, usize)> = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(MARKER_SEPARATOR) {
        let start = cursor + offset;
        let after_separator = start + MARKER_SEPARATOR.len();
        match PartMarker::parse_prefix(&text[after_separator..]) {
            Some((_, consumed)) => {
                boundaries.push((start, after_separator + consumed));
                cursor = after_separator + consumed;
            }
            None => cursor = start + 1,
        }
    }

    let Some(&(first_start, _)) = boundaries.first() else {
        return (text, Vec::new());
    };

    let parts = boundaries
        .iter()
        .enumerate()
        .map(|(position, &(_, content_start))| {
            let end = boundaries
                .get(position + 1)
                .map_or(text.len(), |&(next_start, _)| next_start);
            &text[content_start..end]
        })
        .collect();

    (&text[..first_start], parts)
}

fn parse_part(position: usize, piece: &str) -> Section {
    let default_title = format!("Section {position}");
    let part_text = piece.trim();
    let part_text = part_text
        .strip_prefix(&format!("{position}:"))
        .map_or(part_text, str::trim_start);

    let (title, content) = match part_text.split_once(':') {
        Some((head, tail)) => {
            let head = head.trim();
            let title = if head.is_empty() {
                default_title
            } else {
                head.to_string()
            };
            (title, tail.trim())
        }
        None => (default_title, part_text),
    };

    Section {
        id: position,
        title,
        points: content
            .split(SENTENCE_DELIMITER)
            .map(str::trim)
            .filter(|point| !point.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::aggregate::aggregate;
    use crate::processing::types::PartSummary;

    #[test]
    fn single_marker_without_colon_uses_default_title() {
        let sections = parse_sections("\n\nPart 1:\nThe cat sat. It was calm.");
        assert_eq!(
            sections,
            vec![Section {
                id: 1,
                title: "Section 1".into(),
                points: vec!["The cat sat".into(), "It was calm.".into()],
            }]
        );
    }

    #[test]
    fn marker_free_text_becomes_document_summary() {
        let sections = parse_sections("First line\n\n  second line  \n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, 1);
        assert_eq!(sections[0].title, "Document Summary");
        assert_eq!(sections[0].points, vec!["First line", "second line"]);
    }

    #[test]
    fn empty_input_still_yields_a_section() {
        let sections = parse_sections("");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Document Summary");
        assert!(sections[0].points.is_empty());
    }

    #[test]
    fn text_before_first_marker_becomes_overview() {
        let sections = parse_sections("Intro text\nmore intro\n\nPart 1:\nBody. More body");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].id, 0);
        assert_eq!(sections[0].title, "Overview");
        assert_eq!(sections[0].points, vec!["Intro text", "more intro"]);
        assert_eq!(sections[1].id, 1);
        assert_eq!(sections[1].points, vec!["Body", "More body"]);
    }

    #[test]
    fn colon_in_part_becomes_title() {
        let sections = parse_sections("\n\nPart 1:\nFindings: growth was steady. Costs fell.");
        assert_eq!(sections[0].title, "Findings");
        assert_eq!(sections[0].points, vec!["growth was steady", "Costs fell."]);
    }

    #[test]
    fn only_first_colon_splits_title() {
        let sections = parse_sections("\n\nPart 1:\nResult: success: partial. Done");
        assert_eq!(sections[0].title, "Result");
        assert_eq!(sections[0].points, vec!["success: partial", "Done"]);
    }

    #[test]
    fn leading_index_prefix_is_stripped_from_title() {
        let sections = parse_sections("\n\nPart 2:\nx\n\nPart 2:\n2: Methods: survey. Interviews");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].id, 2);
        assert_eq!(sections[1].title, "Methods");
        assert_eq!(sections[1].points, vec!["survey", "Interviews"]);
    }

    #[test]
    fn unmatched_markers_are_plain_text() {
        let sections = parse_sections("\n\nPart one:\nno digits\n\nPart 5 missing colon");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Document Summary");
        assert_eq!(
            sections[0].points,
            vec!["Part one:", "no digits", "Part 5 missing colon"]
        );
    }

    #[test]
    fn empty_part_still_yields_its_section() {
        let sections = parse_sections("\n\nPart 1:\n\n\nPart 2:\nSecond");
        assert_eq!(sections.len(), 2);
        assert!(sections[0].points.is_empty());
        assert_eq!(sections[1].points, vec!["Second"]);
    }

    #[test]
    fn aggregated_parts_round_trip_in_order() {
        let parts: Vec<PartSummary> = (1..=3)
            .map(|index| PartSummary {
                index,
                text: format!("Summary number {index}. Ends here"),
            })
            .collect();
        let annotated = aggregate(&parts);
        let sections = parse_sections(annotated.as_str());
        assert_eq!(sections.len(), 3);
        for (offset, section) in sections.iter().enumerate() {
            assert_eq!(section.id, offset + 1);
            assert_eq!(section.title, format!("Section {}", offset + 1));
            assert_eq!(
                section.points,
                vec![format!("Summary number {}", offset + 1), "Ends here".into()]
            );
        }
    }

    #[test]
    fn extra_blank_lines_before_marker_are_tolerated() {
        let sections = parse_sections("\n\n\nPart 1:\nBody");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Section 1");
        assert_eq!(sections[0].points, vec!["Body"]);
    }
}
