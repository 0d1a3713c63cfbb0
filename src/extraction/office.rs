//! Text extraction for OOXML containers (`.docx`, `.pptx`).

use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::ExtractionError;

const DOCX_BODY: &str = "word/document.xml";
const SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Extract paragraph text from a Word document, one line per paragraph.
pub(super) fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = open_archive(bytes)?;
    let xml = read_entry(&mut archive, DOCX_BODY)?;
    xml_text(&xml)
}

/// Extract slide text from a presentation in slide order.
pub(super) fn extract_presentation(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = open_archive(bytes)?;
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|number| (number, name.to_string())))
        .collect();
    slides.sort_unstable_by_key(|(number, _)| *number);

    let mut text = String::new();
    for (_, name) in slides {
        let xml = read_entry(&mut archive, &name)?;
        text.push_str(&xml_text(&xml)?);
    }
    Ok(text)
}

fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

fn open_archive(bytes: &[u8]) -> Result<ZipArchive<Cursor<&[u8]>>, ExtractionError> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|error| {
        ExtractionError::Office(format!("not an OOXML container: {error}"))
    })
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<String, ExtractionError> {
    let mut entry = archive
        .by_name(name)
        .map_err(|error| ExtractionError::Office(format!("missing {name}: {error}")))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|error| ExtractionError::Office(format!("failed to read {name}: {error}")))?;
    Ok(xml)
}

/// Collect run text (`<w:t>`, `<a:t>`) with a newline per paragraph and a space per shape.
fn xml_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) if start.local_name().as_ref() == b"t" => in_run_text = true,
            Ok(Event::End(end)) => match end.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => text.push('\n'),
                b"sp" => text.push(' '),
                _ => {}
            },
            Ok(Event::Empty(empty)) => match empty.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(run)) if in_run_text => {
                let unescaped = run
                    .unescape()
                    .map_err(|error| ExtractionError::Office(error.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                return Err(ExtractionError::Office(format!(
                    "malformed XML at byte {}: {error}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(text)
}
