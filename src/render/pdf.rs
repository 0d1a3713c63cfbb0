//! PDF encoding of a computed layout using the standard 14 fonts.

use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, Rgb};
use std::collections::HashMap;

use super::{DocumentLayout, FontFace, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, RenderError, Rgb8};

const DOCUMENT_TITLE: &str = "Document Summary";

impl FontFace {
    fn builtin(self) -> BuiltinFont {
        match self {
            Self::Helvetica => BuiltinFont::Helvetica,
            Self::HelveticaBold => BuiltinFont::HelveticaBold,
            Self::TimesItalic => BuiltinFont::TimesItalic,
            Self::Courier => BuiltinFont::Courier,
            Self::CourierBold => BuiltinFont::CourierBold,
        }
    }
}

fn fill_color(color: Rgb8) -> Color {
    let Rgb8(r, g, b) = color;
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Encode every page of `layout` into a PDF byte stream.
pub(super) fn encode(layout: &DocumentLayout) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        DOCUMENT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Page 1",
    );
    let mut fonts: HashMap<FontFace, IndirectFontRef> = HashMap::new();

    for (number, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if number == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Page {}", number + 1),
            )
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for run in &page.runs {
            let font = match fonts.get(&run.font) {
                Some(font) => font.clone(),
                None => {
                    let font = doc
                        .add_builtin_font(run.font.builtin())
                        .map_err(|error| RenderError::Pdf(error.to_string()))?;
                    fonts.insert(run.font, font.clone());
                    font
                }
            };
            layer.set_fill_color(fill_color(run.color));
            layer.use_text(
                run.text.as_str(),
                run.size_pt,
                Mm(run.x_mm),
                Mm(PAGE_HEIGHT_MM - run.baseline_mm),
                &font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|error| RenderError::Pdf(error.to_string()))
}
