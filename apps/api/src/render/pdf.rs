//! Serializes laid-out pages into a PDF 1.5 document with lopdf.

use lopdf::{dictionary, Document, Object, Stream};

use super::layout::{Page, Rgb, PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use super::metrics::{encode_literal, win_ansi_byte, PdfFont};
use super::RenderError;

const PRODUCER: &str = "Draftsmith";

/// Builds the PDF bytes for `pages`. `title` goes into the document info.
pub fn write_pdf(pages: &[Page], title: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font_dictionary(PdfFont::Helvetica));
    let bold_id = doc.add_object(font_dictionary(PdfFont::HelveticaBold));

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            PdfFont::Helvetica.resource_name() => regular_id,
            PdfFont::HelveticaBold.resource_name() => bold_id,
        },
    });

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(page)));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH_PT.into(), PAGE_HEIGHT_PT.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| (*id).into()).collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_info(title)),
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(buffer)
}

fn font_dictionary(font: PdfFont) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// WinAnsi bytes for the info dictionary; lopdf escapes the literal on save.
fn encode_info(title: &str) -> Vec<u8> {
    title
        .chars()
        .map(win_ansi_byte)
        .collect()
}

/// Content stream for one page: rules first, then each text line in its own
/// text object.
fn page_content(page: &Page) -> Vec<u8> {
    let mut content = Vec::new();

    for rule in &page.rules {
        content.extend_from_slice(
            format!(
                "{} RG\n0.75 w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\n",
                rgb(rule.color),
                rule.x1,
                rule.y,
                rule.x2,
                rule.y
            )
            .as_bytes(),
        );
    }

    for line in &page.lines {
        content.extend_from_slice(
            format!(
                "BT\n{} rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n(",
                rgb(line.color),
                line.font.resource_name(),
                line.size,
                line.x,
                line.y
            )
            .as_bytes(),
        );
        content.extend_from_slice(&encode_literal(&line.text));
        content.extend_from_slice(b") Tj\nET\n");
    }

    content
}

fn rgb((r, g, b): Rgb) -> String {
    format!("{r:.2} {g:.2} {b:.2}")
}
