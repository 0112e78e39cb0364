//! Turns plain document text into positioned lines on US-letter pages.
//!
//! Two stages: [`parse`] classifies lines into blocks, [`paginate`] wraps each
//! block with the font metrics and assigns page coordinates. Nothing here
//! touches the PDF object model.

use super::metrics::PdfFont;

pub const PAGE_WIDTH_PT: f32 = 612.0;
pub const PAGE_HEIGHT_PT: f32 = 792.0;
pub const MARGIN_PT: f32 = 54.0;
pub const CONTENT_WIDTH_PT: f32 = PAGE_WIDTH_PT - 2.0 * MARGIN_PT;

const TITLE_SIZE: f32 = 18.0;
const CONTACT_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.5;
const LEADING: f32 = 1.3;
const BULLET_INDENT_PT: f32 = 14.0;

/// Contact details are only looked for this many lines below the title.
const CONTACT_WINDOW: usize = 3;
const MAX_HEADING_CHARS: usize = 40;
const MAX_HEADING_WORDS: usize = 5;

pub type Rgb = (f32, f32, f32);
pub const BLACK: Rgb = (0.0, 0.0, 0.0);
pub const DARK_BLUE: Rgb = (0.12, 0.23, 0.54);
pub const GREY: Rgb = (0.33, 0.33, 0.33);

const SECTION_NAMES: &[&str] = &[
    "SUMMARY",
    "PROFESSIONAL SUMMARY",
    "OBJECTIVE",
    "PROFILE",
    "SKILLS",
    "TECHNICAL SKILLS",
    "CORE COMPETENCIES",
    "EXPERIENCE",
    "PROFESSIONAL EXPERIENCE",
    "WORK EXPERIENCE",
    "EMPLOYMENT HISTORY",
    "EDUCATION",
    "CERTIFICATIONS",
    "PROJECTS",
    "ACHIEVEMENTS",
    "AWARDS",
    "PUBLICATIONS",
    "LANGUAGES",
    "INTERESTS",
    "VOLUNTEER EXPERIENCE",
    "REFERENCES",
];

// ────────────────────────────────────────────────────────────────────────────
// Blocks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    Contact(String),
    Heading(String),
    Bullet(String),
    Paragraph(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentLayout {
    pub blocks: Vec<Block>,
}

impl DocumentLayout {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Classifies each line of `text` into a [`Block`].
pub fn parse(text: &str) -> DocumentLayout {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut lines_after_title: Option<usize> = None;
    let mut seen_heading = false;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            flush(&mut paragraph, &mut blocks);
            continue;
        }

        let Some(seen) = lines_after_title else {
            blocks.push(Block::Title(line.to_string()));
            lines_after_title = Some(0);
            continue;
        };
        let count = seen + 1;
        lines_after_title = Some(count);

        if !seen_heading && count <= CONTACT_WINDOW && (line.contains('@') || line.contains('|')) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Contact(line.to_string()));
        } else if let Some(item) = bullet_text(line) {
            flush(&mut paragraph, &mut blocks);
            if !item.is_empty() {
                blocks.push(Block::Bullet(item.to_string()));
            }
        } else if is_heading(line) {
            flush(&mut paragraph, &mut blocks);
            seen_heading = true;
            blocks.push(Block::Heading(
                line.trim_end_matches(':').trim_end().to_string(),
            ));
        } else if is_salutation(line) {
            flush(&mut paragraph, &mut blocks);
            blocks.push(Block::Paragraph(line.to_string()));
        } else {
            paragraph.push(line);
        }
    }
    flush(&mut paragraph, &mut blocks);

    DocumentLayout { blocks }
}

fn flush(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(paragraph.join(" ")));
        paragraph.clear();
    }
}

fn bullet_text(line: &str) -> Option<&str> {
    ['•', '-', '*']
        .iter()
        .find_map(|marker| line.strip_prefix(*marker))
        .map(str::trim)
}

fn is_heading(line: &str) -> bool {
    let bare = line.trim_end_matches(':').trim_end();
    if bare.is_empty() {
        return false;
    }
    let upper = bare.to_uppercase();
    if SECTION_NAMES.contains(&upper.as_str()) {
        return true;
    }

    let short = bare.chars().count() <= MAX_HEADING_CHARS
        && bare.split_whitespace().count() <= MAX_HEADING_WORDS;
    if !short || bare.to_lowercase().starts_with("dear ") {
        return false;
    }

    let has_letters = bare.chars().any(char::is_alphabetic);
    let all_caps = has_letters
        && bare
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase);

    all_caps || line.ends_with(':')
}

/// "Dear Hiring Manager," and "Sincerely," stay on their own line.
fn is_salutation(line: &str) -> bool {
    line.ends_with(',') && line.split_whitespace().count() <= 4
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

/// One line of text at its baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub font: PdfFont,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub color: Rgb,
    pub text: String,
}

/// A horizontal rule under a heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
    pub rules: Vec<Rule>,
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: PAGE_HEIGHT_PT - MARGIN_PT,
        }
    }

    fn page(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = PAGE_HEIGHT_PT - MARGIN_PT;
    }

    /// Starts a new page unless `height` points still fit above the bottom margin.
    fn ensure_room(&mut self, height: f32) {
        let page_has_content = !self.page().lines.is_empty();
        if self.y - height < MARGIN_PT && page_has_content {
            self.new_page();
        }
    }

    fn skip(&mut self, gap: f32) {
        // Gaps never carry over to the top of a fresh page.
        if !self.page().lines.is_empty() {
            self.y -= gap;
        }
    }

    fn place(&mut self, font: PdfFont, size: f32, x: f32, color: Rgb, text: String) -> f32 {
        let leading = size * LEADING;
        self.ensure_room(leading);
        let baseline = self.y - size;
        self.y -= leading;
        self.page().lines.push(PlacedLine {
            font,
            size,
            x,
            y: baseline,
            color,
            text,
        });
        baseline
    }
}

/// Wraps every block and lays the result out on as many pages as needed.
pub fn paginate(layout: &DocumentLayout) -> Vec<Page> {
    let mut cursor = Cursor::new();
    let regular = PdfFont::Helvetica.metrics();
    let bold = PdfFont::HelveticaBold.metrics();

    for block in &layout.blocks {
        match block {
            Block::Title(text) => {
                for line in bold.wrap(text, TITLE_SIZE, CONTENT_WIDTH_PT) {
                    let x = centered_x(bold.width_pt(&line, TITLE_SIZE));
                    cursor.place(PdfFont::HelveticaBold, TITLE_SIZE, x, BLACK, line);
                }
                cursor.skip(2.0);
            }
            Block::Contact(text) => {
                for line in regular.wrap(text, CONTACT_SIZE, CONTENT_WIDTH_PT) {
                    let x = centered_x(regular.width_pt(&line, CONTACT_SIZE));
                    cursor.place(PdfFont::Helvetica, CONTACT_SIZE, x, GREY, line);
                }
                cursor.skip(4.0);
            }
            Block::Heading(text) => {
                cursor.skip(8.0);
                // Keep the heading on the same page as the first line below it.
                cursor.ensure_room(HEADING_SIZE * LEADING + 4.0 + BODY_SIZE * LEADING);
                let mut baseline = MARGIN_PT;
                for line in bold.wrap(text, HEADING_SIZE, CONTENT_WIDTH_PT) {
                    baseline =
                        cursor.place(PdfFont::HelveticaBold, HEADING_SIZE, MARGIN_PT, DARK_BLUE, line);
                }
                cursor.page().rules.push(Rule {
                    x1: MARGIN_PT,
                    x2: PAGE_WIDTH_PT - MARGIN_PT,
                    y: baseline - 3.0,
                    color: DARK_BLUE,
                });
                cursor.y -= 4.0;
            }
            Block::Bullet(text) => {
                let width = CONTENT_WIDTH_PT - BULLET_INDENT_PT;
                for (i, line) in regular.wrap(text, BODY_SIZE, width).into_iter().enumerate() {
                    if i == 0 {
                        cursor.ensure_room(BODY_SIZE * LEADING);
                        let y = cursor.y - BODY_SIZE;
                        cursor.page().lines.push(PlacedLine {
                            font: PdfFont::Helvetica,
                            size: BODY_SIZE,
                            x: MARGIN_PT + 3.0,
                            y,
                            color: BLACK,
                            text: "•".to_string(),
                        });
                    }
                    cursor.place(
                        PdfFont::Helvetica,
                        BODY_SIZE,
                        MARGIN_PT + BULLET_INDENT_PT,
                        BLACK,
                        line,
                    );
                }
                cursor.skip(1.5);
            }
            Block::Paragraph(text) => {
                for line in regular.wrap(text, BODY_SIZE, CONTENT_WIDTH_PT) {
                    cursor.place(PdfFont::Helvetica, BODY_SIZE, MARGIN_PT, BLACK, line);
                }
                cursor.skip(BODY_SIZE * 0.6);
            }
        }
    }

    cursor.pages
}

fn centered_x(width: f32) -> f32 {
    MARGIN_PT + ((CONTENT_WIDTH_PT - width) / 2.0).max(0.0)
}
