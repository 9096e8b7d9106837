//! Minimal PDF writer with flowing layout.
//!
//! A [`Document`] is a list of blocks laid out top to bottom on A4 pages.
//! A block that does not fit on the current page moves to a new one;
//! tables break between rows and repeat their header. Text uses the
//! standard Helvetica fonts (no embedding). Charts are embedded by passing
//! the PNG's IDAT stream through as `FlateDecode` with the PNG predictor.

use super::chart::{Align, Chart};
use chrono::NaiveDateTime;
use thiserror::Error;

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 36.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const FOOTER_BASELINE: f32 = 18.0;
const ROW_HEIGHT: f32 = 16.0;
const CELL_PADDING: f32 = 4.0;
const TABLE_FONT_SIZE: f32 = 9.0;
const CHART_LABEL_SIZE: f32 = 8.0;
/// Points per chart pixel before scaling down to the content width.
const POINTS_PER_PIXEL: f32 = 0.75;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// A table with fixed column widths in points.
#[derive(Debug, Clone)]
pub struct TableBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub widths: Vec<f32>,
    pub align: Vec<Align>,
}

/// One unit of flowing content.
#[derive(Debug, Clone)]
pub enum Block {
    Title(String),
    Subtitle(String),
    Heading(String),
    Paragraph(String),
    Table(TableBlock),
    Chart(Chart),
    Spacer(f32),
}

/// A paginated document under construction.
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    created: NaiveDateTime,
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(title: &str, created: NaiveDateTime) -> Self {
        Self {
            title: title.to_string(),
            created,
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Lay out all blocks and serialize the PDF file.
    pub fn render(&self) -> Result<Vec<u8>, PdfError> {
        let images = self
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Chart(chart) => Some(PngImage::parse(&chart.png)),
                _ => None,
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut layout = Layout::new();
        let mut image_no = 0;
        for block in &self.blocks {
            match block {
                Block::Title(text) => {
                    layout.text_line(text, Font::Bold, 24.0, Align::Center);
                    layout.space(12.0);
                }
                Block::Subtitle(text) => {
                    layout.text_line(text, Font::Regular, 12.0, Align::Center);
                    layout.space(6.0);
                }
                Block::Heading(text) => {
                    layout.space(6.0);
                    layout.text_line(text, Font::Bold, 14.0, Align::Left);
                    layout.space(4.0);
                }
                Block::Paragraph(text) => layout.paragraph(text, 10.0),
                Block::Table(table) => layout.table(table),
                Block::Chart(chart) => {
                    layout.chart(chart, image_no);
                    image_no += 1;
                }
                Block::Spacer(height) => layout.space(*height),
            }
        }

        Ok(self.serialize(&layout.finish(), &images))
    }

    fn serialize(&self, pages: &[String], images: &[PngImage]) -> Vec<u8> {
        // Object ids: 1 catalog, 2 page tree, 3-4 fonts, 5 info,
        // then images, then a (page, contents) pair per page.
        let first_image = 6;
        let first_page = first_image + images.len();
        let page_id = |i: usize| first_page + 2 * i;

        let mut objects: Vec<Vec<u8>> = Vec::new();
        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", page_id(i)))
            .collect();
        objects.push(
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            )
            .into_bytes(),
        );
        for base in ["Helvetica", "Helvetica-Bold"] {
            objects.push(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    base
                )
                .into_bytes(),
            );
        }
        objects.push(
            format!(
                "<< /Title ({}) /Producer (datareport {}) /CreationDate (D:{}) >>",
                pdf_string(&self.title),
                env!("CARGO_PKG_VERSION"),
                self.created.format("%Y%m%d%H%M%S")
            )
            .into_bytes(),
        );

        for image in images {
            let dict = format!(
                "<< /Type /XObject /Subtype /Image /Width {w} /Height {h} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode \
                 /DecodeParms << /Predictor 15 /Colors 3 /BitsPerComponent 8 /Columns {w} >>",
                w = image.width,
                h = image.height
            );
            objects.push(stream_object(&dict, &image.idat));
        }

        let xobjects: String = (0..images.len())
            .map(|i| format!("/Im{} {} 0 R", i + 1, first_image + i))
            .collect::<Vec<_>>()
            .join(" ");
        for (i, content) in pages.iter().enumerate() {
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> /XObject << {} >> >> \
                     /Contents {} 0 R >>",
                    PAGE_WIDTH,
                    PAGE_HEIGHT,
                    xobjects,
                    page_id(i) + 1
                )
                .into_bytes(),
            );
            objects.push(stream_object("<<", content.as_bytes()));
        }

        let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );
        out
    }
}

/// `dict_open` is a dictionary missing its closing `>>`; the length entry
/// is appended here.
fn stream_object(dict_open: &str, data: &[u8]) -> Vec<u8> {
    let mut body = format!("{} /Length {} >>\nstream\n", dict_open, data.len()).into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(b"\nendstream");
    body
}

/// Page content streams being filled top to bottom.
struct Layout {
    pages: Vec<String>,
    current: String,
    /// Top of the free space on the current page.
    y: f32,
    /// Nothing placed on the current page yet.
    fresh: bool,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
            y: PAGE_HEIGHT - MARGIN,
            fresh: true,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
        self.fresh = true;
    }

    /// Start a new page unless `height` fits below the cursor.
    fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN && !self.fresh {
            self.new_page();
        }
        self.fresh = false;
    }

    fn space(&mut self, height: f32) {
        self.y = (self.y - height).max(MARGIN);
    }

    fn text_line(&mut self, text: &str, font: Font, size: f32, align: Align) {
        let line_height = size * 1.25;
        self.ensure(line_height);
        let x = match align {
            Align::Left => MARGIN,
            Align::Center => PAGE_WIDTH / 2.0,
            Align::Right => PAGE_WIDTH - MARGIN,
        };
        let text = fit_text(text, CONTENT_WIDTH, font, size);
        let baseline = self.y - size;
        self.draw_text(x, baseline, &text, font, size, align);
        self.y -= line_height;
    }

    fn paragraph(&mut self, text: &str, size: f32) {
        for line in wrap(text, CONTENT_WIDTH, Font::Regular, size) {
            self.text_line(&line, Font::Regular, size, Align::Left);
        }
        self.space(size * 0.5);
    }

    fn table(&mut self, table: &TableBlock) {
        self.table_row(table, &table.header, true);
        for row in &table.rows {
            if self.y - ROW_HEIGHT < MARGIN {
                self.new_page();
                self.table_row(table, &table.header, true);
            }
            self.table_row(table, row, false);
        }
        self.space(8.0);
    }

    fn table_row(&mut self, table: &TableBlock, cells: &[String], header: bool) {
        // Keep a header together with at least one body row.
        self.ensure(if header { 2.0 * ROW_HEIGHT } else { ROW_HEIGHT });
        let bottom = self.y - ROW_HEIGHT;
        let font = if header { Font::Bold } else { Font::Regular };

        let mut x = MARGIN;
        for (i, width) in table.widths.iter().enumerate() {
            if header {
                self.current.push_str(&format!(
                    "0.83 g {:.2} {:.2} {:.2} {:.2} re f 0 g\n",
                    x, bottom, width, ROW_HEIGHT
                ));
            }
            self.current.push_str(&format!(
                "0.5 w 0.5 G {:.2} {:.2} {:.2} {:.2} re S 0 G\n",
                x, bottom, width, ROW_HEIGHT
            ));

            let align = if header {
                Align::Left
            } else {
                table.align.get(i).copied().unwrap_or(Align::Left)
            };
            let text_x = match align {
                Align::Left => x + CELL_PADDING,
                Align::Center => x + width / 2.0,
                Align::Right => x + width - CELL_PADDING,
            };
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let cell = fit_text(cell, width - 2.0 * CELL_PADDING, font, TABLE_FONT_SIZE);
            self.draw_text(text_x, bottom + 4.5, &cell, font, TABLE_FONT_SIZE, align);
            x += width;
        }
        self.y = bottom;
    }

    fn chart(&mut self, chart: &Chart, image_no: usize) {
        let max_height = PAGE_HEIGHT - 2.0 * MARGIN;
        let mut width = (chart.width as f32 * POINTS_PER_PIXEL).min(CONTENT_WIDTH);
        let mut height = width * chart.height as f32 / chart.width.max(1) as f32;
        if height > max_height {
            width *= max_height / height;
            height = max_height;
        }

        self.ensure(height);
        let x = MARGIN + (CONTENT_WIDTH - width) / 2.0;
        let y = self.y - height;
        self.current.push_str(&format!(
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /Im{} Do Q\n",
            width,
            height,
            x,
            y,
            image_no + 1
        ));
        for label in &chart.labels {
            let lx = x + label.x * width;
            let ly = y + height - label.y * height;
            self.draw_text(lx, ly, &label.text, Font::Regular, CHART_LABEL_SIZE, label.align);
        }
        self.y = y;
        self.space(10.0);
    }

    fn draw_text(&mut self, x: f32, baseline: f32, text: &str, font: Font, size: f32, align: Align) {
        let width = text_width(text, font, size);
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.current.push_str(&format!(
            "BT /{} {:.1} Tf {:.2} {:.2} Td ({}) Tj ET\n",
            font.resource(),
            size,
            x,
            baseline,
            pdf_string(text)
        ));
    }

    /// Close the last page and stamp page numbers.
    fn finish(mut self) -> Vec<String> {
        self.pages.push(std::mem::take(&mut self.current));
        let total = self.pages.len();
        let mut pages = std::mem::take(&mut self.pages);
        for (i, content) in pages.iter_mut().enumerate() {
            let footer = format!("Page {} of {}", i + 1, total);
            let x = PAGE_WIDTH / 2.0 - text_width(&footer, Font::Regular, 8.0) / 2.0;
            content.push_str(&format!(
                "BT /F1 8.0 Tf {:.2} {:.2} Td ({}) Tj ET\n",
                x, FOOTER_BASELINE, footer
            ));
        }
        pages
    }
}

/// Helvetica advance widths in 1/1000 em for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths in 1/1000 em for ASCII 32..=126.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for characters outside printable ASCII.
const FALLBACK_WIDTH: u16 = 556;

/// Advance width of `c` in em units.
fn char_width(c: char, font: Font) -> f32 {
    let widths = match font {
        Font::Regular => &HELVETICA_WIDTHS,
        Font::Bold => &HELVETICA_BOLD_WIDTHS,
    };
    let units = match c {
        ' '..='~' => widths[c as usize - 32],
        _ => FALLBACK_WIDTH,
    };
    f32::from(units) / 1000.0
}

fn text_width(text: &str, font: Font, size: f32) -> f32 {
    text.chars().map(|c| char_width(c, font)).sum::<f32>() * size
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width`.
fn fit_text(text: &str, max_width: f32, font: Font, size: f32) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "...";
        if text_width(&candidate, font, size) <= max_width {
            return candidate;
        }
    }
    String::new()
}

/// Greedy word wrap.
fn wrap(text: &str, max_width: f32, font: Font, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };
        if text_width(&candidate, font, size) <= max_width || line.is_empty() {
            line = candidate;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Escape text for a PDF literal string in WinAnsi encoding.
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            c if c.is_whitespace() => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

/// The parts of a PNG needed to embed it.
struct PngImage {
    width: u32,
    height: u32,
    /// Concatenated IDAT payload (zlib stream with per-row filters).
    idat: Vec<u8>,
}

impl PngImage {
    /// Accepts 8-bit RGB, non-interlaced PNGs only.
    fn parse(bytes: &[u8]) -> Result<Self, PdfError> {
        if bytes.len() < 8 || bytes[..8] != PNG_SIGNATURE {
            return Err(PdfError::UnsupportedImage("not a PNG file".to_string()));
        }

        let mut header = None;
        let mut idat = Vec::new();
        let mut pos = 8;
        while pos + 8 <= bytes.len() {
            let length = be_u32(&bytes[pos..pos + 4]) as usize;
            let kind = &bytes[pos + 4..pos + 8];
            let start = pos + 8;
            let end = start + length;
            if end + 4 > bytes.len() {
                return Err(PdfError::UnsupportedImage("truncated PNG chunk".to_string()));
            }
            let data = &bytes[start..end];
            match kind {
                b"IHDR" => {
                    if length < 13 {
                        return Err(PdfError::UnsupportedImage("short IHDR".to_string()));
                    }
                    let (bit_depth, color_type, interlace) = (data[8], data[9], data[12]);
                    if bit_depth != 8 || color_type != 2 || interlace != 0 {
                        return Err(PdfError::UnsupportedImage(format!(
                            "bit depth {}, color type {}, interlace {}; need 8-bit RGB",
                            bit_depth, color_type, interlace
                        )));
                    }
                    header = Some((be_u32(&data[0..4]), be_u32(&data[4..8])));
                }
                b"IDAT" => idat.extend_from_slice(data),
                b"IEND" => break,
                _ => {}
            }
            pos = end + 4;
        }

        let (width, height) =
            header.ok_or_else(|| PdfError::UnsupportedImage("missing IHDR".to_string()))?;
        if idat.is_empty() {
            return Err(PdfError::UnsupportedImage("no image data".to_string()));
        }
        Ok(Self {
            width,
            height,
            idat,
        })
    }
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupEntry;
    use crate::report::chart::bar_chart;
    use chrono::NaiveDate;

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn page_count(pdf: &[u8]) -> usize {
        String::from_utf8_lossy(pdf)
            .matches("/Type /Page /Parent")
            .count()
    }

    #[test]
    fn test_render_minimal_document() {
        let mut doc = Document::new("Report", created());
        doc.push(Block::Title("Report (draft)".to_string()));
        doc.push(Block::Paragraph("Hello world".to_string()));

        let pdf = doc.render().unwrap();
        let text = String::from_utf8_lossy(&pdf);

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("(Report \\(draft\\)) Tj"));
        assert!(text.contains("/CreationDate (D:20250106093000)"));
        assert!(text.contains("(Page 1 of 1) Tj"));
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn test_xref_points_at_objects() {
        let mut doc = Document::new("Report", created());
        doc.push(Block::Heading("Section".to_string()));

        let pdf = doc.render().unwrap();
        let text = String::from_utf8_lossy(&pdf);

        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(pdf[startxref..].starts_with(b"xref"));

        // Offset of object 1 from the first in-use xref entry.
        let table = std::str::from_utf8(&pdf[startxref..]).unwrap();
        let entry = table.lines().nth(3).unwrap();
        let offset: usize = entry[..10].parse().unwrap();
        assert!(pdf[offset..].starts_with(b"1 0 obj"));
    }

    #[test]
    fn test_long_table_spans_pages() {
        let rows: Vec<Vec<String>> = (0..120)
            .map(|i| vec![format!("row {}", i), format!("{}.00", i)])
            .collect();
        let mut doc = Document::new("Report", created());
        doc.push(Block::Table(TableBlock {
            header: vec!["Name".to_string(), "Value".to_string()],
            rows,
            widths: vec![150.0, 150.0],
            align: vec![Align::Left, Align::Right],
        }));

        let pdf = doc.render().unwrap();
        let text = String::from_utf8_lossy(&pdf);

        let pages = page_count(&pdf);
        assert!(pages >= 2);
        assert!(text.contains(&format!("/Count {}", pages)));
        // Header repeated on every page.
        assert_eq!(text.matches("(Name) Tj").count(), page_count(&pdf));
        assert!(text.contains("(row 119) Tj"));
    }

    #[test]
    fn test_chart_is_embedded() {
        let entries = vec![GroupEntry {
            key: "A".to_string(),
            value: 1.0,
            rows: 1,
        }];
        let chart = bar_chart(&entries, "Groups", 400, 200).unwrap();
        let mut doc = Document::new("Report", created());
        doc.push(Block::Chart(chart));

        let pdf = doc.render().unwrap();
        let text = String::from_utf8_lossy(&pdf);

        assert!(text.contains("/Subtype /Image /Width 400 /Height 200"));
        assert!(text.contains("/Predictor 15"));
        assert!(text.contains("/Im1 Do"));
        assert!(text.contains("(A) Tj"));
    }

    #[test]
    fn test_rejects_non_png_chart() {
        let mut chart = bar_chart(&[], "Empty", 100, 100).unwrap();
        chart.png = b"GIF89a".to_vec();
        let mut doc = Document::new("Report", created());
        doc.push(Block::Chart(chart));

        assert!(matches!(doc.render(), Err(PdfError::UnsupportedImage(_))));
    }

    #[test]
    fn test_pdf_string_escapes() {
        assert_eq!(pdf_string("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(pdf_string("caf\u{e9}"), "caf\\351");
        assert_eq!(pdf_string("\u{4e2d}\tx"), "? x");
    }

    #[test]
    fn test_wrap_and_fit() {
        let lines = wrap("alpha beta gamma delta", 60.0, Font::Regular, 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "alpha beta gamma delta");

        let fitted = fit_text("a rather long cell value", 40.0, Font::Regular, 9.0);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, Font::Regular, 9.0) <= 40.0);
    }

    #[test]
    fn test_text_width_uses_font_metrics() {
        // Helvetica: 'i' 222, 'W' 944; Helvetica-Bold: 'i' 278.
        assert!((text_width("i", Font::Regular, 1000.0) - 222.0).abs() < 1e-3);
        assert!((text_width("W", Font::Regular, 1000.0) - 944.0).abs() < 1e-3);
        assert!((text_width("i", Font::Bold, 1000.0) - 278.0).abs() < 1e-3);
        // Digits share one width, so right-aligned numbers line up.
        assert_eq!(
            text_width("1111.00", Font::Regular, 9.0),
            text_width("9876.54", Font::Regular, 9.0)
        );
        assert!(text_width("ab", Font::Bold, 10.0) > text_width("ab", Font::Regular, 10.0));
    }
}
