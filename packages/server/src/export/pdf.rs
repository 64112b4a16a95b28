//! Text-only PDF case report: header, one section per log in chronological
//! order, generation footer. Photos appear as filename lists, never as
//! embedded images.

use chrono::Utc;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::entity::recall_case;

use super::{ExportError, LogBundle, us_date, us_datetime};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 7.0;
const BLOCK_GAP_MM: f32 = 5.0;
const SECTION_GAP_MM: f32 = 10.0;
/// Cursor depth that forces a page break before the next line.
const PAGE_BREAK_MM: f32 = 250.0;
/// Word-wrap budget approximating a 170 mm text width at body size.
const WRAP_CHARS: usize = 80;

/// Render the report for `case`.
pub fn case_report(
    case: &recall_case::Model,
    bundles: &[LogBundle],
) -> Result<Vec<u8>, ExportError> {
    let mut ordered: Vec<&LogBundle> = bundles.iter().collect();
    ordered.sort_by_key(|b| b.log.created_at);

    let mut report = Report::new(&case.title)?;

    report.block(&case.title, 18.0, true, MARGIN_MM);
    if let Some(client) = case.client_name.as_deref() {
        report.block(&format!("Client: {client}"), 12.0, false, MARGIN_MM);
    }
    if let Some(location) = case.location_text.as_deref() {
        report.block(&format!("Location: {location}"), 12.0, false, MARGIN_MM);
    }
    report.block(
        &format!("Created: {}", us_date(&case.created_at)),
        12.0,
        false,
        MARGIN_MM,
    );
    report.gap(SECTION_GAP_MM);

    for bundle in ordered {
        let log = &bundle.log;
        report.block(
            &format!("{} - {}", log.log_type, us_datetime(&log.created_at)),
            12.0,
            true,
            MARGIN_MM,
        );
        if !log.note.trim().is_empty() {
            report.block(&log.note, 12.0, false, MARGIN_MM);
        }
        if !bundle.photos.is_empty() {
            let count = bundle.photos.len();
            let label = if count == 1 { "photo" } else { "photos" };
            report.block(
                &format!("{count} {label} attached"),
                12.0,
                false,
                MARGIN_MM,
            );
            report.block(&file_list(bundle), 12.0, false, MARGIN_MM + 5.0);
        }
        report.gap(SECTION_GAP_MM);
    }

    report.footer();
    report.finish()
}

/// `Files: a.jpg, b.jpg, c.jpg +2 more`: first three names, the rest elided.
fn file_list(bundle: &LogBundle) -> String {
    let names: Vec<&str> = bundle
        .photos
        .iter()
        .take(3)
        .map(|p| p.original_filename.as_deref().unwrap_or("photo"))
        .collect();
    let mut line = format!("Files: {}", names.join(", "));
    if bundle.photos.len() > 3 {
        line.push_str(&format!(" +{} more", bundle.photos.len() - 3));
    }
    line
}

/// A4 pages with a top-down cursor; `y` is millimetres from the top edge.
struct Report {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Report {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| pdf_failure(&e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| pdf_failure(&e))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: MARGIN_MM,
        })
    }

    /// Write one word-wrapped block at `x` and advance the cursor.
    fn block(&mut self, text: &str, size: f32, bold: bool, x: f32) {
        for line in wrap_text(text, WRAP_CHARS) {
            self.break_page_if_needed();
            self.draw(&line, size, bold, x, self.y);
            self.y += LINE_HEIGHT_MM;
        }
        self.y += BLOCK_GAP_MM;
    }

    fn gap(&mut self, mm: f32) {
        self.y += mm;
    }

    /// Generation footer below the last section.
    fn footer(&mut self) {
        self.break_page_if_needed();
        self.draw(
            &format!("Generated on {}", us_datetime(&Utc::now())),
            10.0,
            false,
            MARGIN_MM,
            self.y + 10.0,
        );
        self.draw(
            "Recall - Case Management System",
            10.0,
            false,
            MARGIN_MM,
            self.y + 20.0,
        );
    }

    fn break_page_if_needed(&mut self) {
        if self.y > PAGE_BREAK_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = MARGIN_MM;
        }
    }

    fn draw(&self, text: &str, size: f32, bold: bool, x: f32, y: f32) {
        let font = if bold { &self.bold } else { &self.regular };
        // printpdf's origin is the bottom-left corner.
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT_MM - y), font);
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        self.doc.save_to_bytes().map_err(|e| pdf_failure(&e))
    }
}

fn pdf_failure(detail: &dyn std::fmt::Display) -> ExportError {
    tracing::error!(error = %detail, "PDF generation failed");
    ExportError("Failed to generate PDF report".into())
}

/// Greedy word wrap to a character budget. Input newlines are respected;
/// words longer than the budget are hard-split.
fn wrap_text(text: &str, budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        if raw.trim().is_empty() {
            lines.push(String::new());
        } else {
            wrap_line(raw, budget, &mut lines);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_line(line: &str, budget: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        let current_len = current.chars().count();
        if !current.is_empty() && current_len + 1 + word_len > budget {
            out.push(std::mem::take(&mut current));
        }
        if current.is_empty() && word_len > budget {
            let mut rest = word;
            while rest.chars().count() > budget {
                let split_at = rest
                    .char_indices()
                    .nth(budget)
                    .map(|(i, _)| i)
                    .unwrap_or(rest.len());
                let (head, tail) = rest.split_at(split_at);
                out.push(head.to_string());
                rest = tail;
            }
            current.push_str(rest);
            continue;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        out.push(current);
    }
}
