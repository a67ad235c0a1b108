//! Word (DOCX) export.
//!
//! The document is a flat list of right-to-left paragraphs. Text is written
//! exactly as it appears in the record, XML-escaped but otherwise untouched.

use std::io::{Cursor, Write};

use tracing::{debug, error};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::FileOptions;

use crate::core::boilerplate::{BISMILLAH, INTRO};
use crate::core::models::{SectionKind, SummaryRecord};
use crate::errors::ExportError;

pub const DOCX_FILENAME: &str = "khutbah_summary.docx";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const FONT: &str = "B Nazanin";

/// Run sizes in half-points.
pub const TITLE_SIZE: u32 = 32;
pub const HEADING_SIZE: u32 = 30;
pub const BODY_SIZE: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Center,
    Right,
    Justify,
}

impl Align {
    const fn as_ooxml(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "both",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub size: u32,
    pub color: Option<&'static str>,
    /// Line break before the text, inside the same paragraph.
    pub break_before: bool,
}

impl Run {
    fn new(text: impl Into<String>, bold: bool, size: u32) -> Self {
        Self {
            text: text.into(),
            bold,
            size,
            color: None,
            break_before: false,
        }
    }

    fn color(mut self, hex: &'static str) -> Self {
        self.color = Some(hex);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub align: Align,
    pub space_after: u32,
    pub runs: Vec<Run>,
}

impl Paragraph {
    fn single(align: Align, space_after: u32, run: Run) -> Self {
        Self {
            align,
            space_after,
            runs: vec![run],
        }
    }

    /// Concatenated text of all runs, breaks as `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            if run.break_before {
                out.push('\n');
            }
            out.push_str(&run.text);
        }
        out
    }
}

const fn section_color(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Religious => "2563EB",
        SectionKind::Political => "059669",
    }
}

/// The paragraphs of the document, in order.
#[must_use]
pub fn paragraphs(record: &SummaryRecord) -> Vec<Paragraph> {
    let mut intro = Run::new(INTRO, false, BODY_SIZE);
    intro.break_before = true;
    let mut out = vec![
        Paragraph {
            align: Align::Justify,
            space_after: 200,
            runs: vec![Run::new(BISMILLAH, true, BODY_SIZE), intro],
        },
        Paragraph::single(
            Align::Center,
            200,
            Run::new(record.impactful_title.as_str(), true, TITLE_SIZE).color("1D4ED8"),
        ),
    ];

    for (kind, section) in record.sections() {
        out.push(Paragraph::single(
            Align::Right,
            100,
            Run::new(format!("{}: {}", kind.label(), section.title), true, HEADING_SIZE)
                .color(section_color(kind)),
        ));
        for point in &section.points {
            out.push(Paragraph::single(
                Align::Right,
                0,
                Run::new(point.heading.as_str(), true, BODY_SIZE),
            ));
            out.push(Paragraph::single(
                Align::Justify,
                100,
                Run::new(point.explanation.as_str(), false, BODY_SIZE),
            ));
        }
    }

    out.push(Paragraph::single(
        Align::Right,
        100,
        Run::new(record.overall.title.as_str(), true, HEADING_SIZE).color("4F46E5"),
    ));
    out.push(Paragraph::single(
        Align::Justify,
        0,
        Run::new(record.overall.text.as_str(), false, BODY_SIZE),
    ));

    out
}

/// Characters XML 1.0 does not allow in a document, even escaped.
const fn is_xml_illegal(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if is_xml_illegal(c) => {}
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_run(run: &Run, xml: &mut String) {
    xml.push_str("<w:r><w:rPr>");
    xml.push_str(&format!(
        r#"<w:rFonts w:ascii="{FONT}" w:hAnsi="{FONT}" w:cs="{FONT}"/>"#
    ));
    if run.bold {
        xml.push_str("<w:b/><w:bCs/>");
    }
    if let Some(color) = run.color {
        xml.push_str(&format!(r#"<w:color w:val="{color}"/>"#));
    }
    xml.push_str(&format!(
        r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/><w:rtl/></w:rPr>"#,
        run.size
    ));
    if run.break_before {
        xml.push_str("<w:br/>");
    }
    xml.push_str(&format!(
        r#"<w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape_xml(&run.text)
    ));
}

/// `word/document.xml` for the given paragraphs.
#[must_use]
pub fn document_xml(paragraphs: &[Paragraph]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for p in paragraphs {
        xml.push_str("<w:p>");
        xml.push_str(&format!(
            r#"<w:pPr><w:bidi/><w:spacing w:after="{}"/><w:jc w:val="{}"/></w:pPr>"#,
            p.space_after,
            p.align.as_ooxml()
        ));
        for run in &p.runs {
            write_run(run, &mut xml);
        }
        xml.push_str("</w:p>");
    }
    xml.push_str(
        r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="708" w:footer="708" w:gutter="0"/><w:bidi/></w:sectPr></w:body></w:document>"#,
    );
    xml
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

fn styles_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="{FONT}" w:hAnsi="{FONT}" w:cs="{FONT}"/><w:sz w:val="{BODY_SIZE}"/><w:szCs w:val="{BODY_SIZE}"/><w:rtl/><w:lang w:val="fa-IR" w:bidi="fa-IR"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:bidi/></w:pPr></w:pPrDefault></w:docDefaults></w:styles>"#
    )
}

fn write_part(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    content: &str,
    options: FileOptions,
) -> Result<(), ExportError> {
    zip.start_file(name, options)?;
    zip.write_all(content.as_bytes())
        .map_err(|e| ExportError::Document(format!("{name}: {e}")))
}

fn write_package(paragraphs: &[Paragraph]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    write_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES, options)?;
    write_part(&mut zip, "_rels/.rels", ROOT_RELS, options)?;
    write_part(&mut zip, "word/_rels/document.xml.rels", DOCUMENT_RELS, options)?;
    write_part(&mut zip, "word/styles.xml", &styles_xml(), options)?;
    write_part(&mut zip, "word/document.xml", &document_xml(paragraphs), options)?;

    Ok(zip.finish()?.into_inner())
}

/// Serialize the record as a DOCX package.
///
/// # Errors
///
/// `ExportError::Document` when the package cannot be written.
pub fn to_document(record: &SummaryRecord) -> Result<Vec<u8>, ExportError> {
    let paragraphs = paragraphs(record);
    debug!(paragraphs = paragraphs.len(), "Building Word document");

    write_package(&paragraphs).inspect_err(|e| error!("Word export failed: {}", e))
}
