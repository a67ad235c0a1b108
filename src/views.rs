//! Render engine: projects a [`SummaryRecord`] into a displayable tree.
//!
//! The tree is plain data. [`render`] is pure and deterministic, so two calls
//! on the same record produce equal trees. HTML and plain-text projections
//! are derived from the same record.

use serde::{Deserialize, Serialize};

use crate::core::boilerplate::{BISMILLAH, INTRO, QUOTE_CAPTION};
use crate::core::models::{SectionKind, SermonSection, SummaryRecord};
use crate::style::Stylesheet;
use crate::utils::persian::{persian_number, to_persian_digits};

/// Id of the subtree captured by the raster exporters.
pub const SUMMARY_ROOT_ID: &str = "summary-output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Div,
    Section,
    H1,
    H2,
    H3,
    P,
    Ol,
    Li,
    Span,
    Strong,
    Blockquote,
    Button,
}

impl Tag {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Div => "div",
            Self::Section => "section",
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::P => "p",
            Self::Ol => "ol",
            Self::Li => "li",
            Self::Span => "span",
            Self::Strong => "strong",
            Self::Blockquote => "blockquote",
            Self::Button => "button",
        }
    }

    /// Inline elements flow on the same line as their inline siblings.
    #[must_use]
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::Span | Self::Strong | Self::Button)
    }
}

/// What an interactive control does when triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    CopyText,
    ExportWord,
    ExportPdf,
    ExportImage,
    Poster { section: SectionKind },
}

impl Action {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CopyText => "کپی متن",
            Self::ExportWord => "خروجی Word",
            Self::ExportPdf => "خروجی PDF",
            Self::ExportImage => "خروجی تصویر",
            Self::Poster { .. } => "ایجاد خطبه نگاشت",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Set on interactive controls only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl Node {
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            id: None,
            classes: Vec::new(),
            text: None,
            children: Vec::new(),
            action: None,
            hidden: false,
        }
    }

    #[must_use]
    pub fn control(action: Action) -> Self {
        let mut node = Self::new(Tag::Button).class("control").text(action.label());
        node.action = Some(action);
        node
    }

    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub const fn is_control(&self) -> bool {
        self.action.is_some()
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_id_mut(id))
    }

    /// Depth-first, pre-order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Set visibility of every control in this subtree. Returns how many
    /// controls changed state.
    pub fn set_controls_hidden(&mut self, hidden: bool) -> usize {
        let mut changed = 0;
        if self.is_control() && self.hidden != hidden {
            self.hidden = hidden;
            changed += 1;
        }
        for child in &mut self.children {
            changed += child.set_controls_hidden(hidden);
        }
        changed
    }

    /// Number of nodes in this subtree whose text is exactly `needle`.
    #[must_use]
    pub fn count_text(&self, needle: &str) -> usize {
        let mut count = 0;
        self.walk(&mut |n| {
            if n.text.as_deref() == Some(needle) {
                count += 1;
            }
        });
        count
    }
}

/// A rendered tree together with the stylesheet it is displayed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub root: Node,
    pub stylesheet: Stylesheet,
}

impl Page {
    #[must_use]
    pub fn new(record: &SummaryRecord) -> Self {
        Self {
            root: render(record),
            stylesheet: Stylesheet::default(),
        }
    }
}

fn section_id(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Religious => "section-a",
        SectionKind::Political => "section-b",
    }
}

fn render_section(kind: SectionKind, section: &SermonSection) -> Node {
    let points = section.points.iter().enumerate().map(|(i, point)| {
        Node::new(Tag::Li)
            .children([
                Node::new(Tag::Span)
                    .class("marker")
                    .text(format!("{}.", persian_number(i + 1))),
                Node::new(Tag::Strong)
                    .class("point-heading")
                    .text(to_persian_digits(&point.heading)),
                Node::new(Tag::P)
                    .class("point-explanation")
                    .text(to_persian_digits(&point.explanation)),
            ])
    });

    let mut block = Node::new(Tag::Section)
        .id(section_id(kind))
        .class("sermon")
        .class(kind.slug())
        .child(
            Node::new(Tag::H2)
                .class("section-title")
                .text(format!("{}: {}", kind.label(), to_persian_digits(&section.title))),
        )
        .child(Node::new(Tag::Ol).class("points").children(points));

    if let Some(quote) = section.highlight_quote.as_deref().filter(|q| !q.trim().is_empty()) {
        block = block.child(
            Node::new(Tag::Blockquote)
                .class("highlight-quote")
                .child(
                    Node::new(Tag::Span)
                        .class("quote-caption")
                        .text(format!("{} {}:", QUOTE_CAPTION, kind.label())),
                )
                .child(Node::new(Tag::P).class("quote-text").text(to_persian_digits(quote)))
                .child(Node::control(Action::Poster { section: kind })),
        );
    }

    block
}

/// Project a record into its on-screen tree.
#[must_use]
pub fn render(record: &SummaryRecord) -> Node {
    let controls = Node::new(Tag::Div).class("export-controls").children([
        Node::control(Action::CopyText),
        Node::control(Action::ExportWord),
        Node::control(Action::ExportPdf),
        Node::control(Action::ExportImage),
    ]);

    let header = Node::new(Tag::Div)
        .class("preamble")
        .child(Node::new(Tag::H3).class("bismillah").text(BISMILLAH))
        .child(Node::new(Tag::P).class("intro").text(INTRO));

    let overall = Node::new(Tag::Section)
        .id("overall")
        .class("overall")
        .child(
            Node::new(Tag::H2)
                .class("section-title")
                .text(to_persian_digits(&record.overall.title)),
        )
        .child(
            Node::new(Tag::P)
                .class("overall-text")
                .text(to_persian_digits(&record.overall.text)),
        );

    let [(kind_a, section_a), (kind_b, section_b)] = record.sections();

    Node::new(Tag::Div)
        .id(SUMMARY_ROOT_ID)
        .class("summary")
        .child(controls)
        .child(header)
        .child(
            Node::new(Tag::H1)
                .id("impactful-title")
                .class("title")
                .text(to_persian_digits(&record.impactful_title)),
        )
        .child(render_section(kind_a, section_a))
        .child(render_section(kind_b, section_b))
        .child(overall)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_html(node: &Node, out: &mut String, root: bool) {
    let tag = node.tag.name();
    out.push('<');
    out.push_str(tag);
    if root {
        out.push_str(" dir=\"rtl\" lang=\"fa\"");
    }
    if let Some(id) = &node.id {
        out.push_str(&format!(" id=\"{}\"", escape_html(id)));
    }
    if !node.classes.is_empty() {
        out.push_str(&format!(" class=\"{}\"", escape_html(&node.classes.join(" "))));
    }
    if let Some(action) = node.action {
        let name = match action {
            Action::CopyText => "copy-text".to_string(),
            Action::ExportWord => "export-word".to_string(),
            Action::ExportPdf => "export-pdf".to_string(),
            Action::ExportImage => "export-image".to_string(),
            Action::Poster { section } => format!("poster-{}", section.slug()),
        };
        out.push_str(&format!(" type=\"button\" data-action=\"{name}\""));
    }
    if node.hidden {
        out.push_str(" hidden");
    }
    out.push('>');
    if let Some(text) = &node.text {
        out.push_str(&escape_html(text));
    }
    for child in &node.children {
        write_html(child, out, false);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// HTML fragment for the tree, with `dir="rtl"` on the root element.
#[must_use]
pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_html(node, &mut out, true);
    out
}

/// Text placed on the clipboard by the copy control. Headings are marked
/// bold with `**`.
#[must_use]
pub fn to_plain_text(record: &SummaryRecord) -> String {
    let mut text = format!("{BISMILLAH}\n{INTRO}\n\n");
    text.push_str(&format!("**{}**\n", record.impactful_title));

    for (kind, section) in record.sections() {
        text.push_str(&format!("\n**{}: {}**\n", kind.label(), section.title));
        for point in &section.points {
            text.push_str(&format!("- {}: {}\n", point.heading, point.explanation));
        }
    }

    text.push_str(&format!("\n**{}**\n{}", record.overall.title, record.overall.text));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{OverallSummary, SummaryPoint};

    fn record() -> SummaryRecord {
        SummaryRecord {
            impactful_title: "تقوا در سال 1403".into(),
            section_a: SermonSection {
                title: "اخلاق".into(),
                points: vec![
                    SummaryPoint { heading: "h1".into(), explanation: "e1".into() },
                    SummaryPoint { heading: "h2".into(), explanation: "e2".into() },
                ],
                highlight_quote: Some("q".into()),
            },
            section_b: SermonSection {
                title: "سیاست".into(),
                points: vec![SummaryPoint { heading: "h3".into(), explanation: "e3".into() }],
                highlight_quote: None,
            },
            overall: OverallSummary { title: "جمع‌بندی".into(), text: "t".into() },
        }
    }

    #[test]
    fn enumerates_points_with_persian_numerals() {
        let tree = render(&record());
        let section = tree.find_by_id("section-a").unwrap();
        let mut markers = Vec::new();
        section.walk(&mut |n| {
            if n.has_class("marker") {
                markers.push(n.text.clone().unwrap());
            }
        });
        assert_eq!(markers, vec!["۱.", "۲."]);
    }

    #[test]
    fn localizes_digits_in_rendered_text() {
        let tree = render(&record());
        assert_eq!(tree.count_text("تقوا در سال ۱۴۰۳"), 1);
    }

    #[test]
    fn quote_callout_only_when_present() {
        let tree = render(&record());
        let a = tree.find_by_id("section-a").unwrap();
        let b = tree.find_by_id("section-b").unwrap();
        assert!(a.children.iter().any(|c| c.tag == Tag::Blockquote));
        assert!(!b.children.iter().any(|c| c.tag == Tag::Blockquote));
    }

    #[test]
    fn hides_and_restores_controls() {
        let mut tree = render(&record());
        // four export buttons plus one poster button
        assert_eq!(tree.set_controls_hidden(true), 5);
        assert_eq!(tree.set_controls_hidden(true), 0);
        assert_eq!(tree.set_controls_hidden(false), 5);
        assert_eq!(tree, render(&record()));
    }

    #[test]
    fn html_escapes_and_sets_direction() {
        let mut rec = record();
        rec.overall.text = "<b>&</b>".into();
        let html = to_html(&render(&rec));
        assert!(html.starts_with("<div dir=\"rtl\" lang=\"fa\" id=\"summary-output\""));
        assert!(html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
        assert!(html.contains("data-action=\"poster-religious\""));
    }
}
