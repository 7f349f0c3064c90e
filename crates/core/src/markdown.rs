//! Briefing markdown to HTML conversion.
//!
//! Briefings are written in a small, line-oriented markdown dialect. Each non-blank line is
//! classified on its own (there are no multi-line blocks and no paragraph breaks) and rendered
//! as one HTML fragment:
//!
//! | Line prefix | Output                                                         |
//! |-------------|----------------------------------------------------------------|
//! | `## `       | `<div class="section"><div class="section-title">…</div>`      |
//! | `---`       | nothing                                                        |
//! | `- `        | `<div class="news-item">…</div>`, split on the `📎` pin glyph   |
//! | `💡`        | `<div class="point">…</div>`                                   |
//! | otherwise   | `<p>…</p>`                                                     |
//!
//! Section containers are never closed by the next header. They stack, and every container
//! still open at the end of the document is closed in one pass. Downstream stylesheets rely
//! on this nesting, so it is kept as is.
//!
//! Input is trusted markdown: `<`, `>` and `&` are passed through unescaped.

use crate::constants::{CALLOUT_GLYPH, PIN_GLYPH};
use regex::Regex;
use std::sync::LazyLock;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern is valid")
});
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern is valid"));
static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("italic pattern is valid"));

const SECTION_CLOSE: &str = "</div>";

/// Converts inline markup on a single line of text.
///
/// Rules are applied in order, each over the output of the previous one:
///
/// 1. `[label](url)` → `<a href="url" target="_blank">label</a>`
/// 2. `**text**` → `<strong>text</strong>`
/// 3. `*text*` → `<em>text</em>`
///
/// Because substitution works on strings rather than a parse tree, emphasis markers inside a
/// link label are still converted by the later rules.
pub fn convert_inline(text: &str) -> String {
    let linked = LINK_RE.replace_all(text, r#"<a href="${2}" target="_blank">${1}</a>"#);
    let bold = BOLD_RE.replace_all(&linked, "<strong>${1}</strong>");
    ITALIC_RE.replace_all(&bold, "<em>${1}</em>").into_owned()
}

/// Block classification of one trimmed, non-blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block<'a> {
    SectionHeader(&'a str),
    Rule,
    ListItem(&'a str),
    Callout(&'a str),
    Paragraph(&'a str),
}

impl<'a> Block<'a> {
    /// First matching prefix wins.
    fn classify(line: &'a str) -> Self {
        if let Some(title) = line.strip_prefix("## ") {
            Self::SectionHeader(title)
        } else if line.starts_with("---") {
            Self::Rule
        } else if let Some(content) = line.strip_prefix("- ") {
            Self::ListItem(content)
        } else if line.starts_with(CALLOUT_GLYPH) {
            Self::Callout(line)
        } else {
            Self::Paragraph(line)
        }
    }

    fn render(self) -> Option<String> {
        match self {
            Self::SectionHeader(title) => Some(format!(
                r#"<div class="section"><div class="section-title">{}</div>"#,
                convert_inline(title)
            )),
            Self::Rule => None,
            Self::ListItem(content) => Some(render_list_item(content)),
            Self::Callout(line) => Some(format!(
                r#"<div class="point">{}</div>"#,
                convert_inline(line)
            )),
            Self::Paragraph(line) => Some(format!("<p>{}</p>", convert_inline(line))),
        }
    }
}

fn render_list_item(content: &str) -> String {
    match content.split_once(PIN_GLYPH) {
        Some((main, source)) => format!(
            r#"<div class="news-item"><p>{}</p><p class="source">{}</p></div>"#,
            convert_inline(main.trim()),
            convert_inline(&format!("{} {}", PIN_GLYPH, source.trim()))
        ),
        None => format!(
            r#"<div class="news-item"><p>{}</p></div>"#,
            convert_inline(content)
        ),
    }
}

/// Converts a whole briefing document into an HTML fragment.
///
/// Lines are trimmed and blank lines dropped, so `"a\n\nb"` and `"a\nb"` render identically.
/// Fragments are joined with `\n`; the closing tags for any open section containers are
/// appended directly after the last fragment.
///
/// # Arguments
///
/// * `markdown` - The briefing markdown.
///
/// # Returns
///
/// The HTML fragment, or an empty string for an empty document.
pub fn md_to_html(markdown: &str) -> String {
    let mut fragments = Vec::new();
    let mut sections_opened = 0usize;

    for line in markdown.split('\n').map(str::trim) {
        if line.is_empty() {
            continue;
        }

        let block = Block::classify(line);
        if matches!(block, Block::SectionHeader(_)) {
            sections_opened += 1;
        }
        if let Some(fragment) = block.render() {
            fragments.push(fragment);
        }
    }

    let mut html = fragments.join("\n");
    // No header closes its predecessor, so every opened section is still open here.
    html.push_str(&SECTION_CLOSE.repeat(sections_opened));
    html
}
