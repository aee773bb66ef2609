//! Plain-text extraction from filing documents.

use filings_core::ExtractedText;
use scraper::{Html, Node};

/// Elements whose text is never content.
const SKIPPED: &[&str] = &["script", "style", "head", "title", "noscript"];

/// Elements that start a new line of output.
const BLOCKS: &[&str] = &[
    "p", "div", "td", "th", "tr", "li", "table", "h1", "h2", "h3", "h4", "h5", "h6", "pre",
    "section", "article", "blockquote", "body", "br", "center", "font",
];

/// Collapses runs of whitespace into single spaces.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn looks_like_markup(raw: &str) -> bool {
    raw.contains('<') && raw.contains('>')
}

/// Extracts readable text from an HTML or plain-text filing.
///
/// Markup is parsed leniently; `script`, `style` and `head` content is
/// dropped and each block element's text becomes one line with whitespace
/// collapsed. Plain text is whitespace-normalized line by line. Input with
/// nothing readable yields [`ExtractedText::NoContent`].
///
/// # Example
/// ```
/// use filings_edgar::extract_text;
///
/// let text = extract_text("<html><body><p>Net   sales</p><p>rose</p></body></html>");
/// assert_eq!(text.as_str(), Some("Net sales\nrose"));
/// ```
#[must_use]
pub fn extract_text(raw: &str) -> ExtractedText {
    if !looks_like_markup(raw) {
        let lines: Vec<String> = raw
            .lines()
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty())
            .collect();
        return ExtractedText::from_text(lines.join("\n"));
    }

    let document = Html::parse_document(raw);
    let mut lines: Vec<String> = Vec::new();
    let mut current_block = None;

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let fragment = collapse_whitespace(text);
        if fragment.is_empty() {
            continue;
        }

        let mut block = None;
        let mut skipped = false;
        for ancestor in node.ancestors() {
            if let Some(element) = ancestor.value().as_element() {
                let name = element.name();
                if SKIPPED.contains(&name) {
                    skipped = true;
                    break;
                }
                if block.is_none() && BLOCKS.contains(&name) {
                    block = Some(ancestor.id());
                }
            }
        }
        if skipped {
            continue;
        }

        match lines.last_mut() {
            Some(line) if block == current_block => {
                line.push(' ');
                line.push_str(&fragment);
            }
            _ => lines.push(fragment),
        }
        current_block = block;
    }

    ExtractedText::from_text(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_scripts_and_styles() {
        let html = r#"<html>
            <head><title>10-K</title><style>p { color: red; }</style></head>
            <body>
              <script>var tracking = 1;</script>
              <p>Item 1.   Business</p>
              <p>The Company designs <b>smartphones</b> and computers.</p>
            </body>
        </html>"#;

        let text = extract_text(html);
        assert_eq!(
            text.as_str(),
            Some("Item 1. Business\nThe Company designs smartphones and computers.")
        );
    }

    #[test]
    fn test_table_cells_are_lines() {
        let html = "<table><tr><td>Revenue</td><td>$391,035</td></tr></table>";
        let text = extract_text(html);
        assert_eq!(text.as_str(), Some("Revenue\n$391,035"));
    }

    #[test]
    fn test_entities_are_decoded() {
        let text = extract_text("<p>Research &amp; development</p>");
        assert_eq!(text.as_str(), Some("Research & development"));
    }

    #[test]
    fn test_plain_text_is_normalized() {
        let text = extract_text("  UNITED STATES\n\n   SECURITIES AND   EXCHANGE COMMISSION  \n");
        assert_eq!(text.as_str(), Some("UNITED STATES\nSECURITIES AND EXCHANGE COMMISSION"));
    }

    #[test]
    fn test_empty_inputs_yield_no_content() {
        assert_eq!(extract_text(""), ExtractedText::NoContent);
        assert_eq!(extract_text("   \n\t"), ExtractedText::NoContent);
        assert_eq!(
            extract_text("<html><head><style>x{}</style></head><body> </body></html>"),
            ExtractedText::NoContent
        );
    }
}
