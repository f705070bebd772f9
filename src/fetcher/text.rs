use scraper::{Html, Node};

/// Elements whose text content is never rendered.
const INVISIBLE_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Reduce an HTML document to its visible text, one phrase per line.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            raw.push_str(text);
        }
    }

    normalize_whitespace(&raw)
}

/// Line boundaries, including lone `\r`, form feeds and Unicode separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Trim each line, split on runs of two spaces, and drop empty phrases.
///
/// The model call is billed per input token, so whitespace is pure cost.
pub fn normalize_whitespace(text: &str) -> String {
    text.split(is_line_break)
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
