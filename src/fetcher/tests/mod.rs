use std::fs;

use crate::fetcher::html_to_text;

fn fixture() -> String {
    fs::read_to_string("src/fetcher/tests/fixtures/closures.html")
        .expect("Failed to read test fixture")
}

#[test]
fn test_closures_page_text() {
    let text = html_to_text(&fixture());

    assert!(text.contains("Street Closures and Traffic Impacts - October 31, 2025"));
    assert!(text.contains("Staples Street at Saratoga Boulevard"));
    assert!(text.contains("Dates: November 3 – November 21, 2025"));

    // Non-visible content is dropped
    assert!(!text.contains("dataLayer"));
    assert!(!text.contains(".alert"));
    assert!(!text.contains("GovernmentOrganization"));
}

#[test]
fn test_closures_page_lines_are_clean() {
    let text = html_to_text(&fixture());

    for line in text.lines() {
        assert!(!line.is_empty());
        assert_eq!(line, line.trim());
        assert!(!line.contains("  "));
    }

    // Runs of spaces inside a paragraph split it into separate lines
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"Ocean Drive between Buford Street and Louisiana Avenue"));
    assert!(lines.contains(&"will be reduced to one lane"));
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Closures</title><body><p>Unclosed tags<div>Agnes St closed";
    let text = html_to_text(html);

    assert!(text.contains("Closures"));
    assert!(text.contains("Unclosed tags"));
    assert!(text.contains("Agnes St closed"));
}
