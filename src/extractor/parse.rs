use serde_json::Value;

use crate::extractor::ExtractError;
use crate::extractor::model::Extracted;

const FENCE: &str = "```";

/// Return the body of the first fenced code block in `reply`, or the trimmed
/// reply itself when there is no fence.
///
/// A language tag directly after the opening fence (```` ```json ````) is
/// skipped whether the JSON starts on the next line or on the same one. An
/// unterminated block runs to the end of the reply.
pub fn strip_code_fence(reply: &str) -> &str {
    let reply = reply.trim();
    let Some(open) = reply.find(FENCE) else {
        return reply;
    };

    let body = reply[open + FENCE.len()..].trim_start_matches(|c: char| c.is_ascii_alphanumeric());

    match body.find(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Parse a model reply into extracted entries for `source_url`.
pub fn parse_reply(reply: &str, source_url: &str) -> Result<Vec<Extracted>, ExtractError> {
    let body = strip_code_fence(reply);

    let value: Value = serde_json::from_str(body).map_err(|source| ExtractError::Parse {
        source,
        raw: reply.to_string(),
    })?;

    let Value::Array(items) = value else {
        return Err(ExtractError::NotAnArray {
            raw: reply.to_string(),
        });
    };

    Ok(items
        .into_iter()
        .map(|item| Extracted::from_value(item, source_url))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://city.gov/closures-october-31-2025/";
    const ARRAY: &str = r#"[{"location": "Ocean Dr", "type": "road work", "description": "Repaving", "dates": "Nov 3-21", "impact": "One lane", "status": "upcoming"}]"#;

    #[test]
    fn test_strip_fence_with_language_tag() {
        let reply = format!("```json\n{ARRAY}\n```");
        assert_eq!(strip_code_fence(&reply), ARRAY);
    }

    #[test]
    fn test_strip_fence_without_language_tag() {
        let reply = format!("```\n{ARRAY}\n```");
        assert_eq!(strip_code_fence(&reply), ARRAY);
    }

    #[test]
    fn test_strip_fence_with_surrounding_prose() {
        let reply = format!("Here is the data:\n```json\n{ARRAY}\n```\nLet me know!");
        assert_eq!(strip_code_fence(&reply), ARRAY);
    }

    #[test]
    fn test_unfenced_reply_is_trimmed() {
        let reply = format!("\n  {ARRAY}  \n");
        assert_eq!(strip_code_fence(&reply), ARRAY);
    }

    #[test]
    fn test_single_line_fence() {
        assert_eq!(strip_code_fence("```[]```"), "[]");
    }

    #[test]
    fn test_tag_and_json_on_one_line() {
        let reply = format!("```json {ARRAY}```");
        assert_eq!(strip_code_fence(&reply), ARRAY);
        assert_eq!(parse_reply(&reply, URL).unwrap().len(), 1);
    }

    #[test]
    fn test_tag_and_json_on_opening_line_fence_closed_below() {
        let reply = r#"```json [{"location": "Ocean Dr"}]
```"#;
        let entries = parse_reply(reply, URL).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].as_record().unwrap().location, "Ocean Dr");
    }

    #[test]
    fn test_tag_glued_to_json() {
        assert_eq!(strip_code_fence("```json[]```"), "[]");
        assert_eq!(strip_code_fence("```JSON\n[]\n```"), "[]");
    }

    #[test]
    fn test_fenced_and_plain_parse_identically() {
        let fenced = parse_reply(&format!("```json\n{ARRAY}\n```"), URL).unwrap();
        let plain = parse_reply(ARRAY, URL).unwrap();
        assert_eq!(fenced, plain);
        assert_eq!(plain.len(), 1);
    }

    #[test]
    fn test_source_url_overrides_model_value() {
        let reply = r#"[{"location": "Agnes St", "source_url": "https://elsewhere.example/"}, {"location": "Laredo St"}]"#;
        let entries = parse_reply(reply, URL).unwrap();

        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(entry.as_record().unwrap().source_url, URL);
        }
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_reply("Sorry, I could not find anything.", URL).unwrap_err();
        match err {
            ExtractError::Parse { raw, .. } => assert!(raw.starts_with("Sorry")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_object_reply_is_not_an_array() {
        let err = parse_reply(r#"{"projects": []}"#, URL).unwrap_err();
        assert!(matches!(err, ExtractError::NotAnArray { .. }));
    }

    #[test]
    fn test_empty_array() {
        assert!(parse_reply("[]", URL).unwrap().is_empty());
    }

    #[test]
    fn test_mixed_entries() {
        let entries = parse_reply(r#"[{"location": "Ayers St"}, "note", 3]"#, URL).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].as_record().is_some());
        assert!(entries[1].as_record().is_none());
        assert!(entries[2].as_record().is_none());
    }
}
