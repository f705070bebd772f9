use crate::llm::{ChatRequest, Message};

/// Largest page text, in characters, sent to the model.
pub const MAX_INPUT_CHARS: usize = 10_000;
pub const TRUNCATION_MARKER: &str = "... [content truncated]";

pub const TEMPERATURE: f32 = 0.3;
pub const MAX_OUTPUT_TOKENS: u32 = 2000;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts construction and traffic \
information from web content. Always return valid JSON only.";

/// Cut `text` to [`MAX_INPUT_CHARS`] characters, appending the marker when
/// anything was dropped.
pub fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Instruction block for one page.
pub fn user_prompt(region: &str, page_text: &str) -> String {
    format!(
        r#"Analyze the following webpage content and extract all construction-related information for {region} area.

Extract the following information for each construction project/update mentioned:
- Location/Address (be as specific as possible, include street names, intersections, etc.)
- Type of construction (road work, building construction, utility work, etc.)
- Description of the work
- Dates/Timeline (start date, end date, duration if mentioned)
- Impact/Traffic information (lane closures, detours, etc.)
- Status (upcoming, ongoing, completed)

Webpage content:
{page_text}

Return the data as a JSON array of objects. Each object should have these fields:
- location: string (specific address or intersection)
- type: string (type of construction)
- description: string (what work is being done)
- dates: string (timeline information if available)
- impact: string (traffic impact or detour information)
- status: string (upcoming/ongoing/completed)

If no construction information is found, return an empty array [].
Return ONLY valid JSON, no other text."#
    )
}

/// Full chat request for one page; `page_text` is truncated here.
pub fn build_request(model: &str, region: &str, page_text: &str) -> ChatRequest {
    ChatRequest::new(model)
        .message(Message::system(SYSTEM_PROMPT))
        .message(Message::user(user_prompt(region, &truncate(page_text))))
        .temperature(TEMPERATURE)
        .max_tokens(MAX_OUTPUT_TOKENS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::model::RECORD_FIELDS;

    #[test]
    fn test_short_text_untouched() {
        let text = "Leopard St closed";
        assert_eq!(truncate(text), text);

        let exact = "x".repeat(MAX_INPUT_CHARS);
        assert_eq!(truncate(&exact), exact);
    }

    #[test]
    fn test_long_text_truncated_with_marker() {
        let text = format!("{}{}", "a".repeat(MAX_INPUT_CHARS), "b".repeat(5_000));
        let truncated = truncate(&text);

        assert!(truncated.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            truncated.chars().count(),
            MAX_INPUT_CHARS + TRUNCATION_MARKER.chars().count()
        );
        assert!(!truncated.contains('b'));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_INPUT_CHARS + 1);
        let truncated = truncate(&text);
        assert_eq!(truncated, format!("{}{}", "é".repeat(MAX_INPUT_CHARS), TRUNCATION_MARKER));
    }

    #[test]
    fn test_request_embeds_truncated_text() {
        let text = format!("{}{}", "a".repeat(MAX_INPUT_CHARS), "§".repeat(5_000));
        let request = build_request("gpt-4o-mini", "Corpus Christi, Texas", &text);

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        let user = &request.messages[1].content;
        assert!(user.contains(&format!("{}{}", "a".repeat(MAX_INPUT_CHARS), TRUNCATION_MARKER)));
        assert!(!user.contains('§'));
        assert_eq!(request.temperature, Some(TEMPERATURE));
        assert_eq!(request.max_tokens, Some(MAX_OUTPUT_TOKENS));
    }

    #[test]
    fn test_prompt_names_region_and_fields() {
        let prompt = user_prompt("Corpus Christi, Texas", "page");
        assert!(prompt.contains("for Corpus Christi, Texas area"));
        for field in RECORD_FIELDS {
            assert!(prompt.contains(&format!("- {field}: string")), "missing {field}");
        }
        assert!(prompt.contains("return an empty array []"));
    }
}
