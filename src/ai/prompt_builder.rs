//! Builds the instruction prompt and the response schema for one summarization.
//!
//! The generator is asked for JSON that conforms to [`response_schema`]; its
//! output is parsed as data, never scraped out of prose.

use serde_json::{Value, json};

/// Longest transcript (in characters) forwarded to the model.
pub const MAX_TRANSCRIPT_CHARS: usize = 60_000;

/// Remove control characters (keeping line breaks and tabs) and hard-truncate.
#[must_use]
pub fn sanitize_transcript(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|&c| !c.is_control() || c == '\n' || c == '\t')
        .take(MAX_TRANSCRIPT_CHARS)
        .collect()
}

/// Natural-language instructions for one pair of transcripts.
#[must_use]
pub fn build_prompt(text_a: &str, text_b: &str, quote_max_words: usize) -> String {
    let text_a = sanitize_transcript(text_a);
    let text_b = sanitize_transcript(text_b);

    format!(
        "شما یک دستیار متخصص در خلاصه‌سازی و تحلیل محتوای خطبه‌های نماز جمعه هستید.\n\
         متن خطبه اول: {text_a}\n\
         متن خطبه دوم: {text_b}\n\
         دستورالعمل‌ها:\n\
         1. impactfulTitle: تیتر کلی، تاثیرگذار و جذاب (یک جمله).\n\
         2. sectionA.title: تیتر خطبه اول (۲ تا ۴ کلمه).\n\
         3. sectionA.points: خلاصه خطبه اول (مذهبی/اخلاقی) بین ۳ تا ۵ بخش (heading و explanation).\n\
         4. sectionB.title: تیتر خطبه دوم (۲ تا ۴ کلمه).\n\
         5. sectionB.points: خلاصه خطبه دوم (سیاسی/اجتماعی) بین ۳ تا ۵ بخش.\n\
         6. overall.title: تیتر خلاصه نهایی.\n\
         7. overall.text: خلاصه کلی (حدود ۴ خط).\n\
         8. sectionA.highlightQuote: زیباترین و تاثیرگذارترین جمله یا بخش کوتاه از خطبه اول برای طراحی گرافیکی (حداکثر {quote_max_words} کلمه).\n\
         9. sectionB.highlightQuote: زیباترین و تاثیرگذارترین جمله یا بخش کوتاه از خطبه دوم برای طراحی گرافیکی (حداکثر {quote_max_words} کلمه).\n\
         خروجی را دقیقا در قالب JSON مشخص شده برگردانید."
    )
}

fn point_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "heading": { "type": "STRING" },
            "explanation": { "type": "STRING" }
        },
        "required": ["heading", "explanation"],
        "propertyOrdering": ["heading", "explanation"]
    })
}

fn section_schema(quote_max_words: usize) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": "2 to 4 words" },
            "points": {
                "type": "ARRAY",
                "description": "3 to 5 points in narrative order",
                "minItems": 1,
                "items": point_schema()
            },
            "highlightQuote": {
                "type": "STRING",
                "description": format!("at most {quote_max_words} words, suitable for a poster")
            }
        },
        "required": ["title", "points"],
        "propertyOrdering": ["title", "points", "highlightQuote"]
    })
}

/// Declarative shape of the JSON the generator must return; mirrors
/// [`crate::core::models::SummaryRecord`].
#[must_use]
pub fn response_schema(quote_max_words: usize) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "impactfulTitle": { "type": "STRING", "description": "one sentence" },
            "sectionA": section_schema(quote_max_words),
            "sectionB": section_schema(quote_max_words),
            "overall": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "text": { "type": "STRING", "description": "about four lines" }
                },
                "required": ["title", "text"],
                "propertyOrdering": ["title", "text"]
            }
        },
        "required": ["impactfulTitle", "sectionA", "sectionB", "overall"],
        "propertyOrdering": ["impactfulTitle", "sectionA", "sectionB", "overall"]
    })
}

/// Prompt and schema together, ready to be sent.
#[derive(Debug, Clone)]
pub struct SummaryPrompt {
    pub prompt: String,
    pub schema: Value,
}

impl SummaryPrompt {
    #[must_use]
    pub fn new(text_a: &str, text_b: &str, quote_max_words: usize) -> Self {
        Self {
            prompt: build_prompt(text_a, text_b, quote_max_words),
            schema: response_schema(quote_max_words),
        }
    }

    /// Body of a `generateContent` call carrying this prompt.
    #[must_use]
    pub fn to_generate_content_body(&self) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": self.prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": self.schema
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_newlines_and_drops_other_controls() {
        assert_eq!(sanitize_transcript("  a\u{0000}b\nc\t\u{007F}d "), "ab\nc\td");
    }

    #[test]
    fn sanitize_truncates_on_char_boundaries() {
        let long = "س".repeat(MAX_TRANSCRIPT_CHARS + 10);
        assert_eq!(sanitize_transcript(&long).chars().count(), MAX_TRANSCRIPT_CHARS);
    }

    #[test]
    fn prompt_embeds_both_transcripts_and_quote_hint() {
        let prompt = build_prompt("متن اول", "متن دوم", 15);
        assert!(prompt.contains("متن خطبه اول: متن اول"));
        assert!(prompt.contains("متن خطبه دوم: متن دوم"));
        assert!(prompt.contains("حداکثر 15 کلمه"));
    }

    #[test]
    fn body_requests_json_with_schema() {
        let body = SummaryPrompt::new("a", "b", 40).to_generate_content_body();
        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
        assert_eq!(
            config["responseSchema"]["properties"]["sectionA"]["properties"]["points"]["items"]
                ["required"],
            json!(["heading", "explanation"])
        );
        assert!(
            body["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("متن خطبه اول: a")
        );
    }
}
