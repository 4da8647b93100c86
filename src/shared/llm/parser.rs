use lazy_static::lazy_static;
use regex::Regex;
use std::time::{Duration, Instant};

use super::LlmResponse;

lazy_static! {
    /// Regex for trailing commas before } or ]
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();

    /// Regex for JavaScript string concatenation ("str1" + "str2")
    static ref JS_STRING_CONCAT_RE: Regex = Regex::new(r#""\s*\+\s*""#).unwrap();
}

/// Repairs slower than this are discarded
const JSON_REPAIR_TIMEOUT: Duration = Duration::from_secs(5);

/// Find the first balanced `{ ... }` object in `text`, ignoring braces inside strings.
///
/// Returns `None` when no object closes.
fn first_balanced_object(text: &str) -> Option<&str> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (i, ch) in text[start..].char_indices() {
            if in_string {
                match ch {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match ch {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..start + i + 1]);
                    }
                }
                _ => {}
            }
        }

        search_from = start + 1;
    }

    None
}

/// Extract a JSON object string from free-form classifier output
///
/// Tries in order:
/// 1. JSON in markdown code block: ```json ... ```
/// 2. Generic markdown code block: ``` ... ```
/// 3. First balanced `{...}` object anywhere in the text
/// 4. Unbalanced tail starting at the first `{` (left for repair)
pub fn extract_json_string(text: &str) -> Result<String, String> {
    if let Some(block) = text
        .split("```json")
        .nth(1)
        .and_then(|s| s.split("```").next())
    {
        return Ok(block.trim().to_string());
    }

    if let Some(start) = text.find("```") {
        let block_start = start + 3;
        if let Some(newline_offset) = text[block_start..].find('\n') {
            let json_start = block_start + newline_offset + 1;
            if let Some(end_offset) = text[json_start..].find("```") {
                let block = text[json_start..json_start + end_offset].trim();
                if block.starts_with('{') {
                    return Ok(block.to_string());
                }
            }
        }
    }

    if let Some(object) = first_balanced_object(text) {
        return Ok(object.to_string());
    }

    text.find('{')
        .map(|start| text[start..].trim().to_string())
        .ok_or_else(|| "No JSON object found in response".to_string())
}

/// Fix trailing commas in JSON (common LLM mistake)
///
/// Example: `{"severity": "low",}` -> `{"severity": "low"}`
pub fn fix_trailing_commas(json_str: &str) -> String {
    TRAILING_COMMA_RE.replace_all(json_str, "$1").to_string()
}

/// Merge `"a" + "b"` into `"ab"`
pub fn fix_js_string_concatenation(json_str: &str) -> String {
    JS_STRING_CONCAT_RE.replace_all(json_str, "").to_string()
}

fn apply_quick_fixes(json_str: &str) -> String {
    let fixed = fix_js_string_concatenation(json_str);
    fix_trailing_commas(&fixed)
}

/// Attempt to repair JSON using llm_json
///
/// Returns `None` if repair fails, panics or runs past the timeout
fn repair_json_with_timeout(json_str: &str) -> Option<String> {
    let start = Instant::now();

    let options = llm_json::RepairOptions::default();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        llm_json::repair_json(json_str, &options)
    }));

    if start.elapsed() > JSON_REPAIR_TIMEOUT {
        tracing::warn!("JSON repair took longer than timeout");
        return None;
    }

    match result {
        Ok(Ok(repaired)) => Some(repaired),
        Ok(Err(e)) => {
            tracing::debug!("JSON repair failed: {:?}", e);
            None
        }
        Err(_) => {
            tracing::warn!("JSON repair panicked");
            None
        }
    }
}

/// Parse untrusted text as the target type
///
/// Pipeline: extract -> direct parse -> quick fixes -> llm_json repair.
/// The error string is safe to log; it carries at most 200 chars of input.
pub fn parse_structured<T>(text: &str) -> Result<T, String>
where
    T: LlmResponse,
{
    let json_str = extract_json_string(text)?;

    tracing::debug!(
        "Extracted JSON (first 500 chars): {}",
        json_str.chars().take(500).collect::<String>()
    );

    if let Ok(parsed) = serde_json::from_str::<T>(&json_str) {
        return Ok(parsed);
    }

    let fixed_json = apply_quick_fixes(&json_str);
    if let Ok(parsed) = serde_json::from_str::<T>(&fixed_json) {
        tracing::debug!("JSON parsed successfully after quick fixes");
        return Ok(parsed);
    }

    if let Some(repaired) = repair_json_with_timeout(&json_str) {
        if let Ok(parsed) = serde_json::from_str::<T>(&repaired) {
            tracing::debug!("JSON parsed successfully after llm_json repair");
            return Ok(parsed);
        }
    }

    Err(format!(
        "Failed to parse JSON after all repair attempts. Original: {}",
        json_str.chars().take(200).collect::<String>()
    ))
}

/// Parse classifier output, returning a default marked as fallback on failure
///
/// Callers check [`LlmResponse::is_success`] before trusting any field.
pub fn parse_with_fallback<T>(text: &str) -> T
where
    T: LlmResponse,
{
    match parse_structured::<T>(text) {
        Ok(parsed) => parsed,
        Err(error_msg) => {
            tracing::warn!("Classifier response parsing failed: {}", error_msg);
            let mut fallback = T::default();
            fallback.mark_as_fallback(error_msg);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    fn default_true() -> bool {
        true
    }

    #[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
    struct VerdictProbe {
        pub is_approved: bool,
        pub severity: String,
        pub confidence: Option<f64>,

        #[serde(default = "default_true")]
        #[schemars(skip)]
        pub is_llm_success: bool,

        #[serde(skip_serializing_if = "Option::is_none")]
        #[schemars(skip)]
        pub llm_error_message: Option<String>,
    }

    impl LlmResponse for VerdictProbe {
        fn mark_as_fallback(&mut self, error_message: String) {
            self.is_llm_success = false;
            self.llm_error_message = Some(error_message);
        }

        fn is_success(&self) -> bool {
            self.is_llm_success
        }
    }

    #[test]
    fn test_extract_json_from_json_code_block() {
        let response = r#"Assessment follows:

```json
{"is_approved": true, "severity": "none"}
```

Done."#;

        let json = extract_json_string(response).unwrap();
        assert_eq!(json, r#"{"is_approved": true, "severity": "none"}"#);
    }

    #[test]
    fn test_extract_first_object_when_several_present() {
        let response = r#"Result: {"is_approved": false, "severity": "high"} and also {"other": 1}"#;

        let json = extract_json_string(response).unwrap();
        assert_eq!(json, r#"{"is_approved": false, "severity": "high"}"#);
    }

    #[test]
    fn test_extract_ignores_braces_inside_strings() {
        let response = r#"{"notes": "contains } brace", "severity": "low"} trailing"#;

        let json = extract_json_string(response).unwrap();
        assert_eq!(json, r#"{"notes": "contains } brace", "severity": "low"}"#);
    }

    #[test]
    fn test_extract_no_json() {
        assert!(extract_json_string("I cannot classify this content.").is_err());
    }

    #[test]
    fn test_fix_trailing_commas() {
        assert_eq!(
            fix_trailing_commas(r#"{"categories": ["spam",], "x": 1,}"#),
            r#"{"categories": ["spam"], "x": 1}"#
        );
    }

    #[test]
    fn test_fix_js_string_concatenation() {
        assert_eq!(
            fix_js_string_concatenation(r#"{"notes": "mild " + "teasing"}"#),
            r#"{"notes": "mild teasing"}"#
        );
    }

    #[test]
    fn test_parse_structured_with_trailing_comma() {
        let parsed: VerdictProbe =
            parse_structured(r#"{"is_approved": true, "severity": "low", "confidence": 0.8,}"#)
                .unwrap();

        assert!(parsed.is_approved);
        assert_eq!(parsed.confidence, Some(0.8));
    }

    #[test]
    fn test_parse_with_fallback_garbage_is_marked() {
        let result: VerdictProbe = parse_with_fallback("<html>502 Bad Gateway</html>");

        assert!(!result.is_success());
        assert!(result.llm_error_message.is_some());
    }

    #[test]
    fn test_json_schema_hides_internal_fields() {
        let schema = VerdictProbe::json_schema_string();

        assert!(schema.contains("is_approved"));
        assert!(!schema.contains("is_llm_success"));
        assert!(!schema.contains("llm_error_message"));
    }
}
