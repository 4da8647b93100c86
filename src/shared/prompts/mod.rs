//! Prompt template management for classifier calls.
//!
//! Templates use Jinja2 syntax and are rendered with the content's locale,
//! the declared context and the JSON schema the classifier must answer with.

pub mod engine;

pub use engine::{PromptEngine, TemplateError};

use minijinja::Value;
use std::collections::HashMap;

/// Inputs shared by every moderation prompt
#[derive(Debug, Clone, Default)]
pub struct ModerationPromptContext<'a> {
    pub locale: &'a str,
    pub json_schema: &'a str,
    pub post_text: Option<&'a str>,
    pub category_tag: Option<&'a str>,
    pub declared_roasting: bool,
}

/// Render the system prompt for one content kind (`text`, `image`, `video`, `audio`)
pub fn render_moderation_prompt(
    engine: &PromptEngine,
    kind: &str,
    prompt: &ModerationPromptContext<'_>,
) -> Result<String, TemplateError> {
    let mut ctx: HashMap<&str, Value> = HashMap::new();
    ctx.insert("locale", Value::from(prompt.locale));
    ctx.insert("json_schema", Value::from(prompt.json_schema));
    ctx.insert("post_text", Value::from(prompt.post_text.unwrap_or("")));
    ctx.insert("has_post_text", Value::from(prompt.post_text.is_some()));
    ctx.insert("category_tag", Value::from(prompt.category_tag.unwrap_or("")));
    ctx.insert("declared_roasting", Value::from(prompt.declared_roasting));

    engine.render(&format!("moderation/{}.jinja", kind), &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_prompt_embeds_schema_and_locale() {
        let engine = PromptEngine::default();
        let prompt = ModerationPromptContext {
            locale: "es",
            json_schema: r#"{"title": "SchemaMarker"}"#,
            ..Default::default()
        };

        let rendered = render_moderation_prompt(&engine, "text", &prompt).unwrap();

        assert!(rendered.contains("SchemaMarker"));
        assert!(rendered.contains("locale \"es\""));
    }

    #[test]
    fn test_render_video_prompt_mentions_declared_roasting() {
        let engine = PromptEngine::default();
        let prompt = ModerationPromptContext {
            locale: "en",
            json_schema: "{}",
            post_text: Some("roast battle round 2"),
            category_tag: Some("comedy"),
            declared_roasting: true,
        };

        let rendered = render_moderation_prompt(&engine, "video", &prompt).unwrap();

        assert!(rendered.contains("roast battle round 2"));
        assert!(rendered.contains("comedy"));
        assert!(rendered.contains("declared this as a roast"));
    }

    #[test]
    fn test_render_unknown_kind_fails() {
        let engine = PromptEngine::default();
        let result = render_moderation_prompt(&engine, "hologram", &Default::default());

        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }
}
