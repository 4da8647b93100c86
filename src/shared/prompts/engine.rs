//! Template engine for classifier prompts using Jinja2 syntax.
//!
//! Built-in templates are compiled into the binary; a directory of `.jinja`
//! files can override any of them by relative name.

use minijinja::{Environment, Value};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Built-in templates, keyed by the name callers render them with
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "moderation/text.jinja",
        include_str!("../../../templates/prompts/moderation/text.jinja"),
    ),
    (
        "moderation/image.jinja",
        include_str!("../../../templates/prompts/moderation/image.jinja"),
    ),
    (
        "moderation/video.jinja",
        include_str!("../../../templates/prompts/moderation/video.jinja"),
    ),
    (
        "moderation/audio.jinja",
        include_str!("../../../templates/prompts/moderation/audio.jinja"),
    ),
];

/// Errors that can occur during template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

/// Owns the compiled template environment
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Load built-in templates, then apply overrides from `override_dir` if it exists
    pub fn new(override_dir: Option<&str>) -> Self {
        let mut env = Environment::new();

        for (name, source) in BUILTIN_TEMPLATES {
            if let Err(e) = env.add_template(name, source) {
                tracing::error!("Built-in template {} failed to compile: {}", name, e);
            }
        }

        if let Some(dir) = override_dir {
            let base = Path::new(dir);
            if base.exists() {
                load_templates_recursive(&mut env, base, base);
            } else {
                tracing::warn!("Prompt template directory {} does not exist", dir);
            }
        }

        Self { env }
    }

    /// Render a template with the given context
    pub fn render(
        &self,
        template_name: &str,
        ctx: &HashMap<&str, Value>,
    ) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(template_name)
            .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

        let render_ctx = Value::from_iter(ctx.iter().map(|(k, v)| (*k, v.clone())));

        template
            .render(render_ctx)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }

    #[allow(dead_code)]
    pub fn template_exists(&self, template_name: &str) -> bool {
        self.env.get_template(template_name).is_ok()
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Recursively load all .jinja templates from a directory
fn load_templates_recursive(env: &mut Environment<'static>, base_path: &Path, current_path: &Path) {
    let Ok(entries) = std::fs::read_dir(current_path) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_templates_recursive(env, base_path, &path);
            continue;
        }
        if !path.extension().is_some_and(|ext| ext == "jinja") {
            continue;
        }

        let (Ok(relative), Ok(content)) =
            (path.strip_prefix(base_path), std::fs::read_to_string(&path))
        else {
            continue;
        };

        // Windows separators would not match the names callers use
        let template_name = relative.to_string_lossy().replace('\\', "/");
        // Leaked once at startup; templates live as long as the process
        let static_name: &'static str = Box::leak(template_name.clone().into_boxed_str());
        let static_content: &'static str = Box::leak(content.into_boxed_str());
        match env.add_template(static_name, static_content) {
            Ok(()) => tracing::info!("Prompt template overridden: {}", template_name),
            Err(e) => tracing::warn!("Failed to load template {}: {}", template_name, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_are_available() {
        let engine = PromptEngine::default();

        for (name, _) in BUILTIN_TEMPLATES {
            assert!(engine.template_exists(name), "missing {}", name);
        }
    }

    #[test]
    fn test_render_missing_template() {
        let engine = PromptEngine::default();
        let result = engine.render("definitely_not_a_real_template.jinja", &HashMap::new());

        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_missing_override_dir_keeps_builtins() {
        let engine = PromptEngine::new(Some("/nonexistent/prompt/dir"));
        assert!(engine.template_exists("moderation/text.jinja"));
    }
}
