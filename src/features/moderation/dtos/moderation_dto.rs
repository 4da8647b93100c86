use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::moderation::models::{
    Category, ContentItem, ContentPayload, ContentType, Decision, DeclaredContext,
    ModerationResult, Severity,
};

const MAX_TEXT_CHARS: usize = 20_000;
const MAX_GALLERY_IMAGES: usize = 10;
const MAX_URL_CHARS: usize = 2048;

/// Submit (or resubmit after an edit) a content item for moderation
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitContentDto {
    /// Platform id of the content item; a resubmission reuses it
    #[validate(length(min = 1, max = 200, message = "Content id must be 1-200 characters"))]
    pub content_id: String,
    #[validate(custom(function = "validate_payload"))]
    pub payload: ContentPayload,
    #[serde(default)]
    #[validate(custom(function = "validate_context"))]
    pub declared_context: DeclaredContext,
}

impl SubmitContentDto {
    pub fn into_item(self, author_id: &str) -> ContentItem {
        ContentItem::new(self.content_id, author_id, self.payload, self.declared_context)
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn check_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    if url.is_empty() || url.len() > MAX_URL_CHARS {
        return Err(invalid("url", "Media URLs must be 1-2048 characters"));
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(invalid("url", "Media URLs must be http(s)"));
    }
    Ok(())
}

fn validate_payload(payload: &ContentPayload) -> Result<(), ValidationError> {
    match payload {
        ContentPayload::Text { text } => {
            if text.trim().is_empty() {
                return Err(invalid("text", "Text must not be empty"));
            }
            if text.chars().count() > MAX_TEXT_CHARS {
                return Err(invalid("text", "Text must be at most 20000 characters"));
            }
            Ok(())
        }
        ContentPayload::Image { image_urls } => {
            if image_urls.is_empty() || image_urls.len() > MAX_GALLERY_IMAGES {
                return Err(invalid("image_urls", "Provide between 1 and 10 images"));
            }
            image_urls.iter().try_for_each(|url| check_url(url))
        }
        ContentPayload::Video {
            video_url,
            thumbnail_url,
        } => {
            check_url(video_url)?;
            check_url(thumbnail_url)
        }
        ContentPayload::Audio { audio_url } => check_url(audio_url),
    }
}

fn validate_context(context: &DeclaredContext) -> Result<(), ValidationError> {
    let too_long = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|v| v.chars().count() > MAX_TEXT_CHARS)
    };
    if too_long(&context.post_text) || too_long(&context.transcript) {
        return Err(invalid("context", "Post text and transcript must be at most 20000 characters"));
    }
    if context.mentioned_user_ids.len() > 50 {
        return Err(invalid("context", "At most 50 mentioned users"));
    }
    Ok(())
}

/// Full moderation result, as seen by moderators
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResultDto {
    pub id: Uuid,
    pub content_id: String,
    pub user_id: String,
    pub content_type: ContentType,
    pub timestamp: DateTime<Utc>,
    pub decision: Decision,
    pub is_approved: bool,
    pub severity: Severity,
    pub categories: Vec<Category>,
    pub confidence: f64,
    pub overall_score: f64,
    pub context_aware: bool,
    pub classifier_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_message: Option<String>,
    pub appealable: bool,
}

impl From<ModerationResult> for ModerationResultDto {
    fn from(r: ModerationResult) -> Self {
        Self {
            id: r.id,
            content_id: r.content_id,
            user_id: r.user_id,
            content_type: r.content_type,
            timestamp: r.timestamp,
            decision: r.decision,
            is_approved: r.is_approved,
            severity: r.severity,
            categories: r.categories.into_iter().collect(),
            confidence: r.confidence,
            overall_score: r.overall_score,
            context_aware: r.context_aware,
            classifier_id: r.classifier_id,
            notes: r.notes,
            feedback_message: r.feedback_message,
            appealable: r.appealable,
        }
    }
}

/// What an author sees about their own content. Scores, categories and
/// classifier notes stay internal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentOutcomeDto {
    pub moderation_id: Uuid,
    pub content_id: String,
    pub content_type: ContentType,
    pub decision: Decision,
    pub is_approved: bool,
    pub feedback_message: String,
    pub appealable: bool,
    pub decided_at: DateTime<Utc>,
}

impl From<ModerationResult> for ContentOutcomeDto {
    fn from(r: ModerationResult) -> Self {
        Self {
            moderation_id: r.id,
            feedback_message: r
                .feedback_message
                .unwrap_or_else(|| r.decision.feedback_message().to_string()),
            content_id: r.content_id,
            content_type: r.content_type,
            decision: r.decision,
            is_approved: r.is_approved,
            appealable: r.appealable,
            decided_at: r.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dto(value: serde_json::Value) -> SubmitContentDto {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_accepts_text_submission() {
        let submission = dto(json!({
            "contentId": "post-1",
            "payload": { "type": "text", "text": "hello there" }
        }));
        assert!(submission.validate().is_ok());
        assert_eq!(submission.declared_context, DeclaredContext::default());
    }

    #[test]
    fn test_rejects_blank_text() {
        let submission = dto(json!({
            "contentId": "post-1",
            "payload": { "type": "text", "text": "   " }
        }));
        assert!(submission.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_gallery_and_bad_urls() {
        let empty = dto(json!({
            "contentId": "post-2",
            "payload": { "type": "image", "imageUrls": [] }
        }));
        assert!(empty.validate().is_err());

        let bad_scheme = dto(json!({
            "contentId": "post-3",
            "payload": {
                "type": "video",
                "videoUrl": "ftp://cdn.example/v.mp4",
                "thumbnailUrl": "https://cdn.example/t.jpg"
            }
        }));
        assert!(bad_scheme.validate().is_err());
    }

    #[test]
    fn test_parses_declared_context() {
        let submission = dto(json!({
            "contentId": "clip-9",
            "payload": { "type": "audio", "audioUrl": "https://cdn.example/a.mp3" },
            "declaredContext": {
                "isRoasting": true,
                "isMutual": true,
                "mentionedUserIds": ["friend-1"],
                "locale": "es-MX"
            }
        }));
        assert!(submission.validate().is_ok());
        let item = submission.into_item("author-1");
        assert_eq!(item.content_type(), ContentType::Audio);
        assert!(item.declared_context.is_roasting);
        assert_eq!(item.declared_context.is_mutual, Some(true));
        assert_eq!(item.locale("en"), "es-MX");
    }
}
