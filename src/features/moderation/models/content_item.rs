use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::Type;
use utoipa::ToSchema;

/// Kind of submitted content; also names the review queue it lands in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "content_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    Video,
    Audio,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::Text,
        ContentType::Image,
        ContentType::Video,
        ContentType::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Audio => "audio",
        }
    }

    /// Video and audio carry more harm per item and are held when classification fails
    pub fn fails_closed(&self) -> bool {
        matches!(self, ContentType::Video | ContentType::Audio)
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was submitted. The variant determines the content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ContentPayload {
    Text { text: String },
    Image { image_urls: Vec<String> },
    Video { video_url: String, thumbnail_url: String },
    Audio { audio_url: String },
}

impl ContentPayload {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentPayload::Text { .. } => ContentType::Text,
            ContentPayload::Image { .. } => ContentType::Image,
            ContentPayload::Video { .. } => ContentType::Video,
            ContentPayload::Audio { .. } => ContentType::Audio,
        }
    }
}

/// Author-declared context travelling with a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredContext {
    /// Post text accompanying media, or the surrounding post for text content
    #[serde(default)]
    pub post_text: Option<String>,
    #[serde(default)]
    pub category_tag: Option<String>,
    /// The author's answer to "is this roasting?"
    #[serde(default)]
    pub is_roasting: bool,
    /// Whether every targeted participant has roasted the author back.
    /// Supplied by the surrounding platform; never inferred here.
    #[serde(default)]
    pub is_mutual: Option<bool>,
    /// Users explicitly mentioned or targeted by the content
    #[serde(default)]
    pub mentioned_user_ids: Vec<String>,
    #[serde(default)]
    pub locale: Option<String>,
    /// Transcript supplied by the platform (captions) for audio/video
    #[serde(default)]
    pub transcript: Option<String>,
}

/// A submitted piece of content. Immutable once submitted; an edit is a new
/// submission under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub author_id: String,
    pub payload: ContentPayload,
    pub declared_context: DeclaredContext,
    pub submitted_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        payload: ContentPayload,
        declared_context: DeclaredContext,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            payload,
            declared_context,
            submitted_at: Utc::now(),
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.payload.content_type()
    }

    /// SHA-256 over payload and declared context; equal fingerprints mean an
    /// unmodified resubmission.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.author_id.as_bytes());
        hasher.update([0u8]);
        // Serializing plain data structs cannot fail
        if let Ok(bytes) = serde_json::to_vec(&(&self.payload, &self.declared_context)) {
            hasher.update(&bytes);
        }
        hex::encode(hasher.finalize())
    }

    pub fn locale<'a>(&'a self, default_locale: &'a str) -> &'a str {
        self.declared_context
            .locale
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(default_locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_item(text: &str) -> ContentItem {
        ContentItem::new(
            "post-1",
            "author-1",
            ContentPayload::Text {
                text: text.to_string(),
            },
            DeclaredContext::default(),
        )
    }

    #[test]
    fn test_payload_determines_content_type() {
        let video = ContentPayload::Video {
            video_url: "https://cdn.example/v.mp4".to_string(),
            thumbnail_url: "https://cdn.example/v.jpg".to_string(),
        };
        assert_eq!(video.content_type(), ContentType::Video);
        assert!(ContentType::Video.fails_closed());
        assert!(!ContentType::Image.fails_closed());
    }

    #[test]
    fn test_payload_deserializes_from_tagged_json() {
        let payload: ContentPayload =
            serde_json::from_str(r#"{"type": "audio", "audioUrl": "https://cdn.example/a.ogg"}"#)
                .unwrap();

        assert_eq!(payload.content_type(), ContentType::Audio);
    }

    #[test]
    fn test_fingerprint_stable_and_sensitive_to_edits() {
        let first = text_item("hello there");
        let mut again = text_item("hello there");
        again.submitted_at = first.submitted_at + chrono::Duration::seconds(30);
        let edited = text_item("hello there!");

        assert_eq!(first.fingerprint(), again.fingerprint());
        assert_ne!(first.fingerprint(), edited.fingerprint());
        assert_eq!(first.fingerprint().len(), 64);
    }

    #[test]
    fn test_locale_defaults_when_missing_or_empty() {
        let mut item = text_item("hola");
        assert_eq!(item.locale("en"), "en");

        item.declared_context.locale = Some(String::new());
        assert_eq!(item.locale("en"), "en");

        item.declared_context.locale = Some("es".to_string());
        assert_eq!(item.locale("en"), "es");
    }
}
