use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::lexical;
use crate::core::config::ClassifierConfig;
use crate::features::moderation::models::{
    Category, DeclaredContext, RoastingIntensity, Severity,
};
use crate::modules::classifier::{ClassifierClient, ClassifierError};
use crate::shared::llm::{parse_with_fallback, LlmResponse};
use crate::shared::prompts::{render_moderation_prompt, ModerationPromptContext, PromptEngine};

fn default_true() -> bool {
    true
}

/// Shape the classifier is asked to answer with.
///
/// Everything is optional here so that a partial answer still parses;
/// required fields are enforced by [`RawClassifierVerdict::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
#[schemars(title = "ModerationVerdict")]
pub struct RawClassifierVerdict {
    #[schemars(description = "Whether the content may be shown to the community")]
    pub is_approved: Option<bool>,

    #[schemars(description = "Harm level: none, low, medium, high or critical")]
    pub severity: Option<String>,

    #[schemars(
        description = "Zero or more of: safe, harassment, hate_speech, self_harm, sexual, violence, gambling, unauthorized_promotion, spam, misinformation, sarcasm, roasting"
    )]
    #[serde(default)]
    pub categories: Vec<String>,

    #[schemars(description = "Confidence in this assessment between 0.0 and 1.0")]
    pub confidence: Option<f64>,

    #[schemars(description = "Short explanation for moderators")]
    pub notes: Option<String>,

    #[schemars(description = "Images/video: nudity is visible")]
    pub contains_nudity: Option<bool>,

    #[schemars(description = "Images/video: graphic violence is visible")]
    pub contains_violence: Option<bool>,

    #[schemars(description = "Images/video: other sensitive material a human should look at")]
    pub sensitive_content: Option<bool>,

    #[schemars(description = "Set when you are unsure and a human should decide")]
    pub requires_human_review: Option<bool>,

    #[schemars(description = "Images: any text readable in the image, verbatim")]
    pub extracted_text: Option<String>,

    #[schemars(description = "Video/audio: transcript of the spoken words")]
    pub transcript: Option<String>,

    #[schemars(description = "Video/audio: whether the speech is playful roasting")]
    pub is_roasting: Option<bool>,

    #[schemars(description = "Video/audio: roasting intensity: mild, moderate or severe")]
    pub roasting_intensity: Option<String>,

    #[serde(default = "default_true")]
    #[schemars(skip)]
    pub is_llm_success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(skip)]
    pub llm_error_message: Option<String>,
}

impl LlmResponse for RawClassifierVerdict {
    fn mark_as_fallback(&mut self, error_message: String) {
        self.is_llm_success = false;
        self.llm_error_message = Some(error_message);
    }

    fn is_success(&self) -> bool {
        self.is_llm_success
    }
}

/// Visual flags reported alongside a verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerdictFlags {
    pub contains_nudity: bool,
    pub contains_violence: bool,
    pub sensitive_content: bool,
    pub requires_human_review: bool,
}

impl VerdictFlags {
    pub fn is_sensitive(&self) -> bool {
        self.contains_nudity || self.contains_violence || self.sensitive_content
    }

    pub fn merge(self, other: VerdictFlags) -> VerdictFlags {
        VerdictFlags {
            contains_nudity: self.contains_nudity || other.contains_nudity,
            contains_violence: self.contains_violence || other.contains_violence,
            sensitive_content: self.sensitive_content || other.sensitive_content,
            requires_human_review: self.requires_human_review || other.requires_human_review,
        }
    }
}

/// A validated classifier answer
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierVerdict {
    pub is_approved: bool,
    pub severity: Severity,
    pub categories: BTreeSet<Category>,
    pub confidence: f64,
    pub notes: Option<String>,
    pub flags: VerdictFlags,
    pub extracted_text: Option<String>,
    pub transcript: Option<String>,
    pub is_roasting: bool,
    pub roasting_intensity: Option<RoastingIntensity>,
}

impl ClassifierVerdict {
    /// Union in an unsafe verdict on a part of this content. The part can only
    /// make the whole less acceptable.
    pub fn absorb_unsafe(&mut self, categories: &BTreeSet<Category>, severity: Severity) {
        self.is_approved = false;
        self.severity = self.severity.max(severity);
        self.categories.remove(&Category::Safe);
        self.categories
            .extend(categories.iter().copied().filter(|c| *c != Category::Safe));
    }
}

impl RawClassifierVerdict {
    /// Enforce the required fields and ranges
    pub fn validate(self) -> Result<ClassifierVerdict, ClassifierError> {
        if !self.is_llm_success {
            return Err(ClassifierError::ResponseInvalid(
                self.llm_error_message
                    .unwrap_or_else(|| "unparseable response".to_string()),
            ));
        }

        let is_approved = self.is_approved.ok_or_else(|| {
            ClassifierError::ResponseInvalid("missing field: is_approved".to_string())
        })?;
        let severity = self
            .severity
            .ok_or_else(|| ClassifierError::ResponseInvalid("missing field: severity".to_string()))?
            .parse::<Severity>()
            .map_err(ClassifierError::ResponseInvalid)?;
        let confidence = self.confidence.ok_or_else(|| {
            ClassifierError::ResponseInvalid("missing field: confidence".to_string())
        })?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ClassifierError::ResponseInvalid(format!(
                "confidence out of range: {}",
                confidence
            )));
        }

        let categories = self
            .categories
            .iter()
            .filter_map(|label| match label.parse::<Category>() {
                Ok(category) => Some(category),
                Err(e) => {
                    tracing::debug!("Ignoring classifier category: {}", e);
                    None
                }
            })
            .collect();

        Ok(ClassifierVerdict {
            is_approved,
            severity,
            categories,
            confidence,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            flags: VerdictFlags {
                contains_nudity: self.contains_nudity.unwrap_or(false),
                contains_violence: self.contains_violence.unwrap_or(false),
                sensitive_content: self.sensitive_content.unwrap_or(false),
                requires_human_review: self.requires_human_review.unwrap_or(false),
            },
            extracted_text: self.extracted_text.filter(|t| !t.trim().is_empty()),
            transcript: self.transcript.filter(|t| !t.trim().is_empty()),
            is_roasting: self.is_roasting.unwrap_or(false),
            roasting_intensity: self
                .roasting_intensity
                .and_then(|i| i.parse::<RoastingIntensity>().ok()),
        })
    }
}

/// Outcome of the two-stage video classification
#[derive(Debug, Clone, PartialEq)]
pub enum VideoClassification {
    /// Thumbnail was rejected; full analysis never ran
    ThumbnailRejected(ClassifierVerdict),
    Analyzed {
        thumbnail: ClassifierVerdict,
        video: ClassifierVerdict,
    },
}

/// Per-content-type operations over the classifier capability
pub struct ClassifierAdapter {
    client: Arc<dyn ClassifierClient>,
    prompts: Arc<PromptEngine>,
    timeout: Duration,
    max_attempts: u32,
}

impl ClassifierAdapter {
    pub fn new(
        client: Arc<dyn ClassifierClient>,
        prompts: Arc<PromptEngine>,
        config: &ClassifierConfig,
    ) -> Self {
        Self {
            client,
            prompts,
            timeout: config.timeout,
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub async fn classify_text(
        &self,
        text: &str,
        context: &DeclaredContext,
        locale: &str,
    ) -> Result<ClassifierVerdict, ClassifierError> {
        let user_prompt = format!("Content to moderate:\n\n{}", text);
        self.classify("text", context, locale, &user_prompt).await
    }

    /// Classify one image. Text the classifier reads off the image is
    /// classified as text and can veto an otherwise safe image.
    pub async fn classify_image(
        &self,
        image_url: &str,
        context: &DeclaredContext,
        locale: &str,
    ) -> Result<ClassifierVerdict, ClassifierError> {
        let user_prompt = format!("Image URL: {}", image_url);
        let mut verdict = self.classify("image", context, locale, &user_prompt).await?;

        if let Some(embedded) = verdict.extracted_text.clone() {
            let (safe, categories, severity) = match self
                .classify_text(&embedded, context, locale)
                .await
            {
                Ok(text_verdict) => (
                    text_verdict.is_approved,
                    text_verdict.categories,
                    text_verdict.severity,
                ),
                Err(e) => {
                    tracing::warn!("Embedded text classification failed, using lexical: {}", e);
                    let lexical = lexical::classify(&embedded, locale);
                    (lexical.is_safe, lexical.categories, lexical.severity)
                }
            };

            if !safe {
                tracing::info!("Embedded text vetoed image {}", image_url);
                verdict.absorb_unsafe(&categories, severity);
            }
        }

        Ok(verdict)
    }

    /// Classify every image of a gallery; any rejected image rejects the set
    pub async fn classify_images(
        &self,
        image_urls: &[String],
        context: &DeclaredContext,
        locale: &str,
    ) -> Result<ClassifierVerdict, ClassifierError> {
        let verdicts = futures::future::join_all(
            image_urls
                .iter()
                .map(|url| self.classify_image(url, context, locale)),
        )
        .await;

        let mut combined: Option<ClassifierVerdict> = None;
        for verdict in verdicts {
            let verdict = verdict?;
            combined = Some(match combined {
                None => verdict,
                Some(acc) => combine_verdicts(acc, verdict),
            });
        }

        combined.ok_or_else(|| ClassifierError::ResponseInvalid("no images to classify".to_string()))
    }

    /// Thumbnail first; full analysis only when the thumbnail passes
    pub async fn classify_video(
        &self,
        video_url: &str,
        thumbnail_url: &str,
        context: &DeclaredContext,
        locale: &str,
    ) -> Result<VideoClassification, ClassifierError> {
        let thumbnail = self.classify_image(thumbnail_url, context, locale).await?;
        if !thumbnail.is_approved {
            tracing::info!(
                "Video thumbnail rejected, skipping full analysis: {}",
                video_url
            );
            return Ok(VideoClassification::ThumbnailRejected(thumbnail));
        }

        let mut user_prompt = format!("Video URL: {}\nThumbnail URL: {}", video_url, thumbnail_url);
        if let Some(transcript) = context.transcript.as_deref() {
            user_prompt.push_str(&format!("\n\nProvided transcript:\n{}", transcript));
        }
        let video = self.classify("video", context, locale, &user_prompt).await?;

        Ok(VideoClassification::Analyzed { thumbnail, video })
    }

    pub async fn classify_audio(
        &self,
        audio_url: &str,
        context: &DeclaredContext,
        locale: &str,
    ) -> Result<ClassifierVerdict, ClassifierError> {
        let mut user_prompt = format!("Audio URL: {}", audio_url);
        if let Some(transcript) = context.transcript.as_deref() {
            user_prompt.push_str(&format!("\n\nProvided transcript:\n{}", transcript));
        }
        self.classify("audio", context, locale, &user_prompt).await
    }

    async fn classify(
        &self,
        kind: &str,
        context: &DeclaredContext,
        locale: &str,
        user_prompt: &str,
    ) -> Result<ClassifierVerdict, ClassifierError> {
        let schema = RawClassifierVerdict::json_schema_string();
        let prompt = ModerationPromptContext {
            locale,
            json_schema: &schema,
            post_text: context.post_text.as_deref(),
            category_tag: context.category_tag.as_deref(),
            declared_roasting: context.is_roasting,
        };
        let system_prompt = render_moderation_prompt(&self.prompts, kind, &prompt)
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let text = self.infer_with_retry(&system_prompt, user_prompt).await?;
        let raw: RawClassifierVerdict = parse_with_fallback(&text);
        raw.validate()
    }

    /// One call bounded by the timeout, retried on transient failure
    async fn infer_with_retry(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ClassifierError> {
        let mut attempt = 1;
        loop {
            let outcome = tokio::time::timeout(
                self.timeout,
                self.client.infer(system_prompt, user_prompt),
            )
            .await
            .unwrap_or_else(|_| {
                Err(ClassifierError::Unavailable(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                )))
            });

            match outcome {
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        "Classifier attempt {}/{} failed, retrying: {}",
                        attempt,
                        self.max_attempts,
                        e
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

fn combine_verdicts(a: ClassifierVerdict, b: ClassifierVerdict) -> ClassifierVerdict {
    let mut categories = a.categories;
    categories.extend(b.categories);
    if categories.len() > 1 {
        categories.remove(&Category::Safe);
    }

    let notes = match (a.notes, b.notes) {
        (Some(x), Some(y)) => Some(format!("{}; {}", x, y)),
        (x, y) => x.or(y),
    };
    let extracted_text = match (a.extracted_text, b.extracted_text) {
        (Some(x), Some(y)) => Some(format!("{}\n{}", x, y)),
        (x, y) => x.or(y),
    };

    ClassifierVerdict {
        is_approved: a.is_approved && b.is_approved,
        severity: a.severity.max(b.severity),
        categories,
        confidence: a.confidence.min(b.confidence),
        notes,
        flags: a.flags.merge(b.flags),
        extracted_text,
        transcript: a.transcript.or(b.transcript),
        is_roasting: a.is_roasting || b.is_roasting,
        roasting_intensity: a.roasting_intensity.max(b.roasting_intensity),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::modules::classifier::{ClassifierClient, ClassifierError};

    /// What a scripted call does
    #[derive(Debug, Clone)]
    pub enum Scripted {
        Reply(String),
        Fail(ClassifierError),
        Hang,
    }

    /// Classifier double: replies per call in order, records user prompts
    #[derive(Default)]
    pub struct ScriptedClassifier {
        script: Mutex<VecDeque<Scripted>>,
        default: Option<Scripted>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClassifier {
        pub fn new(script: Vec<Scripted>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ..Default::default()
            }
        }

        /// Every call answers the same way
        pub fn always(reply: Scripted) -> Self {
            Self {
                default: Some(reply),
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn user_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ClassifierClient for ScriptedClassifier {
        async fn infer(
            &self,
            _system_prompt: &str,
            user_prompt: &str,
        ) -> Result<String, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(user_prompt.to_string());

            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .or_else(|| self.default.clone())
                .unwrap_or_else(|| {
                    Scripted::Fail(ClassifierError::Unavailable("script exhausted".to_string()))
                });

            match next {
                Scripted::Reply(text) => Ok(text),
                Scripted::Fail(e) => Err(e),
                Scripted::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    /// Classifier double answering by the first route whose needle occurs
    /// in the user prompt; call order does not matter
    pub struct RoutedClassifier {
        routes: Vec<(&'static str, Scripted)>,
        otherwise: Scripted,
        calls: AtomicUsize,
    }

    impl RoutedClassifier {
        pub fn new(otherwise: Scripted) -> Self {
            Self {
                routes: Vec::new(),
                otherwise,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn route(mut self, needle: &'static str, reply: Scripted) -> Self {
            self.routes.push((needle, reply));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClassifierClient for RoutedClassifier {
        async fn infer(
            &self,
            _system_prompt: &str,
            user_prompt: &str,
        ) -> Result<String, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self
                .routes
                .iter()
                .find(|(needle, _)| user_prompt.contains(needle))
                .map(|(_, reply)| reply.clone())
                .unwrap_or_else(|| self.otherwise.clone());

            match reply {
                Scripted::Reply(text) => Ok(text),
                Scripted::Fail(e) => Err(e),
                Scripted::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    pub fn verdict_json(approved: bool, severity: &str, confidence: f64) -> String {
        format!(
            r#"{{"is_approved": {}, "severity": "{}", "categories": [], "confidence": {}}}"#,
            approved, severity, confidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn adapter(client: Arc<ScriptedClassifier>) -> ClassifierAdapter {
        let config = ClassifierConfig {
            tensorzero_url: None,
            api_key: String::new(),
            model_name: "test".to_string(),
            timeout: Duration::from_millis(50),
            max_attempts: 2,
        };
        ClassifierAdapter::new(client, Arc::new(PromptEngine::default()), &config)
    }

    fn context() -> DeclaredContext {
        DeclaredContext::default()
    }

    #[tokio::test]
    async fn test_text_verdict_parsed_from_chatty_response() {
        let client = Arc::new(ScriptedClassifier::new(vec![Scripted::Reply(
            r#"Sure! ```json
{"is_approved": false, "severity": "high", "categories": ["harassment", "made_up"], "confidence": 0.92, "notes": "insults",}
```"#
                .to_string(),
        )]));

        let verdict = adapter(client.clone())
            .classify_text("you are awful", &context(), "en")
            .await
            .unwrap();

        assert!(!verdict.is_approved);
        assert_eq!(verdict.severity, Severity::High);
        assert_eq!(verdict.categories, BTreeSet::from([Category::Harassment]));
        assert!(client.user_prompts()[0].contains("you are awful"));
    }

    #[tokio::test]
    async fn test_missing_required_field_is_invalid() {
        let client = Arc::new(ScriptedClassifier::always(Scripted::Reply(
            r#"{"is_approved": true, "categories": []}"#.to_string(),
        )));

        let result = adapter(client.clone())
            .classify_text("hello", &context(), "en")
            .await;

        assert!(matches!(result, Err(ClassifierError::ResponseInvalid(_))));
        // invalid responses are not retried
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_confidence_is_invalid() {
        let client = Arc::new(ScriptedClassifier::always(Scripted::Reply(verdict_json(
            true, "none", 87.0,
        ))));

        let result = adapter(client).classify_text("hello", &context(), "en").await;

        assert!(matches!(result, Err(ClassifierError::ResponseInvalid(_))));
    }

    #[tokio::test]
    async fn test_garbage_is_invalid() {
        let client = Arc::new(ScriptedClassifier::always(Scripted::Reply(
            "upstream error".to_string(),
        )));

        let result = adapter(client).classify_text("hello", &context(), "en").await;

        assert!(matches!(result, Err(ClassifierError::ResponseInvalid(_))));
    }

    #[tokio::test]
    async fn test_transient_failure_retried_once() {
        let client = Arc::new(ScriptedClassifier::new(vec![
            Scripted::Fail(ClassifierError::Unavailable("reset".to_string())),
            Scripted::Reply(verdict_json(true, "none", 0.95)),
        ]));

        let verdict = adapter(client.clone())
            .classify_text("hello", &context(), "en")
            .await
            .unwrap();

        assert!(verdict.is_approved);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable_after_retries() {
        let client = Arc::new(ScriptedClassifier::always(Scripted::Hang));

        let result = adapter(client.clone())
            .classify_text("hello", &context(), "en")
            .await;

        assert!(matches!(result, Err(ClassifierError::Unavailable(_))));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_rejected_thumbnail_skips_video_analysis() {
        let client = Arc::new(ScriptedClassifier::new(vec![
            Scripted::Reply(verdict_json(false, "high", 0.9)),
            Scripted::Reply(verdict_json(true, "none", 0.99)),
        ]));

        let outcome = adapter(client.clone())
            .classify_video(
                "https://cdn.example/v.mp4",
                "https://cdn.example/t.jpg",
                &context(),
                "en",
            )
            .await
            .unwrap();

        assert!(matches!(outcome, VideoClassification::ThumbnailRejected(_)));
        assert_eq!(client.calls(), 1);
        assert!(client
            .user_prompts()
            .iter()
            .all(|p| !p.contains("Video URL")));
    }

    #[tokio::test]
    async fn test_passing_thumbnail_runs_video_analysis() {
        let client = Arc::new(ScriptedClassifier::new(vec![
            Scripted::Reply(verdict_json(true, "none", 0.9)),
            Scripted::Reply(verdict_json(true, "low", 0.8)),
        ]));

        let outcome = adapter(client.clone())
            .classify_video(
                "https://cdn.example/v.mp4",
                "https://cdn.example/t.jpg",
                &context(),
                "en",
            )
            .await
            .unwrap();

        match outcome {
            VideoClassification::Analyzed { thumbnail, video } => {
                assert!(thumbnail.is_approved);
                assert_eq!(video.severity, Severity::Low);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(client.calls(), 2);
        assert!(client.user_prompts()[1].contains("Video URL"));
    }

    #[tokio::test]
    async fn test_embedded_text_vetoes_safe_image() {
        let client = Arc::new(ScriptedClassifier::new(vec![
            Scripted::Reply(
                r#"{"is_approved": true, "severity": "none", "categories": ["safe"], "confidence": 0.9, "extracted_text": "they are vermin"}"#
                    .to_string(),
            ),
            Scripted::Reply(
                r#"{"is_approved": false, "severity": "high", "categories": ["hate_speech"], "confidence": 0.9}"#
                    .to_string(),
            ),
        ]));

        let verdict = adapter(client)
            .classify_image("https://cdn.example/meme.png", &context(), "en")
            .await
            .unwrap();

        assert!(!verdict.is_approved);
        assert_eq!(verdict.severity, Severity::High);
        assert_eq!(verdict.categories, BTreeSet::from([Category::HateSpeech]));
    }

    #[tokio::test]
    async fn test_embedded_text_falls_back_to_lexical() {
        let client = Arc::new(ScriptedClassifier::new(vec![
            Scripted::Reply(
                r#"{"is_approved": true, "severity": "none", "categories": [], "confidence": 0.9, "extracted_text": "subhuman vermin"}"#
                    .to_string(),
            ),
            Scripted::Reply("not json".to_string()),
        ]));

        let verdict = adapter(client)
            .classify_image("https://cdn.example/meme.png", &context(), "en")
            .await
            .unwrap();

        assert!(!verdict.is_approved);
        assert!(verdict.categories.contains(&Category::HateSpeech));
    }

    #[tokio::test]
    async fn test_safe_embedded_text_cannot_approve_unsafe_image() {
        let client = Arc::new(ScriptedClassifier::new(vec![
            Scripted::Reply(
                r#"{"is_approved": false, "severity": "high", "categories": ["sexual"], "confidence": 0.9, "contains_nudity": true, "extracted_text": "good morning"}"#
                    .to_string(),
            ),
            Scripted::Reply(verdict_json(true, "none", 0.99)),
        ]));

        let verdict = adapter(client)
            .classify_image("https://cdn.example/p.png", &context(), "en")
            .await
            .unwrap();

        assert!(!verdict.is_approved);
        assert!(verdict.flags.is_sensitive());
    }

    #[tokio::test]
    async fn test_gallery_rejected_when_any_image_rejected() {
        let client = Arc::new(ScriptedClassifier::new(vec![
            Scripted::Reply(verdict_json(true, "none", 0.95)),
            Scripted::Reply(verdict_json(false, "medium", 0.75)),
        ]));

        let urls = vec![
            "https://cdn.example/1.png".to_string(),
            "https://cdn.example/2.png".to_string(),
        ];
        let verdict = adapter(client)
            .classify_images(&urls, &context(), "en")
            .await
            .unwrap();

        assert!(!verdict.is_approved);
        assert_eq!(verdict.severity, Severity::Medium);
        assert_eq!(verdict.confidence, 0.75);
    }
}
