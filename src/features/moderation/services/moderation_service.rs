use std::collections::BTreeSet;
use std::sync::Arc;

use uuid::Uuid;

use super::scoring::{self, Aggregate, AudioSignal, ScoreInputs, VisualSignal};
use crate::core::config::{FailClosedMode, ModerationConfig};
use crate::core::error::{AppError, Result};
use crate::features::moderation::classifiers::lexical::{self, LexicalVerdict};
use crate::features::moderation::classifiers::{
    leniency, ClassifierAdapter, ClassifierVerdict, VideoClassification,
};
use crate::features::moderation::models::{
    Category, ContentItem, ContentPayload, CreateModerationResult, Decision, DeclaredContext,
    ModerationResult, RoastingContext, Severity,
};
use crate::features::review_queue::services::ReviewQueueService;
use crate::features::safety_metrics::services::SafetyMetricsService;
use crate::modules::classifier::ClassifierError;
use crate::modules::store::ModerationStore;
use crate::shared::constants::{CLASSIFIER_EXTERNAL, CLASSIFIER_FAIL_CLOSED, CLASSIFIER_LEXICAL};
use crate::shared::keyed_locks::{content_key, KeyedLocks};

const THUMBNAIL_REJECTED_FEEDBACK: &str =
    "Your video's thumbnail goes against our community guidelines.";

/// Score used for a fail-closed hold awaiting review
const FAIL_CLOSED_REVIEW_SCORE: f64 = 0.5;

/// Caption or post text verdict, from the classifier or the lexical matcher
#[derive(Debug, Clone)]
struct CaptionCheck {
    is_safe: bool,
    severity: Severity,
    categories: BTreeSet<Category>,
    confidence: f64,
}

impl From<ClassifierVerdict> for CaptionCheck {
    fn from(v: ClassifierVerdict) -> Self {
        Self {
            is_safe: v.is_approved,
            severity: v.severity,
            categories: v.categories,
            confidence: v.confidence,
        }
    }
}

impl From<LexicalVerdict> for CaptionCheck {
    fn from(v: LexicalVerdict) -> Self {
        Self {
            is_safe: v.is_safe,
            severity: v.severity,
            categories: v.categories,
            confidence: v.confidence,
        }
    }
}

/// A verdict not yet bound to a content item
#[derive(Debug, Clone)]
struct Assessment {
    decision: Decision,
    severity: Severity,
    categories: BTreeSet<Category>,
    confidence: f64,
    overall_score: f64,
    context_aware: bool,
    classifier_id: &'static str,
    notes: Option<String>,
    feedback_message: Option<String>,
}

impl Assessment {
    fn from_verdict(verdict: &ClassifierVerdict, aggregate: Aggregate, context_aware: bool) -> Self {
        let mut decision = scoring::decide(aggregate.overall_score, aggregate.requires_human_review);
        if decision == Decision::Approved && verdict.flags.contains_nudity {
            decision = Decision::AgeRestricted;
        }

        Self {
            decision,
            severity: verdict.severity,
            categories: verdict.categories.clone(),
            confidence: verdict.confidence,
            overall_score: aggregate.overall_score,
            context_aware,
            classifier_id: CLASSIFIER_EXTERNAL,
            notes: verdict.notes.clone(),
            feedback_message: None,
        }
    }

    fn text(verdict: &ClassifierVerdict) -> Self {
        let flagged = verdict.flags.requires_human_review || verdict.flags.is_sensitive();
        let aggregate = scoring::aggregate_single(
            verdict.is_approved,
            verdict.confidence,
            verdict.severity,
            flagged,
        );
        Self::from_verdict(verdict, aggregate, false)
    }

    fn image(verdict: &ClassifierVerdict) -> Self {
        let flagged = verdict.flags.requires_human_review
            || verdict.flags.is_sensitive()
            || verdict.confidence < scoring::MIN_VISUAL_CONFIDENCE;
        let aggregate = scoring::aggregate_single(
            verdict.is_approved,
            verdict.confidence,
            verdict.severity,
            flagged,
        );
        Self::from_verdict(verdict, aggregate, false)
    }

    fn video(classification: VideoClassification, context: &DeclaredContext) -> Self {
        let (thumbnail, video) = match classification {
            VideoClassification::ThumbnailRejected(thumbnail) => {
                return Self {
                    decision: Decision::Rejected,
                    severity: thumbnail.severity.max(Severity::Low),
                    overall_score: scoring::single_modality_score(
                        false,
                        thumbnail.confidence,
                        thumbnail.severity,
                    ),
                    categories: thumbnail.categories,
                    confidence: thumbnail.confidence,
                    context_aware: false,
                    classifier_id: CLASSIFIER_EXTERNAL,
                    notes: Some("Thumbnail rejected; full video analysis skipped".to_string()),
                    feedback_message: Some(THUMBNAIL_REJECTED_FEEDBACK.to_string()),
                };
            }
            VideoClassification::Analyzed { thumbnail, video } => (thumbnail, video),
        };

        let flags = thumbnail.flags.merge(video.flags);
        let (audio, roasting) = audio_signal(&video, context, false);
        let severity = thumbnail.severity.max(video.severity);
        let mut aggregate = scoring::aggregate(&ScoreInputs {
            visual: Some(VisualSignal {
                is_safe: video.is_approved,
                confidence: video.confidence,
                sensitive: flags.is_sensitive(),
            }),
            audio,
            roasting: roasting.clone(),
            severity,
        });
        aggregate.requires_human_review |= flags.requires_human_review;

        let mut combined = video;
        combined.severity = severity;
        combined.flags = flags;
        combined.categories.extend(thumbnail.categories);
        let mut assessment = Self::from_verdict(&combined, aggregate, roasting.is_some());
        assessment.tag_roasting(roasting.as_ref(), combined.is_roasting);
        assessment
    }

    fn audio(verdict: &ClassifierVerdict, context: &DeclaredContext) -> Self {
        let (audio, roasting) = audio_signal(verdict, context, true);
        let mut aggregate = scoring::aggregate(&ScoreInputs {
            visual: None,
            audio,
            roasting: roasting.clone(),
            severity: verdict.severity,
        });
        aggregate.requires_human_review |= verdict.flags.requires_human_review;

        let mut assessment = Self::from_verdict(verdict, aggregate, roasting.is_some());
        assessment.tag_roasting(roasting.as_ref(), verdict.is_roasting);
        assessment
    }

    /// Fail-open verdict from the lexical matcher
    fn lexical(verdict: LexicalVerdict) -> Self {
        let decision = if verdict.is_safe {
            Decision::Approved
        } else if verdict.severity >= Severity::High {
            Decision::Rejected
        } else {
            Decision::PendingReview
        };

        Self {
            decision,
            severity: verdict.severity,
            overall_score: verdict.safety_score / 100.0,
            notes: Some(format!(
                "Classifier unavailable; lexical fallback matched {} term(s)",
                verdict.match_count
            )),
            categories: verdict.categories,
            confidence: verdict.confidence,
            context_aware: false,
            classifier_id: CLASSIFIER_LEXICAL,
            feedback_message: None,
        }
    }

    /// Fail-closed hold. Lexical matches on any available text only raise
    /// the severity.
    fn fail_closed(mode: FailClosedMode, lexical: Option<LexicalVerdict>) -> Self {
        let (severity, categories) = match lexical {
            Some(v) if !v.is_safe => (v.severity.max(Severity::Medium), v.categories),
            _ => (Severity::Medium, BTreeSet::new()),
        };
        let (decision, overall_score) = match mode {
            FailClosedMode::Review => (Decision::PendingReview, FAIL_CLOSED_REVIEW_SCORE),
            FailClosedMode::Reject => (Decision::Rejected, 0.0),
        };

        Self {
            decision,
            severity,
            categories,
            confidence: 0.0,
            overall_score,
            context_aware: false,
            classifier_id: CLASSIFIER_FAIL_CLOSED,
            notes: Some("Classifier unavailable; held by fail-closed policy".to_string()),
            feedback_message: None,
        }
    }

    fn tag_roasting(&mut self, roasting: Option<&RoastingContext>, detected: bool) {
        if detected || roasting.is_some_and(|r| r.is_roasting) {
            self.categories.insert(Category::Roasting);
        }
    }

    /// An unsafe caption can only make the media less acceptable
    fn apply_caption(&mut self, caption: CaptionCheck) {
        self.context_aware = true;
        if caption.is_safe {
            return;
        }

        self.severity = self.severity.max(caption.severity);
        self.categories
            .extend(caption.categories.into_iter().filter(|c| *c != Category::Safe));
        self.overall_score = self.overall_score.min(scoring::single_modality_score(
            false,
            caption.confidence,
            caption.severity,
        ));
        self.decision = if caption.severity >= Severity::High || self.decision == Decision::Rejected
        {
            Decision::Rejected
        } else {
            Decision::PendingReview
        };

        let note = "Caption flagged";
        self.notes = Some(match self.notes.take() {
            Some(notes) => format!("{}; {}", notes, note),
            None => note.to_string(),
        });
    }

    /// One-line summary shown to moderators in the queue
    fn summary(&self) -> String {
        let categories: Vec<&str> = self.categories.iter().map(|c| c.as_str()).collect();
        let mut summary = format!(
            "{}: score {:.2}, severity {:?}, categories [{}]",
            self.classifier_id,
            self.overall_score,
            self.severity,
            categories.join(", ")
        );
        if let Some(notes) = &self.notes {
            summary.push_str(". ");
            summary.push_str(notes);
        }
        summary
    }

    fn into_result(self, item: &ContentItem, content_fingerprint: String) -> CreateModerationResult {
        CreateModerationResult {
            content_id: item.id.clone(),
            user_id: item.author_id.clone(),
            content_type: item.content_type(),
            decision: self.decision,
            severity: self.severity,
            categories: self.categories,
            confidence: self.confidence,
            overall_score: self.overall_score,
            context_aware: self.context_aware,
            classifier_id: self.classifier_id.to_string(),
            notes: self.notes,
            feedback_message: self.feedback_message,
            content_fingerprint,
        }
    }
}

/// Audio signal and roasting context from a transcript, when there is one.
/// Without a transcript, `always` falls back to the verdict's own confidence.
fn audio_signal(
    verdict: &ClassifierVerdict,
    context: &DeclaredContext,
    always: bool,
) -> (Option<AudioSignal>, Option<RoastingContext>) {
    let transcript = verdict
        .transcript
        .as_deref()
        .or(context.transcript.as_deref())
        .filter(|t| !t.trim().is_empty());

    let Some(transcript) = transcript else {
        let signal = always.then_some(AudioSignal {
            is_safe: verdict.is_approved,
            contextual_score: verdict.confidence,
        });
        return (signal, None);
    };

    let targets: BTreeSet<String> = context.mentioned_user_ids.iter().cloned().collect();
    let mut assessment = leniency::assess(
        transcript,
        context.is_roasting,
        context.is_mutual.unwrap_or(false),
        &targets,
    );
    if assessment.roasting.is_roasting {
        assessment.roasting.intensity = assessment
            .roasting
            .intensity
            .max(verdict.roasting_intensity);
    }

    (
        Some(AudioSignal {
            is_safe: verdict.is_approved,
            contextual_score: assessment.contextual_score,
        }),
        Some(assessment.roasting),
    )
}

/// The moderation pipeline: classify, score, decide, record, escalate.
///
/// Submissions for one content id are serialized on its content lock, so
/// the latest submission's result is always the authoritative one.
pub struct ModerationService {
    store: Arc<dyn ModerationStore>,
    adapter: Arc<ClassifierAdapter>,
    queue: Arc<ReviewQueueService>,
    metrics: Arc<SafetyMetricsService>,
    locks: Arc<KeyedLocks>,
    fail_closed_all: bool,
    fail_closed_mode: FailClosedMode,
    default_locale: String,
}

impl ModerationService {
    pub fn new(
        store: Arc<dyn ModerationStore>,
        adapter: Arc<ClassifierAdapter>,
        queue: Arc<ReviewQueueService>,
        metrics: Arc<SafetyMetricsService>,
        locks: Arc<KeyedLocks>,
        config: &ModerationConfig,
    ) -> Self {
        Self {
            store,
            adapter,
            queue,
            metrics,
            locks,
            fail_closed_all: config.fail_closed_all,
            fail_closed_mode: config.fail_closed_mode,
            default_locale: config.default_locale.clone(),
        }
    }

    /// Moderate a submission. Always produces a verdict; classifier
    /// failures are absorbed by the fallback policy.
    pub async fn submit(&self, item: ContentItem) -> Result<ModerationResult> {
        let slot = self.locks.acquire(&content_key(&item.id)).await;

        let fingerprint = item.fingerprint();
        let previous = self.store.authoritative_result(&item.id).await?;
        if let Some(previous) = &previous {
            if previous.user_id != item.author_id {
                return Err(AppError::Forbidden(format!(
                    "Content {} belongs to another author",
                    item.id
                )));
            }
            if previous.content_fingerprint == fingerprint {
                tracing::info!(
                    content_id = %item.id,
                    decision = ?previous.decision,
                    "Unchanged resubmission, returning current result"
                );
                return Ok(previous.clone());
            }
        }

        // Nothing is persisted until classification finishes
        let assessment = self.assess(&item).await;
        let summary = assessment.summary();
        let result: ModerationResult = assessment.into_result(&item, fingerprint).into();

        self.store.save_content(&item).await?;
        self.store.record_result(&result).await?;

        if result.decision == Decision::PendingReview {
            self.queue.enqueue(&slot, &result, summary).await?;
        } else {
            self.queue.supersede(&slot, &result).await?;
        }

        match &previous {
            Some(previous) => self.metrics.revise(previous, &result).await?,
            None => self.metrics.record(&result).await?,
        };

        tracing::info!(
            content_id = %result.content_id,
            content_type = %result.content_type,
            decision = ?result.decision,
            severity = ?result.severity,
            overall_score = result.overall_score,
            classifier = %result.classifier_id,
            "Content moderated"
        );

        Ok(result)
    }

    pub async fn get_result(&self, id: Uuid) -> Result<ModerationResult> {
        self.store
            .get_result(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Moderation result {} not found", id)))
    }

    /// The current verdict for a content item
    pub async fn current_result(&self, content_id: &str) -> Result<ModerationResult> {
        self.store
            .authoritative_result(content_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Content {} not found", content_id)))
    }

    /// Every verdict for a content item, oldest first
    pub async fn history(&self, content_id: &str) -> Result<Vec<ModerationResult>> {
        let history = self.store.result_history(content_id).await?;
        if history.is_empty() {
            return Err(AppError::NotFound(format!("Content {} not found", content_id)));
        }
        Ok(history)
    }

    async fn assess(&self, item: &ContentItem) -> Assessment {
        let context = &item.declared_context;
        let locale = item.locale(&self.default_locale);

        if let ContentPayload::Text { .. } = item.payload {
            return self.assess_payload(item, locale).await;
        }

        // Media and its caption are independent; classify them together
        let caption = context
            .post_text
            .as_deref()
            .filter(|t| !t.trim().is_empty());
        let (mut assessment, caption) = futures::join!(
            self.assess_payload(item, locale),
            self.check_caption(caption, context, locale),
        );
        if let Some(caption) = caption {
            assessment.apply_caption(caption);
        }
        assessment
    }

    async fn assess_payload(&self, item: &ContentItem, locale: &str) -> Assessment {
        let context = &item.declared_context;
        let outcome = match &item.payload {
            ContentPayload::Text { text } => self
                .adapter
                .classify_text(text, context, locale)
                .await
                .map(|v| Assessment::text(&v)),
            ContentPayload::Image { image_urls } => self
                .adapter
                .classify_images(image_urls, context, locale)
                .await
                .map(|v| Assessment::image(&v)),
            ContentPayload::Video {
                video_url,
                thumbnail_url,
            } => self
                .adapter
                .classify_video(video_url, thumbnail_url, context, locale)
                .await
                .map(|c| Assessment::video(c, context)),
            ContentPayload::Audio { audio_url } => self
                .adapter
                .classify_audio(audio_url, context, locale)
                .await
                .map(|v| Assessment::audio(&v, context)),
        };

        match outcome {
            Ok(assessment) => assessment,
            Err(e) => self.fallback(item, locale, e),
        }
    }

    async fn check_caption(
        &self,
        caption: Option<&str>,
        context: &DeclaredContext,
        locale: &str,
    ) -> Option<CaptionCheck> {
        let caption = caption?;
        let check = match self.adapter.classify_text(caption, context, locale).await {
            Ok(verdict) => verdict.into(),
            Err(e) => {
                tracing::warn!("Caption classification failed, using lexical: {}", e);
                lexical::classify(caption, locale).into()
            }
        };
        Some(check)
    }

    fn fallback(&self, item: &ContentItem, locale: &str, error: ClassifierError) -> Assessment {
        let content_type = item.content_type();
        let context = &item.declared_context;
        let text = match &item.payload {
            ContentPayload::Text { text } => Some(text.as_str()),
            ContentPayload::Image { .. } => context.post_text.as_deref(),
            ContentPayload::Video { .. } | ContentPayload::Audio { .. } => context
                .transcript
                .as_deref()
                .or(context.post_text.as_deref()),
        };
        let lexical = text.map(|t| lexical::classify(t, locale));

        if self.fail_closed_all || content_type.fails_closed() {
            tracing::warn!(
                content_id = %item.id,
                content_type = %content_type,
                mode = ?self.fail_closed_mode,
                "Classifier unusable, failing closed: {}",
                error
            );
            return Assessment::fail_closed(self.fail_closed_mode, lexical);
        }

        tracing::warn!(
            content_id = %item.id,
            content_type = %content_type,
            "Classifier unusable, using lexical fallback: {}",
            error
        );
        Assessment::lexical(lexical.unwrap_or_else(|| lexical::classify("", locale)))
    }
}
